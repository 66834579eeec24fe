//! Edit Overlay
//!
//! A sparse map from line index to pending line content. The overlay is what the user sees
//! and edits; the [`LineBuffer`] is what was last read from or written to disk. Entries at
//! `buffer.line_count()` and above are lines appended during editing that do not exist in the
//! buffer yet.

use crate::{EditorError, LineBuffer, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Pending, uncommitted line contents keyed by line index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOverlay {
    entries: BTreeMap<usize, String>,
}

impl EditOverlay {
    /// Create an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending content for `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    /// The text the user sees at `index`: the overlay entry if present, else the buffer line.
    ///
    /// # Errors
    ///
    /// [`EditorError::OutOfRange`] when `index` is past the buffer and has no entry.
    pub fn get_effective<'a>(&'a self, buffer: &'a LineBuffer, index: usize) -> Result<Cow<'a, str>> {
        match self.entries.get(&index) {
            Some(content) => Ok(Cow::Borrowed(content.as_str())),
            None => buffer.get(index).map(Cow::Borrowed),
        }
    }

    /// Insert or update the pending content of `index`.
    pub fn set(&mut self, index: usize, content: impl Into<String>) {
        self.entries.insert(index, content.into());
    }

    /// Drop the pending content of `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        self.entries.remove(&index)
    }

    /// Drop every pending entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `true` when `index` has pending content.
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Indices with pending content, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// Buffer length plus the contiguous run of appended lines that follows it.
    pub fn effective_line_count(&self, buffer: &LineBuffer) -> usize {
        let mut count = buffer.line_count();
        while self.entries.contains_key(&count) {
            count += 1;
        }
        count
    }

    /// Shift every entry at or after `at` one line down, leaving `at` free.
    pub fn open_gap(&mut self, at: usize) {
        let tail = self.entries.split_off(&at);
        self.entries
            .extend(tail.into_iter().map(|(index, content)| (index + 1, content)));
    }

    /// Drop the entry at `at` and shift every later entry one line up.
    pub fn close_gap(&mut self, at: usize) {
        let mut tail = self.entries.split_off(&at);
        tail.remove(&at);
        self.entries
            .extend(tail.into_iter().map(|(index, content)| (index - 1, content)));
    }

    /// Fold every entry into `buffer`, then clear the overlay.
    ///
    /// In-range entries replace buffer lines; entries at the buffer's end are appended in
    /// ascending order. The buffer is left untouched if the appended run has a hole.
    pub fn commit(&mut self, buffer: &mut LineBuffer) -> Result<()> {
        let base = buffer.line_count();
        let mut expected = base;
        for &index in self.entries.range(base..).map(|(index, _)| index) {
            if index != expected {
                return Err(EditorError::OutOfRange {
                    index,
                    len: expected,
                });
            }
            expected += 1;
        }

        for (index, content) in std::mem::take(&mut self.entries) {
            if index < base {
                buffer.replace(index, content)?;
            } else {
                buffer.insert_after(buffer.line_count() - 1, content)?;
            }
        }
        Ok(())
    }
}
