//! Line Buffer
//!
//! Owns the committed lines of a file. Terminators are kept out-of-band so that saving an
//! unedited buffer reproduces the file byte for byte.

use crate::text::split_lines_with_endings;
use crate::{EditorError, LineEnding, Result};
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredLine {
    text: String,
    ending: Option<LineEnding>,
}

/// The committed lines of a file.
///
/// Invariant: never empty. A zero-byte file is one empty, unterminated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<StoredLine>,
    line_ending: LineEnding,
}

impl LineBuffer {
    /// Create a buffer holding a single empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![StoredLine {
                text: String::new(),
                ending: None,
            }],
            line_ending: LineEnding::Lf,
        }
    }

    /// Build a buffer from in-memory text, splitting on LF, CRLF and lone CR.
    pub fn from_text(text: &str) -> Self {
        let lines = split_lines_with_endings(text)
            .into_iter()
            .map(|(text, ending)| StoredLine { text, ending })
            .collect();
        Self {
            lines,
            line_ending: LineEnding::detect_in_text(text),
        }
    }

    /// Read `path` as UTF-8 text.
    ///
    /// A missing file yields a buffer with one empty line.
    ///
    /// # Errors
    ///
    /// [`EditorError::Io`] for read failures other than not-found, and
    /// [`EditorError::Encoding`] when the content is not valid UTF-8.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "file does not exist, starting empty");
                return Ok(Self::new());
            }
            Err(err) => return Err(EditorError::io("read", path, err)),
        };
        let text = String::from_utf8(bytes).map_err(|source| EditorError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;
        let buffer = Self::from_text(&text);
        info!(
            path = %path.display(),
            lines = buffer.line_count(),
            ending = buffer.line_ending.label(),
            "loaded"
        );
        Ok(buffer)
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Terminator used for lines created by editing.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Text of line `index`, without its terminator.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.lines
            .get(index)
            .map(|line| line.text.as_str())
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Iterate over line texts in file order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }

    /// Replace the text of line `index`, keeping its terminator.
    pub fn replace(&mut self, index: usize, content: impl Into<String>) -> Result<()> {
        let err = self.out_of_range(index);
        let line = self.lines.get_mut(index).ok_or(err)?;
        line.text = content.into();
        Ok(())
    }

    /// Insert a new line directly after line `index`.
    ///
    /// Inserting after the final line moves the final line's terminator state onto the new
    /// line, and the former final line takes the buffer's dominant ending.
    pub fn insert_after(&mut self, index: usize, content: impl Into<String>) -> Result<()> {
        if index >= self.lines.len() {
            return Err(self.out_of_range(index));
        }
        let dominant = self.line_ending;
        let ending = if index + 1 == self.lines.len() {
            self.lines[index].ending.replace(dominant)
        } else {
            Some(dominant)
        };
        self.lines.insert(
            index + 1,
            StoredLine {
                text: content.into(),
                ending,
            },
        );
        Ok(())
    }

    /// Remove line `index` and return its text.
    ///
    /// # Errors
    ///
    /// [`EditorError::LastLine`] when only one line remains.
    pub fn remove(&mut self, index: usize) -> Result<String> {
        if index >= self.lines.len() {
            return Err(self.out_of_range(index));
        }
        if self.lines.len() == 1 {
            return Err(EditorError::LastLine);
        }
        let removed = self.lines.remove(index);
        if index == self.lines.len() {
            if let Some(last) = self.lines.last_mut() {
                last.ending = removed.ending;
            }
        }
        Ok(removed.text)
    }

    /// Reconstitute the file content, terminators included.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.text.len() + 2).sum());
        for line in &self.lines {
            out.push_str(&line.text);
            if let Some(ending) = line.ending {
                out.push_str(ending.as_str());
            }
        }
        out
    }

    /// Stream the file content into `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for line in &self.lines {
            writer.write_all(line.text.as_bytes())?;
            if let Some(ending) = line.ending {
                writer.write_all(ending.as_str().as_bytes())?;
            }
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> EditorError {
        EditorError::OutOfRange {
            index,
            len: self.lines.len(),
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
