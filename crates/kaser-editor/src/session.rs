//! Editing session
//!
//! [`EditorSession`] owns everything one open file needs: the committed buffer, the pending
//! overlay, the cursor, the mode, and the search state. Nothing lives outside it; the
//! presentation loop feeds it tokens through [`EditorSession::handle`] and reads it back
//! through [`EditorSession::snapshot`].

use crate::machine::{self, Effect};
use crate::persist::{self, SaveOptions, SaveReport};
use crate::search::SearchState;
use crate::snapshot::{ViewLine, ViewSnapshot};
use crate::text;
use crate::viewport::{ViewportWindow, compute_window};
use crate::{Cursor, EditOverlay, KeyToken, LineBuffer, Mode, Result};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Terminal height assumed until the presentation loop reports the real one.
pub const DEFAULT_TERMINAL_ROWS: usize = 24;

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How saves are performed.
    pub save: SaveOptions,
    /// Initial terminal height, used for paging until [`EditorSession::set_terminal_rows`]
    /// is called.
    pub terminal_rows: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            save: SaveOptions::default(),
            terminal_rows: DEFAULT_TERMINAL_ROWS,
        }
    }
}

/// One open file and all of its editing state.
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub(crate) path: PathBuf,
    pub(crate) buffer: LineBuffer,
    /// Buffer as of the last load or save; restored by a full discard.
    pub(crate) saved: LineBuffer,
    pub(crate) overlay: EditOverlay,
    pub(crate) cursor: Cursor,
    pub(crate) mode: Mode,
    pub(crate) search: SearchState,
    pub(crate) search_prompt: Option<String>,
    /// Buffer indices of empty lines inserted by mid-file splits since the last save.
    pub(crate) placeholders: BTreeSet<usize>,
    pub(crate) terminal_rows: usize,
    config: SessionConfig,
}

impl EditorSession {
    /// Load `path` and start viewing it.
    ///
    /// # Errors
    ///
    /// Propagates [`LineBuffer::load`] failures.
    pub fn open(path: impl Into<PathBuf>, config: SessionConfig) -> Result<Self> {
        let path = path.into();
        let buffer = LineBuffer::load(&path)?;
        Ok(Self::with_buffer(path, buffer, config))
    }

    /// Start a session over an already loaded buffer.
    pub fn with_buffer(path: impl Into<PathBuf>, buffer: LineBuffer, config: SessionConfig) -> Self {
        Self {
            path: path.into(),
            saved: buffer.clone(),
            buffer,
            overlay: EditOverlay::new(),
            cursor: Cursor::new(),
            mode: Mode::Viewing,
            search: SearchState::new(),
            search_prompt: None,
            placeholders: BTreeSet::new(),
            terminal_rows: config.terminal_rows,
            config,
        }
    }

    /// File this session edits.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Committed lines.
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Pending edits.
    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    /// Cursor position and insert flag.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Current mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Active search.
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Search term being typed, while the search prompt is open.
    pub fn search_prompt(&self) -> Option<&str> {
        self.search_prompt.as_deref()
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// `true` while typed characters are text (editing or prompting) rather than commands.
    pub fn accepts_text(&self) -> bool {
        self.search_prompt.is_some() || self.mode.is_text_entry()
    }

    /// Number of lines the user sees, pending appended lines included.
    pub fn line_count(&self) -> usize {
        self.overlay.effective_line_count(&self.buffer)
    }

    /// Effective content of line `index`.
    pub fn line(&self, index: usize) -> Result<Cow<'_, str>> {
        self.overlay.get_effective(&self.buffer, index)
    }

    /// `true` when line `index` differs from what is on disk.
    pub fn is_line_modified(&self, index: usize) -> bool {
        self.overlay.contains(index)
    }

    /// `true` when saving would change the file.
    ///
    /// Edits that were undone by hand (a split followed by the matching join, a line typed
    /// back to its old text) do not count.
    pub fn has_unsaved_changes(&self) -> bool {
        if self.overlay.is_empty() {
            return self.buffer != self.saved;
        }
        if self.buffer == self.saved {
            return self
                .overlay
                .indices()
                .any(|index| self.overlay.get(index) != self.saved.get(index).ok());
        }
        let mut committed = self.buffer.clone();
        match self.overlay.clone().commit(&mut committed) {
            Ok(()) => committed != self.saved,
            Err(_) => true,
        }
    }

    /// Terminal height last reported by the presentation loop.
    pub fn terminal_rows(&self) -> usize {
        self.terminal_rows
    }

    /// Record the terminal height used for paging.
    pub fn set_terminal_rows(&mut self, rows: usize) {
        self.terminal_rows = rows;
    }

    /// Lines to draw when `visible_rows` rows are available.
    pub fn window(&self, visible_rows: usize) -> ViewportWindow {
        compute_window(self.line_count(), self.cursor.line, visible_rows)
    }

    /// Everything needed to draw `visible_rows` rows of text.
    pub fn snapshot(&self, visible_rows: usize) -> ViewSnapshot {
        let window = self.window(visible_rows);
        let lines = window
            .as_range()
            .map(|index| ViewLine {
                index,
                text: self.line_text(index),
                modified: self.is_line_modified(index),
                current: index == self.cursor.line,
            })
            .collect();
        ViewSnapshot {
            window,
            lines,
            cursor: self.cursor,
            total_lines: self.line_count(),
        }
    }

    /// Apply one token, running the Persistence Gate when the token asks for it.
    ///
    /// A failed save is reported as [`Effect::SaveFailed`]; the session returns to viewing
    /// with every edit still pending.
    pub fn handle(&mut self, token: KeyToken) -> Option<Effect> {
        match machine::apply(self, token) {
            Some(Effect::SaveRequested) => Some(match self.save() {
                Ok(report) => Effect::Saved(report),
                Err(err) => {
                    warn!(%err, path = %self.path.display(), "save failed, edits kept pending");
                    Effect::SaveFailed {
                        message: err.to_string(),
                    }
                }
            }),
            effect => effect,
        }
    }

    /// Back up the file, commit pending edits and write them.
    ///
    /// # Errors
    ///
    /// See [`persist::save`]. On error nothing in the session changes.
    pub fn save(&mut self) -> Result<SaveReport> {
        let report = persist::save(
            &self.path,
            &mut self.buffer,
            &mut self.overlay,
            &self.config.save,
        )?;
        self.saved = self.buffer.clone();
        self.placeholders.clear();
        self.clamp_cursor();
        Ok(report)
    }

    /// Drop every pending change and return to the last saved content.
    pub fn discard_all(&mut self) {
        self.buffer = self.saved.clone();
        self.overlay.clear();
        self.placeholders.clear();
        self.clamp_cursor();
    }

    pub(crate) fn line_text(&self, index: usize) -> String {
        match self.overlay.get_effective(&self.buffer, index) {
            Ok(line) => line.into_owned(),
            Err(err) => {
                error!(%err, "effective line lookup failed");
                String::new()
            }
        }
    }

    pub(crate) fn line_len(&self, index: usize) -> usize {
        text::char_len(&self.line_text(index))
    }

    pub(crate) fn clamp_cursor(&mut self) {
        let line = self.cursor.line.min(self.line_count() - 1);
        self.cursor.line = line;
        self.cursor.column = self.cursor.column.min(self.line_len(line));
    }
}
