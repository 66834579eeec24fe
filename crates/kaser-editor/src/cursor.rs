//! Cursor position and editing mode.

/// Cursor position plus the insert/overwrite flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Line index (0-based).
    pub line: usize,
    /// Column in characters.
    pub column: usize,
    /// `true` = insert, `false` = overwrite.
    pub insert_mode: bool,
}

impl Cursor {
    /// Cursor at the start of the file in insert mode.
    pub fn new() -> Self {
        Self::at(0, 0)
    }

    /// Cursor at `(line, column)` in insert mode.
    pub fn at(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            insert_mode: true,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Which interaction the session is in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Read-only navigation, search, line details.
    #[default]
    Viewing,
    /// Prompted replacement of the current line; `draft` is what has been typed so far.
    LineReplace {
        /// Replacement text typed so far.
        draft: String,
    },
    /// Character-level editing with a live cursor.
    InlineEdit,
}

impl Mode {
    /// Short label for status lines and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Viewing => "view",
            Self::LineReplace { .. } => "replace",
            Self::InlineEdit => "edit",
        }
    }

    /// `true` while keystrokes are text rather than commands.
    pub fn is_text_entry(&self) -> bool {
        !matches!(self, Self::Viewing)
    }
}
