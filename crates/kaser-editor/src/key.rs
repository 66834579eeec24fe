//! Abstract key tokens.
//!
//! Decoding raw terminal input into tokens is the caller's job; the engine only ever sees
//! this closed alphabet.

/// One decoded keystroke or control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    /// Cursor left (page up while viewing).
    MoveLeft,
    /// Cursor right (page down while viewing).
    MoveRight,
    /// Previous line.
    MoveUp,
    /// Next line.
    MoveDown,
    /// Start of line (first line while viewing).
    Home,
    /// End of line (last line while viewing).
    End,
    /// Scroll one page up.
    PageUp,
    /// Scroll one page down.
    PageDown,
    /// Flip between insert and overwrite.
    ToggleInsert,
    /// Delete before the cursor, joining lines at column 0.
    Backspace,
    /// Delete under the cursor.
    Delete,
    /// Split the line, confirm a prompt, or show line details.
    Enter,
    /// Finish editing, cancel a prompt, or request quitting.
    Escape,
    /// Save now.
    ExplicitSave,
    /// Drop pending edits.
    ExplicitDiscard,
    /// Start inline editing of the current line.
    EditStart,
    /// Start a prompted whole-line replacement.
    ReplaceLine,
    /// Open the search prompt.
    SearchStart,
    /// Jump to the next search match.
    SearchNext,
    /// Jump to the previous search match.
    SearchPrev,
    /// The terminal may have changed size.
    Resize,
    /// A typed character.
    PrintableChar(char),
}

impl KeyToken {
    /// `true` for characters that may be inserted into a line.
    pub fn is_insertable(self) -> bool {
        matches!(self, Self::PrintableChar(ch) if !ch.is_control())
    }
}
