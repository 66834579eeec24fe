#![warn(missing_docs)]
//! KASER Editor - Line Editing Engine
//!
//! # Overview
//!
//! `kaser-editor` is the editing core of the KASER terminal file browser. It lets a user
//! inspect and modify a text file line by line: scrollable viewing, in-place cursor editing,
//! prompted whole-line replacement, case-insensitive search, and saving that always backs up
//! the file on disk first.
//!
//! It does not draw anything and does not read the keyboard. A presentation loop decodes
//! keystrokes into [`KeyToken`]s, feeds them to an [`EditorSession`], and renders the
//! [`ViewSnapshot`] it gets back.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorSession (handle / snapshot / save)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Cursor/Mode State Machine                  │  ← Token interpretation
//! ├──────────────────────┬──────────────────────┤
//! │  Search Engine       │  Persistence Gate    │  ← Invoked by the machine
//! ├──────────────────────┴──────────────────────┤
//! │  Edit Overlay (pending edits)               │  ← What the user sees
//! ├─────────────────────────────────────────────┤
//! │  Line Buffer (committed lines + endings)    │  ← What is on disk
//! └─────────────────────────────────────────────┘
//!            Viewport Calculator (pure, per render)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use kaser_editor::{EditorSession, KeyToken, LineBuffer, SessionConfig};
//!
//! let buffer = LineBuffer::from_text("Line 1\nLine 2\nLine 3\n");
//! let mut session = EditorSession::with_buffer("notes.txt", buffer, SessionConfig::default());
//!
//! session.handle(KeyToken::MoveDown);
//! session.handle(KeyToken::EditStart);
//! session.handle(KeyToken::End);
//! for ch in " extra".chars() {
//!     session.handle(KeyToken::PrintableChar(ch));
//! }
//!
//! assert_eq!(session.line(1).unwrap(), "Line 2 extra");
//! // The buffer still holds what is on disk until the next save.
//! assert_eq!(session.buffer().get(1).unwrap(), "Line 2");
//! assert!(session.has_unsaved_changes());
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - committed lines with out-of-band terminators
//! - [`overlay`] - pending edits keyed by line index
//! - [`machine`] - the cursor/mode state machine
//! - [`viewport`] - visible window calculation
//! - [`search`] - case-insensitive line search
//! - [`persist`] - backup-first saving
//! - [`session`] - the session object tying everything together

pub mod buffer;
pub mod cursor;
pub mod error;
pub mod key;
pub mod line_ending;
pub mod machine;
pub mod overlay;
pub mod persist;
pub mod search;
pub mod session;
pub mod snapshot;
mod text;
pub mod viewport;

pub use buffer::LineBuffer;
pub use cursor::{Cursor, Mode};
pub use error::{EditorError, Result};
pub use key::KeyToken;
pub use line_ending::LineEnding;
pub use machine::{Effect, apply};
pub use overlay::EditOverlay;
pub use persist::{DEFAULT_BACKUP_SUFFIX, SaveOptions, SaveReport, backup_path};
pub use search::{SearchHits, SearchState, search};
pub use session::{EditorSession, SessionConfig};
pub use snapshot::{ViewLine, ViewSnapshot};
pub use viewport::{ViewportWindow, compute_window, page_size};
