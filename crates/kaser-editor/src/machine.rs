//! Cursor/Mode State Machine
//!
//! [`apply`] interprets one [`KeyToken`] against an [`EditorSession`]. It is total over the
//! token alphabet: a token that means nothing in the current mode is ignored, and all index
//! arithmetic saturates or clamps.
//!
//! Character edits always read the *effective* line (overlay first, buffer second) and write
//! the result back into the overlay. Splits and joins are the only edits that touch the line
//! structure: a split in the middle of the file inserts a placeholder line into the buffer, a
//! join removes the joined line from it, and the overlay entries below are shifted to match.

use crate::search::{SearchState, search};
use crate::text;
use crate::viewport::page_size;
use crate::{EditorSession, KeyToken, Mode, SaveReport};
use std::collections::BTreeSet;
use tracing::{debug, error, trace};

/// Something the caller should react to after a token was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The Persistence Gate should run now. [`EditorSession::handle`] resolves this into
    /// [`Effect::Saved`] or [`Effect::SaveFailed`].
    SaveRequested,
    /// The file was saved.
    Saved(SaveReport),
    /// Saving failed; every edit is still pending.
    SaveFailed {
        /// Human readable cause, including the OS message.
        message: String,
    },
    /// Inline editing started on `line`.
    EditStarted {
        /// Line being edited.
        line: usize,
    },
    /// Inline editing ended without saving.
    EditFinished {
        /// `true` when pending edits remain unsaved.
        unsaved: bool,
    },
    /// The pending edit of `line` was dropped.
    LineDiscarded {
        /// Line whose edit was dropped.
        line: usize,
    },
    /// Every pending change was dropped.
    Discarded,
    /// A prompted replacement was stored for `line`.
    LineReplaced {
        /// Replaced line.
        line: usize,
    },
    /// A prompted replacement matched the current content and was ignored.
    LineUnchanged {
        /// Line left as is.
        line: usize,
    },
    /// The search prompt opened.
    SearchPromptOpened,
    /// The search prompt was cancelled.
    SearchCancelled,
    /// A search ran.
    SearchCompleted {
        /// Searched term (empty clears the search).
        term: String,
        /// Number of matching lines.
        matches: usize,
    },
    /// The cursor jumped to a search match.
    SearchMoved {
        /// Line of the match.
        line: usize,
        /// 1-based position of the match among all matches.
        position: usize,
        /// Number of matches.
        total: usize,
    },
    /// Details of the current line were requested.
    LineDetails {
        /// Line index.
        line: usize,
        /// Length in characters.
        length: usize,
        /// Effective content.
        content: String,
    },
    /// The user asked to leave the viewer.
    QuitRequested {
        /// `true` when pending edits would be lost.
        unsaved: bool,
    },
    /// The terminal geometry should be queried again.
    GeometryInvalidated,
}

/// Apply one token to `session`.
pub fn apply(session: &mut EditorSession, token: KeyToken) -> Option<Effect> {
    let before = session.mode.name();
    let effect = if session.search_prompt.is_some() {
        apply_search_prompt(session, token)
    } else {
        match session.mode {
            Mode::Viewing => apply_viewing(session, token),
            Mode::LineReplace { .. } => apply_line_replace(session, token),
            Mode::InlineEdit => apply_inline_edit(session, token),
        }
    };

    let after = session.mode.name();
    if before != after {
        debug!(from = before, to = after, line = session.cursor.line, "mode transition");
    }
    trace!(
        ?token,
        line = session.cursor.line,
        column = session.cursor.column,
        ?effect,
        "applied"
    );
    effect
}

fn apply_viewing(session: &mut EditorSession, token: KeyToken) -> Option<Effect> {
    let last = session.line_count() - 1;
    let page = page_size(session.terminal_rows);
    let line = session.cursor.line;

    match token {
        KeyToken::MoveUp => session.cursor.line = line.saturating_sub(1),
        KeyToken::MoveDown => session.cursor.line = line.saturating_add(1).min(last),
        KeyToken::MoveLeft | KeyToken::PageUp => session.cursor.line = line.saturating_sub(page),
        KeyToken::MoveRight | KeyToken::PageDown => {
            session.cursor.line = line.saturating_add(page).min(last);
        }
        KeyToken::Home => session.cursor.line = 0,
        KeyToken::End => session.cursor.line = last,
        KeyToken::EditStart => {
            session.mode = Mode::InlineEdit;
            session.cursor.column = 0;
            session.cursor.insert_mode = true;
            return Some(Effect::EditStarted { line });
        }
        KeyToken::ReplaceLine => {
            session.mode = Mode::LineReplace {
                draft: String::new(),
            };
        }
        KeyToken::SearchStart => {
            session.search_prompt = Some(String::new());
            return Some(Effect::SearchPromptOpened);
        }
        KeyToken::SearchNext => {
            let target = session.search.next_match()?;
            return Some(jump_to_match(session, target));
        }
        KeyToken::SearchPrev => {
            let target = session.search.prev_match()?;
            return Some(jump_to_match(session, target));
        }
        KeyToken::Enter => {
            let content = session.line_text(line);
            return Some(Effect::LineDetails {
                line,
                length: text::char_len(&content),
                content,
            });
        }
        KeyToken::ExplicitSave => {
            if session.has_unsaved_changes() {
                return Some(Effect::SaveRequested);
            }
        }
        KeyToken::ExplicitDiscard => {
            if session.has_unsaved_changes() {
                session.discard_all();
                return Some(Effect::Discarded);
            }
        }
        KeyToken::Escape => {
            return Some(Effect::QuitRequested {
                unsaved: session.has_unsaved_changes(),
            });
        }
        KeyToken::Resize => {
            session.clamp_cursor();
            return Some(Effect::GeometryInvalidated);
        }
        KeyToken::ToggleInsert
        | KeyToken::Backspace
        | KeyToken::Delete
        | KeyToken::PrintableChar(_) => {}
    }

    session.cursor.column = 0;
    None
}

fn jump_to_match(session: &mut EditorSession, target: usize) -> Effect {
    session.cursor.line = target;
    session.cursor.column = 0;
    session.clamp_cursor();
    Effect::SearchMoved {
        line: session.cursor.line,
        position: session.search.pointer().map_or(0, |p| p + 1),
        total: session.search.matches().len(),
    }
}

fn apply_search_prompt(session: &mut EditorSession, token: KeyToken) -> Option<Effect> {
    let prompt = session.search_prompt.as_mut()?;

    match token {
        KeyToken::PrintableChar(ch) if token.is_insertable() => prompt.push(ch),
        KeyToken::Backspace => {
            prompt.pop();
        }
        KeyToken::Escape => {
            session.search_prompt = None;
            return Some(Effect::SearchCancelled);
        }
        KeyToken::Enter => {
            let term = session
                .search_prompt
                .take()
                .unwrap_or_default()
                .trim()
                .to_string();
            return Some(run_search(session, term));
        }
        KeyToken::Resize => {
            session.clamp_cursor();
            return Some(Effect::GeometryInvalidated);
        }
        _ => {}
    }
    None
}

fn run_search(session: &mut EditorSession, term: String) -> Effect {
    if term.is_empty() {
        session.search.clear();
        return Effect::SearchCompleted { term, matches: 0 };
    }

    let hits = search(&session.buffer, &session.overlay, &term, session.cursor.line);
    session.search = SearchState::from_hits(term.clone(), hits);
    if let Some(line) = session.search.current_line() {
        session.cursor.line = line;
        session.cursor.column = 0;
    }
    Effect::SearchCompleted {
        term,
        matches: session.search.matches().len(),
    }
}

fn apply_line_replace(session: &mut EditorSession, token: KeyToken) -> Option<Effect> {
    let Mode::LineReplace { draft } = &mut session.mode else {
        return None;
    };

    match token {
        KeyToken::PrintableChar(ch) if token.is_insertable() => draft.push(ch),
        KeyToken::Backspace => {
            draft.pop();
        }
        KeyToken::Enter => {
            let draft = std::mem::take(draft);
            session.mode = Mode::Viewing;
            let line = session.cursor.line;
            if draft == session.line_text(line) {
                return Some(Effect::LineUnchanged { line });
            }
            session.overlay.set(line, draft);
            return Some(Effect::LineReplaced { line });
        }
        KeyToken::Escape => session.mode = Mode::Viewing,
        KeyToken::Resize => {
            session.clamp_cursor();
            return Some(Effect::GeometryInvalidated);
        }
        _ => {}
    }
    None
}

fn apply_inline_edit(session: &mut EditorSession, token: KeyToken) -> Option<Effect> {
    let line = session.cursor.line;

    match token {
        KeyToken::MoveLeft => session.cursor.column = session.cursor.column.saturating_sub(1),
        KeyToken::MoveRight => {
            session.cursor.column = (session.cursor.column + 1).min(session.line_len(line));
        }
        KeyToken::MoveUp => {
            if line > 0 {
                move_to_line(session, line - 1);
            }
        }
        KeyToken::MoveDown => {
            if line + 1 < session.line_count() {
                move_to_line(session, line + 1);
            }
        }
        KeyToken::Home => session.cursor.column = 0,
        KeyToken::End => session.cursor.column = session.line_len(line),
        KeyToken::ToggleInsert => session.cursor.insert_mode = !session.cursor.insert_mode,
        KeyToken::PrintableChar(ch) if token.is_insertable() => type_char(session, ch),
        KeyToken::Backspace => backspace(session),
        KeyToken::Delete => delete_forward(session),
        KeyToken::Enter => split_line(session),
        KeyToken::Escape => {
            leave_inline_edit(session);
            return Some(Effect::EditFinished {
                unsaved: session.has_unsaved_changes(),
            });
        }
        KeyToken::ExplicitSave => {
            leave_inline_edit(session);
            return Some(Effect::SaveRequested);
        }
        KeyToken::ExplicitDiscard => {
            discard_line(session, line);
            leave_inline_edit(session);
            return Some(Effect::LineDiscarded { line });
        }
        KeyToken::Resize => {
            session.clamp_cursor();
            return Some(Effect::GeometryInvalidated);
        }
        KeyToken::PageUp
        | KeyToken::PageDown
        | KeyToken::EditStart
        | KeyToken::ReplaceLine
        | KeyToken::SearchStart
        | KeyToken::SearchNext
        | KeyToken::SearchPrev
        | KeyToken::PrintableChar(_) => {}
    }
    None
}

fn leave_inline_edit(session: &mut EditorSession) {
    session.mode = Mode::Viewing;
    session.cursor.column = 0;
}

fn move_to_line(session: &mut EditorSession, target: usize) {
    session.cursor.line = target;
    session.cursor.column = session.cursor.column.min(session.line_len(target));
}

fn type_char(session: &mut EditorSession, ch: char) {
    let line = session.cursor.line;
    let column = session.cursor.column;
    let current = session.line_text(line);
    let updated = if session.cursor.insert_mode {
        text::insert_char(&current, column, ch)
    } else {
        text::overwrite_char(&current, column, ch)
    };
    session.overlay.set(line, updated);
    session.cursor.column = column + 1;
}

fn backspace(session: &mut EditorSession) {
    let line = session.cursor.line;
    let column = session.cursor.column;

    if column > 0 {
        let current = session.line_text(line);
        session
            .overlay
            .set(line, text::remove_char(&current, column - 1));
        session.cursor.column = column - 1;
    } else if line > 0 {
        join_with_previous(session, line);
    }
}

fn join_with_previous(session: &mut EditorSession, line: usize) {
    let previous = session.line_text(line - 1);
    let current = session.line_text(line);
    let join_column = text::char_len(&previous);

    if line < session.buffer.line_count() {
        if let Err(err) = session.buffer.remove(line) {
            error!(%err, line, "join failed");
            return;
        }
        close_placeholder_gap(&mut session.placeholders, line);
    }
    session.overlay.close_gap(line);
    session.overlay.set(line - 1, previous + &current);

    session.cursor.line = line - 1;
    session.cursor.column = join_column;
}

fn delete_forward(session: &mut EditorSession) {
    let line = session.cursor.line;
    let column = session.cursor.column;
    let current = session.line_text(line);
    if column < text::char_len(&current) {
        session.overlay.set(line, text::remove_char(&current, column));
    }
}

fn split_line(session: &mut EditorSession) {
    let line = session.cursor.line;
    let current = session.line_text(line);
    let (first, second) = text::split_at_column(&current, session.cursor.column);
    let next = line + 1;

    // Below the buffer's end the new line is a pending append and needs no placeholder.
    if next < session.buffer.line_count() {
        if let Err(err) = session.buffer.insert_after(line, String::new()) {
            error!(%err, line, "split failed");
            return;
        }
        open_placeholder_gap(&mut session.placeholders, next);
        session.placeholders.insert(next);
    }
    session.overlay.open_gap(next);
    session.overlay.set(line, first);
    session.overlay.set(next, second);

    session.cursor.line = next;
    session.cursor.column = 0;
}

/// Lines that did not exist at the last save (pending appends and split placeholders) are
/// removed; any other line goes back to its buffer text.
fn discard_line(session: &mut EditorSession, line: usize) {
    if line >= session.buffer.line_count() {
        session.overlay.close_gap(line);
    } else if session.placeholders.contains(&line) {
        if let Err(err) = session.buffer.remove(line) {
            error!(%err, line, "discarding split line failed");
            return;
        }
        close_placeholder_gap(&mut session.placeholders, line);
        session.overlay.close_gap(line);
        debug!(line, "split line discarded");
    } else {
        session.overlay.remove(line);
    }
    session.clamp_cursor();
}

fn open_placeholder_gap(placeholders: &mut BTreeSet<usize>, at: usize) {
    let tail = placeholders.split_off(&at);
    placeholders.extend(tail.into_iter().map(|index| index + 1));
}

fn close_placeholder_gap(placeholders: &mut BTreeSet<usize>, at: usize) {
    let mut tail = placeholders.split_off(&at);
    tail.remove(&at);
    placeholders.extend(tail.into_iter().map(|index| index - 1));
}
