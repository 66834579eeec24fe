//! Application state and drawing.

use crate::keymap::token_for;
use crate::layout::{
    TAB_WIDTH, clip_line, horizontal_scroll, line_number_width, str_width, visual_x_for_column,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use kaser_editor::{Effect, EditorSession, KeyToken, Mode, ViewSnapshot};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{debug, info, warn};

/// Marker, number padding, modified flag and separator around each line number.
const GUTTER_EXTRA_CELLS: usize = 3;

/// Application state
pub struct App {
    /// The open file
    session: EditorSession,
    /// Set once the main loop should stop
    should_quit: bool,
    /// Waiting for an answer to the unsaved-changes question
    confirm_quit: bool,
    /// Message shown in the status line until the next key
    status_message: String,
}

impl App {
    pub fn new(session: EditorSession) -> Self {
        let status_message = format!(
            "{} lines, {} endings",
            session.line_count(),
            session.buffer().line_ending().label()
        );
        Self {
            session,
            should_quit: false,
            confirm_quit: false,
            status_message,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Handle one terminal key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.confirm_quit {
            self.handle_confirm_key(key.code);
            return;
        }

        if let Some(token) = token_for(key, self.session.accepts_text()) {
            self.apply(token);
        }
    }

    /// Feed a token to the session and report its outcome.
    pub fn apply(&mut self, token: KeyToken) {
        let effect = self.session.handle(token);
        if let Some(effect) = &effect {
            debug!(?effect, "effect");
        }

        match effect {
            Some(Effect::QuitRequested { unsaved: false }) => self.should_quit = true,
            Some(Effect::QuitRequested { unsaved: true }) => {
                self.confirm_quit = true;
                self.status_message =
                    "Unsaved changes. y: discard and quit  s: save and quit  n: cancel"
                        .to_string();
            }
            Some(Effect::GeometryInvalidated) => {}
            Some(effect) => {
                if let Some(message) = status_for(&effect) {
                    self.status_message = message;
                } else {
                    self.status_message.clear();
                }
            }
            None => self.status_message.clear(),
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y' | 'Y') => {
                info!(path = %self.session.path().display(), "quitting, pending edits discarded");
                self.session.discard_all();
                self.should_quit = true;
            }
            KeyCode::Char('s' | 'S') => match self.session.save() {
                Ok(_) => self.should_quit = true,
                Err(err) => {
                    warn!(%err, "save before quit failed");
                    self.status_message = format!("Save failed: {err}");
                    self.confirm_quit = false;
                }
            },
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.confirm_quit = false;
                self.status_message.clear();
            }
            _ => {}
        }
    }

    /// Draw one frame.
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();
        self.session.set_terminal_rows(usize::from(size.height));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // editor
                Constraint::Length(1), // status line
                Constraint::Length(1), // shortcuts
            ])
            .split(size);

        self.render_editor(frame, chunks[0]);
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            " {}{} ",
            self.session.path().display(),
            if self.session.has_unsaved_changes() { " [+]" } else { "" }
        );
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        let snapshot = self.session.snapshot(usize::from(inner.height));

        let (lines, cursor) = editor_lines(
            &snapshot,
            usize::from(inner.width),
            matches!(self.session.mode(), Mode::InlineEdit),
            self.session.search().matches(),
        );
        frame.render_widget(Paragraph::new(lines).block(block), area);

        if let Some((x, row)) = cursor {
            let x = (inner.x as usize + x).min(usize::from(inner.right().saturating_sub(1)));
            let y = inner.y as usize + row;
            frame.set_cursor_position((x as u16, y as u16));
        }
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let prompt = match (self.session.search_prompt(), self.session.mode()) {
            (Some(term), _) => Some(format!("Search > {term}")),
            (None, Mode::LineReplace { draft }) => Some(format!(
                "Replace line {} > {draft}",
                self.session.cursor().line + 1
            )),
            _ => None,
        };

        let status_text = if let Some(prompt) = &prompt {
            prompt.clone()
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            self.position_summary()
        };

        let status_line = Paragraph::new(clip_line(
            &status_text,
            0,
            usize::from(area.width),
            TAB_WIDTH,
        ))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, area);

        if let Some(prompt) = prompt {
            let x = str_width(&prompt, TAB_WIDTH).min(usize::from(area.width.saturating_sub(1)));
            frame.set_cursor_position((area.x + x as u16, area.y));
        }
    }

    fn position_summary(&self) -> String {
        let cursor = self.session.cursor();
        let mut text = format!(
            "{} | line {}/{}",
            self.session.mode().name(),
            cursor.line + 1,
            self.session.line_count()
        );
        if matches!(self.session.mode(), Mode::InlineEdit) {
            text.push_str(&format!(
                " col {} | {}",
                cursor.column + 1,
                if cursor.insert_mode { "INS" } else { "OVR" }
            ));
        }
        let search = self.session.search();
        if search.is_active() {
            text.push_str(&format!(
                " | '{}' {}/{}",
                search.term(),
                search.pointer().map_or(0, |p| p + 1),
                search.matches().len()
            ));
        }
        if self.session.has_unsaved_changes() {
            text.push_str(" | modified");
        }
        text
    }

    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.confirm_quit {
            "Y:discard and quit  S:save and quit  N/Esc:cancel"
        } else if self.session.search_prompt().is_some() {
            "Enter:search  Esc:cancel  (empty term clears the search)"
        } else {
            match self.session.mode() {
                Mode::Viewing => {
                    "e:edit  r:replace  /:search  n/p:next/prev  Enter:details  Ctrl-S:save  Ctrl-D:discard all  q:quit"
                }
                Mode::LineReplace { .. } => "Enter:replace line  Esc:cancel",
                Mode::InlineEdit => {
                    "Esc:done  Ctrl-S:save  Ctrl-D:discard line  Ins:insert/overwrite  Enter:split  Bksp@col1:join"
                }
            }
        };

        let shortcuts_line = Paragraph::new(clip_line(shortcuts, 0, usize::from(area.width), TAB_WIDTH))
            .style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(shortcuts_line, area);
    }
}

/// Styled rows for `snapshot` in an area `width` cells wide, plus the cursor cell
/// `(x, row)` relative to the area when inline editing.
fn editor_lines(
    snapshot: &ViewSnapshot,
    width: usize,
    editing: bool,
    search_matches: &[usize],
) -> (Vec<Line<'static>>, Option<(usize, usize)>) {
    let digits = line_number_width(snapshot.total_lines);
    let gutter = digits + GUTTER_EXTRA_CELLS;
    let text_width = width.saturating_sub(gutter);

    let mut cursor = None;
    let mut lines = Vec::with_capacity(snapshot.lines.len());
    for (row, view) in snapshot.lines.iter().enumerate() {
        let marker = if view.current { '▶' } else { ' ' };
        let flag = if view.modified { '*' } else { ' ' };
        let gutter_text = format!("{marker}{:>digits$}{flag} ", view.index + 1);

        let mut scroll_x = 0;
        if view.current && editing {
            let cursor_x = visual_x_for_column(&view.text, snapshot.cursor.column, TAB_WIDTH);
            scroll_x = horizontal_scroll(cursor_x, text_width);
            cursor = Some((gutter + cursor_x - scroll_x, row));
        }
        let body = clip_line(&view.text, scroll_x, text_width, TAB_WIDTH);

        let gutter_style = if view.modified {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut body_style = Style::default();
        if search_matches.binary_search(&view.index).is_ok() {
            body_style = body_style.fg(Color::Cyan);
        }
        if view.current {
            body_style = body_style.add_modifier(Modifier::BOLD);
        }

        lines.push(Line::from(vec![
            Span::styled(gutter_text, gutter_style),
            Span::styled(body, body_style),
        ]));
    }
    (lines, cursor)
}

/// Status line text for `effect`; `None` clears the status line.
fn status_for(effect: &Effect) -> Option<String> {
    let message = match effect {
        Effect::Saved(report) => {
            let backup = report
                .backup
                .as_ref()
                .map(|path| format!(", backup {}", path.display()))
                .unwrap_or_default();
            format!("Saved {} lines, {} bytes{backup}", report.lines, report.bytes)
        }
        Effect::SaveFailed { message } => format!("Save failed: {message}"),
        Effect::EditStarted { line } => format!("Editing line {}", line + 1),
        Effect::EditFinished { unsaved: true } => "Changes pending, Ctrl-S to save".to_string(),
        Effect::LineDiscarded { line } => format!("Discarded changes to line {}", line + 1),
        Effect::Discarded => "Discarded all changes".to_string(),
        Effect::LineReplaced { line } => format!("Line {} replaced (unsaved)", line + 1),
        Effect::LineUnchanged { line } => format!("Line {} unchanged", line + 1),
        Effect::SearchCancelled => "Search cancelled".to_string(),
        Effect::SearchCompleted { term, .. } if term.is_empty() => "Search cleared".to_string(),
        Effect::SearchCompleted { term, matches: 0 } => format!("No lines match '{term}'"),
        Effect::SearchCompleted { term, matches } => format!("'{term}': {matches} matching lines"),
        Effect::SearchMoved {
            line,
            position,
            total,
        } => format!("Match {position}/{total} at line {}", line + 1),
        Effect::LineDetails {
            line,
            length,
            content,
        } => format!("Line {} ({length} chars): {content}", line + 1),
        Effect::EditFinished { unsaved: false }
        | Effect::SearchPromptOpened
        | Effect::SaveRequested
        | Effect::QuitRequested { .. }
        | Effect::GeometryInvalidated => return None,
    };
    Some(message)
}
