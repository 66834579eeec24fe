//! Terminal key events to engine tokens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kaser_editor::KeyToken;

/// Decode `key` into a token.
///
/// `accepts_text` is `true` while the session treats letters as text (inline edit, line
/// replace, search prompt); otherwise single letters are commands.
pub fn token_for(key: KeyEvent, accepts_text: bool) -> Option<KeyToken> {
    let token = match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => KeyToken::ExplicitSave,
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => KeyToken::ExplicitDiscard,

        (_, KeyCode::Left) => KeyToken::MoveLeft,
        (_, KeyCode::Right) => KeyToken::MoveRight,
        (_, KeyCode::Up) => KeyToken::MoveUp,
        (_, KeyCode::Down) => KeyToken::MoveDown,
        (_, KeyCode::Home) => KeyToken::Home,
        (_, KeyCode::End) => KeyToken::End,
        (_, KeyCode::PageUp) => KeyToken::PageUp,
        (_, KeyCode::PageDown) => KeyToken::PageDown,
        (_, KeyCode::Insert) => KeyToken::ToggleInsert,
        (_, KeyCode::Backspace) => KeyToken::Backspace,
        (_, KeyCode::Delete) => KeyToken::Delete,
        (_, KeyCode::Enter) => KeyToken::Enter,
        (_, KeyCode::Esc) => KeyToken::Escape,

        (mods, KeyCode::Char(_))
            if mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            return None;
        }
        (_, KeyCode::Char(ch)) if accepts_text => KeyToken::PrintableChar(ch),
        (_, KeyCode::Char(ch)) => command_for(ch)?,

        _ => return None,
    };
    Some(token)
}

fn command_for(ch: char) -> Option<KeyToken> {
    Some(match ch {
        'e' => KeyToken::EditStart,
        'r' => KeyToken::ReplaceLine,
        '/' => KeyToken::SearchStart,
        'n' => KeyToken::SearchNext,
        'p' | 'N' => KeyToken::SearchPrev,
        'q' => KeyToken::Escape,
        'j' => KeyToken::MoveDown,
        'k' => KeyToken::MoveUp,
        'g' => KeyToken::Home,
        'G' => KeyToken::End,
        _ => return None,
    })
}
