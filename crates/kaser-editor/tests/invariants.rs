//! Random keystroke sequences must never leave the session in an inconsistent state.

use kaser_editor::{EditorSession, KeyToken, LineBuffer, Mode, SessionConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOKENS: &[KeyToken] = &[
    KeyToken::MoveLeft,
    KeyToken::MoveRight,
    KeyToken::MoveUp,
    KeyToken::MoveDown,
    KeyToken::Home,
    KeyToken::End,
    KeyToken::PageUp,
    KeyToken::PageDown,
    KeyToken::ToggleInsert,
    KeyToken::Backspace,
    KeyToken::Backspace,
    KeyToken::Delete,
    KeyToken::Enter,
    KeyToken::Enter,
    KeyToken::Escape,
    KeyToken::ExplicitDiscard,
    KeyToken::EditStart,
    KeyToken::EditStart,
    KeyToken::ReplaceLine,
    KeyToken::SearchStart,
    KeyToken::SearchNext,
    KeyToken::SearchPrev,
    KeyToken::Resize,
    KeyToken::PrintableChar('a'),
    KeyToken::PrintableChar('b'),
    KeyToken::PrintableChar(' '),
    KeyToken::PrintableChar('é'),
    KeyToken::PrintableChar('\t'),
];

fn check(session: &EditorSession, step: usize, token: KeyToken) {
    let count = session.line_count();
    let cursor = session.cursor();
    assert!(count >= 1, "step {step} ({token:?}): no lines");
    assert!(
        cursor.line < count,
        "step {step} ({token:?}): line {} of {count}",
        cursor.line
    );

    let line = session.line(cursor.line).unwrap();
    if *session.mode() == Mode::InlineEdit {
        assert!(
            cursor.column <= line.chars().count(),
            "step {step} ({token:?}): column {} past {line:?}",
            cursor.column
        );
    } else {
        assert_eq!(cursor.column, 0, "step {step} ({token:?}): column outside editing");
    }

    // Every pending entry is either a buffer line or part of the appended run.
    let buffer_len = session.buffer().line_count();
    for index in session.overlay().indices() {
        assert!(index < count, "step {step} ({token:?}): stray entry {index}");
    }
    assert_eq!(
        count - buffer_len,
        session.overlay().indices().filter(|&i| i >= buffer_len).count()
    );
}

#[test]
fn test_random_keystrokes_keep_cursor_in_bounds() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = EditorSession::with_buffer(
            "random.txt",
            LineBuffer::from_text("alpha beta\n\ngamma\ndelta epsilon zeta\n"),
            SessionConfig::default(),
        );

        for step in 0..400 {
            let token = TOKENS[rng.gen_range(0..TOKENS.len())];
            session.handle(token);
            check(&session, step, token);
        }
    }
}

#[test]
fn test_discard_all_after_random_edits_restores_file() {
    let original = "one\ntwo\nthree\n";
    for seed in 100..116 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = EditorSession::with_buffer(
            "discard.txt",
            LineBuffer::from_text(original),
            SessionConfig::default(),
        );

        for _ in 0..200 {
            let token = TOKENS[rng.gen_range(0..TOKENS.len())];
            session.handle(token);
        }
        session.discard_all();

        assert!(!session.has_unsaved_changes(), "seed {seed}");
        assert_eq!(session.buffer().to_text(), original, "seed {seed}");
        assert_eq!(session.line_count(), 3, "seed {seed}");
    }
}
