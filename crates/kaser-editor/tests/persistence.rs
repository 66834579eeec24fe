use kaser_editor::{
    Effect, EditorError, EditorSession, KeyToken, LineEnding, SaveOptions, SessionConfig,
    backup_path,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn open(path: &Path) -> EditorSession {
    EditorSession::open(path, SessionConfig::default()).unwrap()
}

fn type_text(session: &mut EditorSession, text: &str) {
    for ch in text.chars() {
        session.handle(KeyToken::PrintableChar(ch));
    }
}

#[test]
fn test_edit_save_scenario_writes_backup_then_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "Line 1\nLine 2\nLine 3\n").unwrap();

    let mut session = open(&path);
    session.handle(KeyToken::MoveDown);
    session.handle(KeyToken::EditStart);
    session.handle(KeyToken::End);
    type_text(&mut session, " extra");

    let effect = session.handle(KeyToken::ExplicitSave);
    let Some(Effect::Saved(report)) = effect else {
        panic!("expected a successful save, got {effect:?}");
    };

    let backup = dir.path().join("notes.txt.bak");
    assert_eq!(report.backup.as_deref(), Some(backup.as_path()));
    assert_eq!(report.lines, 3);
    assert_eq!(
        fs::read_to_string(&backup).unwrap(),
        "Line 1\nLine 2\nLine 3\n"
    );
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Line 1\nLine 2 extra\nLine 3\n"
    );
    assert_eq!(report.bytes, "Line 1\nLine 2 extra\nLine 3\n".len());

    assert!(session.overlay().is_empty());
    assert!(!session.has_unsaved_changes());
    assert_eq!(session.buffer().get(1).unwrap(), "Line 2 extra");
}

#[test]
fn test_failed_backup_aborts_save_and_keeps_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "keep me\n").unwrap();
    // A directory in the backup's place makes the copy fail.
    fs::create_dir(backup_path(&path, ".bak")).unwrap();

    let mut session = open(&path);
    session.handle(KeyToken::EditStart);
    type_text(&mut session, ">> ");

    let err = session.save().unwrap_err();
    assert!(matches!(err, EditorError::BackupFailed { .. }), "{err:?}");
    assert!(err.is_io());
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");
    assert_eq!(session.line(0).unwrap(), ">> keep me");

    let effect = session.handle(KeyToken::ExplicitSave);
    assert!(
        matches!(effect, Some(Effect::SaveFailed { ref message }) if message.contains("backup")),
        "{effect:?}"
    );
    assert!(session.has_unsaved_changes());
    assert_eq!(session.buffer().get(0).unwrap(), "keep me");
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");
}

#[test]
fn test_saving_new_file_creates_no_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.txt");

    let mut session = open(&path);
    assert_eq!(session.line_count(), 1);
    session.handle(KeyToken::EditStart);
    type_text(&mut session, "hello");

    let report = session.save().unwrap();
    assert_eq!(report.backup, None);
    assert!(!backup_path(&path, ".bak").exists());
    // A new file starts as one unterminated line.
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
}

#[test]
fn test_backup_is_overwritten_by_each_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");
    fs::write(&path, "v1\n").unwrap();

    let mut session = open(&path);
    session.handle(KeyToken::EditStart);
    session.handle(KeyToken::End);
    type_text(&mut session, "+");
    session.save().unwrap();
    type_text(&mut session, "+");
    session.save().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "v1++\n");
    assert_eq!(
        fs::read_to_string(backup_path(&path, ".bak")).unwrap(),
        "v1+\n"
    );
}

#[test]
fn test_custom_backup_suffix_and_in_place_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ini");
    fs::write(&path, "a=1\nb=2\n").unwrap();

    let config = SessionConfig {
        save: SaveOptions {
            backup_suffix: "~".to_string(),
            atomic: false,
        },
        ..SessionConfig::default()
    };
    let mut session = EditorSession::open(&path, config).unwrap();
    session.handle(KeyToken::MoveDown);
    session.handle(KeyToken::ReplaceLine);
    type_text(&mut session, "b=3");
    session.handle(KeyToken::Enter);

    let report = session.save().unwrap();
    assert_eq!(report.backup, Some(dir.path().join("config.ini~")));
    assert_eq!(fs::read_to_string(&path).unwrap(), "a=1\nb=3\n");
}

#[test]
fn test_crlf_terminators_survive_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dos.txt");
    fs::write(&path, "one\r\ntwo\r\nthree").unwrap();

    let mut session = open(&path);
    assert_eq!(session.buffer().line_ending(), LineEnding::Crlf);
    session.handle(KeyToken::MoveDown);
    session.handle(KeyToken::EditStart);
    session.handle(KeyToken::End);
    type_text(&mut session, "!");
    session.save().unwrap();

    // The missing final terminator stays missing.
    assert_eq!(fs::read(&path).unwrap(), b"one\r\ntwo!\r\nthree".to_vec());
}

#[test]
fn test_split_and_appended_lines_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");
    fs::write(&path, "apple banana\ncherry\n").unwrap();

    let mut session = open(&path);
    session.handle(KeyToken::EditStart);
    for _ in 0..5 {
        session.handle(KeyToken::MoveRight);
    }
    session.handle(KeyToken::Enter);
    session.handle(KeyToken::Delete);
    session.handle(KeyToken::MoveDown);
    session.handle(KeyToken::End);
    session.handle(KeyToken::Enter);
    type_text(&mut session, "date");

    assert_eq!(session.line_count(), 4);
    let report = session.save().unwrap();
    assert_eq!(report.lines, 4);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "apple\nbanana\ncherry\ndate\n"
    );

    let reopened = open(&path);
    assert_eq!(reopened.buffer(), session.buffer());
}

#[test]
fn test_join_is_written_after_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("join.txt");
    fs::write(&path, "foo\nbar\nbaz\n").unwrap();

    let mut session = open(&path);
    session.handle(KeyToken::MoveDown);
    session.handle(KeyToken::EditStart);
    session.handle(KeyToken::Backspace);
    assert!(session.has_unsaved_changes());

    session.handle(KeyToken::Escape);
    assert_eq!(
        session.handle(KeyToken::ExplicitSave),
        Some(Effect::Saved(kaser_editor::SaveReport {
            backup: Some(backup_path(&path, ".bak")),
            lines: 2,
            bytes: "foobar\nbaz\n".len(),
        }))
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "foobar\nbaz\n");
}

#[test]
fn test_save_without_changes_in_viewing_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("same.txt");
    fs::write(&path, "unchanged\n").unwrap();

    let mut session = open(&path);
    assert_eq!(session.handle(KeyToken::ExplicitSave), None);
    assert!(!backup_path(&path, ".bak").exists());
}

#[test]
fn test_discard_all_restores_saved_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("undo.txt");
    fs::write(&path, "x\ny\nz\n").unwrap();

    let mut session = open(&path);
    session.handle(KeyToken::MoveDown);
    session.handle(KeyToken::EditStart);
    session.handle(KeyToken::Backspace);
    session.handle(KeyToken::Enter);
    session.handle(KeyToken::Enter);
    type_text(&mut session, "new");
    session.handle(KeyToken::Escape);
    assert_eq!(session.line_count(), 4);

    assert_eq!(
        session.handle(KeyToken::ExplicitDiscard),
        Some(Effect::Discarded)
    );
    assert!(!session.has_unsaved_changes());
    assert_eq!(session.line_count(), 3);
    assert_eq!(session.line(1).unwrap(), "y");
    assert!(session.cursor().line < 3);
    assert_eq!(fs::read_to_string(&path).unwrap(), "x\ny\nz\n");
}

#[test]
fn test_open_rejects_invalid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("binary.dat");
    fs::write(&path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

    let err = EditorSession::open(&path, SessionConfig::default()).unwrap_err();
    assert!(matches!(err, EditorError::Encoding { .. }), "{err:?}");
}

#[cfg(unix)]
#[test]
fn test_atomic_save_through_symlink_writes_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real.txt");
    let link = dir.path().join("link.txt");
    fs::write(&real, "one\n").unwrap();
    std::os::unix::fs::symlink("real.txt", &link).unwrap();

    let mut session = open(&link);
    session.handle(KeyToken::EditStart);
    type_text(&mut session, "X");
    let effect = session.handle(KeyToken::ExplicitSave);
    assert!(matches!(effect, Some(Effect::Saved(_))), "{effect:?}");

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&real).unwrap(), "Xone\n");
    assert_eq!(fs::read_to_string(&link).unwrap(), "Xone\n");
    assert_eq!(
        fs::read_to_string(backup_path(&link, ".bak")).unwrap(),
        "one\n"
    );
}

#[cfg(unix)]
#[test]
fn test_atomic_save_keeps_hard_links_shared() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("first.txt");
    let other = dir.path().join("second.txt");
    fs::write(&path, "one\n").unwrap();
    fs::hard_link(&path, &other).unwrap();

    let mut session = open(&path);
    session.handle(KeyToken::EditStart);
    type_text(&mut session, "X");
    session.save().unwrap();

    assert_eq!(fs::read_to_string(&other).unwrap(), "Xone\n");
}

#[cfg(unix)]
#[test]
fn test_atomic_save_of_read_only_file_behaves_like_in_place_write() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.txt");
    fs::write(&path, "locked\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();
    // Privileged users may write read-only files; the save must agree with the OS either way.
    let writable = fs::OpenOptions::new().write(true).open(&path).is_ok();

    let mut session = open(&path);
    session.handle(KeyToken::EditStart);
    type_text(&mut session, "x");
    let result = session.save();

    assert_eq!(result.is_ok(), writable, "{result:?}");
    if writable {
        assert_eq!(fs::read_to_string(&path).unwrap(), "xlocked\n");
    } else {
        assert!(result.unwrap_err().is_io());
        assert_eq!(fs::read_to_string(&path).unwrap(), "locked\n");
        assert!(session.has_unsaved_changes());
    }
    assert_eq!(
        fs::metadata(&path).unwrap().permissions().mode() & 0o777,
        0o444
    );
}
