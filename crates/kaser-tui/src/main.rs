//! KASER line editor
//!
//! Terminal front end for `kaser-editor`, built with crossterm and ratatui.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p kaser-tui -- <file_path>
//! ```
//!
//! A missing file is created on the first save. Every save first copies the file on disk
//! to `<file_path>.bak`.
//!
//! # Environment
//!
//! - `KASER_BACKUP_SUFFIX`: backup suffix instead of `.bak`
//! - `KASER_ATOMIC_SAVE=0`: overwrite the file in place instead of renaming a temp file
//! - `KASER_LOG`: log filter (for example `kaser_editor=debug`); the log is written to
//!   `kaser-tui.log` in the system temp directory
//!
//! # Keys
//!
//! Viewing:
//! - Up/Down (j/k): previous/next line
//! - Left/Right, PageUp/PageDown: one page back/forward
//! - Home/End (g/G): first/last line
//! - e: edit the current line in place
//! - r: replace the current line
//! - /: search; n/p: next/previous match
//! - Enter: line details
//! - Ctrl+S: save; Ctrl+D: discard all changes
//! - q/Esc: quit
//!
//! Editing:
//! - Arrows, Home/End: move the cursor
//! - Insert: toggle insert/overwrite
//! - Enter: split the line; Backspace at column 1: join with the previous line
//! - Ctrl+S: save; Ctrl+D: discard changes to this line; Esc: back to viewing

mod app;
mod config;
mod keymap;
mod layout;
mod logging;

use app::App;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use kaser_editor::{EditorSession, KeyToken};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env,
    io::{self, stdout},
    panic,
    path::PathBuf,
    process,
    time::Duration,
};
use tracing::{error, info};

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("kaser-tui", String::as_str);
    let Some(file_arg) = args.get(1) else {
        eprintln!("usage: {program} <file_path>");
        eprintln!("\nexample:");
        eprintln!("  {program} notes.txt");
        process::exit(1);
    };

    let _log_guard = logging::init();
    let file_path = PathBuf::from(file_arg);
    let config = config::from_env();
    info!(path = %file_path.display(), ?config, "starting");

    let session = match EditorSession::open(&file_path, config) {
        Ok(session) => session,
        Err(err) => {
            error!(%err, "open failed");
            eprintln!("{program}: {err}");
            process::exit(1);
        }
    };

    install_panic_hook();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(%err, "terminal loop failed");
        eprintln!("error: {err}");
    }
    info!(
        unsaved = app.session().has_unsaved_changes(),
        log = %logging::log_path().display(),
        "exiting"
    );

    Ok(())
}

/// Leave raw mode before the default hook prints, so the message is readable.
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        error!(%info, "panic");
        default_hook(info);
    }));
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit() {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Resize(_, _) => app.apply(KeyToken::Resize),
                _ => {}
            }
        }
    }

    Ok(())
}
