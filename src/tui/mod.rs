//! Interactive board.
//!
//! - `app`: key handling and cursor state on top of the [`Controller`]
//! - `ui`: layout and widgets
//!
//! [`run_board`] owns the terminal for the lifetime of the session and hands
//! every key press to [`BoardApp::handle_key`].

mod app;
mod ui;

pub use app::{BoardApp, FormField, Selection};
pub use ui::render;

use crate::controller::Controller;
use crate::error::Result;
use crate::persistence::Storage;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;

/// Event poll interval. Also bounds how late an expired notice disappears.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn init_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the board until the user quits.
pub fn run_board<S: Storage>(controller: Controller<S>) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = init_terminal()?;
    let mut app = BoardApp::new(controller);
    tracing::info!("board opened");

    let outcome = event_loop(&mut terminal, &mut app);

    restore_terminal(&mut terminal)?;
    tracing::info!("board closed");
    outcome
}

fn event_loop<S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut BoardApp<S>,
) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| render(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    app.quit();
                } else {
                    app.handle_key(key.code);
                }
            }
        }
    }
    Ok(())
}
