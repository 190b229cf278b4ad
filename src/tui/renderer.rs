//! TUI Renderer
//!
//! Handles terminal setup, event loop, and rendering.

use super::app::DashboardApp;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;

pub type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Initialize terminal for TUI
pub fn init_terminal() -> io::Result<TuiTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore terminal to normal state
pub fn restore_terminal(terminal: &mut TuiTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop. Redraws only after input; there is no background work.
pub fn run_event_loop(
    terminal: &mut TuiTerminal,
    app: &mut DashboardApp,
    poll_interval: Duration,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| app.render(f))?;

        if event::poll(poll_interval)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key)?;
            }
        }
    }

    Ok(())
}

/// Run the dashboard until the user quits
pub fn run(app: &mut DashboardApp, poll_interval: Duration) -> Result<()> {
    let mut terminal = init_terminal().context("Failed to initialize terminal")?;

    let result = run_event_loop(&mut terminal, app, poll_interval);

    // Restore terminal regardless of result
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;

    result
}
