//! Interactive terminal front-end.
//!
//! A table/detail browser over the same store the CLI uses, scoped to the
//! current project unless the all-projects toggle is active. Synchronous
//! event loop; the store blocks, the UI waits.

mod app;
mod ui;

pub use app::{App, Modal, TicketForm, View};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::time::Duration;

use crate::db::Database;

pub fn run(db: Database, project: String) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(db, project);
    let result = event_loop(&mut terminal, &mut app);
    restore_terminal()?;
    result
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    app.refresh()?;

    while !app.should_quit() {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key)?;
                }
            }
        }
    }

    Ok(())
}
