//! Terminal User Interface Module
//!
//! Provides the terminal chat interface for the Estate Chat analyst.
//! Built with Ratatui for high-performance terminal rendering.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            Estate Chat • AI Real Estate Analyst [rag]           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─ Data File ─────────────────────────────────────────────┐   │
//! │  │ ✓ pune.csv  12 KB • 1,250 rows • 4 columns  [Ctrl+R]    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │  ┌─ Conversation ──────────────────────────────────────────┐   │
//! │  │  [Scrollable chat history, You / Analyst]                │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │  ┌─ Visual Analysis ──────┐  ┌─ Detailed Data ────────────┐   │
//! │  │  [chart of the focused │  │  [table of the focused     │   │
//! │  │   answer]              │  │   answer]                  │   │
//! │  └────────────────────────┘  └────────────────────────────┘   │
//! │  ┌─ Query ─────────────────────────────────────────────────┐   │
//! │  │ > Ask about prices, trends, comparisons...               │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │  Ready  [Enter] Send [Tab] Queries [Ctrl+U] Upload [F1] Help   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, View};
pub use event::{AppAction, EventHandler};

use std::io::{self, Stdout};
use std::sync::Arc;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};

use crate::backend::HttpBackend;
use crate::config::Config;

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    let backend = Arc::new(HttpBackend::new(
        config.api.base_url.clone(),
        config.api.dialect,
    ));

    let mut terminal = init_terminal()?;

    let mut app = App::new(config, backend);
    app.start_preflight();

    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        // Drain finished gateway tasks before drawing.
        app.poll_events();

        terminal.draw(|frame| ui::render(frame, app))?;

        // Blocks until a key arrives or the next tick fires, so idle frames
        // cost nothing.
        match events.next().await {
            Some(action) => app.handle_action(action),
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
