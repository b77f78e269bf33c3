//! Event Handling
//!
//! Translates keyboard and timer events into application actions.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the application
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Quit the application
    Quit,
    /// Force quit (Ctrl+C)
    ForceQuit,
    /// Submit current input (Enter key)
    Submit,
    /// Toggle help view
    ToggleHelp,
    /// Escape - close modals, cancel the upload prompt
    Escape,
    /// Open the upload path prompt (Ctrl+U)
    StartUpload,
    /// Discard the uploaded file (Ctrl+R)
    RemoveFile,
    /// Export the focused table to CSV (Ctrl+E)
    ExportTable,
    /// Focus the previous message with chart/table data (F2)
    FocusPrevVisual,
    /// Focus the next message with chart/table data (F3)
    FocusNextVisual,
    /// Cycle a suggested query into the input (Tab)
    CycleQuickQuery,
    /// Scroll up one line
    ScrollUp,
    /// Scroll down one line
    ScrollDown,
    /// Scroll up one page
    ScrollPageUp,
    /// Scroll down one page
    ScrollPageDown,
    /// Regular input key, routed to whichever view is active
    Input(KeyEvent),
    /// Timer tick for animations
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = Self::map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Wait for the next action
    pub async fn next(&mut self) -> Option<AppAction> {
        self.rx.recv().await
    }

    fn map_event(event: Event) -> Option<AppAction> {
        match event {
            Event::Key(key) => Self::map_key_event(key),
            // The terminal redraws on the next tick after a resize.
            _ => None,
        }
    }

    fn map_key_event(key: KeyEvent) -> Option<AppAction> {
        match (key.modifiers, key.code) {
            // Quit shortcuts
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),

            // File and data actions
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(AppAction::StartUpload),
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => Some(AppAction::RemoveFile),
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => Some(AppAction::ExportTable),

            // Help
            (KeyModifiers::CONTROL, KeyCode::Char('h')) => Some(AppAction::ToggleHelp),

            (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => Some(AppAction::Escape),
                KeyCode::Enter => Some(AppAction::Submit),

                KeyCode::F(1) => Some(AppAction::ToggleHelp),
                KeyCode::F(2) => Some(AppAction::FocusPrevVisual),
                KeyCode::F(3) => Some(AppAction::FocusNextVisual),

                // Scrolling
                KeyCode::Up => Some(AppAction::ScrollUp),
                KeyCode::Down => Some(AppAction::ScrollDown),
                KeyCode::PageUp => Some(AppAction::ScrollPageUp),
                KeyCode::PageDown => Some(AppAction::ScrollPageDown),

                KeyCode::Tab => Some(AppAction::CycleQuickQuery),

                // Everything else is input for the active view
                _ => Some(AppAction::Input(key)),
            },

            // Pass through other key combinations as input
            _ => Some(AppAction::Input(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_control_shortcuts_map_to_actions() {
        assert!(matches!(
            EventHandler::map_key_event(key(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            Some(AppAction::StartUpload)
        ));
        assert!(matches!(
            EventHandler::map_key_event(key(KeyCode::Char('e'), KeyModifiers::CONTROL)),
            Some(AppAction::ExportTable)
        ));
        assert!(matches!(
            EventHandler::map_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(AppAction::ForceQuit)
        ));
    }

    #[test]
    fn test_plain_characters_reach_the_input() {
        let action = EventHandler::map_key_event(key(KeyCode::Char('u'), KeyModifiers::NONE));
        assert!(matches!(action, Some(AppAction::Input(_))));
    }
}
