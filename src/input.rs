//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`]; remember to update the help
//! text in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, InputMode};

/// Something the main loop must do outside of [`App`] state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Refresh,
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    match app.mode {
        InputMode::Search => {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => app.finish_search(),
                KeyCode::Backspace => app.pop_search_char(),
                KeyCode::Char(c) => app.push_search_char(c),
                _ => {}
            }
            Action::None
        }
        InputMode::Normal => {
            match key.code {
                KeyCode::Char('r') => return Action::Refresh,
                KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
                KeyCode::Home | KeyCode::Char('g') => app.select_first(),
                KeyCode::End | KeyCode::Char('G') => app.select_last(),
                KeyCode::Char('c') => app.cycle_category(),
                KeyCode::Char('/') => app.start_search(),
                _ => {}
            }
            Action::None
        }
    }
}
