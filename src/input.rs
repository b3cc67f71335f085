//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Which keys mean what depends
//! on the screen, and on whether a popup (prompt dialog or source selector)
//! is open: popups take every key while they are visible.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in the handler for the right screen.
//! 3. Update the help text in `ui::draw_status_bar`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, Screen};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.screen {
        Screen::Auth if app.pending_prompt().is_some() => handle_prompt(app, key.code),
        Screen::Auth => handle_auth(app, key.code),
        Screen::Headlines if app.selector.is_some() => handle_selector(app, key.code),
        Screen::Headlines => handle_headlines(app, key.code),
        Screen::Detail => handle_detail(app, key.code),
    }
}

fn handle_prompt(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter | KeyCode::Char('y') => app.prompt_confirm(),
        KeyCode::Char('n') => app.prompt_reject(),
        KeyCode::Esc => app.prompt_cancel(),
        _ => {}
    }
}

fn handle_auth(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Enter | KeyCode::Char('a') => app.authenticate(),
        _ => {}
    }
}

fn handle_selector(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('s') => app.close_selector(),
        KeyCode::Down | KeyCode::Char('j') => app.selector_next(),
        KeyCode::Up | KeyCode::Char('k') => app.selector_previous(),
        KeyCode::Enter => app.confirm_selector(),
        _ => {}
    }
}

fn handle_headlines(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('s') => app.open_selector(),
        _ => {}
    }
}

fn handle_detail(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => app.close_detail(),
        _ => {}
    }
}
