use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode, DialogKind};
use crate::fs::node::NodeKind;

/// Rows the preview moves per PageUp/PageDown.
const PREVIEW_PAGE: isize = 10;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode.clone() {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Dialog(kind) => handle_dialog_mode(app, key, kind),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),

        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),

        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.activate_current(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_or_parent(),

        KeyCode::Char('a') => app.create(NodeKind::File),
        KeyCode::Char('A') => app.create(NodeKind::Directory),
        KeyCode::Char('r') | KeyCode::F(2) => app.begin_rename(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('o') => app.begin_open_folder(),
        KeyCode::Char('O') => app.reveal_root(),

        KeyCode::Char('<') => app.resize_sidebar(false),
        KeyCode::Char('>') => app.resize_sidebar(true),
        KeyCode::PageDown => app.scroll_preview(PREVIEW_PAGE),
        KeyCode::PageUp => app.scroll_preview(-PREVIEW_PAGE),

        _ => {}
    }
}

fn handle_dialog_mode(app: &mut App, key: KeyEvent, kind: DialogKind) {
    match kind {
        DialogKind::Error { .. } => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                app.close_dialog();
            }
        }
        DialogKind::DeleteConfirm { path, .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                app.close_dialog();
                app.delete(&path);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
            _ => {}
        },
        DialogKind::Rename { path } => {
            if handle_text_input(app, key) {
                app.confirm_rename(&path);
            }
        }
        DialogKind::OpenFolder => {
            if handle_text_input(app, key) {
                app.confirm_open_folder();
            }
        }
    }
}

/// Edit the dialog input. Returns `true` when the user submitted it.
fn handle_text_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => return true,
        KeyCode::Esc => {
            app.cancel_dialog();
            return false;
        }
        _ => {}
    }
    let state = &mut app.dialog_state;
    match key.code {
        KeyCode::Backspace => state.delete_char(),
        KeyCode::Left => state.move_left(),
        KeyCode::Right => state.move_right(),
        KeyCode::Home => state.home(),
        KeyCode::End => state.end(),
        KeyCode::Char(c) => state.insert_char(c),
        _ => {}
    }
    false
}
