use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::dialog::DialogWidget;
use crate::components::preview::PreviewWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::fs::path;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    app.terminal_width = area.width;

    let [main_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(area);

    let (tree_area, preview_area) = if app.settings.preview_enabled {
        let [tree, preview] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(app.sidebar_width()), Constraint::Min(0)])
            .areas(main_area);
        (tree, Some(preview))
    } else {
        (main_area, None)
    };

    // Keep the cursor row visible inside the bordered tree.
    app.update_scroll(tree_area.height.saturating_sub(2) as usize);

    let palette = &app.palette;
    let border = Style::default().fg(palette.border_fg);
    let title = app
        .store
        .root()
        .map(|root| format!(" {} ", root.name))
        .unwrap_or_else(|| " innote ".to_string());
    let tree = TreeWidget::new(&app.flat_items, palette)
        .cursor(app.cursor, app.scroll_offset)
        .marks(app.store.selected_path(), app.store.editing_path())
        .use_icons(app.settings.use_icons)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border),
        );
    frame.render_widget(tree, tree_area);

    if let Some(preview_area) = preview_area {
        let title = app
            .preview
            .path
            .as_deref()
            .map(|p| format!(" {} ", path::last_segment(p)))
            .unwrap_or_else(|| " Preview ".to_string());
        let preview = PreviewWidget::new(&app.preview, palette).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border),
        );
        frame.render_widget(preview, preview_area);
    }

    let root = app.store.root_path().unwrap_or("no folder open");
    let selection = app.store.selected_path().unwrap_or_default();
    let selection = match app.store.root_path() {
        Some(root) => path::relative_to(selection, root)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(selection),
        None => selection,
    };
    let mut status = StatusBarWidget::new(root, selection, palette).busy(app.is_busy());
    if let Some(msg) = &app.status_message {
        status = status.status_message(&msg.text, msg.is_error);
    }
    frame.render_widget(status, status_area);

    if let AppMode::Dialog(kind) = &app.mode {
        frame.render_widget(DialogWidget::new(kind, &app.dialog_state, palette), area);
    }
}
