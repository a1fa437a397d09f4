use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::{DialogKind, DialogState};
use crate::fs::node::NodeKind;
use crate::fs::path;
use crate::theme::Palette;

/// Centered modal for the active dialog.
pub struct DialogWidget<'a> {
    kind: &'a DialogKind,
    state: &'a DialogState,
    palette: &'a Palette,
}

impl<'a> DialogWidget<'a> {
    pub fn new(kind: &'a DialogKind, state: &'a DialogState, palette: &'a Palette) -> Self {
        Self {
            kind,
            state,
            palette,
        }
    }
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + area.width.saturating_sub(w) / 2,
        area.y + area.height.saturating_sub(h) / 2,
        w,
        h,
    )
}

impl Widget for DialogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = self.palette;
        match self.kind {
            DialogKind::Rename { .. } => {
                self.render_input("Rename", area, buf);
            }
            DialogKind::OpenFolder => {
                self.render_input("Open Folder", area, buf);
            }
            DialogKind::DeleteConfirm { path: target, kind } => {
                let name = path::last_segment(target);
                let question = match kind {
                    NodeKind::Directory => {
                        format!("Delete folder \"{name}\" and everything in it?")
                    }
                    NodeKind::File => format!("Delete \"{name}\"?"),
                };
                let width = (question.chars().count() as u16 + 6).max(40);
                let Some(inner) = open_box(" Delete ", palette.error_fg, width, 5, area, buf, palette)
                else {
                    return;
                };
                let line = Line::from(Span::styled(
                    question,
                    Style::default()
                        .fg(palette.warning_fg)
                        .add_modifier(Modifier::BOLD),
                ));
                buf.set_line(inner.x, inner.y, &line, inner.width);
                hint("[y] Yes  [n/Esc] Cancel", inner, buf, palette);
            }
            DialogKind::Error { message } => {
                let width = (message.chars().count() as u16 + 6).max(30);
                let Some(inner) = open_box(" Error ", palette.error_fg, width, 5, area, buf, palette)
                else {
                    return;
                };
                let line = Line::from(Span::styled(
                    message.as_str(),
                    Style::default().fg(palette.error_fg),
                ));
                buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);
                hint("[Enter/Esc] Dismiss", inner, buf, palette);
            }
        }
    }
}

impl DialogWidget<'_> {
    fn render_input(&self, title: &str, area: Rect, buf: &mut Buffer) {
        let palette = self.palette;
        let title = format!(" {title} ");
        let Some(inner) = open_box(&title, palette.dialog_border_fg, 60, 5, area, buf, palette)
        else {
            return;
        };

        let input = &self.state.input;
        let cursor = match self.state.cursor {
            c if input.is_char_boundary(c) => c,
            _ => input.len(),
        };
        let (before, rest) = input.split_at(cursor);
        let mut rest_chars = rest.chars();
        let under = rest_chars
            .next()
            .map(String::from)
            .unwrap_or_else(|| " ".to_string());
        let after = rest_chars.as_str();

        // Keep the cursor visible by dropping characters from the left.
        let room = (inner.width as usize).saturating_sub(1);
        let before_len = before.chars().count();
        let before: String = before
            .chars()
            .skip(before_len.saturating_sub(room))
            .collect();

        let text = Style::default().fg(palette.text_fg);
        let line = Line::from(vec![
            Span::styled(before, text),
            Span::styled(
                under,
                Style::default()
                    .bg(palette.text_fg)
                    .fg(palette.dialog_bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(after, text),
        ]);
        buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);
        hint("[Enter] Confirm  [Esc] Cancel", inner, buf, palette);
    }
}

/// Clear a centered box, draw its border and return the inner area.
fn open_box(
    title: &str,
    border: Color,
    width: u16,
    height: u16,
    area: Rect,
    buf: &mut Buffer,
    palette: &Palette,
) -> Option<Rect> {
    let rect = centered_rect(width.min(area.width.saturating_sub(4)), height, area);
    Clear.render(rect, buf);
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(palette.dialog_bg))
        .padding(Padding::horizontal(1));
    let inner = block.inner(rect);
    block.render(rect, buf);
    (inner.width > 0 && inner.height > 0).then_some(inner)
}

fn hint(text: &str, inner: Rect, buf: &mut Buffer, palette: &Palette) {
    if inner.height < 2 {
        return;
    }
    let line = Line::from(Span::styled(
        text,
        Style::default()
            .fg(palette.dim_fg)
            .add_modifier(Modifier::DIM),
    ));
    buf.set_line(inner.x, inner.y + inner.height - 1, &line, inner.width);
}
