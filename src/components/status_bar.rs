use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::Palette;

const KEY_HINTS: &str = " a:new  A:dir  r:ren  d:del  o:open  O:reveal  q:quit ";

/// One-line bar: root folder, current selection and key hints, or a
/// transient status message that takes the whole line.
pub struct StatusBarWidget<'a> {
    root: &'a str,
    selection: &'a str,
    palette: &'a Palette,
    status_message: Option<&'a str>,
    is_error: bool,
    busy: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(root: &'a str, selection: &'a str, palette: &'a Palette) -> Self {
        Self {
            root,
            selection,
            palette,
            status_message: None,
            is_error: false,
            busy: false,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    /// Show a marker while gateway work is in flight.
    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }
}

/// Keep the tail of `text` within `budget` columns, marking the cut with `…`.
fn truncate_left(text: &str, budget: usize) -> String {
    let len = text.chars().count();
    if len <= budget {
        return text.to_string();
    }
    if budget == 0 {
        return String::new();
    }
    let tail: String = text.chars().skip(len - (budget - 1)).collect();
    format!("…{tail}")
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;
        let base = Style::default()
            .bg(self.palette.status_bg)
            .fg(self.palette.status_fg);
        buf.set_style(area, base);

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                base.bg(self.palette.error_fg).fg(self.palette.status_bg)
            } else {
                base.fg(self.palette.success_fg)
            };
            let display = format!("{:<width$}", msg, width = width);
            buf.set_line(area.x, area.y, &Line::from(Span::styled(display, style)), area.width);
            return;
        }

        let busy = if self.busy { " ⟳" } else { "" };
        let hints = if width > KEY_HINTS.len() + 20 { KEY_HINTS } else { "" };
        let left_budget = width
            .saturating_sub(hints.len())
            .saturating_sub(busy.chars().count());

        let root = truncate_left(self.root, left_budget);
        let selection = match self.selection {
            "" => String::new(),
            sel => {
                let room = left_budget.saturating_sub(root.chars().count() + 3);
                format!(" › {}", truncate_left(sel, room))
            }
        };
        let used = root.chars().count() + selection.chars().count() + busy.chars().count();
        let pad = width.saturating_sub(used + hints.len());

        let spans = vec![
            Span::styled(root, base.add_modifier(Modifier::BOLD)),
            Span::styled(selection, base.fg(self.palette.accent_fg)),
            Span::styled(busy, base.fg(self.palette.warning_fg)),
            Span::raw(" ".repeat(pad)),
            Span::styled(
                hints,
                base.fg(self.palette.dim_fg).add_modifier(Modifier::DIM),
            ),
        ];
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(widget: StatusBarWidget, width: u16) -> (Buffer, String) {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let content: String = (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        (buf, content)
    }

    #[test]
    fn normal_bar_shows_root_selection_and_hints() {
        let palette = Palette::dark();
        let widget = StatusBarWidget::new("/home/me/notes", "ideas.md", &palette);
        let (_, content) = render(widget, 100);
        assert!(content.starts_with("/home/me/notes › ideas.md"));
        assert!(content.contains("a:new"));
        assert!(content.contains("q:quit"));
    }

    #[test]
    fn success_message_uses_success_color() {
        let palette = Palette::dark();
        let widget =
            StatusBarWidget::new("/n", "", &palette).status_message("Created untitled.md", false);
        let (buf, content) = render(widget, 80);
        assert!(content.contains("Created untitled.md"));
        assert_eq!(buf.cell((0, 0)).unwrap().fg, palette.success_fg);
    }

    #[test]
    fn error_message_uses_error_background() {
        let palette = Palette::dark();
        let widget =
            StatusBarWidget::new("/n", "", &palette).status_message("Permission denied", true);
        let (buf, content) = render(widget, 80);
        assert!(content.contains("Permission denied"));
        assert_eq!(buf.cell((0, 0)).unwrap().bg, palette.error_fg);
    }

    #[test]
    fn narrow_bar_drops_hints_and_truncates_root() {
        let palette = Palette::dark();
        let widget = StatusBarWidget::new("/a/very/long/path/to/notes", "", &palette);
        let (_, content) = render(widget, 12);
        assert_eq!(content, "…th/to/notes");
        assert!(!content.contains("a:new"));
    }

    #[test]
    fn busy_marker_is_shown() {
        let palette = Palette::dark();
        let widget = StatusBarWidget::new("/n", "", &palette).busy(true);
        let (_, content) = render(widget, 80);
        assert!(content.contains("⟳"));
    }

    #[test]
    fn zero_area_does_not_panic() {
        let palette = Palette::dark();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("/n", "", &palette).render(area, &mut buf);
    }

    #[test]
    fn truncate_left_keeps_tail() {
        assert_eq!(truncate_left("abcdef", 4), "…def");
        assert_eq!(truncate_left("abc", 4), "abc");
        assert_eq!(truncate_left("abc", 0), "");
    }
}
