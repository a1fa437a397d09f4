use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::app::PreviewState;
use crate::theme::Palette;

/// Plain-text view of the selected note.
pub struct PreviewWidget<'a> {
    state: &'a PreviewState,
    palette: &'a Palette,
    block: Option<Block<'a>>,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(state: &'a PreviewState, palette: &'a Palette) -> Self {
        Self {
            state,
            palette,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for PreviewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let placeholder = if self.state.loading {
            Some("Loading…")
        } else if self.state.path.is_none() {
            Some("No note selected")
        } else if self.state.lines.is_empty() {
            Some("(empty)")
        } else {
            None
        };
        if let Some(msg) = placeholder {
            let style = Style::default()
                .fg(self.palette.dim_fg)
                .add_modifier(Modifier::ITALIC);
            buf.set_line(inner.x, inner.y, &Line::from(Span::styled(msg, style)), inner.width);
            return;
        }

        let text = Style::default().fg(self.palette.text_fg);
        let visible = self
            .state
            .lines
            .iter()
            .skip(self.state.scroll_offset)
            .take(inner.height as usize);
        for (y, line) in (inner.y..).zip(visible) {
            buf.set_line(
                inner.x,
                y,
                &Line::from(Span::styled(line.as_str(), text)),
                inner.width,
            );
        }
    }
}
