use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::node::NodeKind;
use crate::fs::tree::FlatItem;
use crate::theme::Palette;

/// Sidebar tree drawn with box-drawing guides.
pub struct TreeWidget<'a> {
    items: &'a [FlatItem],
    cursor: usize,
    scroll: usize,
    selected: Option<&'a str>,
    editing: Option<&'a str>,
    palette: &'a Palette,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(items: &'a [FlatItem], palette: &'a Palette) -> Self {
        Self {
            items,
            cursor: 0,
            scroll: 0,
            selected: None,
            editing: None,
            palette,
            use_icons: true,
            block: None,
        }
    }

    pub fn cursor(mut self, cursor: usize, scroll: usize) -> Self {
        self.cursor = cursor;
        self.scroll = scroll;
        self
    }

    /// Paths the store currently has selected and in rename-edit.
    pub fn marks(mut self, selected: Option<&'a str>, editing: Option<&'a str>) -> Self {
        self.selected = selected;
        self.editing = editing;
        self
    }

    pub fn use_icons(mut self, use_icons: bool) -> Self {
        self.use_icons = use_icons;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn indicator(&self, item: &FlatItem) -> &'static str {
        match (item.kind, self.use_icons) {
            (NodeKind::Directory, true) if item.is_expanded => "\u{f07c} ",
            (NodeKind::Directory, true) => "\u{f07b} ",
            (NodeKind::File, true) if is_note(&item.name) => "\u{f48a} ",
            (NodeKind::File, true) => "\u{f15b} ",
            (NodeKind::Directory, false) if item.is_expanded => "v ",
            (NodeKind::Directory, false) => "> ",
            (NodeKind::File, false) => "  ",
        }
    }

    fn style_for(&self, row: usize, item: &FlatItem) -> Style {
        let mut style = match item.kind {
            NodeKind::Directory => Style::default()
                .fg(self.palette.tree_dir_fg)
                .add_modifier(Modifier::BOLD),
            NodeKind::File => Style::default().fg(self.palette.tree_file_fg),
        };
        if self.selected == Some(item.path.as_str()) {
            style = style.fg(self.palette.tree_selected_fg);
        }
        if self.editing == Some(item.path.as_str()) {
            style = style
                .fg(self.palette.tree_editing_fg)
                .add_modifier(Modifier::ITALIC);
        }
        if row == self.cursor {
            style = style
                .bg(self.palette.tree_cursor_bg)
                .add_modifier(Modifier::BOLD);
        }
        style
    }
}

fn is_note(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ["md", "markdown", "txt"]
            .iter()
            .any(|note| note.eq_ignore_ascii_case(ext))
    })
}

/// Guide prefix for every row, computed in one pass.
///
/// `open[d]` records whether the ancestor at depth `d` still has siblings
/// below it, which decides between `│  ` and blank space at that column.
pub fn build_prefixes(items: &[FlatItem]) -> Vec<String> {
    let mut open: Vec<bool> = Vec::new();
    let mut prefixes = Vec::with_capacity(items.len());
    for item in items {
        open.truncate(item.depth);
        let mut prefix = String::new();
        if item.depth > 0 {
            for &more in open.iter().skip(1) {
                prefix.push_str(if more { "│  " } else { "   " });
            }
            prefix.push_str(if item.is_last_sibling { "└──" } else { "├──" });
        }
        open.push(!item.is_last_sibling);
        prefixes.push(prefix);
    }
    prefixes
}

impl Widget for TreeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if self.items.is_empty() || inner.height == 0 {
            return;
        }

        let prefixes = build_prefixes(self.items);
        let rows = self
            .items
            .iter()
            .zip(prefixes)
            .enumerate()
            .skip(self.scroll)
            .take(inner.height as usize);

        for (y, (row, (item, prefix))) in (inner.y..).zip(rows) {
            let mut spans = vec![
                Span::styled(prefix, Style::default().fg(self.palette.border_fg)),
                Span::styled(
                    format!("{}{}", self.indicator(item), item.name),
                    self.style_for(row, item),
                ),
            ];
            if item.is_loading {
                spans.push(Span::styled(" …", Style::default().fg(self.palette.dim_fg)));
            }
            buf.set_line(inner.x, y, &Line::from(spans), inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, depth: usize, kind: NodeKind, is_last_sibling: bool) -> FlatItem {
        FlatItem {
            name: name.to_string(),
            path: format!("/root/{name}"),
            kind,
            depth,
            is_expanded: kind == NodeKind::Directory,
            is_loading: false,
            is_last_sibling,
        }
    }

    fn sample() -> Vec<FlatItem> {
        vec![
            item("root", 0, NodeKind::Directory, true),
            item("docs", 1, NodeKind::Directory, false),
            item("guide.md", 2, NodeKind::File, true),
            item("a.md", 1, NodeKind::File, true),
        ]
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn prefixes_follow_sibling_structure() {
        let items = sample();
        assert_eq!(build_prefixes(&items), vec!["", "├──", "│  └──", "└──"]);
    }

    #[test]
    fn prefixes_leave_blank_under_last_sibling() {
        let items = vec![
            item("root", 0, NodeKind::Directory, true),
            item("docs", 1, NodeKind::Directory, true),
            item("guide.md", 2, NodeKind::File, true),
        ];
        assert_eq!(build_prefixes(&items)[2], "   └──");
    }

    #[test]
    fn renders_rows_with_ascii_markers() {
        let items = sample();
        let palette = Palette::dark();
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&items, &palette)
            .use_icons(false)
            .render(area, &mut buf);
        assert_eq!(row_text(&buf, 0), "v root");
        assert_eq!(row_text(&buf, 1), "├──v docs");
        assert_eq!(row_text(&buf, 2), "│  └──  guide.md");
        assert_eq!(row_text(&buf, 3), "└──  a.md");
    }

    #[test]
    fn scroll_skips_leading_rows() {
        let items = sample();
        let palette = Palette::dark();
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&items, &palette)
            .use_icons(false)
            .cursor(2, 2)
            .render(area, &mut buf);
        assert_eq!(row_text(&buf, 0), "│  └──  guide.md");
        assert_eq!(buf.cell((6, 0)).unwrap().bg, palette.tree_cursor_bg);
    }

    #[test]
    fn loading_rows_get_an_ellipsis() {
        let mut items = sample();
        items[1].is_expanded = false;
        items[1].is_loading = true;
        let palette = Palette::dark();
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&items[..2], &palette)
            .use_icons(false)
            .render(area, &mut buf);
        assert_eq!(row_text(&buf, 1), "├──> docs …");
    }

    #[test]
    fn selected_and_editing_rows_are_colored() {
        let items = sample();
        let palette = Palette::dark();
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&items, &palette)
            .use_icons(false)
            .cursor(0, 0)
            .marks(Some("/root/a.md"), Some("/root/guide.md"))
            .render(area, &mut buf);
        assert_eq!(buf.cell((5, 3)).unwrap().fg, palette.tree_selected_fg);
        assert_eq!(buf.cell((8, 2)).unwrap().fg, palette.tree_editing_fg);
    }
}
