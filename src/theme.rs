//! Built-in color palettes.

use ratatui::style::Color;

/// Colors used across the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub text_fg: Color,
    pub dim_fg: Color,

    pub tree_dir_fg: Color,
    pub tree_file_fg: Color,
    pub tree_cursor_bg: Color,
    /// The store's selected note.
    pub tree_selected_fg: Color,
    /// Entry being renamed.
    pub tree_editing_fg: Color,

    pub status_bg: Color,
    pub status_fg: Color,
    pub border_fg: Color,

    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
    pub accent_fg: Color,
}

impl Palette {
    /// Catppuccin Mocha.
    pub fn dark() -> Self {
        Self {
            text_fg: Color::Rgb(205, 214, 244),
            dim_fg: Color::Rgb(108, 112, 134),

            tree_dir_fg: Color::Rgb(137, 180, 250),
            tree_file_fg: Color::Rgb(205, 214, 244),
            tree_cursor_bg: Color::Rgb(69, 71, 90),
            tree_selected_fg: Color::Rgb(166, 227, 161),
            tree_editing_fg: Color::Rgb(249, 226, 175),

            status_bg: Color::Rgb(30, 30, 46),
            status_fg: Color::Rgb(205, 214, 244),
            border_fg: Color::Rgb(88, 91, 112),

            dialog_bg: Color::Rgb(49, 50, 68),
            dialog_border_fg: Color::Rgb(137, 180, 250),

            error_fg: Color::Rgb(243, 139, 168),
            warning_fg: Color::Rgb(249, 226, 175),
            success_fg: Color::Rgb(166, 227, 161),
            accent_fg: Color::Rgb(203, 166, 247),
        }
    }

    /// Catppuccin Latte.
    pub fn light() -> Self {
        Self {
            text_fg: Color::Rgb(76, 79, 105),
            dim_fg: Color::Rgb(156, 160, 176),

            tree_dir_fg: Color::Rgb(30, 102, 245),
            tree_file_fg: Color::Rgb(76, 79, 105),
            tree_cursor_bg: Color::Rgb(204, 208, 218),
            tree_selected_fg: Color::Rgb(64, 160, 43),
            tree_editing_fg: Color::Rgb(223, 142, 29),

            status_bg: Color::Rgb(239, 241, 245),
            status_fg: Color::Rgb(76, 79, 105),
            border_fg: Color::Rgb(172, 176, 190),

            dialog_bg: Color::Rgb(230, 233, 239),
            dialog_border_fg: Color::Rgb(30, 102, 245),

            error_fg: Color::Rgb(210, 15, 57),
            warning_fg: Color::Rgb(223, 142, 29),
            success_fg: Color::Rgb(64, 160, 43),
            accent_fg: Color::Rgb(136, 57, 239),
        }
    }

    /// Palette for a `[theme] scheme` value. Unknown names get the dark one.
    pub fn for_scheme(scheme: &str) -> Self {
        if scheme.eq_ignore_ascii_case("light") {
            Self::light()
        } else {
            Self::dark()
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_scheme_is_case_insensitive() {
        assert_eq!(Palette::for_scheme("Light"), Palette::light());
    }

    #[test]
    fn unknown_scheme_falls_back_to_dark() {
        assert_eq!(Palette::for_scheme("neon"), Palette::dark());
        assert_eq!(Palette::default(), Palette::dark());
    }

    #[test]
    fn dark_and_light_differ_where_it_matters() {
        let dark = Palette::dark();
        let light = Palette::light();
        assert_ne!(dark.text_fg, light.text_fg);
        assert_ne!(dark.tree_cursor_bg, light.tree_cursor_bg);
        assert_ne!(dark.tree_dir_fg, light.tree_dir_fg);
    }
}
