use ratatui::style::Color;

use crate::model::theme::Theme;

/// Concrete colors for one theme variant
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub dim: Color,
    pub highlight: Color,
    pub selection_bg: Color,
    pub drag_bg: Color,
    pub date: Color,
    pub red: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                background: Color::Rgb(0xFA, 0xFA, 0xF7),
                text: Color::Rgb(0x33, 0x33, 0x33),
                text_bright: Color::Rgb(0x00, 0x00, 0x00),
                dim: Color::Rgb(0x99, 0x99, 0x99),
                highlight: Color::Rgb(0x1E, 0x66, 0xD0),
                selection_bg: Color::Rgb(0xE4, 0xEC, 0xF7),
                drag_bg: Color::Rgb(0xFF, 0xF1, 0xC2),
                date: Color::Rgb(0x5A, 0x6B, 0x85),
                red: Color::Rgb(0xC6, 0x28, 0x28),
            },
            Theme::Dark => Palette {
                background: Color::Rgb(0x12, 0x14, 0x18),
                text: Color::Rgb(0xC8, 0xCC, 0xD4),
                text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
                dim: Color::Rgb(0x6B, 0x70, 0x7A),
                highlight: Color::Rgb(0xFF, 0xC8, 0x57),
                selection_bg: Color::Rgb(0x2A, 0x2E, 0x36),
                drag_bg: Color::Rgb(0x3D, 0x35, 0x1A),
                date: Color::Rgb(0x8F, 0xA8, 0xC8),
                red: Color::Rgb(0xFF, 0x6B, 0x6B),
            },
            Theme::Colored => Palette {
                background: Color::Rgb(0x0C, 0x00, 0x1B),
                text: Color::Rgb(0xB0, 0xAA, 0xFF),
                text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
                dim: Color::Rgb(0x7D, 0x78, 0xBF),
                highlight: Color::Rgb(0xFB, 0x41, 0x96),
                selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
                drag_bg: Color::Rgb(0x14, 0x3D, 0x3A),
                date: Color::Rgb(0x44, 0xDD, 0xFF),
                red: Color::Rgb(0xFF, 0x44, 0x44),
            },
        }
    }

    /// Glyph shown in the header for the theme the next `T` press selects
    pub fn mode_icon(theme: Theme) -> &'static str {
        match theme {
            Theme::Light => "\u{263E}",
            Theme::Dark => "\u{2600}",
            Theme::Colored => "\u{25C9}",
        }
    }
}
