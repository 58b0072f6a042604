//! Theme and Colors
//!
//! Maps the conductor's active [`Theme`] onto terminal colors. The view never
//! picks an aesthetic of its own: every accent comes from the published theme,
//! with fixed fallbacks only for hex values a terminal cannot show.

use atelier_core::{Rgb, Theme};
use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Fixed UI Colors
// ============================================================================

/// Placeholder affordances (pending enrichments)
pub const PENDING_GRAY: Color = Color::Rgb(110, 110, 120);

/// Dim secondary text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Failure banner
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Upload slot that is filled
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn hex_or(value: &str, fallback: Color) -> Color {
    Rgb::parse_hex(value).map_or(fallback, to_color)
}

// ============================================================================
// Palette
// ============================================================================

/// Terminal colors derived from a [`Theme`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Headline and accent color
    pub primary: Color,
    /// Secondary accent (tags, labels)
    pub secondary: Color,
    /// Body text
    pub text: Color,
    /// Background, taken from the first gradient stop
    pub background: Color,
    /// Text drawn on a primary-colored button
    pub button_text: Color,
}

impl Palette {
    /// Build the palette for a theme
    pub fn from_theme(theme: &Theme) -> Self {
        let background = theme
            .gradient_stops()
            .first()
            .copied()
            .map_or(Color::Black, to_color);
        Self {
            primary: hex_or(&theme.primary_color, Color::Magenta),
            secondary: hex_or(&theme.secondary_color, Color::Cyan),
            text: hex_or(&theme.text_color, Color::White),
            background,
            button_text: hex_or(theme.button_text_color(), Color::White),
        }
    }

    /// Base style for the whole screen
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    /// Concept name and section titles
    pub fn heading(&self) -> Style {
        self.base().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    /// Field labels and tags
    pub fn label(&self) -> Style {
        self.base().fg(self.secondary)
    }

    /// Placeholder for a pending enrichment
    pub fn pending(&self) -> Style {
        self.base().fg(PENDING_GRAY).add_modifier(Modifier::ITALIC)
    }

    /// Secondary text
    pub fn dim(&self) -> Style {
        self.base().fg(DIM_GRAY)
    }

    /// Inverted "button" style used by the key hints
    pub fn button(&self) -> Style {
        Style::default().fg(self.button_text).bg(self.primary)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_theme(&Theme::studio_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.primary, Color::Rgb(0xFF, 0x00, 0x80));
        assert_eq!(palette.secondary, Color::Rgb(0x00, 0xFF, 0xFF));
        assert_eq!(palette.background, Color::Rgb(0x05, 0x05, 0x05));
        assert_eq!(palette.text, Color::Rgb(0xFF, 0xFF, 0xFF));
    }

    #[test]
    fn test_white_primary_gets_black_button_text() {
        let theme = Theme {
            primary_color: "#FFFFFF".to_string(),
            ..Theme::studio_default()
        };
        assert_eq!(Palette::from_theme(&theme).button_text, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_unparseable_colors_fall_back() {
        let theme = Theme {
            primary_color: "hotpink".to_string(),
            background_gradient: "none".to_string(),
            ..Theme::studio_default()
        };
        let palette = Palette::from_theme(&theme);
        assert_eq!(palette.primary, Color::Magenta);
        assert_eq!(palette.background, Color::Black);
    }
}
