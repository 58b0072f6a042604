//! Presentation Theme
//!
//! The aesthetic extracted from a primary concept generation. A theme is never
//! generated on its own: it rides along with the concept and becomes the active
//! presentation theme the moment the concept is published.
//!
//! Surfaces consume themes as plain CSS-literal strings; the helpers here parse
//! the hex colors so terminal surfaces can map them onto their own palettes.

use serde::{Deserialize, Serialize};

/// Presentation theme for a concept
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Theme {
    /// Display name of the aesthetic (also seeds the mood board)
    pub name: String,
    /// Dominant accent color (hex)
    pub primary_color: String,
    /// Secondary accent color (hex)
    pub secondary_color: String,
    /// CSS gradient literal for the page background
    pub background_gradient: String,
    /// Readable text color (hex)
    pub text_color: String,
}

impl Theme {
    /// The studio theme shown before any concept exists
    #[must_use]
    pub fn studio_default() -> Self {
        Self {
            name: "Neon Vogue".to_string(),
            primary_color: "#FF0080".to_string(),
            secondary_color: "#00FFFF".to_string(),
            background_gradient:
                "linear-gradient(135deg, #050505 0%, #1a0b2e 50%, #000000 100%)".to_string(),
            text_color: "#ffffff".to_string(),
        }
    }

    /// Text color for controls painted with the primary color
    ///
    /// White primaries get black text; everything else uses the theme's
    /// own text color.
    #[must_use]
    pub fn button_text_color(&self) -> &str {
        if self.primary_color.eq_ignore_ascii_case("#ffffff") {
            "#000000"
        } else {
            &self.text_color
        }
    }

    /// Colors named in the background gradient, in order of appearance
    #[must_use]
    pub fn gradient_stops(&self) -> Vec<Rgb> {
        hex_tokens(&self.background_gradient)
            .filter_map(Rgb::parse_hex)
            .collect()
    }

    /// Check that every color field is a well-formed literal
    ///
    /// Returns the name of the first offending field.
    pub fn check(&self) -> Result<(), (&'static str, String)> {
        let fields = [
            ("primary_hex", &self.primary_color),
            ("secondary_hex", &self.secondary_color),
            ("text_color", &self.text_color),
        ];
        for (field, value) in fields {
            if Rgb::parse_hex(value).is_none() {
                return Err((field, format!("`{value}` is not a hex color")));
            }
        }
        if self.name.trim().is_empty() {
            return Err(("theme_name", "must not be empty".to_string()));
        }
        if self.background_gradient.trim().is_empty() {
            return Err(("css_gradient", "must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::studio_default()
    }
}

/// An 8-bit RGB color parsed from a hex literal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (alpha is discarded)
    #[must_use]
    pub fn parse_hex(value: &str) -> Option<Self> {
        let digits = value.trim().strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok();
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        match digits.len() {
            3 | 4 => Some(Self {
                r: nibble(0)? * 17,
                g: nibble(1)? * 17,
                b: nibble(2)? * 17,
            }),
            6 | 8 => Some(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            _ => None,
        }
    }
}

/// Split out every `#...` token from a CSS literal
fn hex_tokens(css: &str) -> impl Iterator<Item = &str> {
    css.match_indices('#').map(move |(start, _)| {
        let end = css[start + 1..]
            .find(|c: char| !c.is_ascii_hexdigit())
            .map_or(css.len(), |offset| start + 1 + offset);
        &css[start..end]
    })
}
