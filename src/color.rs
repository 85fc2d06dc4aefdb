use std::fmt;
use std::str::FromStr;

use color::{DynamicColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::DiagramError;

/// An sRGB color with 8-bit channels, parsed from any CSS color string
/// (`#B3E5FC`, `#666`, `white`, `rgb(232, 232, 232)`, `hsl(...)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn parse(input: &str) -> Result<Self, DiagramError> {
        let trimmed = input.trim();
        let parsed = DynamicColor::from_str(trimmed)
            .map_err(|err| DiagramError::config(format!("invalid color '{input}': {err}")))?;
        let rgba = parsed.to_alpha_color::<Srgb>().to_rgba8();
        Ok(Self::rgba(rgba.r, rgba.g, rgba.b, rgba.a))
    }

    pub fn is_opaque(self) -> bool {
        self.a == 0xFF
    }

    pub fn opaque(self) -> Self {
        Self { a: 0xFF, ..self }
    }

    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// `#rrggbb` form for SVG paint attributes; alpha goes in a separate
    /// `*-opacity` attribute.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "{}", self.to_hex())
        } else {
            write!(f, "{}{:02x}", self.to_hex(), self.a)
        }
    }
}

impl FromStr for Color {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = DiagramError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Color::parse("#B3E5FC").unwrap(), Color::rgb(0xB3, 0xE5, 0xFC));
        assert_eq!(Color::parse("#666").unwrap(), Color::rgb(0x66, 0x66, 0x66));
        assert_eq!(
            Color::parse("#37474F80").unwrap(),
            Color::rgba(0x37, 0x47, 0x4F, 0x80)
        );
    }

    #[test]
    fn parses_named_and_functional_colors() {
        assert_eq!(Color::parse("white").unwrap(), Color::WHITE);
        assert_eq!(Color::parse(" gray ").unwrap(), Color::rgb(128, 128, 128));
        assert_eq!(
            Color::parse("rgb(232, 232, 232)").unwrap(),
            Color::rgb(232, 232, 232)
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = Color::parse("not-a-color").unwrap_err();
        assert!(matches!(err, DiagramError::Configuration(_)));
    }

    #[test]
    fn display_round_trips_through_serde() {
        let color = Color::rgba(0x12, 0x34, 0x56, 0x78);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#12345678\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
    }
}
