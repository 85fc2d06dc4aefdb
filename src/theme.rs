use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Diagram-wide defaults that style records fall back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: Color,
    pub border_color: Color,
    pub line_color: Color,
    pub label_background: Color,
    pub label_border: Color,
    pub legend_border: Color,
    pub background: Color,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
}

impl Theme {
    /// Slate strokes and heavy borders, the look used for the detailed
    /// architecture view.
    pub fn classic() -> Self {
        Self {
            font_family: "DejaVu Sans, Verdana, Arial, sans-serif".to_string(),
            text_color: Color::BLACK,
            border_color: Color::rgb(0x37, 0x47, 0x4F),
            line_color: Color::rgb(0x37, 0x47, 0x4F),
            label_background: Color::WHITE,
            label_border: Color::rgb(0x37, 0x47, 0x4F),
            legend_border: Color::rgb(0x42, 0x42, 0x42),
            background: Color::WHITE,
            line_spacing: 1.2,
        }
    }

    /// Darker outlines and softer label borders for printed documents.
    pub fn print() -> Self {
        Self {
            font_family: "DejaVu Sans, Verdana, Arial, sans-serif".to_string(),
            text_color: Color::BLACK,
            border_color: Color::rgb(0x26, 0x32, 0x38),
            line_color: Color::rgb(0x37, 0x47, 0x4F),
            label_background: Color::WHITE,
            label_border: Color::rgb(0x80, 0x80, 0x80),
            legend_border: Color::rgb(0x26, 0x32, 0x38),
            background: Color::WHITE,
            line_spacing: 1.2,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "print" => Some(Self::print()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
