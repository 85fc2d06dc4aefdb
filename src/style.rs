//! Explicit style records, one per primitive. Nothing is inherited between
//! elements; every record is built from a [`Theme`] and then overridden field
//! by field.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{DiagramError, Result, ensure_finite};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn is_bold(self) -> bool {
        matches!(self, FontWeight::Bold)
    }

    pub fn svg_value(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

/// What happens to shape text wider than the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOverflow {
    /// Drawn as given; may spill past the outline.
    #[default]
    Visible,
    /// Greedy word wrap to the inner width of the shape.
    Wrap,
    /// Clipped to the shape outline.
    Clip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HAlign {
    pub fn svg_anchor(self) -> &'static str {
        match self {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    /// The anchor is the baseline of the last line.
    #[default]
    Baseline,
    Bottom,
    Center,
    Top,
}

/// Font attributes shared by every piece of text. Sizes are in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_size: f32,
    pub weight: FontWeight,
    pub italic: bool,
    pub color: Color,
    pub overflow: TextOverflow,
}

impl TextStyle {
    pub fn themed(theme: &Theme) -> Self {
        Self {
            font_size: 10.0,
            weight: FontWeight::Normal,
            italic: false,
            color: theme.text_color,
            overflow: TextOverflow::Visible,
        }
    }

    pub fn with_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_overflow(mut self, overflow: TextOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite("font size", &[self.font_size])?;
        if self.font_size <= 0.0 {
            return Err(DiagramError::config(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        Ok(())
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::themed(&Theme::default())
    }
}

/// Rounded box. `pad` grows the outline past the nominal bounds on every
/// side and `corner_radius` rounds it, both in canvas units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxStyle {
    pub fill: Color,
    pub border_color: Color,
    /// Stroke width in points.
    pub border_width: f32,
    pub pad: f32,
    pub corner_radius: f32,
    pub text: TextStyle,
}

impl BoxStyle {
    pub fn themed(theme: &Theme) -> Self {
        Self {
            fill: Color::WHITE,
            border_color: theme.border_color,
            border_width: 2.5,
            pad: 0.08,
            corner_radius: 0.08,
            text: TextStyle::themed(theme),
        }
    }

    /// Square-cornered box drawn exactly on its bounds, as used for legend
    /// swatches.
    pub fn plain(fill: Color, border_color: Color, border_width: f32) -> Self {
        Self {
            fill,
            border_color,
            border_width,
            pad: 0.0,
            corner_radius: 0.0,
            text: TextStyle::default(),
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_text(mut self, text: TextStyle) -> Self {
        self.text = text;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite(
            "box style",
            &[self.border_width, self.pad, self.corner_radius],
        )?;
        if self.border_width < 0.0 || self.pad < 0.0 || self.corner_radius < 0.0 {
            return Err(DiagramError::config(
                "box border width, pad and corner radius must not be negative",
            ));
        }
        self.text.validate()
    }
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self::themed(&Theme::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvalStyle {
    pub fill: Color,
    pub border_color: Color,
    pub border_width: f32,
    pub text: TextStyle,
}

impl OvalStyle {
    pub fn themed(theme: &Theme) -> Self {
        Self {
            fill: Color::WHITE,
            border_color: theme.border_color,
            border_width: 2.5,
            text: TextStyle::themed(theme).with_size(11.0).bold(),
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite("oval border width", &[self.border_width])?;
        if self.border_width < 0.0 {
            return Err(DiagramError::config(
                "oval border width must not be negative",
            ));
        }
        self.text.validate()
    }
}

impl Default for OvalStyle {
    fn default() -> Self {
        Self::themed(&Theme::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Head at the end point only.
    #[default]
    Forward,
    /// Heads at both end points.
    Bidirectional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadKind {
    /// Two strokes meeting at the tip.
    #[default]
    Open,
    /// Solid triangle.
    Filled,
}

/// Arrow styling. Head dimensions are fractions of `head_scale`, which is
/// expressed in points, so heads keep their size whatever the canvas units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorStyle {
    pub color: Color,
    pub line_width: f32,
    pub direction: Direction,
    pub head: HeadKind,
    pub head_scale: f32,
    pub head_length: f32,
    pub head_width: f32,
    /// Gap left between each end point and the drawn line, in points.
    pub shrink: f32,
}

impl ConnectorStyle {
    pub fn themed(theme: &Theme) -> Self {
        Self {
            color: theme.line_color,
            line_width: 2.5,
            direction: Direction::Forward,
            head: HeadKind::Open,
            head_scale: 25.0,
            head_length: 0.4,
            head_width: 0.2,
            shrink: 2.0,
        }
    }

    pub fn bidirectional(mut self) -> Self {
        self.direction = Direction::Bidirectional;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite(
            "connector style",
            &[
                self.line_width,
                self.head_scale,
                self.head_length,
                self.head_width,
                self.shrink,
            ],
        )?;
        if self.line_width < 0.0
            || self.head_scale < 0.0
            || self.head_length < 0.0
            || self.head_width < 0.0
            || self.shrink < 0.0
        {
            return Err(DiagramError::config(
                "connector widths, head dimensions and shrink must not be negative",
            ));
        }
        Ok(())
    }
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self::themed(&Theme::default())
    }
}

/// Opaque backing patch drawn behind connector labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub text: TextStyle,
    pub background: Color,
    pub border_color: Color,
    pub border_width: f32,
    /// Patch padding as a multiple of the font size.
    pub pad: f32,
}

impl LabelStyle {
    pub fn themed(theme: &Theme) -> Self {
        Self {
            text: TextStyle::themed(theme).with_size(8.0).bold(),
            background: theme.label_background,
            border_color: theme.label_border,
            border_width: 1.5,
            pad: 0.3,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite("label style", &[self.border_width, self.pad])?;
        if self.border_width < 0.0 || self.pad < 0.0 {
            return Err(DiagramError::config(
                "label border width and pad must not be negative",
            ));
        }
        self.text.validate()
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self::themed(&Theme::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwatchMarker {
    #[default]
    Rect,
    Oval,
}

/// Fixed-step grid used by the legend composer. Steps and sizes are in
/// canvas units; rows advance downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendStyle {
    pub title: Option<String>,
    pub title_text: TextStyle,
    /// Vertical distance from the grid origin up to the title baseline.
    pub title_offset: f32,
    pub column_step: f32,
    pub row_step: f32,
    pub swatch_width: f32,
    pub swatch_height: f32,
    pub swatch_border: Color,
    pub swatch_border_width: f32,
    /// Horizontal gap between the swatch and its label.
    pub text_gap: f32,
    pub text: TextStyle,
}

impl LegendStyle {
    pub fn themed(theme: &Theme) -> Self {
        Self {
            title: None,
            title_text: TextStyle::themed(theme).with_size(9.0).bold(),
            title_offset: 0.2,
            column_step: 3.5,
            row_step: 0.3,
            swatch_width: 0.3,
            swatch_height: 0.15,
            swatch_border: theme.legend_border,
            swatch_border_width: 1.0,
            text_gap: 0.1,
            text: TextStyle::themed(theme).with_size(7.0),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite(
            "legend style",
            &[
                self.title_offset,
                self.column_step,
                self.row_step,
                self.swatch_width,
                self.swatch_height,
                self.swatch_border_width,
                self.text_gap,
            ],
        )?;
        if self.swatch_width < 0.0 || self.swatch_height < 0.0 || self.swatch_border_width < 0.0 {
            return Err(DiagramError::config(
                "legend swatch size and border width must not be negative",
            ));
        }
        self.title_text.validate()?;
        self.text.validate()
    }
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self::themed(&Theme::default())
    }
}
