//! Diagram documents: one architecture view as pure data.
//!
//! A document names its canvas, an optional theme, a palette of named
//! colors, per-primitive style defaults and an ordered list of element
//! declarations. [`Diagram::build`] replays the declarations against a fresh
//! [`Canvas`] in order.
//!
//! ```json5
//! {
//!   canvas: { width: 12, height: 8 },
//!   palette: { external: "#B3E5FC" },
//!   elements: [
//!     { kind: "box", at: [0.5, 6.8], size: [2.5, 0.8], text: "WhatsApp Web", fill: "external" },
//!     { kind: "connector", from: [1.75, 6.8], to: [1.75, 6.3], label: "drives" },
//!   ],
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::annotation::add_text;
use crate::canvas::{BoundsPolicy, Canvas};
use crate::color::Color;
use crate::config::RenderOverrides;
use crate::connector::{ConnectorLabel, add_connector};
use crate::error::{DiagramError, Result};
use crate::geometry::{Point, Size};
use crate::legend::{LegendEntry, add_legend};
use crate::shape::{add_box, add_oval};
use crate::style::{
    BoxStyle, ConnectorStyle, Direction, HAlign, HeadKind, LabelStyle, LegendStyle, OvalStyle,
    SwatchMarker, TextOverflow, TextStyle, VAlign,
};
use crate::theme::Theme;

#[derive(Debug, Clone, Deserialize)]
pub struct Diagram {
    pub canvas: CanvasDecl,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub render: RenderOverrides,
    /// Where the CLI writes the image when no output flag is given.
    #[serde(default)]
    pub output: Option<PathBuf>,
    pub elements: Vec<Declaration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanvasDecl {
    pub width: f32,
    pub height: f32,
    /// Physical size in inches; one inch per unit when absent.
    #[serde(default)]
    pub figure: Option<Size>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub bounds: BoundsPolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Defaults {
    #[serde(rename = "box")]
    pub boxes: ShapeProps,
    #[serde(rename = "oval")]
    pub ovals: ShapeProps,
    pub connector: ConnectorProps,
    pub label: LabelProps,
    pub text: TextProps,
    pub legend: LegendProps,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Box(ShapeDecl),
    Oval(ShapeDecl),
    Connector(ConnectorDecl),
    Text(TextDecl),
    Legend(LegendDecl),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShapeDecl {
    pub at: Point,
    pub size: Size,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub props: ShapeProps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorDecl {
    pub from: Point,
    pub to: Point,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub label_offset: Option<Point>,
    #[serde(flatten)]
    pub props: ConnectorProps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDecl {
    pub at: Point,
    pub text: String,
    #[serde(default)]
    pub align: HAlign,
    #[serde(default)]
    pub valign: VAlign,
    #[serde(flatten)]
    pub props: TextProps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegendDecl {
    pub at: Point,
    pub columns: usize,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<LegendEntryDecl>,
    #[serde(flatten)]
    pub props: LegendProps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegendEntryDecl {
    pub color: String,
    pub label: String,
    #[serde(default)]
    pub marker: SwatchMarker,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextProps {
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<String>,
    pub overflow: Option<TextOverflow>,
}

impl TextProps {
    fn apply(&self, style: &mut TextStyle, palette: &Palette<'_>) -> Result<()> {
        if let Some(v) = self.font_size {
            style.font_size = v;
        }
        if let Some(bold) = self.bold {
            style.weight = if bold {
                crate::style::FontWeight::Bold
            } else {
                crate::style::FontWeight::Normal
            };
        }
        if let Some(v) = self.italic {
            style.italic = v;
        }
        if let Some(v) = &self.color {
            style.color = palette.resolve(v)?;
        }
        if let Some(v) = self.overflow {
            style.overflow = v;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShapeProps {
    pub fill: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<f32>,
    /// Boxes only.
    pub pad: Option<f32>,
    /// Boxes only.
    pub corner_radius: Option<f32>,
    #[serde(flatten)]
    pub text: TextProps,
}

impl ShapeProps {
    fn apply_box(&self, style: &mut BoxStyle, palette: &Palette<'_>) -> Result<()> {
        if let Some(v) = &self.fill {
            style.fill = palette.resolve(v)?;
        }
        if let Some(v) = &self.border_color {
            style.border_color = palette.resolve(v)?;
        }
        if let Some(v) = self.border_width {
            style.border_width = v;
        }
        if let Some(v) = self.pad {
            style.pad = v;
        }
        if let Some(v) = self.corner_radius {
            style.corner_radius = v;
        }
        self.text.apply(&mut style.text, palette)
    }

    fn apply_oval(&self, style: &mut OvalStyle, palette: &Palette<'_>) -> Result<()> {
        if let Some(v) = &self.fill {
            style.fill = palette.resolve(v)?;
        }
        if let Some(v) = &self.border_color {
            style.border_color = palette.resolve(v)?;
        }
        if let Some(v) = self.border_width {
            style.border_width = v;
        }
        self.text.apply(&mut style.text, palette)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LabelProps {
    pub background: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<f32>,
    pub pad: Option<f32>,
    #[serde(flatten)]
    pub text: TextProps,
}

impl LabelProps {
    fn apply(&self, style: &mut LabelStyle, palette: &Palette<'_>) -> Result<()> {
        if let Some(v) = &self.background {
            style.background = palette.resolve(v)?;
        }
        if let Some(v) = &self.border_color {
            style.border_color = palette.resolve(v)?;
        }
        if let Some(v) = self.border_width {
            style.border_width = v;
        }
        if let Some(v) = self.pad {
            style.pad = v;
        }
        self.text.apply(&mut style.text, palette)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectorProps {
    pub color: Option<String>,
    pub line_width: Option<f32>,
    pub direction: Option<Direction>,
    pub head: Option<HeadKind>,
    pub head_scale: Option<f32>,
    pub head_length: Option<f32>,
    pub head_width: Option<f32>,
    pub shrink: Option<f32>,
    pub label_style: Option<LabelProps>,
}

impl ConnectorProps {
    fn apply(&self, style: &mut ConnectorStyle, palette: &Palette<'_>) -> Result<()> {
        if let Some(v) = &self.color {
            style.color = palette.resolve(v)?;
        }
        if let Some(v) = self.line_width {
            style.line_width = v;
        }
        if let Some(v) = self.direction {
            style.direction = v;
        }
        if let Some(v) = self.head {
            style.head = v;
        }
        if let Some(v) = self.head_scale {
            style.head_scale = v;
        }
        if let Some(v) = self.head_length {
            style.head_length = v;
        }
        if let Some(v) = self.head_width {
            style.head_width = v;
        }
        if let Some(v) = self.shrink {
            style.shrink = v;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegendProps {
    pub column_step: Option<f32>,
    pub row_step: Option<f32>,
    pub swatch_size: Option<Size>,
    pub swatch_border: Option<String>,
    pub swatch_border_width: Option<f32>,
    pub text_gap: Option<f32>,
    pub title_offset: Option<f32>,
    pub font_size: Option<f32>,
    pub title_font_size: Option<f32>,
}

impl LegendProps {
    fn apply(&self, style: &mut LegendStyle, palette: &Palette<'_>) -> Result<()> {
        if let Some(v) = self.column_step {
            style.column_step = v;
        }
        if let Some(v) = self.row_step {
            style.row_step = v;
        }
        if let Some(v) = self.swatch_size {
            style.swatch_width = v.width;
            style.swatch_height = v.height;
        }
        if let Some(v) = &self.swatch_border {
            style.swatch_border = palette.resolve(v)?;
        }
        if let Some(v) = self.swatch_border_width {
            style.swatch_border_width = v;
        }
        if let Some(v) = self.text_gap {
            style.text_gap = v;
        }
        if let Some(v) = self.title_offset {
            style.title_offset = v;
        }
        if let Some(v) = self.font_size {
            style.text.font_size = v;
        }
        if let Some(v) = self.title_font_size {
            style.title_text.font_size = v;
        }
        Ok(())
    }
}

/// Named colors of one document. Names shadow CSS color names.
struct Palette<'a> {
    colors: &'a BTreeMap<String, String>,
}

impl Palette<'_> {
    fn resolve(&self, value: &str) -> Result<Color> {
        match self.colors.get(value) {
            Some(color) => Color::parse(color)
                .map_err(|err| DiagramError::config(format!("palette entry '{value}': {err}"))),
            None => Color::parse(value),
        }
    }
}

impl Diagram {
    pub fn from_json5(source: &str) -> Result<Self> {
        json5::from_str(source)
            .map_err(|err| DiagramError::config(format!("invalid diagram document: {err}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source =
            std::fs::read_to_string(path).map_err(|source| DiagramError::io(path, source))?;
        Self::from_json5(&source).map_err(|err| match err {
            DiagramError::Configuration(message) => {
                DiagramError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// The document's named theme layered over `base`, or `base` itself.
    pub fn theme(&self, base: &Theme) -> Result<Theme> {
        match self.theme.as_deref() {
            Some(name) => Theme::by_name(name)
                .map(|named| Theme {
                    font_family: base.font_family.clone(),
                    ..named
                })
                .ok_or_else(|| DiagramError::config(format!("unknown theme '{name}'"))),
            None => Ok(base.clone()),
        }
    }

    /// Replays every declaration onto a new canvas.
    pub fn build(&self, theme: &Theme) -> Result<Canvas> {
        let palette = Palette {
            colors: &self.palette,
        };
        let background = match &self.canvas.background {
            Some(value) => palette.resolve(value)?,
            None => theme.background,
        };
        let mut canvas = Canvas::new(self.canvas.width, self.canvas.height)?
            .with_background(background)
            .with_bounds_policy(self.canvas.bounds);
        if let Some(figure) = self.canvas.figure {
            canvas = canvas.with_figure_size(figure.width, figure.height)?;
        }

        for (idx, declaration) in self.elements.iter().enumerate() {
            self.place(&mut canvas, declaration, theme, &palette)
                .map_err(|err| match err {
                    DiagramError::Configuration(message) => {
                        DiagramError::config(format!("element {idx}: {message}"))
                    }
                    other => other,
                })?;
        }
        debug!("built canvas with {} elements", canvas.len());
        Ok(canvas)
    }

    fn place(
        &self,
        canvas: &mut Canvas,
        declaration: &Declaration,
        theme: &Theme,
        palette: &Palette<'_>,
    ) -> Result<()> {
        let defaults = &self.defaults;
        match declaration {
            Declaration::Box(decl) => {
                let mut style = BoxStyle::themed(theme);
                defaults.boxes.apply_box(&mut style, palette)?;
                decl.props.apply_box(&mut style, palette)?;
                add_box(canvas, decl.at, decl.size, &decl.text, &style)
            }
            Declaration::Oval(decl) => {
                let mut style = OvalStyle::themed(theme);
                defaults.ovals.apply_oval(&mut style, palette)?;
                decl.props.apply_oval(&mut style, palette)?;
                add_oval(canvas, decl.at, decl.size, &decl.text, &style)
            }
            Declaration::Connector(decl) => {
                let mut style = ConnectorStyle::themed(theme);
                defaults.connector.apply(&mut style, palette)?;
                decl.props.apply(&mut style, palette)?;
                let label = match &decl.label {
                    Some(text) if !text.is_empty() => {
                        let mut label_style = LabelStyle::themed(theme);
                        defaults.label.apply(&mut label_style, palette)?;
                        if let Some(props) = &defaults.connector.label_style {
                            props.apply(&mut label_style, palette)?;
                        }
                        if let Some(props) = &decl.props.label_style {
                            props.apply(&mut label_style, palette)?;
                        }
                        let offset = decl.label_offset.unwrap_or_default();
                        Some(
                            ConnectorLabel::new(text.clone(), label_style)
                                .with_offset(offset.x, offset.y),
                        )
                    }
                    _ => None,
                };
                add_connector(canvas, decl.from, decl.to, &style, label)
            }
            Declaration::Text(decl) => {
                let mut style = TextStyle::themed(theme);
                defaults.text.apply(&mut style, palette)?;
                decl.props.apply(&mut style, palette)?;
                add_text(canvas, decl.at, &decl.text, &style, decl.align, decl.valign)
            }
            Declaration::Legend(decl) => {
                let mut style = LegendStyle::themed(theme);
                defaults.legend.apply(&mut style, palette)?;
                decl.props.apply(&mut style, palette)?;
                style.title = decl.title.clone();
                let entries = decl
                    .entries
                    .iter()
                    .map(|entry| {
                        Ok(LegendEntry::new(palette.resolve(&entry.color)?, entry.label.clone())
                            .with_marker(entry.marker))
                    })
                    .collect::<Result<Vec<_>>>()?;
                add_legend(canvas, &entries, decl.at, decl.columns, &style)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Element;

    const SAMPLE: &str = r##"{
        // hand-tuned coordinates
        canvas: { width: 12, height: 8, background: "white" },
        palette: { external: "#B3E5FC", core: "#FFE082" },
        defaults: { box: { font_size: 7 }, connector: { line_width: 2 } },
        render: { dpi: 150 },
        output: "out/architecture.png",
        elements: [
            { kind: "text", at: [6, 7.6], text: "Architecture", align: "center", font_size: 14, bold: true },
            { kind: "box", at: [0.5, 6.0], size: [2.5, 0.8], text: "WhatsApp Web", fill: "external", bold: true },
            { kind: "oval", at: [3.5, 6.0], size: [2.5, 0.8], text: "START", fill: "core" },
            { kind: "connector", from: [3, 6.4], to: [3.3, 6.4], direction: "bidirectional", label: "talks" },
            { kind: "legend", at: [0.5, 0.3], columns: 3, title: "LEGEND:", entries: [
                { color: "external", label: "External" },
                { color: "core", label: "Core", marker: "oval" },
            ] },
        ],
    }"##;

    #[test]
    fn parses_and_builds_in_order() {
        let diagram = Diagram::from_json5(SAMPLE).unwrap();
        assert_eq!(diagram.output.as_deref(), Some(Path::new("out/architecture.png")));
        assert_eq!(diagram.render.dpi, Some(150.0));
        let canvas = diagram.build(&Theme::classic()).unwrap();
        // text + box + oval + connector + title + 2 * (swatch + label)
        assert_eq!(canvas.len(), 9);
        assert!(matches!(canvas.elements()[0], Element::Text(_)));
        let Element::Shape(shape) = &canvas.elements()[1] else {
            panic!("expected box");
        };
        assert_eq!(shape.fill, Color::rgb(0xB3, 0xE5, 0xFC));
        assert_eq!(shape.text_style.font_size, 7.0);
        assert!(shape.text_style.weight.is_bold());
        let Element::Connector(connector) = &canvas.elements()[3] else {
            panic!("expected connector");
        };
        assert_eq!(connector.style.direction, Direction::Bidirectional);
        assert_eq!(connector.style.line_width, 2.0);
        assert_eq!(connector.label.as_ref().map(|l| l.text.as_str()), Some("talks"));
    }

    #[test]
    fn unknown_color_names_the_element() {
        let source = r#"{
            canvas: { width: 4, height: 4 },
            elements: [
                { kind: "box", at: [1, 1], size: [1, 1], fill: "not-a-color" },
            ],
        }"#;
        let diagram = Diagram::from_json5(source).unwrap();
        let err = diagram.build(&Theme::classic()).unwrap_err();
        assert!(err.to_string().contains("element 0"), "{err}");
    }

    #[test]
    fn malformed_document_is_configuration_error() {
        let err = Diagram::from_json5("{ canvas: { width: 4 } }").unwrap_err();
        assert!(matches!(err, DiagramError::Configuration(_)));
    }

    #[test]
    fn named_theme_applies() {
        let diagram = Diagram::from_json5(
            r#"{ canvas: { width: 4, height: 4 }, theme: "print", elements: [] }"#,
        )
        .unwrap();
        let theme = diagram.theme(&Theme::classic()).unwrap();
        assert_eq!(theme.border_color, Theme::print().border_color);
    }
}
