//! Canvas to SVG.
//!
//! The document is expressed in points (72 per inch) with y pointing down;
//! canvas coordinates are projected through a [`Frame`]. Elements are
//! written in insertion order so later elements paint over earlier ones.

use crate::annotation::Annotation;
use crate::canvas::{BoundsPolicy, Canvas, Element};
use crate::color::Color;
use crate::connector::{Connector, arrow_geometry};
use crate::geometry::{Point, Rect};
use crate::shape::{Outline, Shape};
use crate::style::{HAlign, HeadKind, TextOverflow, TextStyle, VAlign};
use crate::text::{FontSpec, TextBlock, measure_block, wrap_block};
use crate::theme::Theme;

/// Baseline sits this far below the vertical middle of a line, in ems.
const BASELINE_SHIFT: f32 = 0.35;

/// Mapping from canvas units to SVG points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Visible region in canvas units.
    pub view: Rect,
    pub sx: f32,
    pub sy: f32,
}

impl Frame {
    pub fn width_pt(&self) -> f32 {
        self.view.width * self.sx
    }

    pub fn height_pt(&self) -> f32 {
        self.view.height * self.sy
    }

    pub fn project(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.view.x) * self.sx,
            (self.view.max_y() - p.y) * self.sy,
        )
    }

    /// Projects a canvas rectangle to a point-space rectangle (y down).
    pub fn project_rect(&self, r: Rect) -> Rect {
        let top_left = self.project(Point::new(r.x, r.max_y()));
        Rect::new(top_left.x, top_left.y, r.width * self.sx, r.height * self.sy)
    }
}

/// Computes the visible region for `canvas`: its bounds, widened to every
/// element's extent under [`BoundsPolicy::Extend`].
pub fn frame_for(canvas: &Canvas, theme: &Theme) -> Frame {
    let (sx, sy) = canvas.points_per_unit();
    let view = match canvas.bounds_policy() {
        BoundsPolicy::Clip => canvas.bounds(),
        BoundsPolicy::Extend => match content_extent(canvas, theme) {
            Some(extent) => canvas.bounds().union(&extent),
            None => canvas.bounds(),
        },
    };
    Frame { view, sx, sy }
}

/// Union of every element's painted extent, in canvas units.
pub fn content_extent(canvas: &Canvas, theme: &Theme) -> Option<Rect> {
    let (sx, sy) = canvas.points_per_unit();
    canvas
        .elements()
        .iter()
        .map(|element| element_extent(element, theme, sx, sy))
        .reduce(|acc, rect| acc.union(&rect))
}

fn element_extent(element: &Element, theme: &Theme, sx: f32, sy: f32) -> Rect {
    match element {
        Element::Shape(shape) => {
            let half = shape.border_width / 2.0;
            let outline = shape.outline_bounds().inflate(half / sx, half / sy);
            let block = shape_text_block(shape, theme, sx);
            let text = text_extent(
                shape.center(),
                &block,
                &shape.text_style,
                HAlign::Center,
                VAlign::Center,
                sx,
                sy,
            );
            outline.union(&text)
        }
        Element::Connector(connector) => {
            let style = &connector.style;
            let reach = style.head_width * style.head_scale + style.line_width;
            let mut rect = Rect::from_points(connector.start, connector.end)
                .inflate(reach / sx, reach / sy);
            if let (Some(label), Some(anchor)) = (&connector.label, connector.label_anchor()) {
                let block = measure_block(&label.text, font_spec(&label.style.text, theme));
                let pad = label.style.pad * label.style.text.font_size + label.style.border_width;
                let patch = Rect::centered(
                    anchor,
                    (block.width + 2.0 * pad) / sx,
                    (block.height + 2.0 * pad) / sy,
                );
                rect = rect.union(&patch);
            }
            rect
        }
        Element::Text(annotation) => {
            let block = measure_block(&annotation.text, font_spec(&annotation.style, theme));
            text_extent(
                annotation.position,
                &block,
                &annotation.style,
                annotation.halign,
                annotation.valign,
                sx,
                sy,
            )
        }
    }
}

fn text_extent(
    anchor: Point,
    block: &TextBlock,
    style: &TextStyle,
    halign: HAlign,
    valign: VAlign,
    sx: f32,
    sy: f32,
) -> Rect {
    // Lay out around the origin in point space, then map back to units.
    let layout = text_layout(Point::default(), block, style.font_size, halign, valign);
    Rect::new(
        anchor.x + layout.rect.x / sx,
        anchor.y - layout.rect.max_y() / sy,
        layout.rect.width / sx,
        layout.rect.height / sy,
    )
}

pub fn render_svg(canvas: &Canvas, theme: &Theme) -> String {
    let frame = frame_for(canvas, theme);
    render_svg_with_frame(canvas, theme, &frame)
}

pub fn render_svg_with_frame(canvas: &Canvas, theme: &Theme, frame: &Frame) -> String {
    let mut svg = String::new();
    let width = frame.width_pt();
    let height = frame.height_pt();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" {}/>",
        paint("fill", canvas.background())
    ));

    for (idx, element) in canvas.elements().iter().enumerate() {
        match element {
            Element::Shape(shape) => render_shape(&mut svg, idx, shape, theme, frame),
            Element::Connector(connector) => render_connector(&mut svg, connector, theme, frame),
            Element::Text(annotation) => render_annotation(&mut svg, annotation, theme, frame),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn render_shape(svg: &mut String, idx: usize, shape: &Shape, theme: &Theme, frame: &Frame) {
    let outline = outline_svg(shape, frame);
    svg.push_str(&format!(
        "<{outline} {} {} stroke-width=\"{:.2}\"/>",
        paint("fill", shape.fill),
        paint("stroke", shape.border_color),
        shape.border_width
    ));

    if shape.text.is_empty() {
        return;
    }

    let block = shape_text_block(shape, theme, frame.sx);
    let center = frame.project(shape.center());
    let clip = if shape.text_style.overflow == TextOverflow::Clip {
        let id = format!("clip-{idx}");
        svg.push_str(&format!("<defs><clipPath id=\"{id}\"><{outline}/></clipPath></defs>"));
        Some(id)
    } else {
        None
    };
    svg.push_str(&text_block_svg(
        center,
        &block,
        &shape.text_style,
        HAlign::Center,
        VAlign::Center,
        theme,
        clip.as_deref(),
    ));
}

/// Outline element name plus geometry attributes.
fn outline_svg(shape: &Shape, frame: &Frame) -> String {
    match shape.outline {
        Outline::Rounded { radius, .. } => {
            let r = frame.project_rect(shape.outline_bounds());
            format!(
                "rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\"",
                r.x,
                r.y,
                r.width,
                r.height,
                radius * frame.sx,
                radius * frame.sy
            )
        }
        Outline::Ellipse => {
            let c = frame.project(shape.center());
            format!(
                "ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\"",
                c.x,
                c.y,
                shape.size.width * frame.sx / 2.0,
                shape.size.height * frame.sy / 2.0
            )
        }
    }
}

fn shape_text_block(shape: &Shape, theme: &Theme, sx: f32) -> TextBlock {
    let font = font_spec(&shape.text_style, theme);
    match shape.text_style.overflow {
        TextOverflow::Wrap => {
            let inner = (shape.size.width * sx - shape.text_style.font_size * 0.4).max(1.0);
            wrap_block(&shape.text, inner, font)
        }
        TextOverflow::Visible | TextOverflow::Clip => measure_block(&shape.text, font),
    }
}

fn render_connector(svg: &mut String, connector: &Connector, theme: &Theme, frame: &Frame) {
    let style = &connector.style;
    let start = frame.project(connector.start);
    let end = frame.project(connector.end);
    let geometry = arrow_geometry(start, end, style);
    let stroke = paint("stroke", style.color);

    svg.push_str(&format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" fill=\"none\" {stroke} stroke-width=\"{:.2}\" stroke-linecap=\"butt\"/>",
        geometry.shaft.0.x, geometry.shaft.0.y, geometry.shaft.1.x, geometry.shaft.1.y, style.line_width
    ));

    for [left, tip, right] in &geometry.heads {
        let d = format!(
            "M {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2}",
            left.x, left.y, tip.x, tip.y, right.x, right.y
        );
        match style.head {
            HeadKind::Open => svg.push_str(&format!(
                "<path d=\"{d}\" fill=\"none\" {stroke} stroke-width=\"{:.2}\" stroke-linejoin=\"round\" stroke-linecap=\"round\"/>",
                style.line_width
            )),
            HeadKind::Filled => svg.push_str(&format!(
                "<path d=\"{d} Z\" {} {stroke} stroke-width=\"{:.2}\" stroke-linejoin=\"round\"/>",
                paint("fill", style.color),
                style.line_width
            )),
        }
    }

    let (Some(label), Some(anchor)) = (&connector.label, connector.label_anchor()) else {
        return;
    };
    let center = frame.project(anchor);
    let block = measure_block(&label.text, font_spec(&label.style.text, theme));
    let pad = label.style.pad * label.style.text.font_size;
    let patch = Rect::centered(center, block.width + 2.0 * pad, block.height + 2.0 * pad);
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{pad:.2}\" ry=\"{pad:.2}\" {} {} stroke-width=\"{:.2}\"/>",
        patch.x,
        patch.y,
        patch.width,
        patch.height,
        paint("fill", label.style.background.opaque()),
        paint("stroke", label.style.border_color),
        label.style.border_width
    ));
    svg.push_str(&text_block_svg(
        center,
        &block,
        &label.style.text,
        HAlign::Center,
        VAlign::Center,
        theme,
        None,
    ));
}

fn render_annotation(svg: &mut String, annotation: &Annotation, theme: &Theme, frame: &Frame) {
    let block = measure_block(&annotation.text, font_spec(&annotation.style, theme));
    svg.push_str(&text_block_svg(
        frame.project(annotation.position),
        &block,
        &annotation.style,
        annotation.halign,
        annotation.valign,
        theme,
        None,
    ));
}

struct TextLayout {
    /// Bounding box of the block in point space.
    rect: Rect,
    first_baseline: f32,
}

/// Places a block relative to `anchor` (point space, y down).
fn text_layout(
    anchor: Point,
    block: &TextBlock,
    font_size: f32,
    halign: HAlign,
    valign: VAlign,
) -> TextLayout {
    let lines = block.lines.len().max(1) as f32;
    let line_height = block.line_height;
    let baseline_in_line = line_height / 2.0 + BASELINE_SHIFT * font_size;
    let top = match valign {
        VAlign::Top => anchor.y,
        VAlign::Center => anchor.y - block.height / 2.0,
        VAlign::Bottom => anchor.y - block.height,
        VAlign::Baseline => anchor.y - (lines - 1.0) * line_height - baseline_in_line,
    };
    let left = match halign {
        HAlign::Left => anchor.x,
        HAlign::Center => anchor.x - block.width / 2.0,
        HAlign::Right => anchor.x - block.width,
    };
    TextLayout {
        rect: Rect::new(left, top, block.width, block.height),
        first_baseline: top + baseline_in_line,
    }
}

fn text_block_svg(
    anchor: Point,
    block: &TextBlock,
    style: &TextStyle,
    halign: HAlign,
    valign: VAlign,
    theme: &Theme,
    clip: Option<&str>,
) -> String {
    let layout = text_layout(anchor, block, style.font_size, halign, valign);
    let x = anchor.x;
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\"",
        layout.first_baseline,
        halign.svg_anchor(),
        escape_xml(&theme.font_family),
        style.font_size,
        style.weight.svg_value()
    ));
    if style.italic {
        text.push_str(" font-style=\"italic\"");
    }
    if let Some(id) = clip {
        text.push_str(&format!(" clip-path=\"url(#{id})\""));
    }
    text.push_str(&format!(" {}>", paint("fill", style.color)));

    for (idx, line) in block.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { block.line_height };
        // Empty tspans collapse; a space keeps the blank line's advance.
        let content = if line.is_empty() { " " } else { line.as_str() };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(content)
        ));
    }

    text.push_str("</text>");
    text
}

fn font_spec<'a>(style: &TextStyle, theme: &'a Theme) -> FontSpec<'a> {
    FontSpec {
        family: theme.font_family.as_str(),
        size: style.font_size,
        bold: style.weight.is_bold(),
        line_spacing: theme.line_spacing,
    }
}

/// `fill="#rrggbb"` plus an opacity attribute when the color is translucent.
fn paint(attr: &str, color: Color) -> String {
    if color.is_opaque() {
        format!("{attr}=\"{}\"", color.to_hex())
    } else {
        format!(
            "{attr}=\"{}\" {attr}-opacity=\"{:.3}\"",
            color.to_hex(),
            color.opacity()
        )
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
