//! Boxes and ovals: styled regions with centered text.

use log::debug;

use crate::canvas::{Canvas, Element};
use crate::color::Color;
use crate::error::{DiagramError, Result, ensure_finite};
use crate::geometry::{Point, Rect, Size};
use crate::style::{BoxStyle, OvalStyle, TextStyle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outline {
    /// Rounded rectangle grown by `pad` on every side.
    Rounded { pad: f32, radius: f32 },
    /// Ellipse inscribed in the bounds.
    Ellipse,
}

/// A placed shape. Identity is purely positional; nothing links it to
/// connectors.
#[derive(Debug, Clone)]
pub struct Shape {
    pub outline: Outline,
    /// Bottom-left corner of the nominal bounds.
    pub origin: Point,
    pub size: Size,
    pub text: String,
    pub fill: Color,
    pub border_color: Color,
    pub border_width: f32,
    pub text_style: TextStyle,
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.size.width, self.size.height)
    }

    /// Outline as drawn, including the box padding.
    pub fn outline_bounds(&self) -> Rect {
        match self.outline {
            Outline::Rounded { pad, .. } => self.bounds().inflate(pad, pad),
            Outline::Ellipse => self.bounds(),
        }
    }

    /// Anchor of the text block.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }
}

/// Appends a rounded box with `text` centered in it.
pub fn add_box(
    canvas: &mut Canvas,
    position: Point,
    size: Size,
    text: &str,
    style: &BoxStyle,
) -> Result<()> {
    validate_placement(position, size)?;
    style.validate()?;
    debug!(
        "box at ({}, {}) size {}x{}: {:?}",
        position.x, position.y, size.width, size.height, text
    );
    canvas.push(Element::Shape(Shape {
        outline: Outline::Rounded {
            pad: style.pad,
            radius: style.corner_radius,
        },
        origin: position,
        size,
        text: text.to_string(),
        fill: style.fill,
        border_color: style.border_color,
        border_width: style.border_width,
        text_style: style.text.clone(),
    }));
    Ok(())
}

/// Appends an ellipse inscribed in `position`/`size` with `text` centered.
pub fn add_oval(
    canvas: &mut Canvas,
    position: Point,
    size: Size,
    text: &str,
    style: &OvalStyle,
) -> Result<()> {
    validate_placement(position, size)?;
    style.validate()?;
    debug!(
        "oval at ({}, {}) size {}x{}: {:?}",
        position.x, position.y, size.width, size.height, text
    );
    canvas.push(Element::Shape(Shape {
        outline: Outline::Ellipse,
        origin: position,
        size,
        text: text.to_string(),
        fill: style.fill,
        border_color: style.border_color,
        border_width: style.border_width,
        text_style: style.text.clone(),
    }));
    Ok(())
}

fn validate_placement(position: Point, size: Size) -> Result<()> {
    ensure_finite("shape position", &[position.x, position.y])?;
    ensure_finite("shape size", &[size.width, size.height])?;
    if size.width < 0.0 || size.height < 0.0 {
        return Err(DiagramError::config(format!(
            "shape size must not be negative, got {}x{}",
            size.width, size.height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(12.0, 8.0).unwrap()
    }

    #[test]
    fn box_is_appended_with_padding() {
        let mut canvas = canvas();
        let style = BoxStyle::default().with_fill(Color::parse("#B3E5FC").unwrap());
        add_box(
            &mut canvas,
            Point::new(0.5, 6.0),
            Size::new(2.5, 0.8),
            "WhatsApp Web\nweb.whatsapp.com",
            &style,
        )
        .unwrap();
        assert_eq!(canvas.len(), 1);
        let Element::Shape(shape) = &canvas.elements()[0] else {
            panic!("expected a shape");
        };
        assert_eq!(shape.fill, Color::rgb(0xB3, 0xE5, 0xFC));
        assert_eq!(shape.center(), Point::new(1.75, 6.4));
        let outline = shape.outline_bounds();
        assert!((outline.x - 0.42).abs() < 1e-5);
        assert!((outline.width - 2.66).abs() < 1e-5);
    }

    #[test]
    fn oval_outline_matches_bounds() {
        let mut canvas = canvas();
        add_oval(
            &mut canvas,
            Point::new(2.5, 7.0),
            Size::new(3.0, 0.5),
            "START",
            &OvalStyle::default(),
        )
        .unwrap();
        let Element::Shape(shape) = &canvas.elements()[0] else {
            panic!("expected a shape");
        };
        assert_eq!(shape.outline, Outline::Ellipse);
        assert_eq!(shape.outline_bounds(), shape.bounds());
    }

    #[test]
    fn empty_text_is_allowed() {
        let mut canvas = canvas();
        add_box(
            &mut canvas,
            Point::new(1.0, 1.0),
            Size::new(1.0, 1.0),
            "",
            &BoxStyle::default(),
        )
        .unwrap();
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn rejects_non_finite_or_negative_geometry() {
        let mut canvas = canvas();
        let style = BoxStyle::default();
        let err = add_box(
            &mut canvas,
            Point::new(f32::NAN, 1.0),
            Size::new(1.0, 1.0),
            "x",
            &style,
        )
        .unwrap_err();
        assert!(matches!(err, DiagramError::Configuration(_)));
        assert!(
            add_oval(
                &mut canvas,
                Point::new(1.0, 1.0),
                Size::new(-1.0, 1.0),
                "x",
                &OvalStyle::default(),
            )
            .is_err()
        );
        assert!(canvas.is_empty());
    }
}
