//! The drawing surface every primitive appends to.
//!
//! Coordinates are abstract canvas units with the origin at the
//! **bottom-left** corner and y growing upward. Every primitive, the renderer
//! and the legend composer use this convention.

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::color::Color;
use crate::connector::Connector;
use crate::error::{DiagramError, Result, ensure_finite};
use crate::geometry::{Rect, Size};
use crate::shape::Shape;

/// How content outside the canvas bounds is treated at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Anything outside the bounds is clipped away.
    #[default]
    Clip,
    /// The rendered viewport grows to include out-of-bounds content. The
    /// canvas bounds themselves stay unchanged.
    Extend,
}

#[derive(Debug, Clone)]
pub enum Element {
    Shape(Shape),
    Connector(Connector),
    Text(Annotation),
}

/// A fixed-size diagram surface. Elements render in insertion order, later
/// ones on top.
#[derive(Debug, Clone)]
pub struct Canvas {
    bounds: Rect,
    figure_size: Size,
    background: Color,
    bounds_policy: BoundsPolicy,
    elements: Vec<Element>,
}

impl Canvas {
    /// Creates a `width` x `height` canvas rendered at one inch per unit.
    pub fn new(width: f32, height: f32) -> Result<Self> {
        validate_extent("canvas", width, height)?;
        Ok(Self {
            bounds: Rect::new(0.0, 0.0, width, height),
            figure_size: Size::new(width, height),
            background: Color::WHITE,
            bounds_policy: BoundsPolicy::Clip,
            elements: Vec::new(),
        })
    }

    /// Physical size of the whole canvas in inches. Pixel dimensions are
    /// this size times the export DPI.
    pub fn with_figure_size(mut self, width_in: f32, height_in: f32) -> Result<Self> {
        validate_extent("figure size", width_in, height_in)?;
        self.figure_size = Size::new(width_in, height_in);
        Ok(self)
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_bounds_policy(mut self, policy: BoundsPolicy) -> Self {
        self.bounds_policy = policy;
        self
    }

    pub fn width(&self) -> f32 {
        self.bounds.width
    }

    pub fn height(&self) -> f32 {
        self.bounds.height
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn figure_size(&self) -> Size {
        self.figure_size
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn bounds_policy(&self) -> BoundsPolicy {
        self.bounds_policy
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Points per canvas unit on each axis.
    pub(crate) fn points_per_unit(&self) -> (f32, f32) {
        (
            72.0 * self.figure_size.width / self.bounds.width,
            72.0 * self.figure_size.height / self.bounds.height,
        )
    }

    pub(crate) fn push(&mut self, element: Element) {
        self.elements.push(element);
    }
}

fn validate_extent(what: &str, width: f32, height: f32) -> Result<()> {
    ensure_finite(what, &[width, height])?;
    if width <= 0.0 || height <= 0.0 {
        return Err(DiagramError::config(format!(
            "{what} must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_empty_with_unit_inches() {
        let canvas = Canvas::new(12.0, 8.0).unwrap();
        assert!(canvas.is_empty());
        assert_eq!(canvas.figure_size(), Size::new(12.0, 8.0));
        assert_eq!(canvas.points_per_unit(), (72.0, 72.0));
        assert_eq!(canvas.bounds_policy(), BoundsPolicy::Clip);
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        assert!(Canvas::new(0.0, 8.0).is_err());
        assert!(Canvas::new(12.0, -1.0).is_err());
        assert!(Canvas::new(f32::NAN, 8.0).is_err());
        assert!(Canvas::new(4.0, 4.0).unwrap().with_figure_size(0.0, 2.0).is_err());
    }

    #[test]
    fn figure_size_scales_points_per_unit() {
        let canvas = Canvas::new(100.0, 50.0)
            .unwrap()
            .with_figure_size(10.0, 5.0)
            .unwrap();
        assert_eq!(canvas.points_per_unit(), (7.2, 7.2));
    }
}
