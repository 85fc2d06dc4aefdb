//! Arrows between caller-supplied points.
//!
//! Endpoints are never checked against shapes; collisions with other
//! elements are the caller's concern.

use log::debug;

use crate::canvas::{Canvas, Element};
use crate::error::{Result, ensure_finite};
use crate::geometry::Point;
use crate::style::{ConnectorStyle, Direction, HeadKind, LabelStyle};

/// Text drawn over a connector on an opaque patch.
#[derive(Debug, Clone)]
pub struct ConnectorLabel {
    pub text: String,
    /// Displacement from the segment midpoint, in canvas units.
    pub offset: Point,
    pub style: LabelStyle,
}

impl ConnectorLabel {
    pub fn new(text: impl Into<String>, style: LabelStyle) -> Self {
        Self {
            text: text.into(),
            offset: Point::default(),
            style,
        }
    }

    pub fn with_offset(mut self, dx: f32, dy: f32) -> Self {
        self.offset = Point::new(dx, dy);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Connector {
    pub start: Point,
    pub end: Point,
    pub style: ConnectorStyle,
    pub label: Option<ConnectorLabel>,
}

impl Connector {
    /// Where the label patch is centered, in canvas units.
    pub fn label_anchor(&self) -> Option<Point> {
        self.label
            .as_ref()
            .map(|label| self.start.midpoint(self.end).offset(label.offset.x, label.offset.y))
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// Appends an arrow from `start` to `end`. Identical endpoints produce a
/// zero-length arrow rather than an error.
pub fn add_connector(
    canvas: &mut Canvas,
    start: Point,
    end: Point,
    style: &ConnectorStyle,
    label: Option<ConnectorLabel>,
) -> Result<()> {
    ensure_finite("connector start", &[start.x, start.y])?;
    ensure_finite("connector end", &[end.x, end.y])?;
    style.validate()?;
    if let Some(label) = &label {
        ensure_finite("label offset", &[label.offset.x, label.offset.y])?;
        label.style.validate()?;
    }
    if start == end {
        debug!("connector at ({}, {}) has zero length", start.x, start.y);
    }
    canvas.push(Element::Connector(Connector {
        start,
        end,
        style: style.clone(),
        label,
    }));
    Ok(())
}

/// Drawable pieces of an arrow, in point space.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowGeometry {
    pub shaft: (Point, Point),
    /// Each head is `[left barb, tip, right barb]`.
    pub heads: Vec<[Point; 3]>,
}

/// Computes the shaft and heads for an arrow between two projected points.
/// Head sizes are `head_length`/`head_width` times `head_scale` points.
pub fn arrow_geometry(start: Point, end: Point, style: &ConnectorStyle) -> ArrowGeometry {
    let length = start.distance(end);
    if length <= f32::EPSILON {
        return ArrowGeometry {
            shaft: (start, end),
            heads: Vec::new(),
        };
    }
    let ux = (end.x - start.x) / length;
    let uy = (end.y - start.y) / length;

    let shrink = if length > 2.0 * style.shrink {
        style.shrink
    } else {
        0.0
    };
    let tail = start.offset(ux * shrink, uy * shrink);
    let tip = end.offset(-ux * shrink, -uy * shrink);

    let head_length = style.head_length * style.head_scale;
    let head_width = style.head_width * style.head_scale;
    let head_at = |tip: Point, dx: f32, dy: f32| -> [Point; 3] {
        let base = tip.offset(-dx * head_length, -dy * head_length);
        [
            base.offset(-dy * head_width, dx * head_width),
            tip,
            base.offset(dy * head_width, -dx * head_width),
        ]
    };

    let mut heads = vec![head_at(tip, ux, uy)];
    if style.direction == Direction::Bidirectional {
        heads.push(head_at(tail, -ux, -uy));
    }

    // A filled head would let the shaft poke through its tip.
    let shaft = if style.head == HeadKind::Filled {
        let inset = head_length.min(length / 2.0);
        let shaft_end = tip.offset(-ux * inset, -uy * inset);
        let shaft_start = if style.direction == Direction::Bidirectional {
            tail.offset(ux * inset, uy * inset)
        } else {
            tail
        };
        (shaft_start, shaft_end)
    } else {
        (tail, tip)
    };

    ArrowGeometry { shaft, heads }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn forward_arrow_has_one_head_at_end() {
        let style = ConnectorStyle::default();
        let geometry = arrow_geometry(Point::new(0.0, 0.0), Point::new(100.0, 0.0), &style);
        assert_eq!(geometry.heads.len(), 1);
        let [left, tip, right] = geometry.heads[0];
        assert!(close(tip, Point::new(98.0, 0.0)));
        assert!(close(left, Point::new(88.0, 5.0)));
        assert!(close(right, Point::new(88.0, -5.0)));
        assert!(close(geometry.shaft.0, Point::new(2.0, 0.0)));
    }

    #[test]
    fn bidirectional_arrow_has_heads_at_both_ends() {
        let style = ConnectorStyle::default().bidirectional();
        let geometry = arrow_geometry(Point::new(0.0, 0.0), Point::new(0.0, 50.0), &style);
        assert_eq!(geometry.heads.len(), 2);
        assert!(close(geometry.heads[1][1], Point::new(0.0, 2.0)));
    }

    #[test]
    fn filled_head_shortens_shaft() {
        let mut style = ConnectorStyle::default();
        style.head = HeadKind::Filled;
        let geometry = arrow_geometry(Point::new(0.0, 0.0), Point::new(100.0, 0.0), &style);
        assert!(close(geometry.shaft.1, Point::new(88.0, 0.0)));
    }

    #[test]
    fn zero_length_connector_is_accepted() {
        let mut canvas = Canvas::new(4.0, 4.0).unwrap();
        let at = Point::new(1.0, 1.0);
        add_connector(&mut canvas, at, at, &ConnectorStyle::default(), None).unwrap();
        assert_eq!(canvas.len(), 1);
        let geometry = arrow_geometry(at, at, &ConnectorStyle::default());
        assert!(geometry.heads.is_empty());
        assert_eq!(geometry.shaft, (at, at));
    }

    #[test]
    fn label_sits_at_offset_midpoint() {
        let mut canvas = Canvas::new(12.0, 8.0).unwrap();
        let label = ConnectorLabel::new("usa datos", LabelStyle::default()).with_offset(0.3, 0.0);
        add_connector(
            &mut canvas,
            Point::new(3.3, 5.8),
            Point::new(7.0, 5.8),
            &ConnectorStyle::default(),
            Some(label),
        )
        .unwrap();
        let Element::Connector(connector) = &canvas.elements()[0] else {
            panic!("expected a connector");
        };
        let anchor = connector.label_anchor().unwrap();
        assert!(close(anchor, Point::new(5.45, 5.8)));
    }

    #[test]
    fn rejects_infinite_endpoints() {
        let mut canvas = Canvas::new(4.0, 4.0).unwrap();
        let result = add_connector(
            &mut canvas,
            Point::new(0.0, 0.0),
            Point::new(f32::INFINITY, 1.0),
            &ConnectorStyle::default(),
            None,
        );
        assert!(result.is_err());
        assert!(canvas.is_empty());
    }
}
