//! Grid layout of (color swatch, label) pairs.
//!
//! Wrapping is plain arithmetic on the entry index; nothing is measured and
//! overflow past the canvas bounds is not detected.

use serde::{Deserialize, Serialize};

use crate::annotation::add_text;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{DiagramError, Result, ensure_finite};
use crate::geometry::{Point, Size};
use crate::shape::{add_box, add_oval};
use crate::style::{BoxStyle, HAlign, LegendStyle, OvalStyle, SwatchMarker, VAlign};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: Color,
    pub label: String,
    #[serde(default)]
    pub marker: SwatchMarker,
}

impl LegendEntry {
    pub fn new(color: Color, label: impl Into<String>) -> Self {
        Self {
            color,
            label: label.into(),
            marker: SwatchMarker::Rect,
        }
    }

    pub fn with_marker(mut self, marker: SwatchMarker) -> Self {
        self.marker = marker;
        self
    }
}

/// Grid position of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendCell {
    pub index: usize,
    pub row: usize,
    pub column: usize,
}

pub fn legend_cells(count: usize, columns: usize) -> Result<Vec<LegendCell>> {
    if columns == 0 {
        return Err(DiagramError::config("legend needs at least one column"));
    }
    Ok((0..count)
        .map(|index| LegendCell {
            index,
            row: index / columns,
            column: index % columns,
        })
        .collect())
}

/// Bottom-left corner of the swatch for `cell`.
pub fn swatch_origin(origin: Point, cell: LegendCell, style: &LegendStyle) -> Point {
    origin.offset(
        cell.column as f32 * style.column_step,
        -(cell.row as f32) * style.row_step,
    )
}

/// Lays `entries` out from `origin` (the first swatch's bottom-left corner),
/// `columns` per row, with the optional title `title_offset` above.
pub fn add_legend(
    canvas: &mut Canvas,
    entries: &[LegendEntry],
    origin: Point,
    columns: usize,
    style: &LegendStyle,
) -> Result<()> {
    ensure_finite("legend origin", &[origin.x, origin.y])?;
    style.validate()?;
    let cells = legend_cells(entries.len(), columns)?;

    if let Some(title) = &style.title {
        add_text(
            canvas,
            origin.offset(0.0, style.title_offset),
            title,
            &style.title_text,
            HAlign::Left,
            VAlign::Baseline,
        )?;
    }

    let swatch = Size::new(style.swatch_width, style.swatch_height);
    for (entry, cell) in entries.iter().zip(cells) {
        let at = swatch_origin(origin, cell, style);
        match entry.marker {
            SwatchMarker::Rect => add_box(
                canvas,
                at,
                swatch,
                "",
                &BoxStyle::plain(entry.color, style.swatch_border, style.swatch_border_width),
            )?,
            SwatchMarker::Oval => add_oval(
                canvas,
                at,
                swatch,
                "",
                &OvalStyle {
                    fill: entry.color,
                    border_color: style.swatch_border,
                    border_width: style.swatch_border_width,
                    text: style.text.clone(),
                },
            )?,
        }
        add_text(
            canvas,
            at.offset(swatch.width + style.text_gap, swatch.height / 2.0),
            &entry.label,
            &style.text,
            HAlign::Left,
            VAlign::Center,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Element;

    fn entries(n: usize) -> Vec<LegendEntry> {
        (0..n)
            .map(|i| LegendEntry::new(Color::rgb(10 * i as u8, 0, 0), format!("entry {i}")))
            .collect()
    }

    #[test]
    fn six_entries_in_three_columns_make_two_rows() {
        let cells = legend_cells(6, 3).unwrap();
        let rows: Vec<usize> = cells.iter().map(|c| c.row).collect();
        let columns: Vec<usize> = cells.iter().map(|c| c.column).collect();
        assert_eq!(rows, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(columns, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(cells.iter().map(|c| c.row).max(), Some(1));
    }

    #[test]
    fn rows_advance_downward_in_input_order() {
        let mut canvas = Canvas::new(12.0, 8.0).unwrap();
        let style = LegendStyle::default();
        add_legend(&mut canvas, &entries(6), Point::new(0.5, 0.3), 3, &style).unwrap();
        // swatch + label per entry
        assert_eq!(canvas.len(), 12);
        let swatches: Vec<Point> = canvas
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::Shape(shape) => Some(shape.origin),
                _ => None,
            })
            .collect();
        assert_eq!(swatches[0], Point::new(0.5, 0.3));
        assert_eq!(swatches[2], Point::new(7.5, 0.3));
        assert!((swatches[3].y - 0.0).abs() < 1e-6);
        assert_eq!(swatches[3].x, 0.5);
        assert_eq!(swatches[5].x, 7.5);
    }

    #[test]
    fn empty_legend_only_adds_title() {
        let mut canvas = Canvas::new(12.0, 8.0).unwrap();
        let style = LegendStyle::default().with_title("LEGEND:");
        add_legend(&mut canvas, &[], Point::new(0.5, 0.3), 3, &style).unwrap();
        assert_eq!(canvas.len(), 1);
        assert!(matches!(&canvas.elements()[0], Element::Text(t) if t.text == "LEGEND:"));

        let mut untitled = Canvas::new(12.0, 8.0).unwrap();
        add_legend(&mut untitled, &[], Point::new(0.5, 0.3), 3, &LegendStyle::default()).unwrap();
        assert!(untitled.is_empty());
    }

    #[test]
    fn zero_columns_is_a_configuration_error() {
        let mut canvas = Canvas::new(12.0, 8.0).unwrap();
        let err = add_legend(
            &mut canvas,
            &entries(2),
            Point::new(0.0, 0.0),
            0,
            &LegendStyle::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DiagramError::Configuration(_)));
    }

    #[test]
    fn oval_markers_become_ovals() {
        let mut canvas = Canvas::new(8.0, 10.0).unwrap();
        let entry = LegendEntry::new(Color::rgb(0x81, 0xC7, 0x84), "Start/End")
            .with_marker(SwatchMarker::Oval);
        add_legend(&mut canvas, &[entry], Point::new(0.65, 0.4), 3, &LegendStyle::default())
            .unwrap();
        let Element::Shape(shape) = &canvas.elements()[0] else {
            panic!("expected swatch");
        };
        assert_eq!(shape.outline, crate::shape::Outline::Ellipse);
    }
}
