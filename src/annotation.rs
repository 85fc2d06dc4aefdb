//! Free-standing text such as titles and section headers.

use crate::canvas::{Canvas, Element};
use crate::error::{Result, ensure_finite};
use crate::geometry::Point;
use crate::style::{HAlign, TextStyle, VAlign};

#[derive(Debug, Clone)]
pub struct Annotation {
    pub position: Point,
    pub text: String,
    pub style: TextStyle,
    pub halign: HAlign,
    pub valign: VAlign,
}

/// Appends `text` anchored at `position`. Defaults to left/baseline
/// alignment, so the anchor is where the first glyph sits.
pub fn add_text(
    canvas: &mut Canvas,
    position: Point,
    text: &str,
    style: &TextStyle,
    halign: HAlign,
    valign: VAlign,
) -> Result<()> {
    ensure_finite("text position", &[position.x, position.y])?;
    style.validate()?;
    canvas.push(Element::Text(Annotation {
        position,
        text: text.to_string(),
        style: style.clone(),
        halign,
        valign,
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_appended() {
        let mut canvas = Canvas::new(12.0, 8.0).unwrap();
        let style = TextStyle::default().with_size(14.0).bold();
        add_text(
            &mut canvas,
            Point::new(6.0, 7.6),
            "Automation Framework Architecture",
            &style,
            HAlign::Center,
            VAlign::Baseline,
        )
        .unwrap();
        let Element::Text(text) = &canvas.elements()[0] else {
            panic!("expected text");
        };
        assert_eq!(text.halign, HAlign::Center);
        assert!(text.style.weight.is_bold());
    }
}
