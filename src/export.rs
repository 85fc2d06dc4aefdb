//! Writes a rendered canvas to disk as PNG or SVG.
//!
//! Output goes to a temporary file next to the target and is renamed into
//! place, so a failed export never leaves a partial file behind.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::{EmptyCanvasPolicy, OutputFormat, RenderConfig};
use crate::error::{DiagramError, Result};
use crate::render::{Frame, content_extent, frame_for, render_svg_with_frame};
use crate::theme::Theme;

/// What was written, for reporting back to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub dpi: f32,
    /// Dimensions of the written image after trimming.
    pub width_px: u32,
    pub height_px: u32,
    /// Nominal resolution: the full view, figure size times DPI.
    pub full_width_px: u32,
    pub full_height_px: u32,
    pub bytes: u64,
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "✓ Diagram saved to: {}", self.path.display())?;
        writeln!(
            f,
            "✓ Resolution: {}x{} px ({} DPI)",
            self.full_width_px, self.full_height_px, self.dpi
        )?;
        if (self.width_px, self.height_px) != (self.full_width_px, self.full_height_px) {
            writeln!(f, "✓ Trimmed to: {}x{} px", self.width_px, self.height_px)?;
        }
        match self.format {
            OutputFormat::Png => write!(f, "✓ Format: PNG with opaque background"),
            OutputFormat::Svg => write!(f, "✓ Format: SVG"),
        }
    }
}

/// Renders `canvas` and writes it to `output`. The canvas is left untouched.
pub fn export(
    canvas: &Canvas,
    output: &Path,
    theme: &Theme,
    config: &RenderConfig,
) -> Result<ExportReport> {
    config.validate()?;
    if canvas.is_empty() && config.empty_canvas == EmptyCanvasPolicy::Reject {
        return Err(DiagramError::render(
            "canvas has no elements; set empty_canvas to \"blank\" to render it anyway",
        ));
    }
    ensure_parent_dir(output)?;

    let format = config
        .format
        .or_else(|| OutputFormat::from_path(output))
        .unwrap_or(OutputFormat::Png);
    let background = opaque_background(config.background.unwrap_or(canvas.background()));
    let canvas = canvas.clone().with_background(background);

    let frame = frame_for(&canvas, theme);
    let (full_width_px, full_height_px) = full_pixel_size(&frame, config.dpi);

    let (bytes, width_px, height_px) = match format {
        OutputFormat::Svg => {
            let frame = if config.trim {
                trimmed_frame(&canvas, theme, &frame, config.pad_inches)
            } else {
                frame
            };
            let (width, height) = full_pixel_size(&frame, config.dpi);
            let svg = render_svg_with_frame(&canvas, theme, &frame);
            (svg.into_bytes(), width, height)
        }
        OutputFormat::Png => {
            let svg = render_svg_with_frame(&canvas, theme, &frame);
            let png = rasterize(&svg, &frame, background, theme, config)?;
            (png.data, png.width, png.height)
        }
    };

    write_atomically(output, &bytes)?;
    let path = output
        .canonicalize()
        .map_err(|source| DiagramError::io(output, source))?;
    info!(
        "wrote {} ({}x{} px, {} bytes)",
        path.display(),
        width_px,
        height_px,
        bytes.len()
    );

    Ok(ExportReport {
        path,
        format,
        dpi: config.dpi,
        width_px,
        height_px,
        full_width_px,
        full_height_px,
        bytes: bytes.len() as u64,
    })
}

fn full_pixel_size(frame: &Frame, dpi: f32) -> (u32, u32) {
    let scale = dpi / 72.0;
    (
        (frame.width_pt() * scale).round().max(1.0) as u32,
        (frame.height_pt() * scale).round().max(1.0) as u32,
    )
}

/// Narrows `frame` to the content extent plus `pad_inches`, never beyond the
/// original view. A canvas with nothing visible keeps the full view.
fn trimmed_frame(canvas: &Canvas, theme: &Theme, frame: &Frame, pad_inches: f32) -> Frame {
    let Some(extent) = content_extent(canvas, theme) else {
        return *frame;
    };
    let pad_pt = pad_inches * 72.0;
    let padded = extent.inflate(pad_pt / frame.sx, pad_pt / frame.sy);
    match padded.intersection(&frame.view) {
        Some(view) => {
            debug!("trimming SVG view {:?} to {view:?}", frame.view);
            Frame { view, ..*frame }
        }
        None => *frame,
    }
}

fn opaque_background(color: Color) -> Color {
    if color.is_opaque() {
        color
    } else {
        warn!("background {color} is translucent; rendering it opaque");
        color.opaque()
    }
}

fn ensure_parent_dir(output: &Path) -> Result<()> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(DiagramError::io(
            output,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("output directory {} does not exist", parent.display()),
            ),
        ));
    }
    Ok(())
}

fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file =
        tempfile::NamedTempFile::new_in(parent).map_err(|source| DiagramError::io(output, source))?;
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .map_err(|source| DiagramError::io(output, source))?;
    file.persist(output)
        .map_err(|err| DiagramError::io(output, err.error))?;
    Ok(())
}

struct RasterImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

#[cfg(feature = "png")]
fn rasterize(
    svg: &str,
    frame: &Frame,
    background: Color,
    theme: &Theme,
    config: &RenderConfig,
) -> Result<RasterImage> {
    use resvg::tiny_skia::{self, IntRect, Pixmap, PixmapPaint, Transform};

    let mut opt = usvg::Options::default();
    if let Some(first) = theme.font_family.split(',').next() {
        opt.font_family = first.trim().trim_matches('"').to_string();
    }
    opt.fontdb = fonts::shared_database();

    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|err| DiagramError::render(format!("failed to parse generated SVG: {err}")))?;

    let scale = config.dpi / 72.0;
    let (width, height) = full_pixel_size(frame, config.dpi);
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        DiagramError::render(format!("failed to allocate {width}x{height} pixmap"))
    })?;
    let bg = tiny_skia::Color::from_rgba8(background.r, background.g, background.b, 0xFF);
    pixmap.fill(bg);
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    let pixmap = if config.trim {
        let bg_pixel = bg.premultiply().to_color_u8();
        match content_box(pixmap.pixels(), width, height, |p| p != bg_pixel) {
            Some(content) => {
                let pad = (config.pad_inches * config.dpi).round().max(0.0) as u32;
                let crop = pad_box(content, pad, width, height);
                debug!("trimming {width}x{height} to {crop:?}");
                let rect = IntRect::from_xywh(
                    crop.x as i32,
                    crop.y as i32,
                    crop.width,
                    crop.height,
                )
                .ok_or_else(|| DiagramError::render("invalid trim rectangle"))?;
                let cropped = pixmap
                    .clone_rect(rect)
                    .ok_or_else(|| DiagramError::render("failed to crop rendered image"))?;
                // Re-composite over the background so pad pixels are opaque.
                let mut out = Pixmap::new(crop.width, crop.height).ok_or_else(|| {
                    DiagramError::render("failed to allocate trimmed pixmap")
                })?;
                out.fill(bg);
                out.draw_pixmap(
                    0,
                    0,
                    cropped.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
                out
            }
            None => pixmap,
        }
    } else {
        pixmap
    };

    let (width, height) = (pixmap.width(), pixmap.height());
    let data = pixmap
        .encode_png()
        .map_err(|err| DiagramError::render(format!("failed to encode PNG: {err}")))?;
    Ok(RasterImage {
        data,
        width,
        height,
    })
}

#[cfg(not(feature = "png"))]
fn rasterize(
    _svg: &str,
    _frame: &Frame,
    _background: Color,
    _theme: &Theme,
    _config: &RenderConfig,
) -> Result<RasterImage> {
    Err(DiagramError::render(
        "PNG output requires the `png` feature",
    ))
}

#[cfg(feature = "png")]
mod fonts {
    use std::sync::Arc;

    use once_cell::sync::Lazy;

    static FONT_DB: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    });

    pub(super) fn shared_database() -> Arc<usvg::fontdb::Database> {
        FONT_DB.clone()
    }
}

/// Pixel rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Smallest box containing every pixel `is_content` accepts, or `None` when
/// the image is blank.
fn content_box<P: Copy>(
    pixels: &[P],
    width: u32,
    height: u32,
    is_content: impl Fn(P) -> bool,
) -> Option<PixelBox> {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut found = false;
    for y in 0..height {
        let row = &pixels[(y * width) as usize..((y + 1) * width) as usize];
        for (x, pixel) in row.iter().enumerate() {
            if is_content(*pixel) {
                let x = x as u32;
                found = true;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }
    found.then(|| PixelBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

fn pad_box(content: PixelBox, pad: u32, width: u32, height: u32) -> PixelBox {
    let x = content.x.saturating_sub(pad);
    let y = content.y.saturating_sub(pad);
    let max_x = (content.x + content.width).saturating_add(pad).min(width);
    let max_y = (content.y + content.height).saturating_add(pad).min(height);
    PixelBox {
        x,
        y,
        width: max_x - x,
        height: max_y - y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_box_finds_marked_pixels() {
        #[rustfmt::skip]
        let pixels = [
            0, 0, 0, 0,
            0, 1, 1, 0,
            0, 0, 1, 0,
        ];
        let found = content_box(&pixels, 4, 3, |p| p == 1).unwrap();
        assert_eq!(
            found,
            PixelBox {
                x: 1,
                y: 1,
                width: 2,
                height: 2
            }
        );
        assert!(content_box(&[0; 12], 4, 3, |p| p == 1).is_none());
    }

    #[test]
    fn padding_is_clamped_to_image() {
        let content = PixelBox {
            x: 2,
            y: 1,
            width: 3,
            height: 3,
        };
        assert_eq!(
            pad_box(content, 5, 10, 8),
            PixelBox {
                x: 0,
                y: 0,
                width: 10,
                height: 8
            }
        );
        assert_eq!(
            pad_box(content, 1, 10, 8),
            PixelBox {
                x: 1,
                y: 0,
                width: 5,
                height: 5
            }
        );
    }

    #[test]
    fn oversized_padding_saturates_to_image() {
        let content = PixelBox {
            x: 10,
            y: 20,
            width: 30,
            height: 40,
        };
        assert_eq!(
            pad_box(content, u32::MAX, 100, 80),
            PixelBox {
                x: 0,
                y: 0,
                width: 100,
                height: 80
            }
        );
    }

    #[cfg(feature = "png")]
    #[test]
    fn huge_pad_inches_export_keeps_full_view() {
        let dir = tempfile::tempdir().unwrap();
        let theme = Theme::classic();
        let mut canvas = Canvas::new(4.0, 3.0).unwrap();
        crate::shape::add_box(
            &mut canvas,
            crate::geometry::Point::new(1.0, 1.0),
            crate::geometry::Size::new(1.0, 0.5),
            "",
            &crate::style::BoxStyle::themed(&theme),
        )
        .unwrap();
        let config = RenderConfig {
            dpi: 72.0,
            pad_inches: 1.0e8,
            ..RenderConfig::default()
        };
        for name in ["pad.png", "pad.svg"] {
            let report = export(&canvas, &dir.path().join(name), &theme, &config).unwrap();
            assert_eq!((report.width_px, report.height_px), (288, 216), "{name}");
        }
    }

    #[test]
    fn report_prints_nominal_resolution_and_trimmed_size() {
        let report = ExportReport {
            path: PathBuf::from("/tmp/architecture.png"),
            format: OutputFormat::Png,
            dpi: 300.0,
            width_px: 720,
            height_px: 420,
            full_width_px: 3600,
            full_height_px: 2400,
            bytes: 1024,
        };
        let text = report.to_string();
        assert!(text.contains("/tmp/architecture.png"));
        assert!(text.contains("✓ Resolution: 3600x2400 px (300 DPI)"));
        assert!(text.contains("✓ Trimmed to: 720x420 px"));

        let untrimmed = ExportReport {
            width_px: 3600,
            height_px: 2400,
            ..report
        };
        assert!(!untrimmed.to_string().contains("Trimmed"));
    }

    #[test]
    fn svg_export_trims_to_content_unless_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let theme = Theme::classic();
        let mut canvas = Canvas::new(12.0, 8.0).unwrap();
        crate::shape::add_box(
            &mut canvas,
            crate::geometry::Point::new(5.0, 3.0),
            crate::geometry::Size::new(2.0, 1.0),
            "core",
            &crate::style::BoxStyle::themed(&theme),
        )
        .unwrap();
        let trimmed = RenderConfig {
            dpi: 72.0,
            format: Some(OutputFormat::Svg),
            ..RenderConfig::default()
        };
        let output = dir.path().join("trimmed.svg");
        let report = export(&canvas, &output, &theme, &trimmed).unwrap();
        assert_eq!((report.full_width_px, report.full_height_px), (864, 576));
        assert!(report.width_px < 864 && report.height_px < 576, "{report:?}");
        // Box plus border plus 0.1in pad on each side.
        assert!(report.width_px >= 2 * 72 + 14, "{report:?}");
        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(!svg.contains("width=\"864.00\""));

        let full = RenderConfig {
            trim: false,
            ..trimmed
        };
        let report = export(&canvas, &dir.path().join("full.svg"), &theme, &full).unwrap();
        assert_eq!((report.width_px, report.height_px), (864, 576));
    }

    #[test]
    fn translucent_background_is_forced_opaque() {
        let bg = opaque_background(Color::rgba(10, 20, 30, 40));
        assert!(bg.is_opaque());
        assert_eq!((bg.r, bg.g, bg.b), (10, 20, 30));
    }
}
