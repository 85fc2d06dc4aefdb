//! Declarative architecture diagrams on a fixed coordinate canvas.
//!
//! Shapes, connectors, annotations and legends are placed at explicit
//! positions in canvas units (origin bottom-left, y up). A finished canvas is
//! rendered to SVG and optionally rasterized to PNG.

pub mod annotation;
pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod connector;
pub mod diagram;
pub mod error;
pub mod export;
pub mod geometry;
pub mod legend;
pub mod preview;
pub mod render;
pub mod shape;
pub mod style;
pub mod text;
pub mod text_metrics;
pub mod theme;

pub use annotation::add_text;
pub use canvas::{BoundsPolicy, Canvas, Element};
#[cfg(feature = "cli")]
pub use cli::run;
pub use color::Color;
pub use config::{Config, EmptyCanvasPolicy, OutputFormat, RenderConfig, load_config};
pub use connector::{ConnectorLabel, add_connector};
pub use diagram::Diagram;
pub use error::{DiagramError, Result};
pub use export::{ExportReport, export};
pub use geometry::{Point, Rect, Size};
pub use legend::{LegendEntry, add_legend};
pub use render::render_svg;
pub use shape::{add_box, add_oval};
pub use theme::Theme;
