use crate::color::Color;
use crate::config::{OutputFormat, RenderConfig, load_config};
use crate::diagram::Diagram;
use crate::export::export;
use crate::preview;
use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(
    name = "archdraw",
    version,
    about = "Render architecture diagrams described as JSON5 documents"
)]
pub struct Args {
    /// Diagram document (.json5)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output image. Defaults to the document's `output` field.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format. Inferred from the output extension when omitted.
    #[arg(short = 'e', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Config JSON file (theme, themeVariables, render)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Raster resolution in dots per inch
    #[arg(long = "dpi")]
    pub dpi: Option<f32>,

    /// Background color, e.g. "white" or "#fafafa"
    #[arg(long = "background")]
    pub background: Option<String>,

    /// Keep the full canvas instead of cropping to the content
    #[arg(long = "no-trim")]
    pub no_trim: bool,

    /// Do not open the written image in a viewer
    #[arg(long = "no-preview")]
    pub no_preview: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);
    debug!("parsed arguments: {args:?}");

    let config = load_config(args.config.as_deref())?;
    let diagram = Diagram::load(&args.input)?;
    let theme = diagram.theme(&config.theme)?;

    let mut render = config.render.clone();
    diagram.render.apply(&mut render);
    apply_args(&args, &mut render)?;

    let output = resolve_output(&args, &diagram)?;
    let canvas = diagram
        .build(&theme)
        .with_context(|| format!("failed to build {}", args.input.display()))?;
    let report = export(&canvas, &output, &theme, &render)?;
    println!("{report}");

    if !args.no_preview {
        match preview::open(&report.path) {
            Ok(()) => info!("opened preview of {}", report.path.display()),
            Err(err) => info!("preview skipped: {err}"),
        }
    }
    Ok(())
}

fn init_logging(level: &str) {
    let level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
}

fn apply_args(args: &Args, render: &mut RenderConfig) -> Result<()> {
    if let Some(dpi) = args.dpi {
        render.dpi = dpi;
    }
    if let Some(background) = args.background.as_deref() {
        render.background = Some(Color::parse(background)?);
    }
    if args.no_trim {
        render.trim = false;
    }
    if let Some(format) = args.format {
        render.format = Some(format);
    }
    Ok(())
}

/// The output flag wins; a document `output` is relative to the document.
fn resolve_output(args: &Args, diagram: &Diagram) -> Result<PathBuf> {
    if let Some(path) = &args.output {
        return Ok(path.clone());
    }
    match &diagram.output {
        Some(path) if path.is_absolute() => Ok(path.clone()),
        Some(path) => Ok(args
            .input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(path)),
        None => Err(anyhow::anyhow!(
            "Output path required: pass -o or set `output` in {}",
            args.input.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["archdraw", "-i", "diagrams/architecture.json5"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn flags_override_render_settings() {
        let args = args(&["--dpi", "150", "--background", "#eeeeee", "--no-trim", "-e", "svg"]);
        let mut render = RenderConfig::default();
        apply_args(&args, &mut render).unwrap();
        assert_eq!(render.dpi, 150.0);
        assert_eq!(render.background, Some(Color::rgb(0xee, 0xee, 0xee)));
        assert!(!render.trim);
        assert_eq!(render.format, Some(OutputFormat::Svg));
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn document_output_is_relative_to_document() {
        let diagram = Diagram::from_json5(
            r#"{ canvas: { width: 2, height: 2 }, output: "out.png", elements: [] }"#,
        )
        .unwrap();
        let resolved = resolve_output(&args(&[]), &diagram).unwrap();
        assert_eq!(resolved, Path::new("diagrams/out.png"));
        let explicit = resolve_output(&args(&["-o", "x.svg"]), &diagram).unwrap();
        assert_eq!(explicit, Path::new("x.svg"));
    }

    #[test]
    fn missing_output_is_an_error() {
        let diagram =
            Diagram::from_json5(r#"{ canvas: { width: 2, height: 2 }, elements: [] }"#).unwrap();
        assert!(resolve_output(&args(&[]), &diagram).is_err());
    }
}
