use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{DiagramError, Result, ensure_finite};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }
}

/// What exporting a canvas with no elements does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCanvasPolicy {
    /// Fail with a render error.
    #[default]
    Reject,
    /// Write a background-only image.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub dpi: f32,
    /// Overrides the canvas background when set.
    pub background: Option<Color>,
    /// Crop surrounding background to the content plus `pad_inches`.
    pub trim: bool,
    pub pad_inches: f32,
    pub empty_canvas: EmptyCanvasPolicy,
    /// Inferred from the output extension when unset.
    pub format: Option<OutputFormat>,
}

impl RenderConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        ensure_finite("render settings", &[self.dpi, self.pad_inches])?;
        if self.dpi <= 0.0 {
            return Err(DiagramError::config(format!(
                "dpi must be positive, got {}",
                self.dpi
            )));
        }
        if self.pad_inches < 0.0 {
            return Err(DiagramError::config("pad_inches must not be negative"));
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            background: None,
            trim: true,
            pad_inches: 0.1,
            empty_canvas: EmptyCanvasPolicy::Reject,
            format: None,
        }
    }
}

/// Partial render settings layered over a [`RenderConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOverrides {
    pub dpi: Option<f32>,
    pub background: Option<Color>,
    pub trim: Option<bool>,
    pub pad_inches: Option<f32>,
    pub empty_canvas: Option<EmptyCanvasPolicy>,
    pub format: Option<OutputFormat>,
}

impl RenderOverrides {
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(v) = self.dpi {
            config.dpi = v;
        }
        if let Some(v) = self.background {
            config.background = Some(v);
        }
        if let Some(v) = self.trim {
            config.trim = v;
        }
        if let Some(v) = self.pad_inches {
            config.pad_inches = v;
        }
        if let Some(v) = self.empty_canvas {
            config.empty_canvas = v;
        }
        if let Some(v) = self.format {
            config.format = Some(v);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    text_color: Option<Color>,
    border_color: Option<Color>,
    line_color: Option<Color>,
    label_background: Option<Color>,
    label_border: Option<Color>,
    legend_border: Option<Color>,
    background: Option<Color>,
    line_spacing: Option<f32>,
}

impl ThemeVariables {
    fn apply(self, theme: &mut Theme) {
        if let Some(v) = self.font_family {
            theme.font_family = v;
        }
        if let Some(v) = self.text_color {
            theme.text_color = v;
        }
        if let Some(v) = self.border_color {
            theme.border_color = v;
        }
        if let Some(v) = self.line_color {
            theme.line_color = v;
        }
        if let Some(v) = self.label_background {
            theme.label_background = v;
        }
        if let Some(v) = self.label_border {
            theme.label_border = v;
        }
        if let Some(v) = self.legend_border {
            theme.legend_border = v;
        }
        if let Some(v) = self.background {
            theme.background = v;
        }
        if let Some(v) = self.line_spacing {
            theme.line_spacing = v;
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    render: Option<RenderOverrides>,
}

/// Loads a JSON config file over the defaults. With no path the defaults are
/// returned unchanged.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path).map_err(|source| DiagramError::io(path, source))?;
    let parsed: ConfigFile = serde_json::from_str(&contents).map_err(|err| {
        DiagramError::config(format!("invalid config file {}: {err}", path.display()))
    })?;
    apply_config_file(&mut config, parsed)?;
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) -> Result<()> {
    if let Some(name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(name)
            .ok_or_else(|| DiagramError::config(format!("unknown theme '{name}'")))?;
    }
    if let Some(vars) = parsed.theme_variables {
        vars.apply(&mut config.theme);
    }
    if let Some(render) = parsed.render {
        render.apply(&mut config.render);
    }
    config.render.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Config> {
        let mut config = Config::default();
        let parsed: ConfigFile = serde_json::from_str(json).unwrap();
        apply_config_file(&mut config, parsed)?;
        Ok(config)
    }

    #[test]
    fn defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.render.dpi, 300.0);
        assert!(config.render.trim);
        assert_eq!(config.theme, Theme::classic());
    }

    #[test]
    fn file_overrides_theme_and_render() {
        let config = parse(
            r##"{
                "theme": "print",
                "themeVariables": { "lineColor": "#123456", "fontFamily": "Inter" },
                "render": { "dpi": 150, "trim": false, "emptyCanvas": "blank" }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.border_color, Theme::print().border_color);
        assert_eq!(config.theme.line_color, Color::rgb(0x12, 0x34, 0x56));
        assert_eq!(config.theme.font_family, "Inter");
        assert_eq!(config.render.dpi, 150.0);
        assert!(!config.render.trim);
        assert_eq!(config.render.empty_canvas, EmptyCanvasPolicy::Blank);
    }

    #[test]
    fn rejects_unknown_theme_and_bad_dpi() {
        assert!(parse(r#"{ "theme": "neon" }"#).is_err());
        assert!(parse(r#"{ "render": { "dpi": 0 } }"#).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, DiagramError::Io { .. }));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.PNG")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("b.svg")), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_path(Path::new("b")), None);
    }
}
