//! Error type shared by every stage of diagram composition and export.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while composing, rendering or exporting a diagram.
#[derive(Debug, Error)]
pub enum DiagramError {
    /// Invalid shape, connector, legend, canvas or render parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Reading an input or writing the output file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("render error: {0}")]
    Render(String),

    /// Interactive preview is not possible in this environment. Callers
    /// downgrade this to a log line.
    #[error("interactive display unavailable: {0}")]
    DisplayUnavailable(String),
}

impl DiagramError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = DiagramError> = std::result::Result<T, E>;

/// Rejects NaN and infinite values with a message naming the field.
pub(crate) fn ensure_finite(what: &str, values: &[f32]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(DiagramError::config(format!(
            "{what} must be finite, got {values:?}"
        )))
    }
}
