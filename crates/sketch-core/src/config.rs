//! Construction-time canvas configuration.
//!
//! A [`CanvasConfig`] is validated once, before any backend surface is
//! created. Invalid configurations never produce a canvas.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_WIDTH: u32 = 600;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_TITLE: &str = "Sketch";
pub const DEFAULT_FPS: f64 = 60.0;

/// Which backend surface the canvas draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backend {
    /// GPU-accelerated surface bound to a live window.
    #[serde(rename = "GPU")]
    Display,
    /// Off-screen software raster buffer.
    #[default]
    #[serde(rename = "CPU")]
    Raster,
    /// Paginated PDF document.
    #[serde(rename = "PDF")]
    Document,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Display => "GPU",
            Backend::Raster => "CPU",
            Backend::Document => "PDF",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GPU" => Ok(Backend::Display),
            "CPU" => Ok(Backend::Raster),
            "PDF" => Ok(Backend::Document),
            other => Err(Error::InvalidBackend(other.to_string())),
        }
    }
}

/// Everything needed to construct a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Show the window on screen (display backend only).
    pub show: bool,
    pub backend: Backend,
    pub title: String,
    /// Output file for the document backend.
    pub output: Option<PathBuf>,
    /// Target frames per second for interactive pacing.
    pub fps: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            show: false,
            backend: Backend::default(),
            title: DEFAULT_TITLE.to_string(),
            output: None,
            fps: DEFAULT_FPS,
        }
    }
}

impl CanvasConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Check the configuration before any surface is created.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.backend == Backend::Document {
            match &self.output {
                Some(path) if is_pdf_path(path) => {}
                _ => return Err(Error::MissingDocumentOutput),
            }
        }
        Ok(())
    }
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn backend_parses_mode_names() {
        assert_eq!("GPU".parse::<Backend>().unwrap(), Backend::Display);
        assert_eq!("CPU".parse::<Backend>().unwrap(), Backend::Raster);
        assert_eq!("PDF".parse::<Backend>().unwrap(), Backend::Document);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = "Metal".parse::<Backend>().unwrap_err();
        assert!(matches!(err, Error::InvalidBackend(name) if name == "Metal"));
    }

    #[test]
    fn document_requires_pdf_output() {
        let config = CanvasConfig::default().with_backend(Backend::Document);
        assert!(matches!(config.validate(), Err(Error::MissingDocumentOutput)));

        let config = config.with_output("out.svg");
        assert!(matches!(config.validate(), Err(Error::MissingDocumentOutput)));

        let config = config.with_output("out.PDF");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let config = CanvasConfig::new(0, 100);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidDimensions { width: 0, height: 100 })
        ));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = CanvasConfig::from_json(r#"{ "width": 320, "backend": "CPU" }"#).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.backend, Backend::Raster);
        assert_eq!(config.title, DEFAULT_TITLE);
    }

    #[test]
    fn json_validation_runs_after_parse() {
        let err = CanvasConfig::from_json(r#"{ "backend": "PDF" }"#).unwrap_err();
        assert!(matches!(err, Error::MissingDocumentOutput));
    }
}
