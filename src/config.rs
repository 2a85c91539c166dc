//! Compositor settings: JSON file first, then `STACKSHOT_*` environment overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::{
    core::{Canvas, Rgba8},
    error::{StackshotError, StackshotResult},
};

/// Environment variable naming a TTF/OTF file used for text measurement and glyphs.
pub const ENV_FONT: &str = "STACKSHOT_FONT";
/// Environment variable overriding the minimum canvas, as `WIDTHxHEIGHT`.
pub const ENV_MIN_CANVAS: &str = "STACKSHOT_MIN_CANVAS";

/// Knobs for canvas sizing and text layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComposeSettings {
    /// Floor for the output size; loaded backgrounds only ever grow it.
    pub min_canvas: Canvas,
    /// Fill used when no background is loaded.
    pub placeholder_rgba: [u8; 4],
    /// Line advance as a multiple of the font size.
    pub line_height_factor: f64,
    /// Text background padding as a multiple of the font size.
    pub box_padding_factor: f64,
    /// Text background color; alpha comes from each layer's background opacity.
    pub text_box_rgb: [u8; 3],
    /// Font used for measuring and drawing text. Without one, text is measured approximately
    /// and glyphs are not drawn.
    pub font_path: Option<PathBuf>,
    /// Per-character advance, in ems, used by the approximate measurer.
    pub approx_em_advance: f32,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            min_canvas: Canvas::new(800, 600),
            placeholder_rgba: [0x1e, 0x29, 0x3b, 0xff],
            line_height_factor: 1.2,
            box_padding_factor: 0.5,
            text_box_rgb: [0, 0, 0],
            font_path: None,
            approx_em_advance: 0.55,
        }
    }
}

impl ComposeSettings {
    /// Read settings from a JSON file. Missing keys keep their defaults.
    pub fn from_path(path: &Path) -> StackshotResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `STACKSHOT_FONT` and `STACKSHOT_MIN_CANVAS` from the process environment.
    pub fn with_env_overrides(self) -> StackshotResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup, e.g. a map in tests.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> StackshotResult<Self> {
        if let Some(font) = lookup(ENV_FONT).filter(|v| !v.trim().is_empty()) {
            self.font_path = Some(PathBuf::from(font));
        }
        if let Some(size) = lookup(ENV_MIN_CANVAS).filter(|v| !v.trim().is_empty()) {
            self.min_canvas = size.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> StackshotResult<()> {
        if self.min_canvas.width == 0 || self.min_canvas.height == 0 {
            return Err(StackshotError::validation(
                "minCanvas width and height must be > 0",
            ));
        }
        if !self.line_height_factor.is_finite() || self.line_height_factor <= 0.0 {
            return Err(StackshotError::validation(
                "lineHeightFactor must be finite and > 0",
            ));
        }
        if !self.box_padding_factor.is_finite() || self.box_padding_factor < 0.0 {
            return Err(StackshotError::validation(
                "boxPaddingFactor must be finite and >= 0",
            ));
        }
        if !self.approx_em_advance.is_finite() || self.approx_em_advance <= 0.0 {
            return Err(StackshotError::validation(
                "approxEmAdvance must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub fn placeholder(&self) -> Rgba8 {
        let [r, g, b, a] = self.placeholder_rgba;
        Rgba8 { r, g, b, a }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/settings.rs"]
mod tests;
