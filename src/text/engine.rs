use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    foundation::{
        core::Rgba8,
        error::{StackshotError, StackshotResult},
    },
    text::wrap::TextMeasure,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Parley-backed text measurement and shaping over one registered font.
pub struct FontTextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font_bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontTextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontTextEngine")
            .field("family_name", &self.family_name)
            .field("font_bytes_len", &self.font_bytes.len())
            .finish()
    }
}

impl FontTextEngine {
    /// Register `font_bytes` (TTF/OTF) and use its first family for every layout.
    pub fn from_bytes(font_bytes: Vec<u8>) -> StackshotResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StackshotError::validation("no font families registered from font bytes")
        })?;

        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StackshotError::validation("registered font family has no name"))?
            .to_string();

        tracing::debug!(family = %family_name, "font registered");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font_bytes: Arc::new(font_bytes),
        })
    }

    pub fn from_path(path: &Path) -> StackshotResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Font data in the form the CPU rasterizer consumes.
    pub fn font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.font_bytes.as_ref().clone()),
            0,
        )
    }

    /// Shape one line of text without wrapping.
    pub fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StackshotResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StackshotError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextMeasure for FontTextEngine {
    fn measure(&mut self, text: &str, font_size_px: f32) -> f32 {
        match self.layout_line(text, font_size_px, TextBrushRgba8::default()) {
            Ok(layout) => layout.full_width(),
            Err(e) => {
                tracing::warn!(error = %e, "text measurement failed");
                0.0
            }
        }
    }
}
