use crate::{
    compose::geometry::{anchor_point, padded_rect},
    config::ComposeSettings,
    foundation::core::{Canvas, LayerId, Point, Rect, Rgba8},
    foundation::math::{percent_to_unit, unit_to_u8},
    layers::model::TextLayer,
    text::wrap::{TextMeasure, WrappedLine, widest, wrap_greedy},
};

/// A text layer resolved to positioned lines plus its optional background box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub layer: LayerId,
    /// Top-left anchor of the first line.
    pub origin: Point,
    pub font_size_px: f32,
    pub line_height: f64,
    pub color: Rgba8,
    pub lines: Vec<WrappedLine>,
    pub background: Option<TextBackground>,
}

/// Translucent box painted behind a text block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBackground {
    pub rect: Rect,
    pub color: Rgba8,
}

impl TextBlock {
    /// Top-left position of line `index`.
    pub fn line_origin(&self, index: usize) -> Point {
        Point::new(self.origin.x, self.origin.y + self.line_height * index as f64)
    }
}

/// Wrap and position one text layer. Returns `None` when nothing should be drawn: empty
/// content, or a font size / anchor that cannot be laid out.
pub fn layout_text_block(
    layer: &TextLayer,
    canvas: Canvas,
    settings: &ComposeSettings,
    measure: &mut dyn TextMeasure,
) -> Option<TextBlock> {
    if layer.content.is_empty() {
        return None;
    }
    if !layer.font_size_px.is_finite() || layer.font_size_px <= 0.0 {
        tracing::warn!(id = %layer.id, size = layer.font_size_px, "text layer skipped: bad font size");
        return None;
    }
    if !layer.x.is_finite() || !layer.y.is_finite() {
        tracing::warn!(id = %layer.id, "text layer skipped: non-finite anchor");
        return None;
    }

    let font_size = layer.font_size_px;
    let origin = anchor_point(layer.x, layer.y, canvas);
    let lines = wrap_greedy(
        &layer.content,
        font_size as f32,
        layer.max_width_px as f32,
        measure,
    );
    let line_height = font_size * settings.line_height_factor;

    let color = Rgba8::parse_hex(&layer.color_hex).unwrap_or_else(|_| {
        tracing::warn!(id = %layer.id, color = %layer.color_hex, "unparsable text color, using white");
        Rgba8::WHITE
    });

    let background = (layer.background_opacity > 0.0).then(|| {
        let padding = font_size * settings.box_padding_factor;
        let rect = padded_rect(
            origin,
            f64::from(widest(&lines)),
            lines.len() as f64 * line_height,
            padding,
        );
        let [r, g, b] = settings.text_box_rgb;
        TextBackground {
            rect,
            color: Rgba8::opaque(r, g, b)
                .with_alpha(unit_to_u8(percent_to_unit(layer.background_opacity))),
        }
    });

    Some(TextBlock {
        layer: layer.id,
        origin,
        font_size_px: font_size as f32,
        line_height,
        color,
        lines,
        background,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/text/block.rs"]
mod tests;
