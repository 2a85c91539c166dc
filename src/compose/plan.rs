use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    compose::geometry::{anchor_point, centered_rect, scaled_size},
    config::ComposeSettings,
    foundation::core::{Canvas, LayerId, Point, Rect, Rgba8},
    foundation::math::percent_to_unit,
    layers::store::LayerStore,
    text::block::{TextBlock, layout_text_block},
    text::wrap::TextMeasure,
};

/// Backend-agnostic description of one full repaint.
///
/// Ops are listed in paint order: backgrounds, then overlays, then text.
#[derive(Clone, Debug)]
pub struct ComposePlan {
    pub canvas: Canvas,
    pub ops: Vec<DrawOp>,
}

impl ComposePlan {
    /// True when no background is loaded and the plan only fills the placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.ops.as_slice(), [DrawOp::Fill { .. }])
    }

    pub fn image_ops(&self) -> impl Iterator<Item = &ImageDraw> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image(d) => Some(d),
            _ => None,
        })
    }

    pub fn text_lines(&self) -> impl Iterator<Item = &TextLineDraw> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::TextLine(d) => Some(d),
            _ => None,
        })
    }
}

/// Band an image op came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageBand {
    Background,
    Overlay,
}

#[derive(Clone, Debug)]
/// A single draw operation in a [`ComposePlan`].
pub enum DrawOp {
    /// Fill the whole surface with one color.
    Fill { color: Rgba8 },
    /// Draw an image scaled into `dest` with uniform alpha.
    Image(ImageDraw),
    /// Fill a rectangle (text backgrounds).
    Rect { rect: Rect, color: Rgba8 },
    /// Draw one wrapped line of text with its top-left at `origin`.
    TextLine(TextLineDraw),
}

#[derive(Clone, Debug)]
pub struct ImageDraw {
    pub layer: LayerId,
    pub band: ImageBand,
    pub image: Arc<DecodedImage>,
    pub dest: Rect,
    /// Alpha in `[0, 1]`.
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLineDraw {
    pub layer: LayerId,
    pub text: String,
    pub origin: Point,
    pub font_size_px: f32,
    pub color: Rgba8,
}

/// Output size: the largest natural size among loaded backgrounds, floored at `min`.
pub fn canvas_size(store: &LayerStore, min: Canvas) -> Canvas {
    store
        .backgrounds()
        .iter()
        .filter(|b| b.loaded)
        .fold(min, |acc, b| Canvas {
            width: acc.width.max(b.natural_width),
            height: acc.height.max(b.natural_height),
        })
}

/// Build the paint plan for the current store state.
///
/// Without a loaded background the plan is a single placeholder fill at the minimum size; image
/// overlays and text are never drawn in that state.
#[tracing::instrument(skip_all, fields(revision = store.revision()))]
pub fn compile_plan(
    store: &LayerStore,
    measure: &mut dyn TextMeasure,
    settings: &ComposeSettings,
) -> ComposePlan {
    if !store.has_loaded_background() {
        return ComposePlan {
            canvas: settings.min_canvas,
            ops: vec![DrawOp::Fill {
                color: settings.placeholder(),
            }],
        };
    }

    let canvas = canvas_size(store, settings.min_canvas);
    let mut ops = Vec::new();

    for bg in store.backgrounds() {
        let Some(image) = bg.drawable_image() else {
            continue;
        };
        ops.extend(
            image_draw(
                bg.id,
                ImageBand::Background,
                image,
                (bg.natural_width, bg.natural_height),
                ImageParams {
                    opacity: bg.opacity,
                    scale: bg.scale,
                    x: bg.x,
                    y: bg.y,
                },
                canvas,
            )
            .map(DrawOp::Image),
        );
    }

    for ov in store.overlays() {
        let Some(image) = ov.drawable_image() else {
            continue;
        };
        ops.extend(
            image_draw(
                ov.id,
                ImageBand::Overlay,
                image,
                (image.width, image.height),
                ImageParams {
                    opacity: ov.opacity,
                    scale: ov.scale,
                    x: ov.x,
                    y: ov.y,
                },
                canvas,
            )
            .map(DrawOp::Image),
        );
    }

    for text in store.texts() {
        if let Some(block) = layout_text_block(text, canvas, settings, measure) {
            push_text_block(&mut ops, block);
        }
    }

    tracing::debug!(
        width = canvas.width,
        height = canvas.height,
        ops = ops.len(),
        "plan compiled"
    );
    ComposePlan { canvas, ops }
}

struct ImageParams {
    opacity: f64,
    scale: f64,
    x: f64,
    y: f64,
}

fn image_draw(
    layer: LayerId,
    band: ImageBand,
    image: &Arc<DecodedImage>,
    natural: (u32, u32),
    p: ImageParams,
    canvas: Canvas,
) -> Option<ImageDraw> {
    if !p.scale.is_finite() || p.scale <= 0.0 {
        tracing::warn!(%layer, scale = p.scale, "image layer skipped: bad scale");
        return None;
    }
    if !p.x.is_finite() || !p.y.is_finite() {
        tracing::warn!(%layer, "image layer skipped: non-finite anchor");
        return None;
    }
    let (w, h) = scaled_size(natural.0, natural.1, p.scale);
    Some(ImageDraw {
        layer,
        band,
        image: image.clone(),
        dest: centered_rect(anchor_point(p.x, p.y, canvas), w, h),
        opacity: percent_to_unit(p.opacity),
    })
}

fn push_text_block(ops: &mut Vec<DrawOp>, block: TextBlock) {
    if let Some(bg) = block.background {
        ops.push(DrawOp::Rect {
            rect: bg.rect,
            color: bg.color,
        });
    }
    for (i, line) in block.lines.iter().enumerate() {
        ops.push(DrawOp::TextLine(TextLineDraw {
            layer: block.layer,
            text: line.text.clone(),
            origin: block.line_origin(i),
            font_size_px: block.font_size_px,
            color: block.color,
        }));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
