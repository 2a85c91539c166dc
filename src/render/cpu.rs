use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::decode::DecodedImage,
    compose::plan::{ComposePlan, DrawOp, ImageDraw, TextLineDraw},
    foundation::core::{LayerId, Rect, Rgba8, Rgba8Premul},
    foundation::error::{StackshotError, StackshotResult},
    render::backend::{FrameRGBA, RenderBackend},
    text::{engine::FontTextEngine, wrap::TextMeasure},
};

/// CPU raster backend powered by `vello_cpu`.
///
/// Image paints are cached per layer and rebuilt only when the layer's decoded image changes.
pub struct CpuBackend {
    text: Option<CpuText>,
    image_cache: HashMap<LayerId, CachedPaint>,
}

struct CpuText {
    engine: FontTextEngine,
    font: vello_cpu::peniko::FontData,
}

struct CachedPaint {
    source: Arc<DecodedImage>,
    paint: vello_cpu::Image,
}

impl std::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuBackend")
            .field("font", &self.text.as_ref().map(|t| t.engine.family_name()))
            .field("cached_images", &self.image_cache.len())
            .finish()
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CpuBackend {
    /// Backend that shapes text with `engine`, or skips glyphs when `None`.
    pub fn new(engine: Option<FontTextEngine>) -> Self {
        Self {
            text: engine.map(|engine| CpuText {
                font: engine.font_data(),
                engine,
            }),
            image_cache: HashMap::new(),
        }
    }

    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    fn image_paint_for(&mut self, draw: &ImageDraw) -> StackshotResult<vello_cpu::Image> {
        if let Some(cached) = self.image_cache.get(&draw.layer)
            && Arc::ptr_eq(&cached.source, &draw.image)
        {
            return Ok(cached.paint.clone());
        }

        let img = &draw.image;
        let pixmap = image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(
            draw.layer,
            CachedPaint {
                source: img.clone(),
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip_all, fields(width = plan.canvas.width, height = plan.canvas.height))]
    fn render_plan(&mut self, plan: &ComposePlan) -> StackshotResult<FrameRGBA> {
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| StackshotError::render("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| StackshotError::render("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(StackshotError::render("canvas has zero area"));
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        clear_pixmap(&mut pixmap, Rgba8Premul::transparent().to_array());

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let mut skipped_text = 0usize;
        for op in &plan.ops {
            match op {
                DrawOp::Fill { color } => {
                    fill_rect(
                        &mut ctx,
                        Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
                        *color,
                    );
                }
                DrawOp::Image(draw) => self.draw_image(&mut ctx, draw),
                DrawOp::Rect { rect, color } => fill_rect(&mut ctx, *rect, *color),
                DrawOp::TextLine(line) => {
                    if !self.draw_text_line(&mut ctx, line) {
                        skipped_text += 1;
                    }
                }
            }
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        if skipped_text > 0 {
            tracing::warn!(lines = skipped_text, "text glyphs not drawn: no font configured");
        }

        self.image_cache
            .retain(|id, _| plan.image_ops().any(|d| d.layer == *id));

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn text_measure(&mut self) -> Option<&mut dyn TextMeasure> {
        self.text
            .as_mut()
            .map(|t| &mut t.engine as &mut dyn TextMeasure)
    }
}

impl CpuBackend {
    fn draw_image(&mut self, ctx: &mut vello_cpu::RenderContext, draw: &ImageDraw) {
        if draw.opacity <= 0.0 || draw.dest.width() <= 0.0 || draw.dest.height() <= 0.0 {
            return;
        }
        let paint = match self.image_paint_for(draw) {
            Ok(paint) => paint,
            Err(e) => {
                tracing::warn!(layer = %draw.layer, error = %e, "image layer skipped");
                return;
            }
        };

        let (w, h) = (f64::from(draw.image.width), f64::from(draw.image.height));
        let transform = vello_cpu::kurbo::Affine::translate((draw.dest.x0, draw.dest.y0))
            * vello_cpu::kurbo::Affine::scale_non_uniform(draw.dest.width() / w, draw.dest.height() / h);

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(transform);
        ctx.set_paint(paint);
        if draw.opacity < 1.0 {
            ctx.push_opacity_layer(draw.opacity);
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        if draw.opacity < 1.0 {
            ctx.pop_layer();
        }
    }

    /// Returns false when the line could not be drawn for lack of a font.
    fn draw_text_line(&mut self, ctx: &mut vello_cpu::RenderContext, line: &TextLineDraw) -> bool {
        let Some(text) = self.text.as_mut() else {
            return false;
        };
        let layout = match text
            .engine
            .layout_line(&line.text, line.font_size_px, line.color.into())
        {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(layer = %line.layer, error = %e, "text line skipped");
                return true;
            }
        };

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            line.origin.x,
            line.origin.y,
        )));
        for layout_line in layout.lines() {
            for item in layout_line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                // Positioned glyphs carry the pen advance and the baseline offset.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&text.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        true
    }
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, rect: Rect, color: Rgba8) {
    if color.a == 0 {
        return;
    }
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        rect.x0, rect.y0, rect.x1, rect.y1,
    ));
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StackshotResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StackshotError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StackshotError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StackshotError::render("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
