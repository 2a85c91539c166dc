use crate::{
    compose::plan::ComposePlan, foundation::error::StackshotResult, foundation::math::unpremul_u8,
    text::wrap::TextMeasure,
};

/// A rendered composition as RGBA8 pixels.
///
/// Frames coming out of [`crate::render::cpu::CpuBackend`] are **premultiplied alpha**. The
/// `premultiplied` flag makes this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 value at `(x, y)`, as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Convert to a straight-alpha [`image::RgbaImage`] ready for encoding.
    pub fn to_rgba_image(&self) -> StackshotResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            for px in data.chunks_exact_mut(4) {
                let a = px[3];
                px[0] = unpremul_u8(px[0], a);
                px[1] = unpremul_u8(px[1], a);
                px[2] = unpremul_u8(px[2], a);
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, data).ok_or_else(|| {
            crate::StackshotError::render(format!(
                "frame buffer does not match {}x{}",
                self.width, self.height
            ))
        })
    }
}

/// A renderer that can execute a compiled [`ComposePlan`] into a [`FrameRGBA`].
///
/// Most callers go through [`crate::Compositor`], which compiles the plan from the store first.
pub trait RenderBackend {
    /// Paint the plan onto a fresh surface and read it back.
    fn render_plan(&mut self, plan: &ComposePlan) -> StackshotResult<FrameRGBA>;

    /// Measurer matching the font this backend shapes text with, if it has one.
    ///
    /// Wrapping must measure with the same font the glyphs are drawn with, so backends that draw
    /// text expose it here.
    fn text_measure(&mut self) -> Option<&mut dyn TextMeasure> {
        None
    }
}
