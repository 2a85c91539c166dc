use std::{io::Cursor, path::Path};

use anyhow::Context as _;

use crate::{
    compose::compositor::Compositor,
    foundation::error::{StackshotError, StackshotResult},
    layers::store::LayerStore,
    render::backend::{FrameRGBA, RenderBackend},
};

/// Message shown when export is attempted before any background is loaded.
pub const NO_BACKGROUND_NOTICE: &str = "Please upload a background image first.";

/// Repaint `store` and serialize the surface as PNG bytes.
///
/// Refused before any raster work when no background is loaded.
#[tracing::instrument(skip_all)]
pub fn export_png<B: RenderBackend>(
    store: &LayerStore,
    compositor: &mut Compositor<B>,
) -> StackshotResult<Vec<u8>> {
    if !store.has_loaded_background() {
        return Err(StackshotError::export_refused(NO_BACKGROUND_NOTICE));
    }
    let frame = compositor.render(store)?;
    encode_png(&frame)
}

/// Encode a frame as PNG (straight alpha).
pub fn encode_png(frame: &FrameRGBA) -> StackshotResult<Vec<u8>> {
    let img = frame.to_rgba_image()?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .context("encode png")?;
    let bytes = out.into_inner();
    tracing::debug!(
        width = frame.width,
        height = frame.height,
        bytes = bytes.len(),
        "png encoded"
    );
    Ok(bytes)
}

/// Write encoded bytes to `path`, creating parent directories as needed.
pub fn write_png(path: &Path, bytes: &[u8]) -> StackshotResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "exported");
    Ok(())
}

/// `composition-<timestamp>.png` for the current UTC time.
pub fn default_export_file_name() -> String {
    export_file_name_at(chrono::Utc::now())
}

/// Export file name for a given instant: ISO-8601 with millisecond precision, `:` and `.`
/// replaced by `-`.
pub fn export_file_name_at(at: chrono::DateTime<chrono::Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("composition-{stamp}.png")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
