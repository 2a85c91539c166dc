//! Stackshot is a layered image composition engine.
//!
//! A [`LayerStore`] holds three ordered bands of layers: background images, overlay images and
//! text blocks. A [`Compositor`] turns the store into pixels with one full repaint per change:
//!
//! 1. **Plan**: `LayerStore -> ComposePlan` (canvas size plus draw ops in paint order)
//! 2. **Render**: `ComposePlan -> FrameRGBA` (CPU backend, premultiplied RGBA8)
//! 3. **Export** (optional): `FrameRGBA -> PNG bytes`
//!
//! Project files persist layer parameters as JSON without pixels; loading one reports which image
//! layers need their file again ([`PendingAttachment`]).
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single writer**: image decodes run on the `rayon` pool but are applied to the store on
//!   the caller's thread ([`DecodeQueue`]).
//! - **Contained failures**: every error is a [`StackshotError`] the caller can report and move
//!   past.
#![forbid(unsafe_code)]

/// Image decoding and the background decode queue.
pub mod assets;
/// Planning and compositing.
pub mod compose;
/// Compositor settings.
pub mod config;
/// PNG export.
pub mod encode;
/// Shared value types, ids and errors.
pub mod foundation;
/// Layer records and the store that owns them.
pub mod layers;
/// Project snapshots.
pub mod project;
/// Raster backends.
pub mod render;
/// Interactive editing session.
pub mod session;
/// Text measurement, wrapping and shaping.
pub mod text;

pub use assets::decode::{DecodedImage, decode_image, decode_image_file};
pub use assets::loader::{DecodeQueue, PumpReport};
pub use compose::compositor::Compositor;
pub use compose::plan::{ComposePlan, DrawOp, ImageBand, ImageDraw, TextLineDraw, compile_plan};
pub use config::ComposeSettings;
pub use encode::png::{
    NO_BACKGROUND_NOTICE, default_export_file_name, encode_png, export_png, write_png,
};
pub use foundation::core::{Canvas, LayerId, Point, Rect, Rgba8, Rgba8Premul};
pub use foundation::error::{StackshotError, StackshotResult};
pub use layers::model::{
    BackgroundLayer, ImageKind, Layer, LayerField, LayerKind, OverlayLayer, StackKind, TextLayer,
};
pub use layers::store::LayerStore;
pub use project::snapshot::{PendingAttachment, ProjectSnapshot, load_project};
pub use render::backend::{FrameRGBA, RenderBackend};
pub use render::cpu::CpuBackend;
pub use session::editor::Editor;
pub use text::engine::FontTextEngine;
pub use text::wrap::{ApproxMeasure, TextMeasure, WrappedLine, wrap_greedy};
