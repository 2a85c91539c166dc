//! Project snapshots: layer parameters as JSON, without pixels.
//!
//! Saving writes every field of every layer, with the image payload as `null` and `loaded` as
//! `false`. Loading replaces the store's three lists wholesale and reports which image layers are
//! waiting for their file again.

use std::{collections::HashSet, path::Path};

use anyhow::Context as _;

use crate::{
    foundation::core::LayerId,
    foundation::error::{StackshotError, StackshotResult},
    layers::{
        model::{BackgroundLayer, ImageKind, OverlayLayer, TextLayer},
        store::LayerStore,
    },
};

const REQUIRED_KEYS: [&str; 3] = ["backgrounds", "overlays", "texts"];

/// Persisted form of a whole [`LayerStore`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub backgrounds: Vec<BackgroundRecord>,
    pub overlays: Vec<OverlayRecord>,
    pub texts: Vec<TextRecord>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundRecord {
    pub id: LayerId,
    /// Always `null` on save; ignored on load.
    #[serde(default)]
    pub image: Option<serde_json::Value>,
    #[serde(default)]
    pub loaded: bool,
    #[serde(default, alias = "width")]
    pub natural_width: u32,
    #[serde(default, alias = "height")]
    pub natural_height: u32,
    #[serde(default = "full_percent")]
    pub opacity: f64,
    #[serde(default = "full_percent")]
    pub scale: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub source_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRecord {
    pub id: LayerId,
    #[serde(default)]
    pub image: Option<serde_json::Value>,
    #[serde(default)]
    pub loaded: bool,
    #[serde(default = "full_percent")]
    pub opacity: f64,
    #[serde(default = "half_percent")]
    pub scale: f64,
    #[serde(default = "half_percent")]
    pub x: f64,
    #[serde(default = "half_percent")]
    pub y: f64,
    #[serde(default)]
    pub source_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRecord {
    pub id: LayerId,
    #[serde(default = "text_defaults::content")]
    pub content: String,
    #[serde(default = "text_defaults::font_size_px", alias = "size")]
    pub font_size_px: f64,
    #[serde(default = "text_defaults::color_hex", alias = "color")]
    pub color_hex: String,
    #[serde(default = "text_defaults::x")]
    pub x: f64,
    #[serde(default = "text_defaults::y")]
    pub y: f64,
    #[serde(default = "text_defaults::max_width_px", alias = "maxWidth")]
    pub max_width_px: f64,
    #[serde(default = "text_defaults::background_opacity", alias = "bgOpacity")]
    pub background_opacity: f64,
}

fn full_percent() -> f64 {
    100.0
}

fn half_percent() -> f64 {
    50.0
}

/// Missing text fields fall back to a freshly added text layer.
mod text_defaults {
    use crate::{foundation::core::LayerId, layers::model::TextLayer};

    fn fresh() -> TextLayer {
        TextLayer::new(LayerId(0))
    }

    pub(super) fn content() -> String {
        fresh().content
    }

    pub(super) fn font_size_px() -> f64 {
        fresh().font_size_px
    }

    pub(super) fn color_hex() -> String {
        fresh().color_hex
    }

    pub(super) fn x() -> f64 {
        fresh().x
    }

    pub(super) fn y() -> f64 {
        fresh().y
    }

    pub(super) fn max_width_px() -> f64 {
        fresh().max_width_px
    }

    pub(super) fn background_opacity() -> f64 {
        fresh().background_opacity
    }
}

/// JSON has no NaN or infinity; such values are saved as the kind default instead.
fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

/// An image layer restored from a snapshot that still needs its file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAttachment {
    pub kind: ImageKind,
    pub id: LayerId,
    pub source_name: String,
}

impl From<&BackgroundLayer> for BackgroundRecord {
    fn from(l: &BackgroundLayer) -> Self {
        let d = BackgroundLayer::new(l.id);
        Self {
            id: l.id,
            image: None,
            loaded: false,
            natural_width: l.natural_width,
            natural_height: l.natural_height,
            opacity: finite_or(l.opacity, d.opacity),
            scale: finite_or(l.scale, d.scale),
            x: finite_or(l.x, d.x),
            y: finite_or(l.y, d.y),
            source_name: l.source_name.clone(),
        }
    }
}

impl From<&OverlayLayer> for OverlayRecord {
    fn from(l: &OverlayLayer) -> Self {
        let d = OverlayLayer::new(l.id);
        Self {
            id: l.id,
            image: None,
            loaded: false,
            opacity: finite_or(l.opacity, d.opacity),
            scale: finite_or(l.scale, d.scale),
            x: finite_or(l.x, d.x),
            y: finite_or(l.y, d.y),
            source_name: l.source_name.clone(),
        }
    }
}

impl From<&TextLayer> for TextRecord {
    fn from(l: &TextLayer) -> Self {
        let d = TextLayer::new(l.id);
        Self {
            id: l.id,
            content: l.content.clone(),
            font_size_px: finite_or(l.font_size_px, d.font_size_px),
            color_hex: l.color_hex.clone(),
            x: finite_or(l.x, d.x),
            y: finite_or(l.y, d.y),
            max_width_px: finite_or(l.max_width_px, d.max_width_px),
            background_opacity: finite_or(l.background_opacity, d.background_opacity),
        }
    }
}

impl BackgroundRecord {
    fn into_layer(self) -> BackgroundLayer {
        BackgroundLayer {
            id: self.id,
            image: None,
            natural_width: self.natural_width,
            natural_height: self.natural_height,
            opacity: self.opacity,
            scale: self.scale,
            x: self.x,
            y: self.y,
            source_name: self.source_name,
            loaded: false,
        }
    }
}

impl OverlayRecord {
    fn into_layer(self) -> OverlayLayer {
        OverlayLayer {
            id: self.id,
            image: None,
            opacity: self.opacity,
            scale: self.scale,
            x: self.x,
            y: self.y,
            source_name: self.source_name,
            loaded: false,
        }
    }
}

impl TextRecord {
    fn into_layer(self) -> TextLayer {
        TextLayer {
            id: self.id,
            content: self.content,
            font_size_px: self.font_size_px,
            color_hex: self.color_hex,
            x: self.x,
            y: self.y,
            max_width_px: self.max_width_px,
            background_opacity: self.background_opacity,
        }
    }
}

impl ProjectSnapshot {
    /// Snapshot the current parameters of every layer in `store`.
    pub fn capture(store: &LayerStore) -> Self {
        Self {
            backgrounds: store.backgrounds().iter().map(Into::into).collect(),
            overlays: store.overlays().iter().map(Into::into).collect(),
            texts: store.texts().iter().map(Into::into).collect(),
        }
    }

    pub fn to_json(&self) -> StackshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, rejecting files that lack any of the three layer lists or reuse an id.
    pub fn from_json_str(text: &str) -> StackshotResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| StackshotError::snapshot(format!("project file is not valid JSON: {e}")))?;
        let obj = value
            .as_object()
            .ok_or_else(|| StackshotError::snapshot("project file must be a JSON object"))?;
        for key in REQUIRED_KEYS {
            if !obj.contains_key(key) {
                return Err(StackshotError::snapshot(format!(
                    "invalid project file: missing '{key}'"
                )));
            }
        }

        let snapshot: Self = serde_json::from_value(value)
            .map_err(|e| StackshotError::snapshot(format!("invalid project file: {e}")))?;
        snapshot.check_unique_ids()?;
        Ok(snapshot)
    }

    fn check_unique_ids(&self) -> StackshotResult<()> {
        let mut seen = HashSet::new();
        let ids = self
            .backgrounds
            .iter()
            .map(|l| l.id)
            .chain(self.overlays.iter().map(|l| l.id))
            .chain(self.texts.iter().map(|l| l.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(StackshotError::snapshot(format!(
                    "invalid project file: layer id {id} appears twice"
                )));
            }
        }
        Ok(())
    }

    /// Image layers that name a source file; all of them load unloaded.
    pub fn pending_attachments(&self) -> Vec<PendingAttachment> {
        let bgs = self.backgrounds.iter().filter_map(|l| {
            l.source_name.clone().map(|source_name| PendingAttachment {
                kind: ImageKind::Background,
                id: l.id,
                source_name,
            })
        });
        let ovs = self.overlays.iter().filter_map(|l| {
            l.source_name.clone().map(|source_name| PendingAttachment {
                kind: ImageKind::Overlay,
                id: l.id,
                source_name,
            })
        });
        bgs.chain(ovs).collect()
    }

    /// Replace the store's layers with this snapshot and return the layers awaiting re-attach.
    pub fn apply(self, store: &mut LayerStore) -> Vec<PendingAttachment> {
        let pending = self.pending_attachments();
        store.replace_layers(
            self.backgrounds
                .into_iter()
                .map(BackgroundRecord::into_layer)
                .collect(),
            self.overlays
                .into_iter()
                .map(OverlayRecord::into_layer)
                .collect(),
            self.texts.into_iter().map(TextRecord::into_layer).collect(),
        );
        tracing::info!(pending = pending.len(), "project loaded");
        pending
    }

    pub fn load_from_path(path: &Path) -> StackshotResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn save_to_path(&self, path: &Path) -> StackshotResult<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
        }
        std::fs::write(path, json).with_context(|| format!("write project '{}'", path.display()))?;
        Ok(())
    }
}

/// Parse `text` and load it into `store`. On any error the store is left untouched.
pub fn load_project(store: &mut LayerStore, text: &str) -> StackshotResult<Vec<PendingAttachment>> {
    let snapshot = ProjectSnapshot::from_json_str(text)?;
    Ok(snapshot.apply(store))
}

#[cfg(test)]
#[path = "../../tests/unit/project/snapshot.rs"]
mod tests;
