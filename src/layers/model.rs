use std::sync::Arc;

use crate::{assets::decode::DecodedImage, foundation::core::LayerId};

/// The three layer bands, in paint order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Background,
    Overlay,
    Text,
}

/// Layer kinds that carry a decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Background,
    Overlay,
}

/// Layer kinds that can be reordered within their band.
///
/// Overlays are not listed: they paint as one block in list order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackKind {
    Background,
    Text,
}

impl From<ImageKind> for LayerKind {
    fn from(kind: ImageKind) -> Self {
        match kind {
            ImageKind::Background => LayerKind::Background,
            ImageKind::Overlay => LayerKind::Overlay,
        }
    }
}

impl From<StackKind> for LayerKind {
    fn from(kind: StackKind) -> Self {
        match kind {
            StackKind::Background => LayerKind::Background,
            StackKind::Text => LayerKind::Text,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LayerKind::Background => "background",
            LayerKind::Overlay => "overlay",
            LayerKind::Text => "text",
        })
    }
}

/// A single-field edit applied through [`crate::LayerStore::update`].
///
/// Values are stored as given. Range checks happen at compose time, not here.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerField {
    Opacity(f64),
    Scale(f64),
    X(f64),
    Y(f64),
    SourceName(Option<String>),
    Content(String),
    FontSizePx(f64),
    ColorHex(String),
    MaxWidthPx(f64),
    BackgroundOpacity(f64),
}

impl LayerField {
    pub fn name(&self) -> &'static str {
        match self {
            LayerField::Opacity(_) => "opacity",
            LayerField::Scale(_) => "scale",
            LayerField::X(_) => "x",
            LayerField::Y(_) => "y",
            LayerField::SourceName(_) => "sourceName",
            LayerField::Content(_) => "content",
            LayerField::FontSizePx(_) => "fontSizePx",
            LayerField::ColorHex(_) => "colorHex",
            LayerField::MaxWidthPx(_) => "maxWidthPx",
            LayerField::BackgroundOpacity(_) => "backgroundOpacity",
        }
    }
}

/// Behavior shared by every layer record held in a store list.
pub trait Layer {
    fn id(&self) -> LayerId;

    /// Apply `field` if this kind has it. Returns `false` for fields the kind does not carry.
    fn apply(&mut self, field: LayerField) -> bool;
}

/// Bottom band image layer. Loaded backgrounds drive the canvas size.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundLayer {
    pub id: LayerId,
    pub image: Option<Arc<DecodedImage>>,
    pub natural_width: u32,
    pub natural_height: u32,
    pub opacity: f64,
    pub scale: f64,
    pub x: f64,
    pub y: f64,
    pub source_name: Option<String>,
    pub loaded: bool,
}

impl BackgroundLayer {
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            image: None,
            natural_width: 0,
            natural_height: 0,
            opacity: 100.0,
            scale: 100.0,
            x: 0.0,
            y: 0.0,
            source_name: None,
            loaded: false,
        }
    }

    /// Attach a decoded image. A layer that never had a source is re-centered; a layer restored
    /// from a snapshot keeps its saved anchor.
    pub(crate) fn attach(&mut self, image: Arc<DecodedImage>, source_name: String) {
        if self.source_name.is_none() {
            self.x = 50.0;
            self.y = 50.0;
        }
        self.natural_width = image.width;
        self.natural_height = image.height;
        self.image = Some(image);
        self.source_name = Some(source_name);
        self.loaded = true;
    }

    pub(crate) fn drawable_image(&self) -> Option<&Arc<DecodedImage>> {
        if self.loaded { self.image.as_ref() } else { None }
    }
}

impl Layer for BackgroundLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn apply(&mut self, field: LayerField) -> bool {
        match field {
            LayerField::Opacity(v) => self.opacity = v,
            LayerField::Scale(v) => self.scale = v,
            LayerField::X(v) => self.x = v,
            LayerField::Y(v) => self.y = v,
            LayerField::SourceName(v) => self.source_name = v,
            _ => return false,
        }
        true
    }
}

/// Middle band image layer, painted above every background.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayLayer {
    pub id: LayerId,
    pub image: Option<Arc<DecodedImage>>,
    pub opacity: f64,
    pub scale: f64,
    pub x: f64,
    pub y: f64,
    pub source_name: Option<String>,
    pub loaded: bool,
}

impl OverlayLayer {
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            image: None,
            opacity: 100.0,
            scale: 50.0,
            x: 50.0,
            y: 50.0,
            source_name: None,
            loaded: false,
        }
    }

    pub(crate) fn attach(&mut self, image: Arc<DecodedImage>, source_name: String) {
        self.image = Some(image);
        self.source_name = Some(source_name);
        self.loaded = true;
    }

    pub(crate) fn drawable_image(&self) -> Option<&Arc<DecodedImage>> {
        if self.loaded { self.image.as_ref() } else { None }
    }
}

impl Layer for OverlayLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn apply(&mut self, field: LayerField) -> bool {
        match field {
            LayerField::Opacity(v) => self.opacity = v,
            LayerField::Scale(v) => self.scale = v,
            LayerField::X(v) => self.x = v,
            LayerField::Y(v) => self.y = v,
            LayerField::SourceName(v) => self.source_name = v,
            _ => return false,
        }
        true
    }
}

/// Top band text block. `x`/`y` anchor its top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayer {
    pub id: LayerId,
    pub content: String,
    pub font_size_px: f64,
    pub color_hex: String,
    pub x: f64,
    pub y: f64,
    pub max_width_px: f64,
    pub background_opacity: f64,
}

impl TextLayer {
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            content: "New Text".to_string(),
            font_size_px: 40.0,
            color_hex: "#ffffff".to_string(),
            x: 50.0,
            y: 50.0,
            max_width_px: 400.0,
            background_opacity: 0.0,
        }
    }
}

impl Layer for TextLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn apply(&mut self, field: LayerField) -> bool {
        match field {
            LayerField::X(v) => self.x = v,
            LayerField::Y(v) => self.y = v,
            LayerField::Content(v) => self.content = v,
            LayerField::FontSizePx(v) => self.font_size_px = v,
            LayerField::ColorHex(v) => self.color_hex = v,
            LayerField::MaxWidthPx(v) => self.max_width_px = v,
            LayerField::BackgroundOpacity(v) => self.background_opacity = v,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/model.rs"]
mod tests;
