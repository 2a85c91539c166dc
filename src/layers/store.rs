use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    foundation::{core::LayerId, ids::LayerIdGen},
    layers::model::{
        BackgroundLayer, ImageKind, Layer, LayerField, LayerKind, OverlayLayer, StackKind,
        TextLayer,
    },
};

type Subscriber = Box<dyn FnMut(&LayerStore)>;

/// Owner of the three ordered layer lists and their only mutation surface.
///
/// Index 0 of each list is the bottom of its band. Every call that changes state bumps
/// [`LayerStore::revision`] and invokes each subscriber exactly once; calls that change nothing
/// stay silent.
pub struct LayerStore {
    backgrounds: Vec<BackgroundLayer>,
    overlays: Vec<OverlayLayer>,
    texts: Vec<TextLayer>,
    ids: LayerIdGen,
    revision: u64,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for LayerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStore")
            .field("backgrounds", &self.backgrounds)
            .field("overlays", &self.overlays)
            .field("texts", &self.texts)
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            backgrounds: Vec::new(),
            overlays: Vec::new(),
            texts: Vec::new(),
            ids: LayerIdGen::new(),
            revision: 0,
            subscribers: Vec::new(),
        }
    }

    /// Store for a new project: one unloaded background slot waiting for an image.
    pub fn starter() -> Self {
        let mut store = Self::new();
        let id = store.ids.next_id();
        store.backgrounds.push(BackgroundLayer::new(id));
        store
    }

    /// Register a callback invoked after every state change.
    pub fn subscribe(&mut self, callback: impl FnMut(&LayerStore) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    pub fn backgrounds(&self) -> &[BackgroundLayer] {
        &self.backgrounds
    }

    pub fn overlays(&self) -> &[OverlayLayer] {
        &self.overlays
    }

    pub fn texts(&self) -> &[TextLayer] {
        &self.texts
    }

    pub fn background(&self, id: LayerId) -> Option<&BackgroundLayer> {
        self.backgrounds.iter().find(|l| l.id == id)
    }

    pub fn overlay(&self, id: LayerId) -> Option<&OverlayLayer> {
        self.overlays.iter().find(|l| l.id == id)
    }

    pub fn text(&self, id: LayerId) -> Option<&TextLayer> {
        self.texts.iter().find(|l| l.id == id)
    }

    /// Which band holds `id`, if any.
    pub fn kind_of(&self, id: LayerId) -> Option<LayerKind> {
        if self.background(id).is_some() {
            Some(LayerKind::Background)
        } else if self.overlay(id).is_some() {
            Some(LayerKind::Overlay)
        } else if self.text(id).is_some() {
            Some(LayerKind::Text)
        } else {
            None
        }
    }

    pub fn has_loaded_background(&self) -> bool {
        self.backgrounds.iter().any(|b| b.loaded)
    }

    /// Counter bumped once per state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append a layer with kind defaults and return its id.
    pub fn add(&mut self, kind: LayerKind) -> LayerId {
        let id = self.ids.next_id();
        match kind {
            LayerKind::Background => self.backgrounds.push(BackgroundLayer::new(id)),
            LayerKind::Overlay => self.overlays.push(OverlayLayer::new(id)),
            LayerKind::Text => self.texts.push(TextLayer::new(id)),
        }
        tracing::debug!(%kind, %id, "layer added");
        self.notify();
        id
    }

    /// Remove a layer by id. Absent ids are ignored.
    pub fn remove(&mut self, kind: LayerKind, id: LayerId) -> bool {
        let removed = match kind {
            LayerKind::Background => remove_by_id(&mut self.backgrounds, id),
            LayerKind::Overlay => remove_by_id(&mut self.overlays, id),
            LayerKind::Text => remove_by_id(&mut self.texts, id),
        };
        if removed {
            tracing::debug!(%kind, %id, "layer removed");
            self.notify();
        }
        removed
    }

    /// Set one field on one layer. Absent ids and fields the kind lacks are ignored.
    pub fn update(&mut self, kind: LayerKind, id: LayerId, field: LayerField) -> bool {
        let name = field.name();
        let applied = match kind {
            LayerKind::Background => update_by_id(&mut self.backgrounds, id, field),
            LayerKind::Overlay => update_by_id(&mut self.overlays, id, field),
            LayerKind::Text => update_by_id(&mut self.texts, id, field),
        };
        if applied {
            tracing::debug!(%kind, %id, field = name, "layer updated");
            self.notify();
        } else {
            tracing::debug!(%kind, %id, field = name, "update ignored");
        }
        applied
    }

    /// Swap with the next higher index (toward the top of the band).
    pub fn move_up(&mut self, kind: StackKind, id: LayerId) -> bool {
        let moved = match kind {
            StackKind::Background => swap_with_neighbor(&mut self.backgrounds, id, Direction::Up),
            StackKind::Text => swap_with_neighbor(&mut self.texts, id, Direction::Up),
        };
        if moved {
            self.notify();
        }
        moved
    }

    /// Swap with the next lower index (toward the bottom of the band).
    pub fn move_down(&mut self, kind: StackKind, id: LayerId) -> bool {
        let moved = match kind {
            StackKind::Background => {
                swap_with_neighbor(&mut self.backgrounds, id, Direction::Down)
            }
            StackKind::Text => swap_with_neighbor(&mut self.texts, id, Direction::Down),
        };
        if moved {
            self.notify();
        }
        moved
    }

    /// Attach a decoded image to an image layer and flag it loaded.
    pub fn mark_loaded(
        &mut self,
        kind: ImageKind,
        id: LayerId,
        image: Arc<DecodedImage>,
        source_name: impl Into<String>,
    ) -> bool {
        let source_name = source_name.into();
        let (width, height) = (image.width, image.height);
        let found = match kind {
            ImageKind::Background => self
                .backgrounds
                .iter_mut()
                .find(|l| l.id == id)
                .map(|l| l.attach(image, source_name))
                .is_some(),
            ImageKind::Overlay => self
                .overlays
                .iter_mut()
                .find(|l| l.id == id)
                .map(|l| l.attach(image, source_name))
                .is_some(),
        };
        if found {
            tracing::debug!(kind = ?kind, %id, width, height, "layer loaded");
            self.notify();
        } else {
            tracing::debug!(kind = ?kind, %id, "decoded image arrived for a removed layer");
        }
        found
    }

    /// Replace all three lists at once, e.g. from a project snapshot.
    pub fn replace_layers(
        &mut self,
        backgrounds: Vec<BackgroundLayer>,
        overlays: Vec<OverlayLayer>,
        texts: Vec<TextLayer>,
    ) {
        for id in backgrounds
            .iter()
            .map(|l| l.id)
            .chain(overlays.iter().map(|l| l.id))
            .chain(texts.iter().map(|l| l.id))
        {
            self.ids.observe(id);
        }
        self.backgrounds = backgrounds;
        self.overlays = overlays;
        self.texts = texts;
        tracing::debug!(
            backgrounds = self.backgrounds.len(),
            overlays = self.overlays.len(),
            texts = self.texts.len(),
            "layers replaced"
        );
        self.notify();
    }

    fn notify(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        let mut subscribers = std::mem::take(&mut self.subscribers);
        for cb in subscribers.iter_mut() {
            cb(self);
        }
        // Keep callbacks registered from inside a notification.
        subscribers.append(&mut self.subscribers);
        self.subscribers = subscribers;
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

fn remove_by_id<L: Layer>(list: &mut Vec<L>, id: LayerId) -> bool {
    let before = list.len();
    list.retain(|l| l.id() != id);
    list.len() != before
}

fn update_by_id<L: Layer>(list: &mut [L], id: LayerId, field: LayerField) -> bool {
    list.iter_mut()
        .find(|l| l.id() == id)
        .is_some_and(|l| l.apply(field))
}

fn swap_with_neighbor<L: Layer>(list: &mut [L], id: LayerId, dir: Direction) -> bool {
    let Some(idx) = list.iter().position(|l| l.id() == id) else {
        return false;
    };
    let other = match dir {
        Direction::Up if idx + 1 < list.len() => idx + 1,
        Direction::Down if idx > 0 => idx - 1,
        _ => return false,
    };
    list.swap(idx, other);
    true
}

#[cfg(test)]
#[path = "../../tests/unit/layers/store.rs"]
mod tests;
