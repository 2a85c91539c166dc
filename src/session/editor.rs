use std::{
    cell::{Cell, RefCell},
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{
    assets::loader::{DecodeQueue, PumpReport},
    compose::compositor::Compositor,
    config::ComposeSettings,
    encode::png::{default_export_file_name, export_png, write_png},
    foundation::{core::LayerId, error::StackshotResult},
    layers::{model::ImageKind, store::LayerStore},
    project::snapshot::{PendingAttachment, ProjectSnapshot, load_project},
    render::backend::FrameRGBA,
};

/// One editing session: a store, a compositor that repaints on every change, and the decodes
/// in flight for it.
///
/// The compositor is subscribed to the store at construction, so any mutation made through
/// [`Editor::store_mut`] repaints synchronously before the call returns.
pub struct Editor {
    store: LayerStore,
    compositor: Rc<RefCell<Compositor>>,
    frame: Rc<RefCell<Option<FrameRGBA>>>,
    repaints: Rc<Cell<u64>>,
    decodes: DecodeQueue,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("store", &self.store)
            .field("repaints", &self.repaints.get())
            .field("decodes", &self.decodes)
            .finish()
    }
}

impl Editor {
    /// Start from the starter project: one empty background slot.
    pub fn new(settings: ComposeSettings) -> Self {
        Self::with_store(settings, LayerStore::starter())
    }

    pub fn with_store(settings: ComposeSettings, mut store: LayerStore) -> Self {
        let compositor = Rc::new(RefCell::new(Compositor::from_settings(settings)));
        let frame = Rc::new(RefCell::new(None));
        let repaints = Rc::new(Cell::new(0));

        {
            let compositor = compositor.clone();
            let frame = frame.clone();
            let repaints = repaints.clone();
            store.subscribe(move |store| {
                repaint(store, &compositor, &frame, &repaints);
            });
        }
        repaint(&store, &compositor, &frame, &repaints);

        Self {
            store,
            compositor,
            frame,
            repaints,
            decodes: DecodeQueue::new(),
        }
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// Mutable access for edits. Each state-changing call repaints once.
    pub fn store_mut(&mut self) -> &mut LayerStore {
        &mut self.store
    }

    /// Latest painted surface, if the last repaint succeeded.
    pub fn frame(&self) -> Option<FrameRGBA> {
        self.frame.borrow().clone()
    }

    /// Number of repaints so far, including the initial one.
    pub fn repaint_count(&self) -> u64 {
        self.repaints.get()
    }

    /// Queue a decode of the image at `path` for layer `id`.
    pub fn attach_file(&mut self, kind: ImageKind, id: LayerId, path: &Path) {
        self.decodes.request_path(kind, id, path);
    }

    /// Queue a decode of encoded image bytes for layer `id`.
    pub fn attach_bytes(
        &mut self,
        kind: ImageKind,
        id: LayerId,
        source_name: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.decodes.request(kind, id, source_name, bytes);
    }

    /// Apply decodes that have finished, without blocking.
    pub fn pump(&mut self) -> PumpReport {
        self.decodes.pump(&mut self.store)
    }

    /// Block until every queued decode has been applied.
    pub fn wait_for_decodes(&mut self) -> PumpReport {
        self.decodes.wait_all(&mut self.store)
    }

    pub fn save_project(&self) -> StackshotResult<String> {
        ProjectSnapshot::capture(&self.store).to_json()
    }

    /// Replace every layer from snapshot JSON. On error nothing changes.
    pub fn load_project(&mut self, json: &str) -> StackshotResult<Vec<PendingAttachment>> {
        load_project(&mut self.store, json)
    }

    /// Current composition as PNG bytes.
    pub fn export_png(&self) -> StackshotResult<Vec<u8>> {
        let mut compositor = self.compositor.borrow_mut();
        export_png(&self.store, &mut *compositor)
    }

    /// Export into `dir` under the default timestamped file name and return the path written.
    pub fn export_to_dir(&self, dir: &Path) -> StackshotResult<PathBuf> {
        let bytes = self.export_png()?;
        let path = dir.join(default_export_file_name());
        write_png(&path, &bytes)?;
        Ok(path)
    }
}

fn repaint(
    store: &LayerStore,
    compositor: &RefCell<Compositor>,
    frame: &RefCell<Option<FrameRGBA>>,
    repaints: &Cell<u64>,
) {
    repaints.set(repaints.get() + 1);
    match compositor.borrow_mut().render(store) {
        Ok(painted) => *frame.borrow_mut() = Some(painted),
        Err(e) => {
            tracing::warn!(error = %e, "repaint failed");
            *frame.borrow_mut() = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
