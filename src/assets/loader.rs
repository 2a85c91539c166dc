use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
};

use crate::{
    assets::decode::{DecodedImage, decode_image, decode_image_file, source_name_for},
    foundation::core::LayerId,
    foundation::error::{StackshotError, StackshotResult},
    layers::{model::ImageKind, store::LayerStore},
};

enum DecodeSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// Result of one background decode, waiting to be applied on the store's thread.
#[derive(Debug)]
pub struct DecodeCompletion {
    pub kind: ImageKind,
    pub id: LayerId,
    pub source_name: String,
    pub result: StackshotResult<DecodedImage>,
}

/// What a [`DecodeQueue::pump`] or [`DecodeQueue::wait_all`] call applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Layers that became loaded.
    pub loaded: Vec<LayerId>,
    /// Layers whose decode failed, with the user notice. They stay as they were.
    pub failed: Vec<(LayerId, String)>,
    /// Completions for layers removed while decoding.
    pub dropped: usize,
}

impl PumpReport {
    fn merge(&mut self, other: PumpReport) {
        self.loaded.extend(other.loaded);
        self.failed.extend(other.failed);
        self.dropped += other.dropped;
    }
}

/// Decodes images on the `rayon` pool and hands completions back over a channel.
///
/// Requests return immediately. Completions are only applied to a store by [`Self::pump`] or
/// [`Self::wait_all`], so the store keeps a single writer. Decodes for different layers may
/// finish in any order.
pub struct DecodeQueue {
    tx: mpsc::Sender<DecodeCompletion>,
    rx: mpsc::Receiver<DecodeCompletion>,
    in_flight: usize,
}

impl std::fmt::Debug for DecodeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeQueue")
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl Default for DecodeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Number of requests whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Decode encoded `bytes` for layer `id`.
    pub fn request(
        &mut self,
        kind: ImageKind,
        id: LayerId,
        source_name: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.spawn(kind, id, source_name.into(), DecodeSource::Bytes(bytes));
    }

    /// Read and decode the file at `path` for layer `id`. The file name becomes the source name.
    pub fn request_path(&mut self, kind: ImageKind, id: LayerId, path: &Path) {
        self.spawn(
            kind,
            id,
            source_name_for(path),
            DecodeSource::Path(path.to_path_buf()),
        );
    }

    fn spawn(&mut self, kind: ImageKind, id: LayerId, source_name: String, source: DecodeSource) {
        self.spawn_job(kind, id, source_name, move || match source {
            DecodeSource::Bytes(bytes) => decode_image(&bytes),
            DecodeSource::Path(path) => decode_image_file(&path),
        });
    }

    fn spawn_job(
        &mut self,
        kind: ImageKind,
        id: LayerId,
        source_name: String,
        job: impl FnOnce() -> StackshotResult<DecodedImage> + Send + 'static,
    ) {
        tracing::debug!(kind = ?kind, %id, source = %source_name, "decode requested");
        let tx = self.tx.clone();
        self.in_flight += 1;
        rayon::spawn(move || {
            // Every request must produce a completion or `wait_all` never returns.
            let result = catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
                Err(StackshotError::decode(format!(
                    "image decoder panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });
            // The receiver lives as long as the queue; a send error means it was dropped.
            let _ = tx.send(DecodeCompletion {
                kind,
                id,
                source_name,
                result,
            });
        });
    }

    /// Apply every completion that is already available, without blocking.
    pub fn pump(&mut self, store: &mut LayerStore) -> PumpReport {
        let mut report = PumpReport::default();
        while let Ok(done) = self.rx.try_recv() {
            report.merge(self.apply(store, done));
        }
        report
    }

    /// Block until every outstanding request has been applied.
    pub fn wait_all(&mut self, store: &mut LayerStore) -> PumpReport {
        let mut report = PumpReport::default();
        while self.in_flight > 0 {
            match self.rx.recv() {
                Ok(done) => report.merge(self.apply(store, done)),
                Err(_) => break,
            }
        }
        report
    }

    fn apply(&mut self, store: &mut LayerStore, done: DecodeCompletion) -> PumpReport {
        self.in_flight = self.in_flight.saturating_sub(1);
        let mut report = PumpReport::default();
        match done.result {
            Ok(image) => {
                if store.mark_loaded(done.kind, done.id, Arc::new(image), done.source_name) {
                    report.loaded.push(done.id);
                } else {
                    report.dropped += 1;
                }
            }
            Err(e) => {
                tracing::warn!(
                    kind = ?done.kind,
                    id = %done.id,
                    source = %done.source_name,
                    error = %e,
                    "image decode failed; layer left unchanged"
                );
                report.failed.push((done.id, e.user_notice()));
            }
        }
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
