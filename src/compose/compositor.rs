use crate::{
    compose::plan::{ComposePlan, compile_plan},
    config::ComposeSettings,
    foundation::error::StackshotResult,
    layers::store::LayerStore,
    render::{
        backend::{FrameRGBA, RenderBackend},
        cpu::CpuBackend,
    },
    text::{engine::FontTextEngine, wrap::ApproxMeasure},
};

/// Paints a [`LayerStore`] onto one surface: backgrounds, then overlays, then text.
///
/// Each call to [`Compositor::render`] is a full repaint from the current store state.
#[derive(Debug)]
pub struct Compositor<B: RenderBackend = CpuBackend> {
    settings: ComposeSettings,
    backend: B,
    approx: ApproxMeasure,
}

impl Compositor<CpuBackend> {
    /// CPU compositor, loading the configured font if there is one.
    ///
    /// A font that cannot be read is reported and text falls back to approximate measurement.
    pub fn from_settings(settings: ComposeSettings) -> Self {
        let engine = settings
            .font_path
            .as_deref()
            .and_then(|path| match FontTextEngine::from_path(path) {
                Ok(engine) => Some(engine),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "font not loaded");
                    None
                }
            });
        Self::with_backend(settings, CpuBackend::new(engine))
    }
}

impl<B: RenderBackend> Compositor<B> {
    pub fn with_backend(settings: ComposeSettings, backend: B) -> Self {
        let approx = ApproxMeasure {
            em_advance: settings.approx_em_advance,
        };
        Self {
            settings,
            backend,
            approx,
        }
    }

    pub fn settings(&self) -> &ComposeSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compile the plan for `store`, measuring text with the backend's font when it has one.
    pub fn plan(&mut self, store: &LayerStore) -> ComposePlan {
        match self.backend.text_measure() {
            Some(measure) => compile_plan(store, measure, &self.settings),
            None => compile_plan(store, &mut self.approx, &self.settings),
        }
    }

    /// Full repaint of `store`.
    #[tracing::instrument(skip_all, fields(revision = store.revision()))]
    pub fn render(&mut self, store: &LayerStore) -> StackshotResult<FrameRGBA> {
        let plan = self.plan(store);
        self.backend.render_plan(&plan)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
