use crate::generation::pipeline::GenerationPipeline;
use crate::history::HistoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; the history backend chosen there never changes.
#[derive(Clone)]
pub struct AppState {
    pub history: HistoryStore,
    /// Shares `history` with the handlers; carries the optional provider.
    pub generation: GenerationPipeline,
}
