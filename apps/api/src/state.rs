use std::sync::Arc;

use crate::auth::session::SessionStore;
use crate::ikigai::dialogue::DialogueRegistry;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Bearer token → session resolution, following auth-state changes.
    pub sessions: Arc<SessionStore>,
    /// In-progress Ikigai dialogues, one per user.
    pub dialogues: Arc<DialogueRegistry>,
}
