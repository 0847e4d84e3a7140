use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use serde::Deserialize;

use crate::feedback::FeedbackCollaborator;
use crate::ipc::output::Responder;
use crate::seed::Seeds;
use crate::store::ClassroomStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// What the loop should do once a request has been dispatched.
#[derive(Debug)]
pub enum Reply {
    Now(serde_json::Value),
    /// A worker thread answers later through the shared responder.
    Deferred,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: ClassroomStore,
    /// Defaults used when a workspace slot is missing or unreadable.
    pub seeds: Seeds,
    pub feedback: Arc<dyn FeedbackCollaborator + Send + Sync>,
    pub responder: Responder,
    /// Outstanding feedback workers, joined before exit.
    pub pending: Vec<JoinHandle<()>>,
}

impl AppState {
    pub fn new(
        workspace: Option<PathBuf>,
        store: ClassroomStore,
        seeds: Seeds,
        feedback: Arc<dyn FeedbackCollaborator + Send + Sync>,
        responder: Responder,
    ) -> Self {
        Self {
            workspace,
            store,
            seeds,
            feedback,
            responder,
            pending: Vec::new(),
        }
    }

    /// Waits for every deferred reply to be written.
    pub fn drain(&mut self) {
        for handle in self.pending.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("feedback worker panicked");
            }
        }
    }
}
