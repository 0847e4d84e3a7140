use clap::Parser;
use std::io::{self, BufRead};
use std::sync::Arc;

use classroomd::config::{Cli, FeedbackConfig};
use classroomd::db::{MemorySlots, SlotStore, SqliteSlots};
use classroomd::feedback::{FeedbackCollaborator, FeedbackError, FeedbackRequest};
use classroomd::gemini::GeminiClient;
use classroomd::store::{ClassroomStore, StoreEvent};
use classroomd::{ipc, logging};

/// Stands in when the HTTP client cannot be built; every call reports missing config.
struct Unconfigured;

impl FeedbackCollaborator for Unconfigured {
    fn generate(&self, _request: &FeedbackRequest) -> Result<String, FeedbackError> {
        Err(FeedbackError::MissingConfig)
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing();

    let seeds = cli.seeds();
    let mut workspace = None;
    let slots: Box<dyn SlotStore> = match cli.workspace.as_deref() {
        Some(path) => match SqliteSlots::open(path) {
            Ok(s) => {
                workspace = Some(path.to_path_buf());
                Box::new(s)
            }
            Err(e) => {
                tracing::warn!(error = %e, "workspace unavailable; running in memory");
                Box::new(MemorySlots::new())
            }
        },
        None => Box::new(MemorySlots::new()),
    };

    let mut store = ClassroomStore::open(slots, seeds.clone());
    store.subscribe(|event: &StoreEvent| tracing::debug!(?event, "store changed"));

    let feedback: Arc<dyn FeedbackCollaborator + Send + Sync> =
        match GeminiClient::new(FeedbackConfig::from_env()) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                tracing::warn!(error = %e, "feedback client unavailable");
                Arc::new(Unconfigured)
            }
        };

    let responder = ipc::Responder::stdout();
    let mut state = ipc::AppState::new(workspace, store, seeds, feedback, responder.clone());

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; answer anonymously and keep reading.
                responder.send(&ipc::err("", "bad_json", e.to_string(), None));
                continue;
            }
        };

        match ipc::handle_request(&mut state, req) {
            ipc::Reply::Now(resp) => responder.send(&resp),
            ipc::Reply::Deferred => {}
        }
    }
    state.drain();
    tracing::info!("stdin closed; exiting");
}
