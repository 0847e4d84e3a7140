use serde_json::Value;

use super::handlers;
use super::types::{AppState, Reply, Request};
use crate::ipc::error::err;

type Handler = fn(&mut AppState, &Request) -> Option<Value>;

/// Asked in order; the first family that recognizes the method answers.
const FAMILIES: &[Handler] = &[
    handlers::core::try_handle,
    handlers::classes::try_handle,
    handlers::students::try_handle,
    handlers::assignments::try_handle,
    handlers::grades::try_handle,
    handlers::attendance::try_handle,
    handlers::snippets::try_handle,
    handlers::todos::try_handle,
    handlers::analytics::try_handle,
    handlers::backup::try_handle,
];

pub fn handle_request(state: &mut AppState, req: Request) -> Reply {
    tracing::debug!(id = %req.id, method = %req.method, "request");
    if let Some(resp) = FAMILIES.iter().find_map(|family| family(state, &req)) {
        return Reply::Now(resp);
    }
    // Feedback may answer from a worker thread.
    if let Some(reply) = handlers::feedback::try_handle(state, &req) {
        return reply;
    }
    Reply::Now(err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    ))
}
