use crate::calc::format_average;
use crate::feedback::{assemble, request_feedback, FeedbackRequest, SnapshotError};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Reply, Request};
use serde_json::json;
use std::sync::Arc;

fn snapshot_for(state: &AppState, params: &serde_json::Value) -> Result<FeedbackRequest, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let class_id = get_required_str(params, "classId")?;
    assemble(&state.store.snapshot(), &student_id, &class_id).map_err(|e| match e {
        SnapshotError::NotFound { kind, ref id } => HandlerErr {
            code: "not_found",
            message: e.to_string(),
            details: Some(json!({ "kind": kind, "id": id })),
        },
    })
}

fn feedback_snapshot(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let snapshot = snapshot_for(state, params)?;
    Ok(json!({
        "snapshot": snapshot,
        "average": format_average(snapshot.average),
    }))
}

/// The bundle is taken now; the collaborator runs on a worker so the store
/// keeps serving requests. The reply is written under the request id.
fn feedback_generate(state: &mut AppState, req: &Request) -> Reply {
    let snapshot = match snapshot_for(state, &req.params) {
        Ok(s) => s,
        Err(e) => return Reply::Now(e.response(&req.id)),
    };
    state.pending.retain(|h| !h.is_finished());

    let collaborator = Arc::clone(&state.feedback);
    let responder = state.responder.clone();
    let id = req.id.clone();
    let spawned = std::thread::Builder::new()
        .name("feedback".to_string())
        .spawn(move || {
            let text = request_feedback(collaborator.as_ref(), &snapshot);
            responder.send(&ok(
                &id,
                json!({
                    "feedback": text,
                    "snapshot": snapshot,
                }),
            ));
        });
    match spawned {
        Ok(handle) => {
            state.pending.push(handle);
            Reply::Deferred
        }
        Err(e) => Reply::Now(err(&req.id, "feedback_failed", e.to_string(), None)),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Reply> {
    match req.method.as_str() {
        "feedback.snapshot" => Some(Reply::Now(respond(
            req,
            feedback_snapshot(state, &req.params),
        ))),
        "feedback.generate" => Some(feedback_generate(state, req)),
        _ => None,
    }
}
