use crate::calc::class_counts;
use crate::ipc::helpers::{get_optional_str, get_required_str, outcome_json, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn classes_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    // Counts let the class manager show roster sizes without a second call.
    Ok(json!({ "classes": class_counts(&state.store.snapshot()) }))
}

fn classes_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let section = get_optional_str(params, "section").unwrap_or_default();
    let schedule = get_optional_str(params, "schedule").unwrap_or_default();
    let outcome = state.store.add_class(&name, &section, &schedule);
    Ok(outcome_json(&outcome, &state.store))
}

fn classes_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    // Roster, assignments and attendance stay behind.
    let outcome = state.store.delete_class(&class_id);
    Ok(outcome_json(&outcome, &state.store))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(respond(req, classes_list(state))),
        "classes.create" => Some(respond(req, classes_create(state, &req.params))),
        "classes.delete" => Some(respond(req, classes_delete(state, &req.params))),
        _ => None,
    }
}
