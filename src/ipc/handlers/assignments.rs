use crate::ipc::helpers::{
    get_optional_str, get_required_number, get_required_str, outcome_json, respond, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Assignment;
use crate::store::{Outcome, Rejection};
use serde_json::json;

fn assignments_list(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let snap = state.store.snapshot();
    let assignments: Vec<&Assignment> = match get_optional_str(params, "classId") {
        Some(class_id) => snap.assignments_in_class(&class_id).collect(),
        None => snap.assignments.iter().collect(),
    };
    Ok(json!({ "assignments": assignments }))
}

fn assignments_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let title = get_required_str(params, "title")?;
    let max_points = get_required_number(params, "maxPoints")?;
    let date = get_optional_str(params, "date").unwrap_or_default();
    let outcome = state.store.add_assignment(&class_id, &title, max_points, &date);
    Ok(outcome_json(&outcome, &state.store))
}

/// Fields not supplied keep their current value.
fn assignments_update(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    let Some(current) = state.store.snapshot().assignment(&id).cloned() else {
        return Ok(outcome_json(
            &Outcome::Rejected(Rejection::NotFound),
            &state.store,
        ));
    };
    let max_points = if params.get("maxPoints").is_some() {
        get_required_number(params, "maxPoints")?
    } else {
        current.max_points
    };
    let completed = match params.get("completed") {
        None => current.completed,
        Some(v) => v
            .as_bool()
            .ok_or_else(|| HandlerErr::bad_params("completed must be boolean"))?,
    };
    let updated = Assignment {
        id,
        class_id: get_optional_str(params, "classId").unwrap_or(current.class_id),
        title: get_optional_str(params, "title").unwrap_or(current.title),
        max_points,
        date: get_optional_str(params, "date").unwrap_or(current.date),
        completed,
    };
    let outcome = state.store.update_assignment(updated);
    Ok(outcome_json(&outcome, &state.store))
}

fn assignments_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let assignment_id = get_required_str(params, "assignmentId")?;
    let outcome = state.store.delete_assignment(&assignment_id);
    Ok(outcome_json(&outcome, &state.store))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.list" => Some(respond(req, assignments_list(state, &req.params))),
        "assignments.create" => Some(respond(req, assignments_create(state, &req.params))),
        "assignments.update" => Some(respond(req, assignments_update(state, &req.params))),
        "assignments.delete" => Some(respond(req, assignments_delete(state, &req.params))),
        _ => None,
    }
}
