use crate::ipc::helpers::{get_required_str, outcome_json, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn todos_create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let text = get_required_str(params, "text")?;
    let outcome = state.store.add_todo(&text);
    Ok(outcome_json(&outcome, &state.store))
}

fn todos_toggle(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let todo_id = get_required_str(params, "todoId")?;
    let outcome = state.store.toggle_todo(&todo_id);
    Ok(outcome_json(&outcome, &state.store))
}

fn todos_delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let todo_id = get_required_str(params, "todoId")?;
    let outcome = state.store.delete_todo(&todo_id);
    Ok(outcome_json(&outcome, &state.store))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "todos.list" => Some(respond(req, Ok(json!({ "todos": state.store.todos() })))),
        "todos.create" => Some(respond(req, todos_create(state, &req.params))),
        "todos.toggle" => Some(respond(req, todos_toggle(state, &req.params))),
        "todos.delete" => Some(respond(req, todos_delete(state, &req.params))),
        _ => None,
    }
}
