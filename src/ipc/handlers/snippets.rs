use crate::ipc::helpers::{
    get_optional_str, get_required_str, get_string_list, outcome_json, respond, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn snippets_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let title = get_required_str(params, "title")?;
    let code = get_required_str(params, "code")?;
    let language = get_optional_str(params, "language").unwrap_or_else(|| "java".to_string());
    let tags = get_string_list(params, "tags")?;
    let outcome = state.store.add_snippet(&title, &language, &code, &tags);
    Ok(outcome_json(&outcome, &state.store))
}

fn snippets_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let snippet_id = get_required_str(params, "snippetId")?;
    let outcome = state.store.delete_snippet(&snippet_id);
    Ok(outcome_json(&outcome, &state.store))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "snippets.list" => Some(respond(
            req,
            Ok(json!({ "snippets": state.store.snippets() })),
        )),
        "snippets.create" => Some(respond(req, snippets_create(state, &req.params))),
        "snippets.delete" => Some(respond(req, snippets_delete(state, &req.params))),
        _ => None,
    }
}
