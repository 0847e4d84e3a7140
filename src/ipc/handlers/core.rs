use crate::db::SqliteSlots;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::AppView;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "persistence": state.store.persistence_mode(),
            "persistenceWarning": state.store.persistence_warning(),
            "unsavedCollections": state
                .store
                .unsaved_collections()
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match SqliteSlots::open(&path) {
        Ok(slots) => {
            state.store.reopen(Box::new(slots), state.seeds.clone());
            state.workspace = Some(path.clone());
            tracing::info!(workspace = %path.to_string_lossy(), "workspace selected");
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn view_select(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let raw = get_required_str(params, "view")?;
    let view = AppView::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("unknown view: {}", raw)))?;
    state.store.select_view(view);
    Ok(json!({ "view": view }))
}

fn state_snapshot(state: &AppState) -> serde_json::Value {
    json!({
        "view": state.store.view(),
        "state": state.store.snapshot(),
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "view.select" => Some(respond(req, view_select(state, &req.params))),
        "view.get" => Some(ok(&req.id, json!({ "view": state.store.view() }))),
        "state.snapshot" => Some(ok(&req.id, state_snapshot(state))),
        _ => None,
    }
}
