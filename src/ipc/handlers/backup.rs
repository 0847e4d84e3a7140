use crate::backup;
use crate::ipc::helpers::{get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn backup_failed(e: anyhow::Error) -> HandlerErr {
    HandlerErr {
        code: "backup_failed",
        message: format!("{e:#}"),
        details: None,
    }
}

fn backup_export(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let out_path = PathBuf::from(get_required_str(params, "outPath")?);
    let summary = backup::export_bundle(&state.store, &out_path).map_err(backup_failed)?;
    Ok(json!({
        "path": out_path.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count,
    }))
}

fn backup_import(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let in_path = PathBuf::from(get_required_str(params, "inPath")?);
    let summary = backup::import_bundle(&mut state.store, &in_path).map_err(backup_failed)?;
    let collections: Vec<&str> = summary.collections.iter().map(|c| c.name()).collect();
    Ok(json!({
        "bundleFormatDetected": summary.bundle_format_detected,
        "collections": collections,
        "warning": state.store.persistence_warning(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(respond(req, backup_export(state, &req.params))),
        "backup.import" => Some(respond(req, backup_import(state, &req.params))),
        _ => None,
    }
}
