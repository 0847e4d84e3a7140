use crate::calc::{attendance_status, class_day_summary};
use crate::ipc::helpers::{get_optional_str, get_required_str, outcome_json, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceStatus;
use crate::store::today;
use serde_json::json;

fn parse_status(params: &serde_json::Value) -> Result<AttendanceStatus, HandlerErr> {
    let raw = get_required_str(params, "status")?;
    AttendanceStatus::parse(&raw).ok_or_else(|| HandlerErr {
        code: "bad_params",
        message: "status must be Present, Absent, Late or Excused".to_string(),
        details: Some(json!({ "status": raw })),
    })
}

fn attendance_set(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_str(params, "date")?;
    let class_id = get_required_str(params, "classId")?;
    let student_id = get_required_str(params, "studentId")?;
    let status = parse_status(params)?;
    let outcome = state
        .store
        .update_attendance(&date, &class_id, &student_id, status);
    Ok(outcome_json(&outcome, &state.store))
}

fn attendance_get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_str(params, "date")?;
    let class_id = get_required_str(params, "classId")?;
    let student_id = get_required_str(params, "studentId")?;
    let status = attendance_status(&state.store.snapshot(), &date, &class_id, &student_id);
    // null means no record for that day.
    Ok(json!({ "status": status }))
}

/// Roster for one class on one day, each student with their status.
fn attendance_day(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let date = get_optional_str(params, "date").unwrap_or_else(today);
    let snap = state.store.snapshot();
    let rows: Vec<serde_json::Value> = snap
        .students_in_class(&class_id)
        .map(|s| {
            json!({
                "studentId": s.id,
                "name": s.name,
                "status": attendance_status(&snap, &date, &class_id, &s.id),
            })
        })
        .collect();
    Ok(json!({
        "date": date,
        "classId": class_id,
        "rows": rows,
        "summary": class_day_summary(&snap, &date, &class_id),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.set" => Some(respond(req, attendance_set(state, &req.params))),
        "attendance.get" => Some(respond(req, attendance_get(state, &req.params))),
        "attendance.day" => Some(respond(req, attendance_day(state, &req.params))),
        _ => None,
    }
}
