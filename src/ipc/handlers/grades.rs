use crate::calc::gradebook;
use crate::ipc::helpers::{get_optional_str, get_required_str, outcome_json, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::Grade;
use serde_json::json;
use std::collections::HashSet;

fn grades_list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let snap = state.store.snapshot();
    let grades: Vec<&Grade> = match get_optional_str(params, "classId") {
        Some(class_id) => {
            let in_class: HashSet<&str> = snap
                .assignments_in_class(&class_id)
                .map(|a| a.id.as_str())
                .collect();
            snap.grades
                .iter()
                .filter(|g| in_class.contains(g.assignment_id.as_str()))
                .collect()
        }
        None => snap.grades.iter().collect(),
    };
    Ok(json!({ "grades": grades }))
}

fn grades_set(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let assignment_id = get_required_str(params, "assignmentId")?;
    let outcome = match params.get("score") {
        None => return Err(HandlerErr::bad_params("missing score")),
        Some(serde_json::Value::String(raw)) => {
            state.store.update_grade_text(&student_id, &assignment_id, raw)
        }
        Some(v) => {
            let score = v.as_f64().unwrap_or(f64::NAN);
            state.store.update_grade(&student_id, &assignment_id, score)
        }
    };
    Ok(outcome_json(&outcome, &state.store))
}

fn gradebook_open(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let snap = state.store.snapshot();
    if snap.class(&class_id).is_none() {
        return Err(HandlerErr::not_found("class not found"));
    }
    Ok(json!(gradebook(&snap, &class_id)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.list" => Some(respond(req, grades_list(state, &req.params))),
        "grades.set" => Some(respond(req, grades_set(state, &req.params))),
        "gradebook.open" => Some(respond(req, gradebook_open(state, &req.params))),
        _ => None,
    }
}
