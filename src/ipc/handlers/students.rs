use crate::ipc::helpers::{get_optional_str, get_required_str, outcome_json, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use serde_json::json;

fn students_list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let snap = state.store.snapshot();
    let students: Vec<&Student> = match get_optional_str(params, "classId") {
        Some(class_id) => snap.students_in_class(&class_id).collect(),
        None => snap.students.iter().collect(),
    };
    Ok(json!({ "students": students }))
}

fn students_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let class_id = get_required_str(params, "classId")?;
    let email = get_optional_str(params, "email").unwrap_or_default();
    let outcome = state.store.add_student(&name, &email, &class_id);
    Ok(outcome_json(&outcome, &state.store))
}

fn students_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let outcome = state.store.delete_student(&student_id);
    Ok(outcome_json(&outcome, &state.store))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(respond(req, students_list(state, &req.params))),
        "students.create" => Some(respond(req, students_create(state, &req.params))),
        "students.delete" => Some(respond(req, students_delete(state, &req.params))),
        _ => None,
    }
}
