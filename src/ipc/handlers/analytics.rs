use crate::calc::{
    average_band, class_series, dashboard, format_average, global_series, series_trend,
    student_average, student_average_in_class, student_series,
};
use crate::ipc::helpers::{get_optional_str, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::today;
use serde_json::json;

fn analytics_series(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let snap = state.store.snapshot();
    let (scope, series) = match (
        get_optional_str(params, "studentId"),
        get_optional_str(params, "classId"),
    ) {
        (Some(student_id), _) => ("student", student_series(&snap, &student_id)),
        (None, Some(class_id)) => ("class", class_series(&snap, &class_id)),
        (None, None) => ("global", global_series(&snap)),
    };
    let trend = series_trend(&series);
    Ok(json!({
        "scope": scope,
        "points": series,
        "trend": trend,
    }))
}

fn analytics_student_average(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let snap = state.store.snapshot();
    let avg = match get_optional_str(params, "classId") {
        Some(class_id) => student_average_in_class(&snap, &student_id, &class_id),
        None => student_average(&snap, &student_id),
    };
    Ok(json!({
        "studentId": student_id,
        "average": format_average(avg),
        "band": average_band(avg),
    }))
}

fn analytics_dashboard(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_optional_str(params, "date").unwrap_or_else(today);
    Ok(json!(dashboard(&state.store.snapshot(), &date)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.series" => Some(respond(req, analytics_series(state, &req.params))),
        "analytics.studentAverage" => {
            Some(respond(req, analytics_student_average(state, &req.params)))
        }
        "analytics.dashboard" => Some(respond(req, analytics_dashboard(state, &req.params))),
        _ => None,
    }
}
