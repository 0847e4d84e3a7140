use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::Request;
use crate::store::{parse_number, ClassroomStore, Outcome};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "not_found",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

/// Wraps a handler result into the response envelope.
pub fn respond(req: &Request, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Numeric field that may arrive as a JSON number or as text typed by the user.
/// Text that does not parse comes back as NaN so the store rejects it.
pub fn get_required_number(params: &serde_json::Value, key: &str) -> Result<f64, HandlerErr> {
    match params.get(key) {
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64().unwrap_or(f64::NAN)),
        Some(serde_json::Value::String(s)) => Ok(parse_number(s).unwrap_or(f64::NAN)),
        Some(_) => Ok(f64::NAN),
        None => Err(HandlerErr::bad_params(format!("missing {}", key))),
    }
}

pub fn get_string_list(params: &serde_json::Value, key: &str) -> Result<Vec<String>, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Ok(Vec::new());
    };
    if v.is_null() {
        return Ok(Vec::new());
    }
    if let Some(s) = v.as_str() {
        return Ok(s.split(',').map(|t| t.to_string()).collect());
    }
    let arr = v
        .as_array()
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a list of strings", key)))?;
    arr.iter()
        .map(|it| {
            it.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a list of strings", key)))
        })
        .collect()
}

pub fn outcome_json(outcome: &Outcome, store: &ClassroomStore) -> serde_json::Value {
    let mut v = json!({ "applied": outcome.applied() });
    match outcome {
        Outcome::Created(id) => v["id"] = json!(id),
        Outcome::Removed(n) => v["removed"] = json!(n),
        Outcome::Rejected(r) => v["reason"] = json!(r.reason()),
        Outcome::Inserted | Outcome::Updated => {}
    }
    if let Some(w) = store.persistence_warning() {
        v["warning"] = json!(w);
    }
    v
}
