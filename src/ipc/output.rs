use std::io::Write;
use std::sync::{Arc, Mutex};

/// Shared line writer for responses. Worker threads answer deferred requests
/// through a clone of the same handle, so lines never interleave.
#[derive(Clone)]
pub struct Responder {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Responder {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Writes one response line and flushes. Write errors are logged and dropped.
    pub fn send(&self, resp: &serde_json::Value) {
        let line = serde_json::to_string(resp).unwrap_or_else(|_| "{\"ok\":false}".to_string());
        let mut out = match self.out.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write response");
        }
    }
}
