mod error;
mod handlers;
mod helpers;
mod output;
mod router;
mod types;

pub use error::{err, ok};
pub use output::Responder;
pub use router::handle_request;
pub use types::{AppState, Reply, Request};
