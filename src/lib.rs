pub mod backup;
pub mod calc;
pub mod config;
pub mod db;
pub mod feedback;
pub mod gemini;
pub mod ipc;
pub mod logging;
pub mod model;
pub mod seed;
pub mod store;
