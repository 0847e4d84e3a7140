use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::seed::Seeds;

pub const DEFAULT_FEEDBACK_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FEEDBACK_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_FEEDBACK_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Parser)]
#[command(name = "classroomd")]
#[command(about = "Classroom data store sidecar (newline-delimited JSON over stdio)")]
pub struct Cli {
    /// Workspace directory holding classroom.sqlite3
    #[arg(long, env = "CLASSROOMD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Start from empty collections instead of the sample roster
    #[arg(long)]
    pub empty_seed: bool,
}

impl Cli {
    pub fn seeds(&self) -> Seeds {
        if self.empty_seed {
            Seeds::empty()
        } else {
            Seeds::sample()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_FEEDBACK_MODEL.to_string(),
            base_url: DEFAULT_FEEDBACK_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_FEEDBACK_TIMEOUT_SECS),
        }
    }
}

impl FeedbackConfig {
    /// Reads `CLASSROOMD_FEEDBACK_*`, falling back to `GEMINI_API_KEY` / `API_KEY` for the key.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: non_empty("CLASSROOMD_FEEDBACK_API_KEY")
                .or_else(|| non_empty("GEMINI_API_KEY"))
                .or_else(|| non_empty("API_KEY")),
            model: non_empty("CLASSROOMD_FEEDBACK_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("CLASSROOMD_FEEDBACK_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: non_empty("CLASSROOMD_FEEDBACK_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}
