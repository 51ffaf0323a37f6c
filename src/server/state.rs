//! Application state for the diagnosis server
//!
//! Everything here is read-only after startup, so handlers share it through
//! a plain `Arc` with no locks; the engine inside `Diagnoser` does its own
//! serialization.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::catalog::Locale;
use crate::config::AppConfig;
use crate::pipeline::Diagnoser;

/// Shared application state
pub struct AppState {
    /// Loaded model and catalogs
    pub diagnoser: Arc<Diagnoser>,
    /// Locale used when a request names none
    pub default_locale: Locale,
    /// Limit on one request's inference
    pub inference_timeout: Option<Duration>,
    /// Wall-clock start time, reported by /health
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl AppState {
    pub fn new(diagnoser: Diagnoser, config: &AppConfig) -> Self {
        Self {
            diagnoser: Arc::new(diagnoser),
            default_locale: config.locale.default,
            inference_timeout: config.server.inference_timeout(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
