//! Utilities module for logging, errors, and formatting helpers
//!
//! This module provides:
//! - Structured logging with tracing
//! - The crate error type
//! - Small number formatting helpers shared by the CLI and the pipeline

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{PlantDocError, Result};
pub use logging::{init_logging, LogConfig, LogLevel};

/// Convert a probability to a percentage rounded to two decimals
pub fn confidence_percent(confidence: f32) -> f64 {
    (confidence as f64 * 100.0 * 100.0).round() / 100.0
}

/// Format a latency in a human-readable way
pub fn format_latency(millis: f64) -> String {
    if millis < 1.0 {
        format!("{:.0}µs", millis * 1000.0)
    } else if millis < 1000.0 {
        format!("{:.1}ms", millis)
    } else {
        format!("{:.2}s", millis / 1000.0)
    }
}

/// Format a percentage with a progress bar
pub fn format_confidence_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let empty = width - filled;

    format!("[{}{}] {:.2}%", "█".repeat(filled), "░".repeat(empty), percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_percent_rounds_to_two_decimals() {
        assert_eq!(confidence_percent(0.5), 50.0);
        assert_eq!(confidence_percent(0.123456), 12.35);
        assert_eq!(confidence_percent(1.0), 100.0);
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(0.5), "500µs");
        assert_eq!(format_latency(42.34), "42.3ms");
        assert_eq!(format_latency(1500.0), "1.50s");
    }

    #[test]
    fn test_format_confidence_bar() {
        let bar = format_confidence_bar(50.0, 10);
        assert!(bar.contains("50.00%"));
        assert!(bar.contains("█████░░░░░"));
    }

    #[test]
    fn test_format_confidence_bar_clamps() {
        let bar = format_confidence_bar(150.0, 4);
        assert!(bar.starts_with("[████]"));
    }
}
