use serde::{Deserialize, Serialize};

use crate::detector::Verdict;
use crate::dispatch::{Alert, Severity};
use crate::monitor::MetricsSnapshot;

/// One journal line per dispatched alert.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AlertRecord {
    pub timestamp: String,
    pub severity: Severity,
    pub verdict: Verdict,
    pub score: f64,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    pub message: String,
}

impl AlertRecord {
    pub fn new(alert: &Alert, verdict: Verdict, score: f64, metrics: MetricsSnapshot) -> Self {
        Self {
            timestamp: alert.created_at.to_rfc3339(),
            severity: alert.severity,
            verdict,
            score,
            metrics,
            message: alert.message.clone(),
        }
    }
}
