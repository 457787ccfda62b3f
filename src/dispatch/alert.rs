use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::remediation::RemediationAction;

pub const ALERT_TITLE: &str = "PC Doctor Alert!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Alert,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Alert => "alert",
            Severity::Critical => "critical",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Info => "ℹ️",
            Severity::Warning => "⚠️",
            Severity::Alert => "🚨",
            Severity::Critical => "🔥",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: ALERT_TITLE.to_string(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        }
    }

    /// Messages naming a critical condition or an anomaly also go to the
    /// blocking modal sink.
    pub fn wants_modal(&self) -> bool {
        self.message.contains("Critical") || self.message.contains("Anomaly")
    }

    pub fn wants_speech(&self) -> bool {
        self.message.contains("High") || self.message.contains("Critical")
    }
}

/// An alert plus everything the dispatcher should do with it beyond the
/// keyword routing.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPlan {
    pub alert: Alert,
    /// Phrase spoken even when the message carries no speech keyword.
    pub forced_speech: Option<String>,
    pub remediation: Vec<RemediationAction>,
}

impl AlertPlan {
    pub fn notify_only(alert: Alert) -> Self {
        Self {
            alert,
            forced_speech: None,
            remediation: Vec::new(),
        }
    }

    pub fn speech_text(&self) -> Option<String> {
        if let Some(phrase) = &self.forced_speech {
            return Some(phrase.clone());
        }
        self.alert
            .wants_speech()
            .then(|| self.alert.message.clone())
    }
}
