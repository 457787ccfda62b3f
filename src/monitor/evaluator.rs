use crate::config::{CpuBreachAction, RamBreachAction, RuntimeConfig};
use crate::detector::Verdict;
use crate::dispatch::{Alert, AlertPlan, Severity};
use crate::remediation::RemediationAction;

use super::snapshot::MetricsSnapshot;

pub(crate) const CRITICAL_LINE: &str = "Critical condition detected.";
pub(crate) const OVERLOAD_PHRASE: &str = "System overload predicted!";
pub(crate) const CPU_SUGGESTION: &str = "High CPU load. Suggestion: Close unused applications.";
pub(crate) const RAM_SUGGESTION: &str =
    "Memory pressure detected. Suggestion: Check for memory leaks.";
pub(crate) const RAM_SPOKEN_WARNING: &str = "Boss, memory leakage detected!";

/// Threshold checks for one cycle, kept apart from the message so the
/// status view can report them even when no alert goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breaches {
    pub anomalous: bool,
    pub overload: bool,
    pub cpu: bool,
    pub ram: bool,
}

impl Breaches {
    pub fn evaluate(
        snapshot: &MetricsSnapshot,
        verdict: Verdict,
        score: f64,
        runtime: &RuntimeConfig,
    ) -> Self {
        Self {
            anomalous: verdict.is_anomalous(),
            overload: score > runtime.alerts.overload_score,
            cpu: snapshot.cpu_usage > runtime.alerts.cpu,
            ram: snapshot.ram_usage > runtime.alerts.ram,
        }
    }

    pub fn severity(self) -> Severity {
        if self.overload || self.cpu {
            Severity::Critical
        } else if self.ram {
            Severity::Alert
        } else if self.anomalous {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}

/// Builds the alert for one cycle from its evaluated `breaches`, or `None`
/// when neither the offline verdict nor the online score calls for one.
pub(crate) fn compose_alert(
    snapshot: &MetricsSnapshot,
    breaches: Breaches,
    score: f64,
    runtime: &RuntimeConfig,
) -> Option<AlertPlan> {
    if !breaches.anomalous && !breaches.overload {
        return None;
    }

    let severity = breaches.severity();
    let mut lines = Vec::new();
    if severity == Severity::Critical {
        lines.push(CRITICAL_LINE.to_string());
    }
    if breaches.anomalous {
        lines.push(format!(
            "Anomaly Detected! CPU: {:.1}%, RAM: {:.1}%",
            snapshot.cpu_usage, snapshot.ram_usage
        ));
    }
    if breaches.overload {
        lines.push(format!("{} (score {:.2})", OVERLOAD_PHRASE, score));
    }

    let mut remediation = Vec::new();
    let mut forced_speech = None;

    if breaches.cpu {
        lines.push(CPU_SUGGESTION.to_string());
        if runtime.policy.cpu_breach == CpuBreachAction::KillHeavy {
            remediation.push(RemediationAction::KillHeavy {
                cpu_threshold: runtime.policy.kill_cpu_threshold,
            });
        }
    }

    if breaches.ram {
        lines.push(RAM_SUGGESTION.to_string());
        match runtime.policy.ram_breach {
            RamBreachAction::Notify => {}
            RamBreachAction::KillPrompt => remediation.push(RemediationAction::KillPrompt),
            RamBreachAction::Speak => forced_speech = Some(RAM_SPOKEN_WARNING.to_string()),
        }
    }

    let mut plan = AlertPlan::notify_only(Alert::new(lines.join("\n"), severity));
    plan.forced_speech = forced_speech;
    plan.remediation = remediation;
    Some(plan)
}
