use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::dispatch::Severity;

mod alert_logic;

pub use alert_logic::GateDecision;

/// Mute window and cooldown bookkeeping shared between the polling loop and
/// the command handlers.
#[derive(Debug, Default)]
pub struct AlertGate {
    pub(crate) muted_until: Option<DateTime<Utc>>,
    pub(crate) last_mute_action_at: Option<DateTime<Utc>>,
    pub(crate) last_sent: Option<SentAlert>,
    pub(crate) suppressed: u64,
    pub(crate) dispatched: u64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SentAlert {
    pub(crate) at: Instant,
    pub(crate) severity: Severity,
}

#[derive(Debug, Clone)]
pub struct GateSnapshot {
    pub muted_until: Option<DateTime<Utc>>,
    pub last_severity: Option<Severity>,
    pub suppressed: u64,
    pub dispatched: u64,
}

impl AlertGate {
    pub fn is_muted_at(&self, now: DateTime<Utc>) -> bool {
        self.muted_until.is_some_and(|until| now < until)
    }

    pub(crate) fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            muted_until: self.muted_until,
            last_severity: self.last_sent.map(|sent| sent.severity),
            suppressed: self.suppressed,
            dispatched: self.dispatched,
        }
    }
}
