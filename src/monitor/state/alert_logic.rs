use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::dispatch::Severity;

use super::{AlertGate, SentAlert};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Send,
    Muted,
    Cooldown { remaining_secs: u64 },
}

impl GateDecision {
    pub fn allows(self) -> bool {
        matches!(self, GateDecision::Send)
    }
}

impl AlertGate {
    /// Decides whether an alert of `severity` may be dispatched now. A more
    /// severe alert than the last one sent ignores the cooldown; the mute
    /// window suppresses everything.
    pub(crate) fn admit(
        &mut self,
        severity: Severity,
        cooldown_secs: u64,
        wall_now: DateTime<Utc>,
        now: Instant,
    ) -> GateDecision {
        if self.is_muted_at(wall_now) {
            self.suppressed += 1;
            return GateDecision::Muted;
        }

        if let Some(last) = self.last_sent
            && severity <= last.severity
        {
            let elapsed = now.saturating_duration_since(last.at).as_secs();
            if elapsed < cooldown_secs {
                self.suppressed += 1;
                return GateDecision::Cooldown {
                    remaining_secs: cooldown_secs - elapsed,
                };
            }
        }

        self.last_sent = Some(SentAlert { at: now, severity });
        self.dispatched += 1;
        GateDecision::Send
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use chrono::{Duration as ChronoDuration, Utc};

    use super::GateDecision;
    use crate::dispatch::Severity;
    use crate::monitor::AlertGate;

    #[test]
    fn cooldown_suppresses_repeats_until_it_expires() {
        let mut gate = AlertGate::default();
        let start = Instant::now();
        let wall = Utc::now();

        assert_eq!(gate.admit(Severity::Warning, 60, wall, start), GateDecision::Send);
        assert_eq!(
            gate.admit(Severity::Warning, 60, wall, start + Duration::from_secs(20)),
            GateDecision::Cooldown { remaining_secs: 40 }
        );
        assert_eq!(
            gate.admit(Severity::Info, 60, wall, start + Duration::from_secs(30)),
            GateDecision::Cooldown { remaining_secs: 30 }
        );
        assert_eq!(
            gate.admit(Severity::Warning, 60, wall, start + Duration::from_secs(61)),
            GateDecision::Send
        );
        assert_eq!(gate.snapshot().suppressed, 2);
        assert_eq!(gate.snapshot().dispatched, 2);
    }

    #[test]
    fn escalation_bypasses_cooldown() {
        let mut gate = AlertGate::default();
        let start = Instant::now();
        let wall = Utc::now();

        assert!(gate.admit(Severity::Warning, 300, wall, start).allows());
        assert!(
            gate.admit(Severity::Critical, 300, wall, start + Duration::from_secs(5))
                .allows()
        );
        assert!(
            !gate
                .admit(Severity::Critical, 300, wall, start + Duration::from_secs(10))
                .allows()
        );
        assert_eq!(gate.snapshot().last_severity, Some(Severity::Critical));
    }

    #[test]
    fn mute_window_suppresses_everything() {
        let mut gate = AlertGate::default();
        let wall = Utc::now();
        gate.muted_until = Some(wall + ChronoDuration::minutes(5));

        assert_eq!(
            gate.admit(Severity::Critical, 0, wall, Instant::now()),
            GateDecision::Muted
        );
        assert!(
            gate.admit(
                Severity::Critical,
                0,
                wall + ChronoDuration::minutes(6),
                Instant::now()
            )
            .allows()
        );
    }

    #[test]
    fn zero_cooldown_never_suppresses() {
        let mut gate = AlertGate::default();
        let now = Instant::now();
        let wall = Utc::now();
        assert!(gate.admit(Severity::Info, 0, wall, now).allows());
        assert!(gate.admit(Severity::Info, 0, wall, now).allows());
    }
}
