use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::detector::Verdict;
use crate::dispatch::Alert;

use super::{evaluator::Breaches, snapshot::SampledSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Starting,
    Running,
    Sleeping,
}

impl LoopPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopPhase::Starting => "starting",
            LoopPhase::Running => "running",
            LoopPhase::Sleeping => "sleeping",
        }
    }
}

/// Latest view of the polling loop, published on a watch channel.
#[derive(Debug, Clone)]
pub struct MonitorStatus {
    pub phase: LoopPhase,
    pub latest: Option<SampledSnapshot>,
    pub verdict: Option<Verdict>,
    pub score: f64,
    pub breaches: Option<Breaches>,
    pub cpu_mean: f64,
    pub cpu_forecast: f64,
    pub history_len: usize,
    pub history_capacity: usize,
    pub scorer_warmup_left: u32,
    pub last_tick: Option<DateTime<Utc>>,
    pub cycles: u64,
    pub failed_cycles: u64,
    pub recent_alerts: VecDeque<Alert>,
    recent_capacity: usize,
}

impl MonitorStatus {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            phase: LoopPhase::Starting,
            latest: None,
            verdict: None,
            score: 0.0,
            breaches: None,
            cpu_mean: 0.0,
            cpu_forecast: 0.0,
            history_len: 0,
            history_capacity: 0,
            scorer_warmup_left: 0,
            last_tick: None,
            cycles: 0,
            failed_cycles: 0,
            recent_alerts: VecDeque::with_capacity(recent_capacity.max(1)),
            recent_capacity: recent_capacity.max(1),
        }
    }

    pub fn push_alert(&mut self, alert: Alert) {
        if self.recent_alerts.len() == self.recent_capacity {
            self.recent_alerts.pop_front();
        }
        self.recent_alerts.push_back(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::{LoopPhase, MonitorStatus};
    use crate::dispatch::{Alert, Severity};

    #[test]
    fn recent_alerts_are_bounded() {
        let mut status = MonitorStatus::new(2);
        assert_eq!(status.phase, LoopPhase::Starting);

        for index in 0..3 {
            status.push_alert(Alert::new(format!("alert {}", index), Severity::Info));
        }

        let messages = status
            .recent_alerts
            .iter()
            .map(|alert| alert.message.as_str())
            .collect::<Vec<_>>();
        assert_eq!(messages, vec!["alert 1", "alert 2"]);
    }
}
