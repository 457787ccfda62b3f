use std::{sync::Arc, time::Instant};

use chrono::Utc;
use tokio::sync::{Mutex, watch};

use crate::config::RuntimeConfig;
use crate::detector::{Classifier, OnlineScorer, Verdict};
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::journal::{AlertJournal, AlertRecord};

use super::super::{
    evaluator::{Breaches, compose_alert},
    history::CpuHistory,
    provider::{MetricsProvider, MonitorError},
    snapshot::SampledSnapshot,
    state::{AlertGate, GateDecision},
    status::{LoopPhase, MonitorStatus},
};

/// State owned by the polling task alone.
pub struct PollingState {
    pub history: CpuHistory,
    pub scorer: Box<dyn OnlineScorer>,
}

impl PollingState {
    pub fn new(history: CpuHistory, scorer: Box<dyn OnlineScorer>) -> Self {
        Self { history, scorer }
    }
}

/// Shared collaborators of one polling cycle.
#[derive(Clone)]
pub struct MonitorServices {
    pub classifier: Arc<dyn Classifier>,
    pub gate: Arc<Mutex<AlertGate>>,
    pub dispatcher: Arc<Dispatcher>,
    pub journal: AlertJournal,
    pub status: watch::Sender<MonitorStatus>,
    pub forecast_horizon: usize,
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub sampled: SampledSnapshot,
    pub verdict: Verdict,
    pub score: f64,
    pub gate: Option<GateDecision>,
    pub report: Option<DispatchReport>,
}

/// One poll: snapshot, classify, score, gate and dispatch.
pub async fn run_cycle<P: MetricsProvider>(
    services: &MonitorServices,
    state: &mut PollingState,
    provider: &mut P,
    runtime: &RuntimeConfig,
) -> Result<CycleOutcome, MonitorError> {
    services
        .status
        .send_modify(|status| status.phase = LoopPhase::Running);

    let sampled = provider.snapshot().await?;
    let snapshot = sampled.snapshot;
    let row = snapshot.to_row();

    state.history.push(snapshot.cpu_usage);
    let verdict = services.classifier.classify(&row);
    let score = state.scorer.learn_then_score(&row);
    let breaches = Breaches::evaluate(&snapshot, verdict, score, runtime);
    let cpu_mean = state.history.mean();
    let cpu_forecast = state.history.trend_forecast(services.forecast_horizon);

    tracing::info!(
        target: "monitor",
        module = "monitor",
        cpu = snapshot.cpu_usage,
        ram = snapshot.ram_usage,
        disk = snapshot.disk_usage,
        processes = snapshot.running_processes,
        gpu = snapshot.gpu_usage,
        temperature = snapshot.temperature,
        fallbacks = sampled.fallbacks.len(),
        verdict = verdict.as_str(),
        score = score,
        cpu_mean = cpu_mean,
        cpu_forecast = cpu_forecast,
        cpu_over = breaches.cpu,
        ram_over = breaches.ram,
        overload = breaches.overload,
        "monitor_metrics"
    );

    let mut outcome = CycleOutcome {
        sampled: sampled.clone(),
        verdict,
        score,
        gate: None,
        report: None,
    };

    let dispatched = match compose_alert(&snapshot, breaches, score, runtime) {
        Some(plan) => {
            let decision = {
                let mut gate = services.gate.lock().await;
                gate.admit(
                    plan.alert.severity,
                    runtime.alerts.cooldown_secs,
                    Utc::now(),
                    Instant::now(),
                )
            };
            outcome.gate = Some(decision);

            if decision.allows() {
                let report = services.dispatcher.dispatch(&plan).await;
                log::info!(
                    "alert_dispatched severity={} delivered={} failed={} queued={} dropped={}",
                    plan.alert.severity,
                    report.delivered.len(),
                    report.failed.len(),
                    report.queued.len(),
                    report.dropped.len()
                );

                let record = AlertRecord::new(&plan.alert, verdict, score, snapshot);
                if let Err(error) = services.journal.record(&record) {
                    log::warn!("journal_write_failed error={}", error);
                }

                outcome.report = Some(report);
                Some(plan.alert)
            } else {
                log::debug!(
                    "alert_suppressed severity={} decision={:?}",
                    plan.alert.severity,
                    decision
                );
                None
            }
        }
        None => None,
    };

    let warmup_left = state.scorer.warmup_remaining();
    let history_len = state.history.len();
    let history_capacity = state.history.capacity();
    services.status.send_modify(|status| {
        status.latest = Some(sampled);
        status.verdict = Some(verdict);
        status.score = score;
        status.breaches = Some(breaches);
        status.cpu_mean = cpu_mean;
        status.cpu_forecast = cpu_forecast;
        status.history_len = history_len;
        status.history_capacity = history_capacity;
        status.scorer_warmup_left = warmup_left;
        status.cycles += 1;
        if let Some(alert) = dispatched {
            status.push_alert(alert);
        }
    });

    Ok(outcome)
}
