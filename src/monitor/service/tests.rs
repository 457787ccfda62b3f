use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tempfile::tempdir;
use tokio::sync::{Mutex, watch};

use crate::config::{Config, Journal, RuntimeConfig};
use crate::detector::{Classifier, FeatureLimits, HalfSpaceParams, HalfSpaceTrees, Verdict};
use crate::dispatch::{Alert, AlertSink, Dispatcher, SinkError, SinkWorkerPool};
use crate::journal::AlertJournal;
use crate::monitor::provider::MockMetricsProvider;
use crate::monitor::{AlertGate, CpuHistory, FeatureRow, GateDecision, MonitorStatus, SampledSnapshot};
use crate::monitor::MetricsSnapshot;

use super::mute::{mute_alerts_at, unmute_alerts_at};
use super::{MonitorServices, MuteActionError, PollingState, gate_snapshot, run_cycle};

struct FixedClassifier(Verdict);

impl Classifier for FixedClassifier {
    fn classify(&self, _row: &FeatureRow) -> Verdict {
        self.0
    }
}

#[derive(Default)]
struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl AlertSink for CollectingSink {
    fn name(&self) -> &'static str {
        "collect"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        self.messages.lock().await.push(alert.message.clone());
        Ok(())
    }
}

struct Harness {
    services: MonitorServices,
    state: PollingState,
    sink: Arc<CollectingSink>,
    status: watch::Receiver<MonitorStatus>,
    _journal_dir: tempfile::TempDir,
}

fn harness(verdict: Verdict) -> Harness {
    let journal_dir = tempdir().expect("tempdir should be created");
    let sink = Arc::new(CollectingSink::default());
    let dispatcher = Dispatcher::new(SinkWorkerPool::start(1, 4)).with_inline(sink.clone());
    let (status_tx, status_rx) = watch::channel(MonitorStatus::new(5));

    let services = MonitorServices {
        classifier: Arc::new(FixedClassifier(verdict)),
        gate: Arc::new(Mutex::new(AlertGate::default())),
        dispatcher: Arc::new(dispatcher),
        journal: AlertJournal::from_config(&Journal {
            enabled: true,
            dir: journal_dir.path().to_string_lossy().to_string(),
            max_file_size_bytes: 1024 * 1024,
            retention_days: 7,
        }),
        status: status_tx,
        forecast_horizon: 5,
    };
    let scorer = HalfSpaceTrees::new(
        HalfSpaceParams {
            trees: 5,
            height: 6,
            window_size: 250,
            seed: 42,
        },
        FeatureLimits::default(),
    );

    Harness {
        services,
        state: PollingState::new(CpuHistory::with_capacity(30), Box::new(scorer)),
        sink,
        status: status_rx,
        _journal_dir: journal_dir,
    }
}

fn sampled(cpu: f64, ram: f64) -> SampledSnapshot {
    SampledSnapshot::measured(MetricsSnapshot::from_row([
        cpu, ram, 50.0, 250.0, 1.0e6, 2.0e6, 0.0, 40.0,
    ]))
}

fn runtime() -> RuntimeConfig {
    RuntimeConfig::from_config(&Config::default())
}

#[tokio::test]
async fn anomalous_cycle_dispatches_journals_and_publishes() {
    let mut harness = harness(Verdict::Anomalous);
    let mut provider = MockMetricsProvider::new(vec![sampled(95.0, 50.0)]);

    let outcome = run_cycle(&harness.services, &mut harness.state, &mut provider, &runtime())
        .await
        .expect("cycle should succeed");

    assert_eq!(outcome.verdict, Verdict::Anomalous);
    assert_eq!(outcome.gate, Some(GateDecision::Send));
    assert_eq!(outcome.score, 0.0);

    let messages = harness.sink.messages.lock().await.clone();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Anomaly Detected! CPU: 95.0%, RAM: 50.0%"));
    assert!(messages[0].contains("Close unused applications"));
    assert!(!messages[0].contains("memory leaks"));

    let recent = harness.services.journal.recent(5);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].metrics.cpu_usage, 95.0);

    let status = harness.status.borrow_and_update().clone();
    assert_eq!(status.cycles, 1);
    assert_eq!(status.history_len, 1);
    assert_eq!(status.recent_alerts.len(), 1);
    assert_eq!(status.cpu_mean, 95.0);
    assert_eq!(status.scorer_warmup_left, 249);
}

#[tokio::test]
async fn normal_cycle_is_silent_but_updates_history() {
    let mut harness = harness(Verdict::Normal);
    let mut provider = MockMetricsProvider::new(vec![sampled(10.0, 20.0), sampled(30.0, 20.0)]);

    for _ in 0..2 {
        let outcome = run_cycle(&harness.services, &mut harness.state, &mut provider, &runtime())
            .await
            .expect("cycle should succeed");
        assert!(outcome.gate.is_none());
    }

    assert!(harness.sink.messages.lock().await.is_empty());
    assert_eq!(harness.state.history.values(), vec![10.0, 30.0]);
    assert_eq!(harness.status.borrow().cpu_mean, 20.0);
}

#[tokio::test]
async fn repeated_anomaly_respects_cooldown() {
    let mut harness = harness(Verdict::Anomalous);
    let mut provider = MockMetricsProvider::new(vec![sampled(20.0, 20.0), sampled(21.0, 20.0)]);

    run_cycle(&harness.services, &mut harness.state, &mut provider, &runtime())
        .await
        .expect("cycle should succeed");
    let second = run_cycle(&harness.services, &mut harness.state, &mut provider, &runtime())
        .await
        .expect("cycle should succeed");

    assert!(matches!(second.gate, Some(GateDecision::Cooldown { .. })));
    assert_eq!(harness.sink.messages.lock().await.len(), 1);
    assert_eq!(gate_snapshot(&harness.services.gate).await.suppressed, 1);
}

#[tokio::test]
async fn muted_gate_suppresses_dispatch() {
    let mut harness = harness(Verdict::Anomalous);
    let mut provider = MockMetricsProvider::new(vec![sampled(20.0, 20.0)]);
    mute_alerts_at(&harness.services.gate, ChronoDuration::minutes(10), Utc::now())
        .await
        .expect("mute should succeed");

    let outcome = run_cycle(&harness.services, &mut harness.state, &mut provider, &runtime())
        .await
        .expect("cycle should succeed");

    assert_eq!(outcome.gate, Some(GateDecision::Muted));
    assert!(harness.sink.messages.lock().await.is_empty());
    assert!(harness.services.journal.recent(5).is_empty());
}

#[tokio::test]
async fn provider_failure_is_returned_to_the_caller() {
    let mut harness = harness(Verdict::Anomalous);
    let mut provider = MockMetricsProvider::new(Vec::new());

    let result = run_cycle(&harness.services, &mut harness.state, &mut provider, &runtime()).await;
    assert!(result.is_err());
    assert!(harness.state.history.is_empty());
}

#[tokio::test]
async fn mute_unmute_contract_is_consistent() {
    let gate = Arc::new(Mutex::new(AlertGate::default()));
    let now = Utc::now();

    let muted_until = mute_alerts_at(&gate, ChronoDuration::minutes(10), now)
        .await
        .expect("mute should succeed");
    assert_eq!(gate_snapshot(&gate).await.muted_until, Some(muted_until));
    assert!(gate.lock().await.is_muted_at(now));

    unmute_alerts_at(&gate, now + ChronoDuration::seconds(11))
        .await
        .expect("unmute should succeed");
    assert_eq!(gate_snapshot(&gate).await.muted_until, None);
}

#[tokio::test]
async fn mute_unmute_has_short_cooldown() {
    let gate = Arc::new(Mutex::new(AlertGate::default()));
    let now = Utc::now();

    mute_alerts_at(&gate, ChronoDuration::minutes(1), now)
        .await
        .expect("first mute should succeed");

    let second = unmute_alerts_at(&gate, now + ChronoDuration::seconds(3)).await;
    assert_eq!(
        second,
        Err(MuteActionError::Cooldown {
            retry_after_secs: 7
        })
    );
}
