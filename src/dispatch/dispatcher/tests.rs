use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep, timeout};

use crate::dispatch::{Alert, AlertPlan, AlertSink, Severity, SinkError, SinkWorkerPool};
use crate::system::CommandError;

use super::Dispatcher;

struct RecordingSink {
    name: &'static str,
    fail: bool,
    received: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn new(name: &'static str, fail: bool) -> (Arc<Self>, Arc<Mutex<Vec<String>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::new(Self {
            name,
            fail,
            received: Arc::clone(&received),
        });
        (sink, received)
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        self.received.lock().await.push(alert.message.clone());
        if self.fail {
            return Err(SinkError::Command(CommandError::Timeout {
                cmd: self.name.to_string(),
                timeout_secs: 1,
            }));
        }
        Ok(())
    }
}

async fn wait_for_messages(received: &Arc<Mutex<Vec<String>>>, count: usize) -> Vec<String> {
    timeout(Duration::from_secs(2), async {
        loop {
            {
                let messages = received.lock().await;
                if messages.len() >= count {
                    return messages.clone();
                }
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("queued sink should receive the alert")
}

#[tokio::test]
async fn failing_sink_does_not_block_remaining_sinks() {
    let (broken, broken_seen) = RecordingSink::new("broken", true);
    let (healthy, healthy_seen) = RecordingSink::new("healthy", false);
    let dispatcher = Dispatcher::new(SinkWorkerPool::start(1, 4))
        .with_inline(broken)
        .with_inline(healthy);

    let plan = AlertPlan::notify_only(Alert::new("Anomaly Detected!", Severity::Warning));
    let report = dispatcher.dispatch(&plan).await;

    assert_eq!(report.failed, vec!["broken"]);
    assert_eq!(report.delivered, vec!["healthy"]);
    assert_eq!(broken_seen.lock().await.len(), 1);
    assert_eq!(
        *healthy_seen.lock().await,
        vec!["Anomaly Detected!".to_string()]
    );
}

#[tokio::test]
async fn keywords_route_to_modal_and_speech() {
    let (modal, modal_seen) = RecordingSink::new("dialog", false);
    let (speech, speech_seen) = RecordingSink::new("speech", false);
    let dispatcher = Dispatcher::new(SinkWorkerPool::start(2, 4))
        .with_modal(modal)
        .with_speech(speech, SinkWorkerPool::start(1, 4));

    let message = "Critical condition\nHigh CPU load. Suggestion: Close unused applications.";
    let report = dispatcher
        .dispatch(&AlertPlan::notify_only(Alert::new(message, Severity::Critical)))
        .await;

    assert_eq!(report.queued, vec!["dialog", "speech"]);
    assert_eq!(wait_for_messages(&modal_seen, 1).await, vec![message.to_string()]);
    assert_eq!(wait_for_messages(&speech_seen, 1).await, vec![message.to_string()]);
}

#[tokio::test]
async fn plain_message_skips_modal_and_speech() {
    let (modal, modal_seen) = RecordingSink::new("dialog", false);
    let (speech, speech_seen) = RecordingSink::new("speech", false);
    let dispatcher = Dispatcher::new(SinkWorkerPool::start(1, 4))
        .with_modal(modal)
        .with_speech(speech, SinkWorkerPool::start(1, 4));

    let report = dispatcher
        .dispatch(&AlertPlan::notify_only(Alert::new(
            "System overload predicted!",
            Severity::Info,
        )))
        .await;

    assert!(report.queued.is_empty());
    sleep(Duration::from_millis(30)).await;
    assert!(modal_seen.lock().await.is_empty());
    assert!(speech_seen.lock().await.is_empty());
}

#[tokio::test]
async fn forced_speech_uses_the_configured_phrase() {
    let (speech, speech_seen) = RecordingSink::new("speech", false);
    let dispatcher = Dispatcher::new(SinkWorkerPool::start(1, 4))
        .with_speech(speech, SinkWorkerPool::start(1, 4));

    let plan = AlertPlan {
        alert: Alert::new("Memory pressure detected.", Severity::Alert),
        forced_speech: Some("Boss, memory leakage detected!".to_string()),
        remediation: Vec::new(),
    };
    dispatcher.dispatch(&plan).await;

    assert_eq!(
        wait_for_messages(&speech_seen, 1).await,
        vec!["Boss, memory leakage detected!".to_string()]
    );
}

struct SlowSink {
    name: &'static str,
    hold: Duration,
}

#[async_trait]
impl AlertSink for SlowSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn deliver(&self, _alert: &Alert) -> Result<(), SinkError> {
        sleep(self.hold).await;
        Ok(())
    }
}

#[tokio::test]
async fn open_dialogs_do_not_delay_speech() {
    let modal = Arc::new(SlowSink {
        name: "dialog",
        hold: Duration::from_secs(5),
    });
    let (speech, speech_seen) = RecordingSink::new("speech", false);
    let dispatcher = Dispatcher::new(SinkWorkerPool::start(2, 8))
        .with_modal(modal)
        .with_speech(speech, SinkWorkerPool::start(1, 8));

    let message = "Critical condition\nHigh CPU load.";
    for _ in 0..3 {
        let report = dispatcher
            .dispatch(&AlertPlan::notify_only(Alert::new(message, Severity::Critical)))
            .await;
        assert_eq!(report.queued, vec!["dialog", "speech"]);
    }

    assert_eq!(wait_for_messages(&speech_seen, 3).await.len(), 3);
}
