use std::sync::Arc;

use futures::FutureExt;

use crate::remediation::Remediator;

use super::{
    alert::{Alert, AlertPlan},
    sinks::AlertSink,
    worker::SinkWorkerPool,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub delivered: Vec<&'static str>,
    pub failed: Vec<&'static str>,
    pub queued: Vec<&'static str>,
    pub dropped: Vec<&'static str>,
}

struct SpeechLane {
    sink: Arc<dyn AlertSink>,
    pool: SinkWorkerPool,
}

/// Fans an alert out to the configured sinks. Inline sinks are awaited in
/// order. Modal and remediation jobs go to the shared worker pool; speech
/// has a pool of its own so a dialog left open never holds back an
/// utterance.
pub struct Dispatcher {
    inline: Vec<Arc<dyn AlertSink>>,
    modal: Option<Arc<dyn AlertSink>>,
    speech: Option<SpeechLane>,
    remediator: Option<Arc<Remediator>>,
    pool: SinkWorkerPool,
}

impl Dispatcher {
    pub fn new(pool: SinkWorkerPool) -> Self {
        Self {
            inline: Vec::new(),
            modal: None,
            speech: None,
            remediator: None,
            pool,
        }
    }

    pub fn with_inline(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.inline.push(sink);
        self
    }

    pub fn with_modal(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.modal = Some(sink);
        self
    }

    pub fn with_speech(mut self, sink: Arc<dyn AlertSink>, pool: SinkWorkerPool) -> Self {
        self.speech = Some(SpeechLane { sink, pool });
        self
    }

    pub fn with_remediator(mut self, remediator: Remediator) -> Self {
        self.remediator = Some(Arc::new(remediator));
        self
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.inline
            .iter()
            .chain(self.modal.iter())
            .chain(self.speech.iter().map(|lane| &lane.sink))
            .map(|sink| sink.name())
            .collect()
    }

    pub async fn dispatch(&self, plan: &AlertPlan) -> DispatchReport {
        let mut report = DispatchReport::default();
        let alert = &plan.alert;

        for sink in &self.inline {
            match sink.deliver(alert).await {
                Ok(()) => report.delivered.push(sink.name()),
                Err(error) => {
                    log::warn!(
                        "sink_delivery_failed sink={} severity={} error={}",
                        sink.name(),
                        alert.severity,
                        error
                    );
                    report.failed.push(sink.name());
                }
            }
        }

        if let Some(sink) = &self.modal
            && alert.wants_modal()
        {
            queue_delivery(&self.pool, Arc::clone(sink), alert.clone(), &mut report);
        }

        if let Some(lane) = &self.speech
            && let Some(text) = plan.speech_text()
        {
            let spoken = Alert {
                message: text,
                ..alert.clone()
            };
            queue_delivery(&lane.pool, Arc::clone(&lane.sink), spoken, &mut report);
        }

        if let Some(remediator) = &self.remediator {
            for action in plan.remediation.iter().copied() {
                let remediator = Arc::clone(remediator);
                let name = action.job_name();
                let queued = self
                    .pool
                    .submit(name, async move { remediator.run(action).await }.boxed());
                record_submission(&mut report, name, queued);
            }
        }

        report
    }
}

fn queue_delivery(
    pool: &SinkWorkerPool,
    sink: Arc<dyn AlertSink>,
    alert: Alert,
    report: &mut DispatchReport,
) {
    let name = sink.name();
    let queued = pool.submit(
        name,
        async move {
            if let Err(error) = sink.deliver(&alert).await {
                log::warn!(
                    "sink_delivery_failed sink={} severity={} error={}",
                    sink.name(),
                    alert.severity,
                    error
                );
            }
        }
        .boxed(),
    );
    record_submission(report, name, queued);
}

fn record_submission(report: &mut DispatchReport, name: &'static str, queued: bool) {
    if queued {
        report.queued.push(name);
    } else {
        report.dropped.push(name);
    }
}

#[cfg(test)]
mod tests;
