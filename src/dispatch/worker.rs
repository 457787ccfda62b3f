use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::{Mutex, mpsc};

struct Job {
    name: &'static str,
    task: BoxFuture<'static, ()>,
}

/// Fixed set of tasks draining a bounded job queue. Submission never waits:
/// a full queue drops the job.
#[derive(Clone)]
pub struct SinkWorkerPool {
    sender: mpsc::Sender<Job>,
}

impl SinkWorkerPool {
    pub fn start(workers: usize, queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        for worker_id in 0..workers.max(1) {
            let receiver = Arc::clone(&receiver);
            tokio::spawn(async move {
                loop {
                    let job = {
                        let mut receiver = receiver.lock().await;
                        receiver.recv().await
                    };
                    let Some(job) = job else {
                        break;
                    };

                    log::debug!("sink_job_started worker={} job={}", worker_id, job.name);
                    job.task.await;
                }
            });
        }

        Self { sender }
    }

    /// Queues `task`; returns `false` when the queue is full or closed.
    pub fn submit(&self, name: &'static str, task: BoxFuture<'static, ()>) -> bool {
        match self.sender.try_send(Job { name, task }) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("sink_job_dropped job={} reason=queue_full", name);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::warn!("sink_job_dropped job={} reason=pool_closed", name);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use futures::FutureExt;
    use tokio::sync::{Notify, oneshot};
    use tokio::time::{Duration, timeout};

    use super::SinkWorkerPool;

    #[tokio::test]
    async fn submitted_jobs_run_on_workers() {
        let pool = SinkWorkerPool::start(2, 8);
        let counter = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = oneshot::channel();

        let first = Arc::clone(&counter);
        assert!(pool.submit(
            "count",
            async move {
                first.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        ));
        let second = Arc::clone(&counter);
        assert!(pool.submit(
            "count_and_signal",
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                second.fetch_add(1, Ordering::SeqCst);
                let _ = done_tx.send(());
            }
            .boxed()
        ));

        timeout(Duration::from_secs(2), done_rx)
            .await
            .expect("job should finish")
            .expect("signal should arrive");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn full_queue_drops_jobs() {
        let pool = SinkWorkerPool::start(1, 1);
        let gate = Arc::new(Notify::new());
        let (started_tx, started_rx) = oneshot::channel();

        let blocker = Arc::clone(&gate);
        assert!(pool.submit(
            "blocker",
            async move {
                let _ = started_tx.send(());
                blocker.notified().await;
            }
            .boxed()
        ));
        started_rx.await.expect("blocker should start");

        assert!(pool.submit("queued", async {}.boxed()));
        assert!(!pool.submit("dropped", async {}.boxed()));

        gate.notify_one();
    }
}
