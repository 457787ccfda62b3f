use std::sync::Arc;

use tokio::sync::{Mutex, Notify, RwLock, Semaphore, watch};

use crate::capabilities::Capabilities;
use crate::config::{Config, RuntimeConfig};
use crate::journal::AlertJournal;
use crate::monitor::{AlertGate, MonitorStatus};

#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub config_path: String,
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    pub runtime_update_notify: Arc<Notify>,
    pub gate: Arc<Mutex<AlertGate>>,
    pub status_tx: watch::Sender<MonitorStatus>,
    pub journal: AlertJournal,
    pub capabilities: Capabilities,
    pub command_slots: Arc<Semaphore>,
}

impl AppContext {
    pub fn new(
        config: Config,
        command_concurrency: usize,
        config_path: String,
        capabilities: Capabilities,
    ) -> Self {
        let runtime_config = RuntimeConfig::from_config(&config);
        let (status_tx, _) = watch::channel(MonitorStatus::new(config.alerts.recent_capacity));
        let journal = AlertJournal::from_config(&config.journal);

        Self {
            config,
            config_path,
            runtime_config: Arc::new(RwLock::new(runtime_config)),
            runtime_update_notify: Arc::new(Notify::new()),
            gate: Arc::new(Mutex::new(AlertGate::default())),
            status_tx,
            journal,
            capabilities,
            command_slots: Arc::new(Semaphore::new(command_concurrency.max(1))),
        }
    }

    /// Latest status published by the polling loop.
    pub fn status(&self) -> MonitorStatus {
        self.status_tx.borrow().clone()
    }

    pub async fn update_runtime_config(&self, runtime_config: RuntimeConfig) {
        {
            let mut guard = self.runtime_config.write().await;
            *guard = runtime_config;
        }
        self.runtime_update_notify.notify_waiters();
    }
}
