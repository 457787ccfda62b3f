use tokio::time::{Duration, interval};

use crate::journal::AlertJournal;

const MAINTENANCE_INTERVAL_SECS: u64 = 3600;

pub(super) fn start_maintenance_job(journal: AlertJournal) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(MAINTENANCE_INTERVAL_SECS));

        loop {
            ticker.tick().await;
            journal.run_maintenance();
        }
    });
}
