use std::fs;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};

use super::paths::{AlertJournal, EVENTS_PREFIX};

impl AlertJournal {
    pub fn run_maintenance(&self) {
        if !self.enabled {
            return;
        }

        if let Err(error) = self.ensure_dirs() {
            log::warn!("journal_maintenance_failed reason=create_dir error={}", error);
            return;
        }

        let removed = self.prune_older_than(Utc::now());
        if removed > 0 {
            log::info!("journal_maintenance_done removed_files={}", removed);
        }
    }

    /// Deletes day files older than the retention window. Returns how many
    /// files were removed.
    pub(crate) fn prune_older_than(&self, now: DateTime<Utc>) -> usize {
        let Ok(entries) = fs::read_dir(&self.events_dir) else {
            return 0;
        };

        let today = now.date_naive();
        let keep_for = ChronoDuration::days(i64::from(self.retention_days));
        let mut removed = 0;

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };

            let Some(date_part) = file_name
                .strip_prefix(EVENTS_PREFIX)
                .and_then(|tail| tail.get(0..10))
            else {
                continue;
            };

            let Ok(file_date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") else {
                continue;
            };

            if today.signed_duration_since(file_date) <= keep_for {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    log::info!("journal_file_removed path={}", path.display());
                    removed += 1;
                }
                Err(error) => {
                    log::warn!(
                        "journal_file_remove_failed path={} error={}",
                        path.display(),
                        error
                    );
                }
            }
        }

        removed
    }
}
