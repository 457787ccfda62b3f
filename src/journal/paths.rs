use std::fs;
use std::path::PathBuf;

use crate::config::Journal;

/// Append-only JSONL journal of dispatched alerts, one file per UTC day.
#[derive(Debug, Clone)]
pub struct AlertJournal {
    pub(crate) enabled: bool,
    pub(crate) events_dir: PathBuf,
    pub(crate) max_file_size_bytes: u64,
    pub(crate) retention_days: u16,
}

pub(crate) const EVENTS_PREFIX: &str = "alerts-";

impl AlertJournal {
    pub fn from_config(journal: &Journal) -> Self {
        Self {
            enabled: journal.enabled,
            events_dir: PathBuf::from(&journal.dir).join("alerts"),
            max_file_size_bytes: journal.max_file_size_bytes,
            retention_days: journal.retention_days,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        fs::create_dir_all(&self.events_dir)
    }
}
