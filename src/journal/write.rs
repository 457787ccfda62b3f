use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Datelike, Utc};
use file_rotate::{ContentLimit, FileRotate, compression::Compression, suffix::AppendCount};

use super::model::AlertRecord;
use super::paths::{AlertJournal, EVENTS_PREFIX};

impl AlertJournal {
    pub fn record(&self, record: &AlertRecord) -> Result<(), std::io::Error> {
        self.record_at(record, Utc::now())
    }

    pub(crate) fn record_at(
        &self,
        record: &AlertRecord,
        now: DateTime<Utc>,
    ) -> Result<(), std::io::Error> {
        if !self.enabled {
            return Ok(());
        }

        self.ensure_dirs()?;
        let file_name = format!(
            "{}{:04}-{:02}-{:02}.jsonl",
            EVENTS_PREFIX,
            now.year(),
            now.month(),
            now.day()
        );
        append_with_rotation(
            &self.events_dir.join(file_name),
            record,
            self.max_file_size_bytes,
            self.retention_days,
        )
    }
}

fn append_with_rotation(
    path: &Path,
    record: &AlertRecord,
    max_file_size_bytes: u64,
    retention_days: u16,
) -> Result<(), std::io::Error> {
    let max_bytes = usize::try_from(max_file_size_bytes).unwrap_or(usize::MAX);
    let mut writer = FileRotate::new(
        path,
        AppendCount::new(retention_days as usize),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        None,
    );

    let mut line = serde_json::to_vec(record).map_err(std::io::Error::other)?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()
}
