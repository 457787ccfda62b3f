use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::model::AlertRecord;
use super::paths::{AlertJournal, EVENTS_PREFIX};

const CHUNK_SIZE: usize = 4096;

impl AlertJournal {
    /// Up to `limit` journaled alerts, newest first. Unreadable files and
    /// malformed lines are skipped.
    pub fn recent(&self, limit: usize) -> Vec<AlertRecord> {
        if !self.enabled || limit == 0 {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(limit);
        for file_path in newest_event_files(&self.events_dir) {
            let remaining = limit.saturating_sub(out.len());
            if remaining == 0 {
                break;
            }

            let Ok(lines) = read_tail_lines(&file_path, remaining) else {
                continue;
            };

            for line in lines.into_iter().rev() {
                let Ok(record) = serde_json::from_str::<AlertRecord>(&line) else {
                    continue;
                };
                out.push(record);
                if out.len() >= limit {
                    break;
                }
            }
        }

        out
    }
}

/// Journal files ordered newest first: by the day in the name, then with
/// the active file ahead of its rotated siblings.
fn newest_event_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files = entries
        .flatten()
        .map(|entry| entry.path())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            let rest = name.strip_prefix(EVENTS_PREFIX)?;
            let day = rest.get(0..10)?.to_string();
            let rotation = rest
                .strip_prefix(&format!("{}.jsonl", day))?
                .trim_start_matches('.')
                .parse::<u32>()
                .unwrap_or(0);
            Some((day, rotation, path))
        })
        .collect::<Vec<_>>();

    files.sort_by(|left, right| right.0.cmp(&left.0).then(left.1.cmp(&right.1)));
    files.into_iter().map(|(_, _, path)| path).collect()
}

fn read_tail_lines(path: &Path, max_lines: usize) -> Result<Vec<String>, std::io::Error> {
    let mut file = File::open(path)?;
    let file_len = file.seek(SeekFrom::End(0))?;
    if file_len == 0 || max_lines == 0 {
        return Ok(Vec::new());
    }

    let mut pos = file_len;
    let mut bytes = Vec::new();
    let mut newline_count = 0usize;

    while pos > 0 && newline_count <= max_lines {
        let read_size = CHUNK_SIZE.min(pos as usize);
        pos -= read_size as u64;

        file.seek(SeekFrom::Start(pos))?;
        let mut chunk = vec![0u8; read_size];
        file.read_exact(&mut chunk)?;

        newline_count += chunk.iter().filter(|&&byte| byte == b'\n').count();

        chunk.extend_from_slice(&bytes);
        bytes = chunk;
    }

    let mut lines = String::from_utf8_lossy(&bytes)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    if lines.len() > max_lines {
        lines.drain(0..(lines.len() - max_lines));
    }

    Ok(lines)
}
