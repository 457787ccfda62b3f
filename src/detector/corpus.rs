//! Labeled CSV corpora used to train the offline model.
//!
//! The first line is a header. Columns are matched to features by name, so
//! their order does not matter; a `state` label column and any other
//! unknown column are ignored.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::monitor::{FEATURE_COUNT, FEATURE_NAMES, FeatureRow, Metric, MetricsSnapshot};

pub const LABEL_COLUMN: &str = "state";

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write corpus {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("corpus {path} has no header row")]
    MissingHeader { path: String },
    #[error("corpus {path} is missing column {column}")]
    MissingColumn { path: String, column: &'static str },
    #[error("corpus {path} line {line}: {column} value {value:?} is not a number")]
    InvalidCell {
        path: String,
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("corpus {path} line {line}: expected at least {expected} cells, found {found}")]
    ShortRow {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },
}

pub fn read_corpus(path: impl AsRef<Path>) -> Result<Vec<FeatureRow>, CorpusError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path_str.clone(),
        source,
    })?;
    parse_corpus(&raw, &path_str)
}

fn parse_corpus(raw: &str, path: &str) -> Result<Vec<FeatureRow>, CorpusError> {
    let mut lines = raw
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(CorpusError::MissingHeader {
            path: path.to_string(),
        });
    };

    let header = header.split(',').map(str::trim).collect::<Vec<_>>();
    let mut positions = [0usize; FEATURE_COUNT];
    for metric in Metric::ALL {
        positions[metric.index()] = header
            .iter()
            .position(|column| *column == metric.name())
            .ok_or(CorpusError::MissingColumn {
                path: path.to_string(),
                column: metric.name(),
            })?;
    }
    let needed = positions.iter().copied().max().unwrap_or(0) + 1;

    let mut rows = Vec::new();
    for (index, line) in lines {
        let line_number = index + 1;
        let cells = line.split(',').map(str::trim).collect::<Vec<_>>();
        if cells.len() < needed {
            return Err(CorpusError::ShortRow {
                path: path.to_string(),
                line: line_number,
                expected: needed,
                found: cells.len(),
            });
        }

        let mut row = [0.0; FEATURE_COUNT];
        for metric in Metric::ALL {
            let cell = cells[positions[metric.index()]];
            row[metric.index()] = cell
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| CorpusError::InvalidCell {
                    path: path.to_string(),
                    line: line_number,
                    column: metric.name(),
                    value: cell.to_string(),
                })?;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Appends snapshots to a labeled corpus, writing the header first when the
/// file is new or empty.
pub fn append_corpus(
    path: impl AsRef<Path>,
    label: &str,
    snapshots: &[MetricsSnapshot],
) -> Result<(), CorpusError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let write_error = |source| CorpusError::Write {
        path: path_str.clone(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let needs_header = fs::metadata(path).map(|meta| meta.len() == 0).unwrap_or(true);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_error)?;

    let mut body = String::new();
    if needs_header {
        body.push_str(&FEATURE_NAMES.join(","));
        body.push(',');
        body.push_str(LABEL_COLUMN);
        body.push('\n');
    }
    for snapshot in snapshots {
        let cells = snapshot
            .to_row()
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>();
        body.push_str(&cells.join(","));
        body.push(',');
        body.push_str(label);
        body.push('\n');
    }

    file.write_all(body.as_bytes()).map_err(write_error)
}
