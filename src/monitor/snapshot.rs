use std::fmt;

use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 8;

/// Column order shared by the model artifact, the training corpora and the
/// online scorer.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "cpu_usage",
    "ram_usage",
    "disk_usage",
    "running_processes",
    "network_sent",
    "network_recv",
    "gpu_usage",
    "temperature",
];

pub type FeatureRow = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CpuUsage,
    RamUsage,
    DiskUsage,
    RunningProcesses,
    NetworkSent,
    NetworkRecv,
    GpuUsage,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; FEATURE_COUNT] = [
        Metric::CpuUsage,
        Metric::RamUsage,
        Metric::DiskUsage,
        Metric::RunningProcesses,
        Metric::NetworkSent,
        Metric::NetworkRecv,
        Metric::GpuUsage,
        Metric::Temperature,
    ];

    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    pub fn index(self) -> usize {
        match self {
            Metric::CpuUsage => 0,
            Metric::RamUsage => 1,
            Metric::DiskUsage => 2,
            Metric::RunningProcesses => 3,
            Metric::NetworkSent => 4,
            Metric::NetworkRecv => 5,
            Metric::GpuUsage => 6,
            Metric::Temperature => 7,
        }
    }

    pub fn is_percentage(self) -> bool {
        matches!(
            self,
            Metric::CpuUsage | Metric::RamUsage | Metric::DiskUsage | Metric::GpuUsage
        )
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.name() == name.trim())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One consistent set of readings. Built once per poll and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub cpu_usage: f64,
    pub ram_usage: f64,
    pub disk_usage: f64,
    pub running_processes: f64,
    pub network_sent: f64,
    pub network_recv: f64,
    pub gpu_usage: f64,
    pub temperature: f64,
}

impl MetricsSnapshot {
    /// Builds a snapshot from raw values, clamping each into its documented
    /// bounds. Non-finite values collapse to 0.
    pub fn from_row(row: FeatureRow) -> Self {
        let value = |metric: Metric| sanitize(metric, row[metric.index()]);
        Self {
            cpu_usage: value(Metric::CpuUsage),
            ram_usage: value(Metric::RamUsage),
            disk_usage: value(Metric::DiskUsage),
            running_processes: value(Metric::RunningProcesses),
            network_sent: value(Metric::NetworkSent),
            network_recv: value(Metric::NetworkRecv),
            gpu_usage: value(Metric::GpuUsage),
            temperature: value(Metric::Temperature),
        }
    }

    pub fn to_row(&self) -> FeatureRow {
        [
            self.cpu_usage,
            self.ram_usage,
            self.disk_usage,
            self.running_processes,
            self.network_sent,
            self.network_recv,
            self.gpu_usage,
            self.temperature,
        ]
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.to_row()[metric.index()]
    }
}

fn sanitize(metric: Metric, value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }

    if metric.is_percentage() {
        value.clamp(0.0, 100.0)
    } else {
        value.max(0.0)
    }
}

/// A snapshot together with the metrics that carry a fallback constant
/// instead of a measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledSnapshot {
    pub snapshot: MetricsSnapshot,
    pub fallbacks: Vec<Metric>,
}

impl SampledSnapshot {
    pub fn measured(snapshot: MetricsSnapshot) -> Self {
        Self {
            snapshot,
            fallbacks: Vec::new(),
        }
    }

    pub fn used_fallback(&self, metric: Metric) -> bool {
        self.fallbacks.contains(&metric)
    }
}

/// Result of a single sub-reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Measured(f64),
    Fallback(f64),
}

impl Reading {
    pub fn from_option(value: Option<f64>, fallback: f64) -> Self {
        match value {
            Some(value) if value.is_finite() => Reading::Measured(value),
            _ => Reading::Fallback(fallback),
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Reading::Measured(value) | Reading::Fallback(value) => value,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Reading::Fallback(_))
    }
}

/// Collects per-metric readings and remembers which ones fell back.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    row: FeatureRow,
    fallbacks: Vec<Metric>,
}

impl SnapshotBuilder {
    pub fn set(&mut self, metric: Metric, reading: Reading) -> &mut Self {
        self.row[metric.index()] = reading.value();
        if reading.is_fallback() && !self.fallbacks.contains(&metric) {
            self.fallbacks.push(metric);
        }
        self
    }

    pub fn build(&self) -> SampledSnapshot {
        SampledSnapshot {
            snapshot: MetricsSnapshot::from_row(self.row),
            fallbacks: self.fallbacks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FEATURE_NAMES, Metric, MetricsSnapshot, Reading, SnapshotBuilder};

    #[test]
    fn from_row_clamps_every_field_into_bounds() {
        let snapshot = MetricsSnapshot::from_row([
            140.0,
            -3.0,
            f64::NAN,
            -1.0,
            5_000.0,
            f64::INFINITY,
            101.0,
            -12.0,
        ]);

        for metric in Metric::ALL {
            let value = snapshot.get(metric);
            assert!(value.is_finite(), "{} should be finite", metric);
            assert!(value >= 0.0, "{} should be non-negative", metric);
            if metric.is_percentage() {
                assert!(value <= 100.0, "{} should be at most 100", metric);
            }
        }
        assert_eq!(snapshot.cpu_usage, 100.0);
        assert_eq!(snapshot.network_sent, 5_000.0);
        assert_eq!(snapshot.network_recv, 0.0);
    }

    #[test]
    fn metric_index_matches_feature_names() {
        for (index, name) in FEATURE_NAMES.iter().enumerate() {
            let metric = Metric::from_name(name).expect("every feature name maps to a metric");
            assert_eq!(metric.index(), index);
        }
        assert!(Metric::from_name("state").is_none());
    }

    #[test]
    fn builder_tracks_fallback_readings() {
        let mut builder = SnapshotBuilder::default();
        builder
            .set(Metric::CpuUsage, Reading::Measured(12.5))
            .set(Metric::Temperature, Reading::from_option(None, 40.0))
            .set(Metric::GpuUsage, Reading::Fallback(0.0));

        let sampled = builder.build();
        assert_eq!(sampled.snapshot.cpu_usage, 12.5);
        assert_eq!(sampled.snapshot.temperature, 40.0);
        assert!(sampled.used_fallback(Metric::Temperature));
        assert!(sampled.used_fallback(Metric::GpuUsage));
        assert!(!sampled.used_fallback(Metric::CpuUsage));
    }
}
