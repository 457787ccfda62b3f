use std::path::Path;
use std::time::Duration;

use sysinfo::{ComponentExt, CpuExt, DiskExt, NetworkExt, NetworksExt, System, SystemExt};
use thiserror::Error;

use crate::config::{Config, Fallbacks};
use crate::system::run_cmd_checked;

use super::snapshot::{Metric, Reading, SampledSnapshot, SnapshotBuilder};

const GPU_QUERY_TIMEOUT_SECS: u64 = 5;
const TEMPERATURE_LABEL_HINTS: [&str; 5] = ["package", "tctl", "cpu", "core", "k10temp"];

#[derive(Debug, Error, Clone)]
#[error("metrics provider failed: {message}")]
pub struct MonitorError {
    message: String,
}

impl MonitorError {
    #[cfg(test)]
    pub(crate) fn exhausted() -> Self {
        Self {
            message: "mock snapshots exhausted".to_string(),
        }
    }
}

pub trait MetricsProvider {
    /// Takes one snapshot. Unavailable sub-readings are replaced by their
    /// fallback constant instead of failing the call.
    async fn snapshot(&mut self) -> Result<SampledSnapshot, MonitorError>;
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub cpu_sample_window: Duration,
    pub fallbacks: Fallbacks,
    pub gpu_probe: bool,
}

impl ProviderSettings {
    pub fn from_config(config: &Config, gpu_probe: bool) -> Self {
        Self {
            cpu_sample_window: Duration::from_millis(config.cpu_sample_window_ms),
            fallbacks: config.fallbacks.clone(),
            gpu_probe,
        }
    }
}

pub enum ActiveMetricsProvider {
    Real(Box<RealMetricsProvider>),
    Simulated(SimulatedMetricsProvider),
}

impl ActiveMetricsProvider {
    pub fn new(simulation_enabled: bool, settings: ProviderSettings) -> Self {
        if simulation_enabled {
            Self::Simulated(SimulatedMetricsProvider::new())
        } else {
            Self::Real(Box::new(RealMetricsProvider::new(settings)))
        }
    }
}

impl MetricsProvider for ActiveMetricsProvider {
    async fn snapshot(&mut self) -> Result<SampledSnapshot, MonitorError> {
        match self {
            ActiveMetricsProvider::Real(provider) => provider.snapshot().await,
            ActiveMetricsProvider::Simulated(provider) => provider.snapshot().await,
        }
    }
}

pub struct RealMetricsProvider {
    system: System,
    settings: ProviderSettings,
}

impl RealMetricsProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        let mut system = System::new();
        system.refresh_disks_list();
        system.refresh_networks_list();
        system.refresh_components_list();
        Self { system, settings }
    }

    async fn cpu_usage(&mut self) -> f64 {
        self.system.refresh_cpu();
        tokio::time::sleep(self.settings.cpu_sample_window).await;
        self.system.refresh_cpu();
        f64::from(self.system.global_cpu_info().cpu_usage())
    }

    fn ram_usage(&self) -> Option<f64> {
        let total = self.system.total_memory() as f64;
        (total > 0.0).then(|| self.system.used_memory() as f64 / total * 100.0)
    }

    fn disk_usage(&self) -> Option<f64> {
        self.system
            .disks()
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
            .or_else(|| self.system.disks().first())
            .and_then(|disk| {
                let total = disk.total_space() as f64;
                let used = disk.total_space().saturating_sub(disk.available_space()) as f64;
                (total > 0.0).then_some(used / total * 100.0)
            })
    }

    fn network_totals(&self) -> (f64, f64) {
        self.system
            .networks()
            .iter()
            .filter(|(name, _)| name.as_str() != "lo")
            .fold((0.0, 0.0), |(sent, recv), (_, data)| {
                (
                    sent + data.total_transmitted() as f64,
                    recv + data.total_received() as f64,
                )
            })
    }

    fn temperature(&self) -> Option<f64> {
        let readings = self
            .system
            .components()
            .iter()
            .map(|component| (component.label().to_lowercase(), component.temperature()))
            .filter(|(_, celsius)| celsius.is_finite() && *celsius > 0.0)
            .collect::<Vec<_>>();

        readings
            .iter()
            .filter(|(label, _)| TEMPERATURE_LABEL_HINTS.iter().any(|hint| label.contains(hint)))
            .chain(readings.iter())
            .map(|(_, celsius)| f64::from(*celsius))
            .next()
    }

    async fn gpu_usage(&self) -> Option<f64> {
        if !self.settings.gpu_probe {
            return None;
        }

        let output = run_cmd_checked(
            "nvidia-smi",
            &["--query-gpu=utilization.gpu", "--format=csv,noheader,nounits"],
            GPU_QUERY_TIMEOUT_SECS,
        )
        .await
        .map_err(|error| log::debug!("gpu_probe_failed error={}", error))
        .ok()?;

        parse_gpu_utilization(&output.stdout)
    }
}

/// Averages the per-GPU utilisation lines printed by `nvidia-smi`.
fn parse_gpu_utilization(stdout: &str) -> Option<f64> {
    let values = stdout
        .lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .collect::<Vec<_>>();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

impl MetricsProvider for RealMetricsProvider {
    async fn snapshot(&mut self) -> Result<SampledSnapshot, MonitorError> {
        let cpu = self.cpu_usage().await;

        self.system.refresh_memory();
        self.system.refresh_disks();
        self.system.refresh_networks();
        self.system.refresh_components();
        self.system.refresh_processes();

        let (sent, recv) = self.network_totals();
        let gpu = self.gpu_usage().await;
        let fallbacks = &self.settings.fallbacks;

        let mut builder = SnapshotBuilder::default();
        builder
            .set(Metric::CpuUsage, Reading::Measured(cpu))
            .set(Metric::RamUsage, Reading::from_option(self.ram_usage(), 0.0))
            .set(Metric::DiskUsage, Reading::from_option(self.disk_usage(), 0.0))
            .set(
                Metric::RunningProcesses,
                Reading::Measured(self.system.processes().len() as f64),
            )
            .set(Metric::NetworkSent, Reading::Measured(sent))
            .set(Metric::NetworkRecv, Reading::Measured(recv))
            .set(
                Metric::GpuUsage,
                Reading::from_option(gpu, fallbacks.gpu_usage),
            )
            .set(
                Metric::Temperature,
                Reading::from_option(self.temperature(), fallbacks.temperature),
            );

        Ok(builder.build())
    }
}

/// Deterministic load pattern with periodic spikes, for running without
/// touching the host.
pub struct SimulatedMetricsProvider {
    tick: u64,
}

impl SimulatedMetricsProvider {
    pub fn new() -> Self {
        Self { tick: 0 }
    }
}

impl MetricsProvider for SimulatedMetricsProvider {
    async fn snapshot(&mut self) -> Result<SampledSnapshot, MonitorError> {
        self.tick = self.tick.saturating_add(1);
        let phase = self.tick as f64 / 8.0;

        let mut cpu = 35.0 + phase.sin() * 15.0;
        let mut ram = 50.0 + (phase * 0.7).sin() * 10.0;
        let disk = 60.0 + (phase * 0.2).sin() * 5.0;
        let mut processes = 220.0 + (phase * 0.5).sin() * 20.0;
        let sent = 1.0e6 * self.tick as f64;
        let recv = 2.5e6 * self.tick as f64;
        let gpu = 10.0 + (phase * 0.3).sin().abs() * 10.0;
        let mut temperature = 45.0 + (phase * 0.4).sin() * 5.0;

        if self.tick.is_multiple_of(30) {
            cpu = 96.0;
            processes += 300.0;
            temperature = 88.0;
        }

        if self.tick.is_multiple_of(47) {
            ram = 93.0;
        }

        let mut builder = SnapshotBuilder::default();
        for (metric, value) in [
            (Metric::CpuUsage, cpu),
            (Metric::RamUsage, ram),
            (Metric::DiskUsage, disk),
            (Metric::RunningProcesses, processes.round()),
            (Metric::NetworkSent, sent),
            (Metric::NetworkRecv, recv),
            (Metric::GpuUsage, gpu),
            (Metric::Temperature, temperature),
        ] {
            builder.set(metric, Reading::Measured(value));
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
pub(crate) struct MockMetricsProvider {
    sequence: Vec<SampledSnapshot>,
}

#[cfg(test)]
impl MockMetricsProvider {
    pub(crate) fn new(sequence: Vec<SampledSnapshot>) -> Self {
        Self { sequence }
    }
}

#[cfg(test)]
impl MetricsProvider for MockMetricsProvider {
    async fn snapshot(&mut self) -> Result<SampledSnapshot, MonitorError> {
        if self.sequence.is_empty() {
            return Err(MonitorError::exhausted());
        }

        Ok(self.sequence.remove(0))
    }
}
