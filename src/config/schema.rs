use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_cpu_sample_window_ms")]
    pub cpu_sample_window_ms: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon: usize,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub online: OnlineScorerConfig,
    #[serde(default)]
    pub alerts: Alerts,
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub sinks: Sinks,
    #[serde(default)]
    pub fallbacks: Fallbacks,
    #[serde(default)]
    pub journal: Journal,
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub telegram: Telegram,
}

/// Subset of the config that may change while the monitor is running.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub poll_interval_secs: u64,
    pub alerts: Alerts,
    pub policy: Policy,
}

impl RuntimeConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval_secs: config.poll_interval_secs,
            alerts: config.alerts.clone(),
            policy: config.policy.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
    #[serde(default = "default_model_trees")]
    pub trees: usize,
    #[serde(default = "default_model_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_model_contamination")]
    pub contamination: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnlineScorerConfig {
    #[serde(default = "default_online_trees")]
    pub trees: usize,
    #[serde(default = "default_online_height")]
    pub height: u32,
    #[serde(default = "default_online_window_size")]
    pub window_size: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Alerts {
    #[serde(default = "default_alert_cpu")]
    pub cpu: f64,
    #[serde(default = "default_alert_ram")]
    pub ram: f64,
    #[serde(default = "default_overload_score")]
    pub overload_score: f64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuBreachAction {
    Notify,
    KillHeavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RamBreachAction {
    Notify,
    KillPrompt,
    Speak,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Policy {
    #[serde(default = "default_cpu_breach_action")]
    pub cpu_breach: CpuBreachAction,
    #[serde(default = "default_ram_breach_action")]
    pub ram_breach: RamBreachAction,
    #[serde(default = "default_kill_cpu_threshold")]
    pub kill_cpu_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sinks {
    #[serde(default = "default_true")]
    pub desktop: bool,
    #[serde(default = "default_true")]
    pub speech: bool,
    #[serde(default)]
    pub dialog: bool,
    #[serde(default = "default_speech_command")]
    pub speech_command: String,
    #[serde(default = "default_dialog_command")]
    pub dialog_command: String,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default = "default_dialog_timeout_secs")]
    pub dialog_timeout_secs: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fallbacks {
    #[serde(default = "default_fallback_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub gpu_usage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Journal {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_journal_dir")]
    pub dir: String,
    #[serde(default = "default_journal_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_journal_retention_days")]
    pub retention_days: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Simulation {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Telegram {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub owner_id: u64,
}
