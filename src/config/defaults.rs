use super::schema::{
    Alerts, Config, CpuBreachAction, Fallbacks, Journal, ModelConfig, OnlineScorerConfig, Policy,
    RamBreachAction, Simulation, Sinks, Telegram,
};

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_poll_interval_secs() -> u64 {
    5
}

pub(super) fn default_cpu_sample_window_ms() -> u64 {
    1000
}

pub(super) fn default_history_capacity() -> usize {
    30
}

pub(super) fn default_forecast_horizon() -> usize {
    5
}

pub(super) fn default_seed() -> u64 {
    42
}

pub(super) fn default_model_path() -> String {
    "anomaly_model.json".to_string()
}

pub(super) fn default_model_trees() -> usize {
    100
}

pub(super) fn default_model_sample_size() -> usize {
    256
}

pub(super) fn default_model_contamination() -> f64 {
    0.05
}

pub(super) fn default_online_trees() -> usize {
    10
}

pub(super) fn default_online_height() -> u32 {
    8
}

pub(super) fn default_online_window_size() -> u32 {
    250
}

pub(super) fn default_alert_cpu() -> f64 {
    90.0
}

pub(super) fn default_alert_ram() -> f64 {
    80.0
}

pub(super) fn default_overload_score() -> f64 {
    0.8
}

pub(super) fn default_cooldown_secs() -> u64 {
    60
}

pub(super) fn default_recent_capacity() -> usize {
    20
}

pub(super) fn default_cpu_breach_action() -> CpuBreachAction {
    CpuBreachAction::Notify
}

pub(super) fn default_ram_breach_action() -> RamBreachAction {
    RamBreachAction::Notify
}

pub(super) fn default_kill_cpu_threshold() -> f64 {
    90.0
}

pub(super) fn default_speech_command() -> String {
    "spd-say".to_string()
}

pub(super) fn default_dialog_command() -> String {
    "zenity".to_string()
}

pub(super) fn default_command_timeout_secs() -> u64 {
    30
}

pub(super) fn default_dialog_timeout_secs() -> u64 {
    300
}

pub(super) fn default_workers() -> usize {
    2
}

pub(super) fn default_queue_capacity() -> usize {
    32
}

pub(super) fn default_fallback_temperature() -> f64 {
    40.0
}

pub(super) fn default_journal_dir() -> String {
    "logs".to_string()
}

pub(super) fn default_journal_max_file_size_bytes() -> u64 {
    10 * 1024 * 1024
}

pub(super) fn default_journal_retention_days() -> u16 {
    7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            cpu_sample_window_ms: default_cpu_sample_window_ms(),
            history_capacity: default_history_capacity(),
            forecast_horizon: default_forecast_horizon(),
            model: ModelConfig::default(),
            online: OnlineScorerConfig::default(),
            alerts: Alerts::default(),
            policy: Policy::default(),
            sinks: Sinks::default(),
            fallbacks: Fallbacks::default(),
            journal: Journal::default(),
            simulation: Simulation::default(),
            telegram: Telegram::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            trees: default_model_trees(),
            sample_size: default_model_sample_size(),
            contamination: default_model_contamination(),
            seed: default_seed(),
        }
    }
}

impl Default for OnlineScorerConfig {
    fn default() -> Self {
        Self {
            trees: default_online_trees(),
            height: default_online_height(),
            window_size: default_online_window_size(),
            seed: default_seed(),
        }
    }
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            cpu: default_alert_cpu(),
            ram: default_alert_ram(),
            overload_score: default_overload_score(),
            cooldown_secs: default_cooldown_secs(),
            recent_capacity: default_recent_capacity(),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            cpu_breach: default_cpu_breach_action(),
            ram_breach: default_ram_breach_action(),
            kill_cpu_threshold: default_kill_cpu_threshold(),
        }
    }
}

impl Default for Sinks {
    fn default() -> Self {
        Self {
            desktop: true,
            speech: true,
            dialog: false,
            speech_command: default_speech_command(),
            dialog_command: default_dialog_command(),
            command_timeout_secs: default_command_timeout_secs(),
            dialog_timeout_secs: default_dialog_timeout_secs(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            temperature: default_fallback_temperature(),
            gpu_usage: 0.0,
        }
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_journal_dir(),
            max_file_size_bytes: default_journal_max_file_size_bytes(),
            retention_days: default_journal_retention_days(),
        }
    }
}
