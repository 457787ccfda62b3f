use teloxide::types::{ChatId, UserId};
use thiserror::Error;

use super::schema::Config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Validation(String),
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(invalid("poll_interval_secs must be greater than 0"));
        }
        if self.cpu_sample_window_ms == 0 || self.cpu_sample_window_ms > 10_000 {
            return Err(invalid(
                "cpu_sample_window_ms must be between 1 and 10000",
            ));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity must be greater than 0"));
        }
        if self.forecast_horizon == 0 {
            return Err(invalid("forecast_horizon must be greater than 0"));
        }

        if self.model.path.trim().is_empty() {
            return Err(invalid("model.path must not be empty"));
        }
        if self.model.trees == 0 {
            return Err(invalid("model.trees must be greater than 0"));
        }
        if self.model.sample_size < 2 {
            return Err(invalid("model.sample_size must be at least 2"));
        }
        if !(self.model.contamination > 0.0 && self.model.contamination <= 0.5) {
            return Err(invalid("model.contamination must be in (0, 0.5]"));
        }

        if self.online.trees == 0 {
            return Err(invalid("online.trees must be greater than 0"));
        }
        if !(1..=16).contains(&self.online.height) {
            return Err(invalid("online.height must be between 1 and 16"));
        }
        if self.online.window_size == 0 {
            return Err(invalid("online.window_size must be greater than 0"));
        }

        validate_percentage("alerts.cpu", self.alerts.cpu)?;
        validate_percentage("alerts.ram", self.alerts.ram)?;
        if self.alerts.overload_score.is_nan() || !(0.0..=1.0).contains(&self.alerts.overload_score)
        {
            return Err(invalid("alerts.overload_score must be between 0 and 1"));
        }
        if self.alerts.recent_capacity == 0 {
            return Err(invalid("alerts.recent_capacity must be greater than 0"));
        }

        if self.policy.kill_cpu_threshold.is_nan() || self.policy.kill_cpu_threshold <= 0.0 {
            return Err(invalid("policy.kill_cpu_threshold must be greater than 0"));
        }

        if self.sinks.workers == 0 {
            return Err(invalid("sinks.workers must be greater than 0"));
        }
        if self.sinks.queue_capacity == 0 {
            return Err(invalid("sinks.queue_capacity must be greater than 0"));
        }
        if self.sinks.command_timeout_secs == 0 || self.sinks.dialog_timeout_secs == 0 {
            return Err(invalid("sinks timeouts must be greater than 0"));
        }
        for (enabled, field, command) in [
            (self.sinks.speech, "sinks.speech_command", &self.sinks.speech_command),
            (self.sinks.dialog, "sinks.dialog_command", &self.sinks.dialog_command),
        ] {
            if enabled && command.trim().is_empty() {
                return Err(invalid(format!(
                    "{} must not be empty when the sink is enabled",
                    field
                )));
            }
        }

        if !self.fallbacks.temperature.is_finite() || self.fallbacks.temperature < 0.0 {
            return Err(invalid("fallbacks.temperature must be a non-negative number"));
        }
        validate_percentage("fallbacks.gpu_usage", self.fallbacks.gpu_usage)?;

        if self.journal.enabled && self.journal.dir.trim().is_empty() {
            return Err(invalid(
                "journal.dir must not be empty when journal.enabled is true",
            ));
        }
        if self.journal.max_file_size_bytes == 0 {
            return Err(invalid("journal.max_file_size_bytes must be greater than 0"));
        }
        if self.journal.retention_days == 0 {
            return Err(invalid("journal.retention_days must be greater than 0"));
        }

        if self.telegram.enabled {
            if self.telegram.bot_token.trim().is_empty() {
                return Err(invalid(
                    "telegram.bot_token must not be empty when telegram.enabled is true",
                ));
            }
            self.owner_chat_id()?;
        }

        Ok(())
    }

    pub fn owner_chat_id(&self) -> Result<ChatId, ConfigError> {
        if self.telegram.owner_id == 0 {
            return Err(invalid("telegram.owner_id must be a positive integer"));
        }

        let chat_id = i64::try_from(self.telegram.owner_id)
            .map_err(|_| invalid("telegram.owner_id is too large to fit Telegram chat id"))?;
        Ok(ChatId(chat_id))
    }

    pub fn owner_user_id(&self) -> Result<UserId, ConfigError> {
        if self.telegram.owner_id == 0 {
            return Err(invalid("telegram.owner_id must be a positive integer"));
        }

        Ok(UserId(self.telegram.owner_id))
    }
}

fn validate_percentage(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_nan() || !(0.0..=100.0).contains(&value) {
        return Err(invalid(format!("{} must be between 0 and 100", field)));
    }
    Ok(())
}
