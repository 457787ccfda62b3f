use std::path::Path;

use super::{schema::Config, validate::ConfigError};

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_str.clone(),
        source,
    })?;
    parse_config(&raw, &path_str)
}

/// Loads the config file when present; a missing file yields the defaults.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        log::warn!(
            "config_missing path={} using=defaults",
            path.display()
        );
        let config = Config::default();
        config.validate()?;
        return Ok(config);
    }

    load_config(path)
}

fn parse_config(raw: &str, path: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{load_config, load_config_or_default};
    use crate::config::{ConfigError, CpuBreachAction, RamBreachAction};

    #[test]
    fn empty_file_yields_documented_defaults() {
        let temp = tempdir().expect("tempdir should be created");
        let path = temp.path().join("config.toml");
        fs::write(&path, "").expect("config should be written");

        let config = load_config(&path).expect("empty config should load");
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.history_capacity, 30);
        assert_eq!(config.alerts.cpu, 90.0);
        assert_eq!(config.alerts.ram, 80.0);
        assert_eq!(config.alerts.overload_score, 0.8);
        assert_eq!(config.fallbacks.temperature, 40.0);
        assert_eq!(config.policy.ram_breach, RamBreachAction::Notify);
        assert!(!config.telegram.enabled);
    }

    #[test]
    fn policy_actions_parse_from_snake_case() {
        let temp = tempdir().expect("tempdir should be created");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"poll_interval_secs = 3

[policy]
cpu_breach = "kill_heavy"
ram_breach = "kill_prompt"
kill_cpu_threshold = 95.0

[sinks]
dialog = true
speech = false
"#,
        )
        .expect("config should be written");

        let config = load_config(&path).expect("config should load");
        assert_eq!(config.poll_interval_secs, 3);
        assert_eq!(config.policy.cpu_breach, CpuBreachAction::KillHeavy);
        assert_eq!(config.policy.ram_breach, RamBreachAction::KillPrompt);
        assert!(config.sinks.dialog);
        assert!(!config.sinks.speech);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp = tempdir().expect("tempdir should be created");
        let path = temp.path().join("config.toml");

        for (body, expected) in [
            ("poll_interval_secs = 0", "poll_interval_secs"),
            ("[alerts]\ncpu = 120.0", "alerts.cpu"),
            ("[alerts]\noverload_score = 1.5", "alerts.overload_score"),
            ("[model]\ncontamination = 0.9", "model.contamination"),
            ("[telegram]\nenabled = true\nbot_token = \"t\"", "telegram.owner_id"),
        ] {
            fs::write(&path, body).expect("config should be written");
            let error = load_config(&path).expect_err("config should be rejected");
            assert!(
                matches!(&error, ConfigError::Validation(message) if message.contains(expected)),
                "unexpected error for {:?}: {}",
                body,
                error
            );
        }
    }

    #[test]
    fn unknown_enum_value_is_a_parse_error() {
        let temp = tempdir().expect("tempdir should be created");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[policy]\nram_breach = \"reboot\"").expect("config should be written");

        let error = load_config(&path).expect_err("config should be rejected");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn example_config_matches_defaults() {
        let config = super::parse_config(include_str!("../../config.example.toml"), "example")
            .expect("example config should be valid");
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.online.window_size, 250);
        assert_eq!(config.sinks.queue_capacity, 32);
        assert_eq!(config.journal.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.policy.cpu_breach, CpuBreachAction::Notify);
        assert!(!config.telegram.enabled);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp = tempdir().expect("tempdir should be created");
        let config = load_config_or_default(temp.path().join("absent.toml"))
            .expect("defaults should be valid");
        assert_eq!(config.model.path, "anomaly_model.json");
    }
}
