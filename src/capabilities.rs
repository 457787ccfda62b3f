use std::env;
use std::path::Path;
use std::process::Command;

use crate::config::Sinks;

/// Presentation and sensor tools found on this host at startup.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub has_notification_bus: bool,
    pub has_speech: bool,
    pub has_dialog: bool,
    pub has_nvidia_smi: bool,
}

impl Capabilities {
    pub fn detect(sinks: &Sinks) -> Self {
        Self {
            has_notification_bus: session_bus_available(),
            has_speech: command_exists(&sinks.speech_command),
            has_dialog: command_exists(&sinks.dialog_command),
            has_nvidia_smi: command_exists("nvidia-smi"),
        }
    }
}

pub fn log_capability_warnings(capabilities: &Capabilities, sinks: &Sinks) {
    if sinks.desktop && !capabilities.has_notification_bus {
        log::warn!("capability_degraded feature=desktop_toast reason=dbus_session_unavailable");
    }

    if sinks.speech && !capabilities.has_speech {
        log::warn!(
            "capability_degraded feature=speech reason={}_unavailable",
            sinks.speech_command
        );
    }

    if sinks.dialog && !capabilities.has_dialog {
        log::warn!(
            "capability_degraded feature=modal_dialog reason={}_unavailable",
            sinks.dialog_command
        );
    }

    if !capabilities.has_nvidia_smi {
        log::info!("capability_degraded feature=gpu_usage reason=nvidia-smi_unavailable fallback=0");
    }
}

/// Desktop notifications go over the D-Bus session bus.
fn session_bus_available() -> bool {
    if env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some() {
        return true;
    }
    env::var_os("XDG_RUNTIME_DIR")
        .map(|dir| Path::new(&dir).join("bus").exists())
        .unwrap_or(false)
}

fn command_exists(command: &str) -> bool {
    if command.trim().is_empty() {
        return false;
    }

    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {} >/dev/null 2>&1", command))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::command_exists;

    #[test]
    fn shell_is_always_detected() {
        assert!(command_exists("sh"));
    }

    #[test]
    fn blank_and_unknown_commands_are_missing() {
        assert!(!command_exists("   "));
        assert!(!command_exists("pc-doctor-no-such-tool"));
    }
}
