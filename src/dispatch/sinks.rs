use async_trait::async_trait;
#[cfg(all(unix, not(target_os = "macos")))]
use notify_rust::Urgency;
use notify_rust::{Notification, Timeout};
use teloxide::{prelude::*, types::ParseMode};
use thiserror::Error;

use crate::commands::as_html_block;
use crate::config::Sinks;
use crate::system::{CommandError, run_cmd};

use super::alert::{Alert, Severity};

const APP_NAME: &str = "PC Doctor";
const TOAST_TIMEOUT_MS: u32 = 3000;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("{sink} exited with status {status}")]
    Rejected { sink: &'static str, status: i32 },
    #[error("desktop notification failed: {0}")]
    Notification(#[from] notify_rust::error::Error),
    #[error("sink task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("telegram delivery failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Best-effort presentation channel for one alert.
#[async_trait]
pub trait AlertSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError>;
}

/// Desktop toast over the notification D-Bus service.
#[derive(Debug, Default)]
pub struct DesktopSink;

impl DesktopSink {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn urgency(severity: Severity) -> Urgency {
    match severity {
        Severity::Info => Urgency::Low,
        Severity::Warning | Severity::Alert => Urgency::Normal,
        Severity::Critical => Urgency::Critical,
    }
}

fn show_toast(title: &str, message: &str, severity: Severity) -> Result<(), SinkError> {
    let mut notification = Notification::new();
    notification
        .appname(APP_NAME)
        .summary(title)
        .body(message)
        .timeout(Timeout::Milliseconds(TOAST_TIMEOUT_MS));
    #[cfg(all(unix, not(target_os = "macos")))]
    notification.urgency(urgency(severity));
    #[cfg(not(all(unix, not(target_os = "macos"))))]
    let _ = severity;

    notification.show()?;
    Ok(())
}

#[async_trait]
impl AlertSink for DesktopSink {
    fn name(&self) -> &'static str {
        "desktop"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        let title = alert.title.clone();
        let message = alert.message.clone();
        let severity = alert.severity;
        tokio::task::spawn_blocking(move || show_toast(&title, &message, severity)).await?
    }
}

pub struct SpeechSink {
    command: String,
    timeout_secs: u64,
}

impl SpeechSink {
    pub fn new(sinks: &Sinks) -> Self {
        Self {
            command: sinks.speech_command.clone(),
            timeout_secs: sinks.command_timeout_secs,
        }
    }
}

/// Collapses a multi-line alert into one utterance.
pub(crate) fn spoken_text(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

#[async_trait]
impl AlertSink for SpeechSink {
    fn name(&self) -> &'static str {
        "speech"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        let text = spoken_text(&alert.message);
        let output = run_cmd(&self.command, &["--wait", &text], self.timeout_secs).await?;
        if !output.success() {
            return Err(SinkError::Rejected {
                sink: self.name(),
                status: output.status,
            });
        }
        Ok(())
    }
}

/// Blocking modal dialog. Runs until the user closes it or the dialog
/// times out, so it is only ever driven from the worker pool.
pub struct DialogSink {
    command: String,
    timeout_secs: u64,
}

impl DialogSink {
    pub fn new(sinks: &Sinks) -> Self {
        Self {
            command: sinks.dialog_command.clone(),
            timeout_secs: sinks.dialog_timeout_secs,
        }
    }
}

// zenity: 0 = ok, 1 = closed, 5 = timed out
const DIALOG_ACCEPTED_STATUSES: [i32; 3] = [0, 1, 5];

#[async_trait]
impl AlertSink for DialogSink {
    fn name(&self) -> &'static str {
        "dialog"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        let kind = if alert.severity == Severity::Critical {
            "--error"
        } else {
            "--warning"
        };
        let dialog_timeout = self.timeout_secs.to_string();
        let output = run_cmd(
            &self.command,
            &[
                kind,
                "--title",
                &alert.title,
                "--text",
                &alert.message,
                "--timeout",
                &dialog_timeout,
            ],
            self.timeout_secs.saturating_add(5),
        )
        .await?;

        if !DIALOG_ACCEPTED_STATUSES.contains(&output.status) {
            return Err(SinkError::Rejected {
                sink: self.name(),
                status: output.status,
            });
        }
        Ok(())
    }
}

pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSink {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        let title = format!("{} {}", alert.severity.icon(), alert.title);
        self.bot
            .send_message(self.chat_id, as_html_block(&title, &alert.message))
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
