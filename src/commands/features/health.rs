use chrono::{DateTime, Utc};
use teloxide::{prelude::*, types::ParseMode, utils::command::BotCommands};

use crate::app_context::AppContext;
use crate::capabilities::Capabilities;
use crate::monitor::MonitorStatus;

use super::super::{
    command_def::DoctorCommands,
    helpers::{as_html_block, yes_no},
};

pub(crate) async fn handle_help(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    bot.send_message(
        msg.chat.id,
        as_html_block(
            "Available commands",
            &DoctorCommands::descriptions().to_string(),
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

pub(crate) async fn handle_health(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let runtime_config = app_context.runtime_config.read().await.clone();
    let body = health_body(
        &app_context.status(),
        &app_context.capabilities,
        runtime_config.poll_interval_secs,
        Utc::now(),
    );

    bot.send_message(msg.chat.id, as_html_block("Monitor Health", &body))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

fn health_body(
    status: &MonitorStatus,
    capabilities: &Capabilities,
    poll_interval_secs: u64,
    now: DateTime<Utc>,
) -> String {
    let threshold_secs = (poll_interval_secs * 2) as i64;

    let status_line = match status.last_tick {
        Some(tick) => {
            let lag_secs = now.signed_duration_since(tick).num_seconds().max(0);
            if lag_secs > threshold_secs {
                format!(
                    "⚠️ CRITICAL: Polling loop is delayed. Last tick: {}s ago (threshold: {}s)",
                    lag_secs, threshold_secs
                )
            } else {
                format!(
                    "✅ Healthy. Last tick: {}s ago (threshold: {}s)",
                    lag_secs, threshold_secs
                )
            }
        }
        None => "⏳ Warming up. The polling loop has not completed a cycle yet.".to_string(),
    };

    format!(
        "{}\n\nPhase: {}\nPoll interval: {}s\nCycles: {}\nFailed cycles: {}\n\nCapabilities:\n- desktop notifications: {}\n- speech: {}\n- dialog: {}\n- nvidia-smi: {}",
        status_line,
        status.phase.as_str(),
        poll_interval_secs,
        status.cycles,
        status.failed_cycles,
        yes_no(capabilities.has_notification_bus),
        yes_no(capabilities.has_speech),
        yes_no(capabilities.has_dialog),
        yes_no(capabilities.has_nvidia_smi),
    )
}
