use chrono::{DateTime, Utc};
use teloxide::{prelude::*, types::ParseMode};

use crate::app_context::AppContext;
use crate::config::RuntimeConfig;
use crate::monitor::{
    GateSnapshot, MonitorStatus, MuteActionError, gate_snapshot, mute_alerts_for, unmute_alerts,
};

use super::super::helpers::{as_html_block, parse_mute_duration};

pub(crate) async fn handle_alerts(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let runtime_config = app_context.runtime_config.read().await.clone();
    let gate = gate_snapshot(&app_context.gate).await;
    let body = alerts_body(&runtime_config, &gate, &app_context.status(), Utc::now());

    bot.send_message(msg.chat.id, as_html_block("Alert Configuration", &body))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

fn alerts_body(
    runtime_config: &RuntimeConfig,
    gate: &GateSnapshot,
    status: &MonitorStatus,
    now: DateTime<Utc>,
) -> String {
    let mute_line = match gate.muted_until {
        Some(until) if now < until => {
            let remaining = until.signed_duration_since(now).num_seconds().max(0);
            format!("muted ({}s remaining until {})", remaining, until.to_rfc3339())
        }
        _ => "not muted".to_string(),
    };
    let last_severity = gate
        .last_severity
        .map(|severity| severity.as_str())
        .unwrap_or("none");
    let recent = if status.recent_alerts.is_empty() {
        "- none".to_string()
    } else {
        status
            .recent_alerts
            .iter()
            .rev()
            .map(|alert| {
                format!(
                    "- {} {} {}",
                    alert.created_at.format("%H:%M:%S"),
                    alert.severity.icon(),
                    alert.message.lines().next().unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Thresholds:\n- CPU: {:.1}%\n- RAM: {:.1}%\n- Overload score: {:.2}\n\nPolicy:\n- CPU breach: {:?}\n- RAM breach: {:?}\n- Kill threshold: {:.1}%\n\nGate:\n- Cooldown: {}s\n- Mute: {}\n- Last severity: {}\n- Dispatched: {}\n- Suppressed: {}\n\nRecent (this session):\n{}",
        runtime_config.alerts.cpu,
        runtime_config.alerts.ram,
        runtime_config.alerts.overload_score,
        runtime_config.policy.cpu_breach,
        runtime_config.policy.ram_breach,
        runtime_config.policy.kill_cpu_threshold,
        runtime_config.alerts.cooldown_secs,
        mute_line,
        last_severity,
        gate.dispatched,
        gate.suppressed,
        recent
    )
}

pub(crate) async fn handle_mute(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
    duration_str: &str,
) -> ResponseResult<()> {
    let Some(duration) = parse_mute_duration(duration_str) else {
        let message = as_html_block(
            "Mute failed",
            "Invalid duration. Use format like: 30s, 15m, 2h, 1d",
        );
        bot.send_message(msg.chat.id, message)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    };

    let muted_until = match mute_alerts_for(&app_context.gate, duration).await {
        Ok(until) => until,
        Err(MuteActionError::Cooldown { retry_after_secs }) => {
            bot.send_message(
                msg.chat.id,
                as_html_block(
                    "Mute cooldown",
                    &format!(
                        "Please wait {}s before changing mute state again.",
                        retry_after_secs
                    ),
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            return Ok(());
        }
    };
    let body = format!("Alerts are muted until {}", muted_until.to_rfc3339());
    bot.send_message(msg.chat.id, as_html_block("Alerts muted", &body))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

pub(crate) async fn handle_unmute(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
) -> ResponseResult<()> {
    if let Err(MuteActionError::Cooldown { retry_after_secs }) =
        unmute_alerts(&app_context.gate).await
    {
        bot.send_message(
            msg.chat.id,
            as_html_block(
                "Unmute cooldown",
                &format!(
                    "Please wait {}s before changing mute state again.",
                    retry_after_secs
                ),
            ),
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    }
    bot.send_message(
        msg.chat.id,
        as_html_block("Alerts unmuted", "Alerts are active again."),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}
