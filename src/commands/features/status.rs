use chrono::{DateTime, Utc};
use teloxide::{prelude::*, types::ParseMode};

use crate::app_context::AppContext;
use crate::monitor::{GateSnapshot, Metric, MonitorStatus, gate_snapshot};

use super::super::helpers::as_html_block;

pub(crate) async fn handle_status(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let status = app_context.status();
    let gate = gate_snapshot(&app_context.gate).await;
    let body = status_body(&status, &gate, Utc::now());

    bot.send_message(msg.chat.id, as_html_block("PC Doctor Status", &body))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

fn mute_line(gate: &GateSnapshot, now: DateTime<Utc>) -> String {
    match gate.muted_until {
        Some(until) if now < until => format!("muted until {}", until.to_rfc3339()),
        _ => "not muted".to_string(),
    }
}

pub(super) fn status_body(status: &MonitorStatus, gate: &GateSnapshot, now: DateTime<Utc>) -> String {
    let Some(sampled) = status.latest.as_ref() else {
        return format!(
            "Phase: {}\nNo snapshot taken yet.\nMute: {}",
            status.phase.as_str(),
            mute_line(gate, now)
        );
    };

    let snapshot = &sampled.snapshot;
    let mark = |metric: Metric| if sampled.used_fallback(metric) { " (fallback)" } else { "" };
    let verdict = status
        .verdict
        .map(|verdict| verdict.as_str())
        .unwrap_or("unknown");
    let warmup = if status.scorer_warmup_left > 0 {
        format!(" (warming up, {} samples left)", status.scorer_warmup_left)
    } else {
        String::new()
    };

    format!(
        "Phase: {}\nCycles: {} ({} failed)\n\nSnapshot:\n- CPU: {:.1}%\n- RAM: {:.1}%\n- Disk: {:.1}%\n- Processes: {:.0}\n- Net sent: {:.0} B\n- Net recv: {:.0} B\n- GPU: {:.1}%{}\n- Temperature: {:.1}°C{}\n\nModel:\n- Verdict: {}\n- Online score: {:.3}{}\n\nCPU trend:\n- Mean: {:.1}%\n- Forecast: {:.1}%\n\nMute: {}",
        status.phase.as_str(),
        status.cycles,
        status.failed_cycles,
        snapshot.cpu_usage,
        snapshot.ram_usage,
        snapshot.disk_usage,
        snapshot.running_processes,
        snapshot.network_sent,
        snapshot.network_recv,
        snapshot.gpu_usage,
        mark(Metric::GpuUsage),
        snapshot.temperature,
        mark(Metric::Temperature),
        verdict,
        status.score,
        warmup,
        status.cpu_mean,
        status.cpu_forecast,
        mute_line(gate, now),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Utc};

    use super::status_body;
    use crate::detector::Verdict;
    use crate::monitor::{GateSnapshot, Metric, MetricsSnapshot, MonitorStatus, SampledSnapshot};

    fn open_gate() -> GateSnapshot {
        GateSnapshot {
            muted_until: None,
            last_severity: None,
            suppressed: 0,
            dispatched: 0,
        }
    }

    #[test]
    fn empty_status_reports_no_snapshot() {
        let body = status_body(&MonitorStatus::new(5), &open_gate(), Utc::now());
        assert!(body.contains("Phase: starting"));
        assert!(body.contains("No snapshot taken yet."));
    }

    #[test]
    fn status_marks_fallback_readings_and_mute() {
        let now = Utc::now();
        let mut status = MonitorStatus::new(5);
        status.latest = Some(SampledSnapshot {
            snapshot: MetricsSnapshot::from_row([42.0, 55.0, 60.0, 180.0, 10.0, 20.0, 0.0, 40.0]),
            fallbacks: vec![Metric::GpuUsage, Metric::Temperature],
        });
        status.verdict = Some(Verdict::Normal);
        status.scorer_warmup_left = 12;
        let gate = GateSnapshot {
            muted_until: Some(now + ChronoDuration::minutes(5)),
            ..open_gate()
        };

        let body = status_body(&status, &gate, now);
        assert!(body.contains("- CPU: 42.0%"));
        assert!(body.contains("- GPU: 0.0% (fallback)"));
        assert!(body.contains("- Temperature: 40.0°C (fallback)"));
        assert!(body.contains("- Verdict: normal"));
        assert!(body.contains("warming up, 12 samples left"));
        assert!(body.contains("Mute: muted until"));
    }
}
