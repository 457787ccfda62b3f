use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;

use super::super::state::AlertGate;

const MUTE_ACTION_COOLDOWN_SECS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteActionError {
    Cooldown { retry_after_secs: i64 },
}

fn ensure_mute_action_allowed(
    gate: &mut AlertGate,
    now: DateTime<Utc>,
) -> Result<(), MuteActionError> {
    if let Some(last) = gate.last_mute_action_at {
        let elapsed_secs = now.signed_duration_since(last).num_seconds();
        let remaining = MUTE_ACTION_COOLDOWN_SECS - elapsed_secs;
        if remaining > 0 {
            return Err(MuteActionError::Cooldown {
                retry_after_secs: remaining,
            });
        }
    }

    gate.last_mute_action_at = Some(now);
    Ok(())
}

pub async fn mute_alerts_for(
    gate: &Arc<Mutex<AlertGate>>,
    duration: ChronoDuration,
) -> Result<DateTime<Utc>, MuteActionError> {
    mute_alerts_at(gate, duration, Utc::now()).await
}

pub(crate) async fn mute_alerts_at(
    gate: &Arc<Mutex<AlertGate>>,
    duration: ChronoDuration,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, MuteActionError> {
    let until = now + duration;
    let mut gate = gate.lock().await;
    ensure_mute_action_allowed(&mut gate, now)?;
    gate.muted_until = Some(until);
    Ok(until)
}

pub async fn unmute_alerts(gate: &Arc<Mutex<AlertGate>>) -> Result<(), MuteActionError> {
    unmute_alerts_at(gate, Utc::now()).await
}

pub(crate) async fn unmute_alerts_at(
    gate: &Arc<Mutex<AlertGate>>,
    now: DateTime<Utc>,
) -> Result<(), MuteActionError> {
    let mut gate = gate.lock().await;
    ensure_mute_action_allowed(&mut gate, now)?;
    gate.muted_until = None;
    Ok(())
}
