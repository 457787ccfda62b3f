mod core;
mod mute;
mod snapshot;

pub use self::core::{CycleOutcome, MonitorServices, PollingState, run_cycle};
pub use mute::{MuteActionError, mute_alerts_for, unmute_alerts};
pub use snapshot::gate_snapshot;

#[cfg(test)]
mod tests;
