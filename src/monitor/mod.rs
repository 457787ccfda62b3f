mod evaluator;
mod history;
mod provider;
mod service;
mod snapshot;
mod state;
mod status;

pub use evaluator::Breaches;
pub use history::{CpuHistory, MIN_FORECAST_SAMPLES};
pub use provider::{
    ActiveMetricsProvider, MetricsProvider, MonitorError, ProviderSettings,
};
pub use service::{
    CycleOutcome, MonitorServices, MuteActionError, PollingState, gate_snapshot, mute_alerts_for,
    run_cycle, unmute_alerts,
};
pub use snapshot::{
    FEATURE_COUNT, FEATURE_NAMES, FeatureRow, Metric, MetricsSnapshot, SampledSnapshot,
};
pub use state::{AlertGate, GateDecision, GateSnapshot};
pub use status::{LoopPhase, MonitorStatus};
