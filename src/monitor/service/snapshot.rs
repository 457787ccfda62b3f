use std::sync::Arc;

use tokio::sync::Mutex;

use super::super::state::{AlertGate, GateSnapshot};

pub async fn gate_snapshot(gate: &Arc<Mutex<AlertGate>>) -> GateSnapshot {
    gate.lock().await.snapshot()
}
