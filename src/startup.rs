use std::sync::Arc;

use thiserror::Error;

use crate::app_context::AppContext;
use crate::detector::{Classifier, ModelArtifact, ModelError};
use crate::dispatch::Dispatcher;
use crate::monitor::MonitorServices;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("model {path} could not be loaded: {source}")]
    Model {
        path: String,
        #[source]
        source: ModelError,
    },
}

fn load_classifier(path: &str) -> Result<Arc<dyn Classifier>, StartupError> {
    let artifact = ModelArtifact::load(path).map_err(|source| StartupError::Model {
        path: path.to_string(),
        source,
    })?;
    log::info!(
        "model_loaded path={} trees={} samples={} trained_at={}",
        path,
        artifact.forest.tree_count(),
        artifact.training.samples,
        artifact.training.trained_at.to_rfc3339()
    );
    Ok(Arc::new(artifact))
}

/// Loads the model, then builds the dispatcher and the polling services.
/// Nothing is built when the model fails to load.
pub fn prepare_services(
    app_context: &AppContext,
    build_dispatcher: impl FnOnce() -> Dispatcher,
) -> Result<MonitorServices, StartupError> {
    let classifier = load_classifier(&app_context.config.model.path)?;
    let dispatcher = build_dispatcher();

    Ok(MonitorServices {
        classifier,
        gate: app_context.gate.clone(),
        dispatcher: Arc::new(dispatcher),
        journal: app_context.journal.clone(),
        status: app_context.status_tx.clone(),
        forecast_horizon: app_context.config.forecast_horizon,
    })
}
