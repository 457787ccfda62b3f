use std::path::Path;

use notify::{Config as NotifyConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::app_context::AppContext;
use crate::config::{RuntimeConfig, load_config};

/// Only the runtime subset is swapped in; model, sinks and journal settings
/// keep their startup values until restart.
async fn apply_runtime_reload_from_path(
    app_context: &AppContext,
    config_path: &str,
) -> Result<RuntimeConfig, String> {
    let new_config = load_config(config_path).map_err(|error| error.to_string())?;
    let runtime_config = RuntimeConfig::from_config(&new_config);
    app_context.update_runtime_config(runtime_config.clone()).await;
    Ok(runtime_config)
}

pub(super) fn start_config_hot_reload_job(app_context: AppContext) {
    tokio::spawn(async move {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let config_path = app_context.config_path.clone();
        let mut watcher = match RecommendedWatcher::new(
            move |result| {
                let _ = tx.send(result);
            },
            NotifyConfig::default(),
        ) {
            Ok(watcher) => watcher,
            Err(error) => {
                log::warn!("config_hot_reload_disabled reason=watcher_init error={}", error);
                return;
            }
        };

        if let Err(error) = watcher.watch(Path::new(config_path.as_str()), RecursiveMode::NonRecursive)
        {
            log::warn!(
                "config_hot_reload_disabled reason=watch path={} error={}",
                config_path,
                error
            );
            return;
        }

        while let Some(event_result) = rx.recv().await {
            let event = match event_result {
                Ok(event) => event,
                Err(error) => {
                    log::warn!("config_hot_reload_event_error error={}", error);
                    continue;
                }
            };

            let should_reload = matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
            );
            if !should_reload {
                continue;
            }

            match apply_runtime_reload_from_path(&app_context, config_path.as_str()).await {
                Ok(runtime_config) => {
                    log::info!(
                        "config_hot_reload_applied target=runtime poll_interval_secs={} alerts_cpu={} alerts_ram={} overload_score={} cooldown_secs={} cpu_breach={:?} ram_breach={:?}",
                        runtime_config.poll_interval_secs,
                        runtime_config.alerts.cpu,
                        runtime_config.alerts.ram,
                        runtime_config.alerts.overload_score,
                        runtime_config.alerts.cooldown_secs,
                        runtime_config.policy.cpu_breach,
                        runtime_config.policy.ram_breach,
                    );
                }
                Err(error) => {
                    log::warn!("config_hot_reload_rejected error={}", error);
                }
            }
        }
    });
}
