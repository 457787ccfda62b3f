use std::panic::AssertUnwindSafe;

use chrono::Utc;
use futures::FutureExt;
use tokio::time::{Duration, sleep};

use crate::app_context::AppContext;
use crate::detector::{FeatureLimits, HalfSpaceParams, HalfSpaceTrees};
use crate::monitor::{
    ActiveMetricsProvider, CpuHistory, LoopPhase, MonitorServices, PollingState, ProviderSettings,
    run_cycle,
};

fn build_polling_state(app_context: &AppContext) -> PollingState {
    let online = &app_context.config.online;
    let scorer = HalfSpaceTrees::new(
        HalfSpaceParams {
            trees: online.trees,
            height: online.height,
            window_size: online.window_size,
            seed: online.seed,
        },
        FeatureLimits::default(),
    );

    PollingState::new(
        CpuHistory::with_capacity(app_context.config.history_capacity),
        Box::new(scorer),
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub(super) fn start_monitor_job(app_context: AppContext, services: MonitorServices) {
    tokio::spawn(async move {
        let config = &app_context.config;
        let mut provider = ActiveMetricsProvider::new(
            config.simulation.enabled,
            ProviderSettings::from_config(config, app_context.capabilities.has_nvidia_smi),
        );
        if config.simulation.enabled {
            log::warn!("simulation_mode_enabled source=monitor_provider");
        }

        let mut state = build_polling_state(&app_context);
        let mut previous_tick = None;

        loop {
            let runtime_config = app_context.runtime_config.read().await.clone();
            let now = Utc::now();

            if let Some(previous) = previous_tick {
                let elapsed_secs = now.signed_duration_since(previous).num_seconds().max(0);
                let threshold_secs = (runtime_config.poll_interval_secs * 2) as i64;
                if elapsed_secs > threshold_secs {
                    log::warn!(
                        "monitor_loop_delayed elapsed_secs={} threshold_secs={}",
                        elapsed_secs,
                        threshold_secs
                    );
                }
            }
            previous_tick = Some(now);

            let cycle = AssertUnwindSafe(run_cycle(
                &services,
                &mut state,
                &mut provider,
                &runtime_config,
            ))
            .catch_unwind()
            .await;

            let failed = match cycle {
                Ok(Ok(_)) => false,
                Ok(Err(error)) => {
                    log::warn!("monitor_cycle_failed error={}", error);
                    true
                }
                Err(payload) => {
                    log::error!(
                        "monitor_cycle_panicked error={}",
                        panic_message(payload.as_ref())
                    );
                    true
                }
            };

            services.status.send_modify(|status| {
                status.phase = LoopPhase::Sleeping;
                status.last_tick = Some(now);
                if failed {
                    status.failed_cycles += 1;
                }
            });

            let sleep_duration = Duration::from_secs(runtime_config.poll_interval_secs);
            tokio::select! {
                _ = sleep(sleep_duration) => {}
                _ = app_context.runtime_update_notify.notified() => {
                    log::info!(
                        "poll_interval_change_interrupt_applied previous_sleep_secs={}",
                        runtime_config.poll_interval_secs
                    );
                }
            }
        }
    });
}
