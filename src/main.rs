mod app_context;
mod capabilities;
mod cli;
mod commands;
mod config;
mod detector;
mod dispatch;
mod jobs;
mod journal;
mod monitor;
mod remediation;
mod startup;
mod system;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use teloxide::prelude::*;
use tokio::net::lookup_host;
use tracing_subscriber::EnvFilter;

use crate::app_context::AppContext;
use crate::capabilities::{Capabilities, log_capability_warnings};
use crate::cli::{Cli, CollectArgs, Command, TrainArgs};
use crate::commands::{DoctorCommands, answer};
use crate::config::{Config, load_config_or_default};
use crate::detector::{ForestParams, TrainingCorpora, append_corpus, train_from_corpora};
use crate::dispatch::{
    DesktopSink, DialogSink, Dispatcher, SinkWorkerPool, SpeechSink, TelegramSink,
};
use crate::jobs::start_background_jobs;
use crate::monitor::{ActiveMetricsProvider, MetricsProvider, ProviderSettings};
use crate::remediation::Remediator;
use crate::startup::prepare_services;

const COMMAND_CONCURRENCY: usize = 2;
const SPEECH_WORKERS: usize = 1;

fn init_json_logging() {
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!(
            "logging bridge initialization failed (continuing with existing logger): {}",
            error
        );
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("global logger initialization failed: {}", error);
    }
}

async fn log_dns_probe() {
    match lookup_host(("api.telegram.org", 443)).await {
        Ok(mut addresses) => {
            if let Some(address) = addresses.next() {
                log::info!("dns_probe_ok host=api.telegram.org address={}", address);
            } else {
                log::warn!("dns_probe_degraded host=api.telegram.org reason=no_records");
            }
        }
        Err(error) => {
            log::warn!(
                "dns_probe_degraded host=api.telegram.org reason=lookup_failed error={}",
                error
            );
        }
    }
}

fn load_config_logged(path: &Path) -> Option<Config> {
    match load_config_or_default(path) {
        Ok(config) => Some(config),
        Err(error) => {
            log::error!("config_load_failed path={} error={}", path.display(), error);
            None
        }
    }
}

fn build_dispatcher(config: &Config, capabilities: &Capabilities, bot: Option<&Bot>) -> Dispatcher {
    let sinks = &config.sinks;
    let remediator = Remediator::new(
        &sinks.dialog_command,
        sinks.dialog_timeout_secs,
        Duration::from_millis(config.cpu_sample_window_ms),
    );
    let mut dispatcher = Dispatcher::new(SinkWorkerPool::start(sinks.workers, sinks.queue_capacity))
        .with_remediator(remediator);

    if sinks.desktop && capabilities.has_notification_bus {
        dispatcher = dispatcher.with_inline(Arc::new(DesktopSink::new()));
    }

    if let Some(bot) = bot {
        match config.owner_chat_id() {
            Ok(chat_id) => {
                dispatcher = dispatcher.with_inline(Arc::new(TelegramSink::new(bot.clone(), chat_id)));
            }
            Err(error) => log::warn!("telegram_sink_disabled error={}", error),
        }
    }

    if sinks.dialog && capabilities.has_dialog {
        dispatcher = dispatcher.with_modal(Arc::new(DialogSink::new(sinks)));
    }

    if sinks.speech && capabilities.has_speech {
        dispatcher = dispatcher.with_speech(
            Arc::new(SpeechSink::new(sinks)),
            SinkWorkerPool::start(SPEECH_WORKERS, sinks.queue_capacity),
        );
    }

    dispatcher
}

async fn run(config_path: &Path) -> ExitCode {
    let Some(config) = load_config_logged(config_path) else {
        return ExitCode::FAILURE;
    };

    log::info!("PC Doctor is starting...");
    let capabilities = Capabilities::detect(&config.sinks);
    log_capability_warnings(&capabilities, &config.sinks);

    let bot = if config.telegram.enabled {
        log_dns_probe().await;
        Some(Bot::new(&config.telegram.bot_token))
    } else {
        None
    };

    let app_context = AppContext::new(
        config,
        COMMAND_CONCURRENCY,
        config_path.display().to_string(),
        capabilities,
    );
    let services = match prepare_services(&app_context, || {
        build_dispatcher(&app_context.config, &app_context.capabilities, bot.as_ref())
    }) {
        Ok(services) => services,
        Err(error) => {
            log::error!(
                "model_load_failed error={} hint=run_the_train_subcommand_first",
                error
            );
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "dispatcher_ready sinks={} simulation={}",
        services.dispatcher.sink_names().join(","),
        app_context.config.simulation.enabled
    );

    start_background_jobs(app_context.clone(), services);

    match bot {
        Some(bot) => {
            DoctorCommands::repl(bot, move |bot, msg, cmd| {
                let app_context = app_context.clone();
                async move { answer(bot, msg, cmd, &app_context).await }
            })
            .await;
        }
        None => {
            if let Err(error) = tokio::signal::ctrl_c().await {
                log::error!("shutdown_signal_failed error={}", error);
                return ExitCode::FAILURE;
            }
        }
    }

    log::info!("PC Doctor stopped");
    ExitCode::SUCCESS
}

fn train(config_path: &Path, args: TrainArgs) -> ExitCode {
    let Some(config) = load_config_logged(config_path) else {
        return ExitCode::FAILURE;
    };

    let params = ForestParams {
        trees: args.trees.unwrap_or(config.model.trees),
        sample_size: args.sample_size.unwrap_or(config.model.sample_size),
        contamination: args.contamination.unwrap_or(config.model.contamination),
        seed: args.seed.unwrap_or(config.model.seed),
    };
    let corpora = TrainingCorpora {
        normal: args.normal,
        high_load: args.high_load,
        malicious: args.malicious,
    };

    let result = train_from_corpora(&corpora, params)
        .and_then(|artifact| artifact.save(&args.output));
    match result {
        Ok(()) => {
            log::info!("model_saved path={}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("training_failed error={}", error);
            ExitCode::FAILURE
        }
    }
}

async fn collect(config_path: &Path, args: CollectArgs) -> ExitCode {
    let Some(config) = load_config_logged(config_path) else {
        return ExitCode::FAILURE;
    };

    let capabilities = Capabilities::detect(&config.sinks);
    let mut provider = ActiveMetricsProvider::new(
        false,
        ProviderSettings::from_config(&config, capabilities.has_nvidia_smi),
    );
    let label = args.label.as_str();

    for index in 0..args.samples {
        let sampled = match provider.snapshot().await {
            Ok(sampled) => sampled,
            Err(error) => {
                log::warn!("collect_sample_failed index={} error={}", index, error);
                continue;
            }
        };

        if let Err(error) = append_corpus(&args.output, label, &[sampled.snapshot]) {
            log::error!("collect_write_failed path={} error={}", args.output.display(), error);
            return ExitCode::FAILURE;
        }
        log::info!(
            "collect_sample_written index={} label={} cpu={:.1} ram={:.1} fallbacks={}",
            index + 1,
            label,
            sampled.snapshot.cpu_usage,
            sampled.snapshot.ram_usage,
            sampled.fallbacks.len()
        );

        if index + 1 < args.samples {
            tokio::time::sleep(Duration::from_secs(args.interval_secs)).await;
        }
    }

    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    init_json_logging();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&cli.config).await,
        Command::Train(args) => train(&cli.config, args),
        Command::Collect(args) => collect(&cli.config, args).await,
    }
}
