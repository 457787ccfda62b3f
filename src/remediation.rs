//! Process-kill workflows triggered by CPU and RAM breaches.

use std::time::Duration;

use sysinfo::{Pid, PidExt, ProcessExt, System, SystemExt};
use thiserror::Error;

use crate::system::{CommandError, run_cmd};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemediationAction {
    KillHeavy { cpu_threshold: f64 },
    KillPrompt,
}

impl RemediationAction {
    pub fn job_name(self) -> &'static str {
        match self {
            RemediationAction::KillHeavy { .. } => "kill_heavy",
            RemediationAction::KillPrompt => "kill_prompt",
        }
    }
}

#[derive(Debug, Error)]
pub enum RemediationError {
    #[error("kill prompt failed: {0}")]
    Prompt(#[from] CommandError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_usage: f32,
    pub memory_bytes: u64,
}

/// Processes above `cpu_threshold`, hottest first. The monitor itself and
/// init are never selected.
pub fn select_heavy(
    samples: &[ProcessSample],
    cpu_threshold: f64,
    own_pid: Option<u32>,
) -> Vec<&ProcessSample> {
    let mut heavy = samples
        .iter()
        .filter(|sample| is_killable(sample, own_pid))
        .filter(|sample| f64::from(sample.cpu_usage) > cpu_threshold)
        .collect::<Vec<_>>();
    heavy.sort_by(|left, right| right.cpu_usage.total_cmp(&left.cpu_usage));
    heavy
}

pub fn top_memory(samples: &[ProcessSample], own_pid: Option<u32>) -> Option<&ProcessSample> {
    samples
        .iter()
        .filter(|sample| is_killable(sample, own_pid))
        .max_by_key(|sample| sample.memory_bytes)
}

fn is_killable(sample: &ProcessSample, own_pid: Option<u32>) -> bool {
    sample.pid > 1 && Some(sample.pid) != own_pid
}

#[derive(Debug, Default)]
pub struct KillReport {
    pub killed: Vec<ProcessSample>,
    pub failed: Vec<ProcessSample>,
}

#[derive(Debug, PartialEq)]
pub enum PromptOutcome {
    NothingToKill,
    Declined(ProcessSample),
    Killed(ProcessSample),
    KillFailed(ProcessSample),
}

/// Runs remediation jobs. Built once at startup and shared with the sink
/// worker pool.
#[derive(Debug, Clone)]
pub struct Remediator {
    dialog_command: String,
    dialog_timeout_secs: u64,
    cpu_sample_window: Duration,
}

impl Remediator {
    pub fn new(dialog_command: &str, dialog_timeout_secs: u64, cpu_sample_window: Duration) -> Self {
        Self {
            dialog_command: dialog_command.to_string(),
            dialog_timeout_secs,
            cpu_sample_window,
        }
    }

    pub async fn run(&self, action: RemediationAction) {
        match action {
            RemediationAction::KillHeavy { cpu_threshold } => {
                let report = self.kill_heavy(cpu_threshold).await;
                for process in &report.killed {
                    log::warn!(
                        "remediation_killed pid={} name={} cpu={:.1}",
                        process.pid,
                        process.name,
                        process.cpu_usage
                    );
                }
                for process in &report.failed {
                    log::warn!(
                        "remediation_kill_failed pid={} name={} cpu={:.1}",
                        process.pid,
                        process.name,
                        process.cpu_usage
                    );
                }
                if report.killed.is_empty() && report.failed.is_empty() {
                    log::info!(
                        "remediation_skipped action=kill_heavy reason=no_process_above threshold={}",
                        cpu_threshold
                    );
                }
            }
            RemediationAction::KillPrompt => match self.prompt_kill_top_memory().await {
                Ok(PromptOutcome::NothingToKill) => {
                    log::info!("remediation_skipped action=kill_prompt reason=no_candidate");
                }
                Ok(PromptOutcome::Declined(process)) => {
                    log::info!(
                        "remediation_declined action=kill_prompt pid={} name={}",
                        process.pid,
                        process.name
                    );
                }
                Ok(PromptOutcome::Killed(process)) => {
                    log::warn!(
                        "remediation_killed pid={} name={} memory_bytes={}",
                        process.pid,
                        process.name,
                        process.memory_bytes
                    );
                }
                Ok(PromptOutcome::KillFailed(process)) => {
                    log::warn!(
                        "remediation_kill_failed pid={} name={}",
                        process.pid,
                        process.name
                    );
                }
                Err(error) => {
                    log::warn!("remediation_failed action=kill_prompt error={}", error);
                }
            },
        }
    }

    pub async fn kill_heavy(&self, cpu_threshold: f64) -> KillReport {
        let system = self.sample_system().await;
        let samples = samples_from(&system);
        let own_pid = own_pid();

        let mut report = KillReport::default();
        for process in select_heavy(&samples, cpu_threshold, own_pid) {
            if kill_pid(&system, process.pid) {
                report.killed.push(process.clone());
            } else {
                report.failed.push(process.clone());
            }
        }
        report
    }

    pub async fn prompt_kill_top_memory(&self) -> Result<PromptOutcome, RemediationError> {
        let system = self.sample_system().await;
        let samples = samples_from(&system);
        let Some(candidate) = top_memory(&samples, own_pid()).cloned() else {
            return Ok(PromptOutcome::NothingToKill);
        };

        let question = format!(
            "Memory pressure detected.\n{} (pid {}) uses {} MiB.\nKill it?",
            candidate.name,
            candidate.pid,
            candidate.memory_bytes / (1024 * 1024)
        );
        let dialog_timeout = self.dialog_timeout_secs.to_string();
        let output = run_cmd(
            &self.dialog_command,
            &[
                "--question",
                "--title",
                "PC Doctor",
                "--text",
                &question,
                "--timeout",
                &dialog_timeout,
            ],
            self.dialog_timeout_secs.saturating_add(5),
        )
        .await?;

        if !output.success() {
            return Ok(PromptOutcome::Declined(candidate));
        }

        if kill_pid(&system, candidate.pid) {
            Ok(PromptOutcome::Killed(candidate))
        } else {
            Ok(PromptOutcome::KillFailed(candidate))
        }
    }

    async fn sample_system(&self) -> System {
        let mut system = System::new();
        system.refresh_processes();
        tokio::time::sleep(self.cpu_sample_window).await;
        system.refresh_processes();
        system
    }
}

fn samples_from(system: &System) -> Vec<ProcessSample> {
    system
        .processes()
        .iter()
        .map(|(pid, process)| ProcessSample {
            pid: pid.as_u32(),
            name: process.name().to_string(),
            cpu_usage: process.cpu_usage(),
            memory_bytes: process.memory(),
        })
        .collect()
}

fn own_pid() -> Option<u32> {
    sysinfo::get_current_pid().ok().map(|pid| pid.as_u32())
}

fn kill_pid(system: &System, pid: u32) -> bool {
    system
        .process(Pid::from_u32(pid))
        .map(|process| process.kill())
        .unwrap_or(false)
}
