//! Simulated bot run.
//!
//! No analysis is performed: after an initial delay the run advances one step
//! per interval, one step per link when the input yields links, otherwise a
//! fixed step budget.

pub mod links;

use std::future::Future;

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::time::{interval_at, Instant};
use tracing::info;

use crate::app::AppContext;
use crate::monitoring::metrics::{log_metrics_snapshot, METRICS};
use crate::monitoring::SessionLog;
use crate::types::RunSettings;
use crate::utils::format::rate_per_minute;
use crate::utils::time::format_hms;
use crate::validation::{ready_message, validate_file_path, ValidationStatus};

pub use links::{load_links, read_csv_links, LinksError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Stopped,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("No se puede iniciar. {0}")]
    NotReady(String),

    #[error("El bot ya está en ejecución")]
    AlreadyRunning,
}

/// Outcome of a finished or stopped run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub state: RunState,
    pub processed: u32,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format_execution_summary(self.started_at, self.finished_at, self.processed)
    }
}

/// `RESUMEN DE EJECUCIÓN - Duración: HH:MM:SS - Enlaces procesados: N[ - Velocidad: X análisis/min]`
pub fn format_execution_summary(start: DateTime<Local>, end: DateTime<Local>, processed: u32) -> String {
    let elapsed = (end - start).num_seconds().max(0) as u64;
    let rate = rate_per_minute(u64::from(processed), elapsed)
        .map(|r| format!(" - Velocidad: {r:.1} análisis/min"))
        .unwrap_or_default();
    format!(
        "RESUMEN DE EJECUCIÓN - Duración: {} - Enlaces procesados: {processed}{rate}",
        format_hms(elapsed)
    )
}

pub struct BotRun {
    settings: RunSettings,
    links: Vec<String>,
    state: RunState,
    processed: u32,
    started_at: Option<DateTime<Local>>,
    finished_at: Option<DateTime<Local>>,
}

impl BotRun {
    pub fn new(settings: RunSettings, links: Vec<String>) -> Self {
        Self {
            settings,
            links,
            state: RunState::Idle,
            processed: 0,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn processed(&self) -> u32 {
        self.processed
    }

    /// Steps this run will take before completing.
    pub fn total(&self) -> u32 {
        if self.links.is_empty() {
            self.settings.max_steps.max(1)
        } else {
            u32::try_from(self.links.len()).unwrap_or(u32::MAX)
        }
    }

    /// Move to `Running` if the system is ready.
    pub fn start(&mut self, status: &ValidationStatus) -> Result<(), RunError> {
        if self.state == RunState::Running {
            return Err(RunError::AlreadyRunning);
        }
        let (ready, message) = ready_message(status);
        if !ready {
            return Err(RunError::NotReady(message));
        }
        self.state = RunState::Running;
        self.processed = 0;
        self.started_at = Some(Local::now());
        self.finished_at = None;
        info!(target: "run", total = self.total(), "bot run started");
        Ok(())
    }

    /// Advance one step. Returns false once the run is no longer running.
    pub fn step(&mut self, log: &mut SessionLog) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        let link = self.links.get(self.processed as usize).cloned();
        self.processed += 1;
        METRICS.record_link_processed(link.as_deref());

        let every = self.settings.progress_every;
        if every > 0 && self.processed % every == 0 {
            log.success(format!("Procesados {} enlaces", self.processed));
        }

        if self.processed >= self.total() {
            let report = self.finish(RunState::Completed);
            log.success(report.summary());
            log.success("ANÁLISIS COMPLETADO EXITOSAMENTE");
            log.success(format!("Total procesado: {} enlaces", report.processed));
            return false;
        }
        true
    }

    /// Stop a running run. Does nothing unless the run is `Running`.
    pub fn stop(&mut self, log: &mut SessionLog) -> Option<RunReport> {
        if self.state != RunState::Running {
            return None;
        }
        let report = self.finish(RunState::Stopped);
        log.info(report.summary());
        log.warning("BOT DETENIDO por el usuario");
        Some(report)
    }

    fn finish(&mut self, state: RunState) -> RunReport {
        self.state = state;
        let finished_at = Local::now();
        self.finished_at = Some(finished_at);
        info!(target: "run", ?state, processed = self.processed, "bot run finished");
        self.report_at(finished_at)
    }

    fn report_at(&self, finished_at: DateTime<Local>) -> RunReport {
        RunReport {
            state: self.state,
            processed: self.processed,
            started_at: self.started_at.unwrap_or(finished_at),
            finished_at,
        }
    }

    pub fn report(&self) -> RunReport {
        self.report_at(self.finished_at.unwrap_or_else(Local::now))
    }

    /// Tick the run to completion, or until `stop` resolves.
    ///
    /// `stop` is checked before each tick, so no step is taken once it is ready.
    pub async fn drive<S>(&mut self, log: &mut SessionLog, stop: S) -> RunReport
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(stop);
        let mut ticker = interval_at(
            Instant::now() + self.settings.initial_delay(),
            self.settings.step_interval(),
        );

        while self.state == RunState::Running {
            // A stop that lands on the same instant as a tick wins.
            tokio::select! {
                biased;
                _ = &mut stop => {
                    self.stop(log);
                }
                _ = ticker.tick() => {
                    self.step(log);
                }
            }
        }
        self.report()
    }
}

/// Start a run for the context's configuration and selected file.
///
/// The start banner and every progress line go to the context's session log.
pub async fn run_bot<S>(ctx: &mut AppContext, status: &ValidationStatus, stop: S) -> Result<RunReport, RunError>
where
    S: Future<Output = ()>,
{
    let file = validate_file_path(ctx.selected_file()).ok();
    let links = match &file {
        Some(file) => match load_links(file) {
            Ok(links) => links,
            Err(err) => {
                ctx.log.warning(format!("No se pudieron leer los enlaces: {err}"));
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let mut run = BotRun::new(ctx.settings.run.clone(), links);
    if let Err(err) = run.start(status) {
        ctx.log.error(err.to_string());
        return Err(err);
    }

    ctx.log.success("BOT INICIADO - Comenzando análisis...");
    if let Some(file) = &file {
        ctx.log.info(format!("Archivo: {}", file.file_name()));
    }
    ctx.log.info(format!("Estrategia: {}", ctx.config.strategy));
    ctx.log.info(format!("Fondos: {}", ctx.config.funds_summary()));
    ctx.log.info(format!(
        "Período: {} a {}",
        ctx.config.start_date, ctx.config.end_date
    ));
    ctx.log.info(format!("Pasos programados: {}", run.total()));

    let report = run.drive(&mut ctx.log, stop).await;
    log_metrics_snapshot(&METRICS.snapshot());
    Ok(report)
}
