use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::dates::check_date_range;
use super::file::validate_file_path;
use crate::client::ConnectivityProbe;
use crate::monitoring::LogLevel;
use crate::types::Configuration;

pub const NO_INTERNET: &str = "Sin conexión a internet";

/// Result of one readiness evaluation. Not persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStatus {
    pub internet: bool,
    pub file_valid: bool,
    pub dates_valid: bool,
    pub funds_valid: bool,
    pub overall_valid: bool,
    /// Reasons for each failed check, in check order.
    pub errors: Vec<String>,
}

/// Combine the four readiness checks for a known connectivity result.
pub fn evaluate_with(
    internet: bool,
    config: &Configuration,
    selected_file: Option<&Path>,
    today: NaiveDate,
) -> ValidationStatus {
    let mut errors = Vec::new();

    if !internet {
        errors.push(NO_INTERNET.to_string());
    }

    let file_valid = match validate_file_path(selected_file) {
        Ok(_) => true,
        Err(err) => {
            errors.push(err.to_string());
            false
        }
    };

    let dates_valid = match check_date_range(&config.start_date, &config.end_date, today) {
        Ok(_) => true,
        Err(err) => {
            errors.push(err.to_string());
            false
        }
    };

    let missing_funds = config.missing_funds();
    let funds_valid = missing_funds.is_empty();
    if !funds_valid {
        errors.push(format!("Fondos incompletos: {}", missing_funds.join(", ")));
    }

    ValidationStatus {
        internet,
        file_valid,
        dates_valid,
        funds_valid,
        overall_valid: internet && file_valid && dates_valid && funds_valid,
        errors,
    }
}

/// Readiness evaluator that owns the connectivity probe.
pub struct SystemStatus<P> {
    probe: P,
}

impl<P: ConnectivityProbe> SystemStatus<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub async fn evaluate_at(
        &self,
        config: &Configuration,
        selected_file: Option<&Path>,
        today: NaiveDate,
    ) -> ValidationStatus {
        let internet = self.probe.check().await;
        evaluate_with(internet, config, selected_file, today)
    }

    pub async fn evaluate(&self, config: &Configuration, selected_file: Option<&Path>) -> ValidationStatus {
        self.evaluate_at(config, selected_file, Local::now().date_naive())
            .await
    }
}

/// `(ready, message)` used to allow or refuse starting a run.
pub fn ready_message(status: &ValidationStatus) -> (bool, String) {
    if status.overall_valid {
        return (true, "Sistema listo para iniciar análisis".to_string());
    }
    let missing: Vec<&str> = [
        (status.internet, "conexión a internet"),
        (status.file_valid, "archivo válido"),
        (status.dates_valid, "configuración de fechas"),
        (status.funds_valid, "configuración de fondos"),
    ]
    .into_iter()
    .filter(|(ok, _)| !ok)
    .map(|(_, what)| what)
    .collect();
    (false, format!("Faltan: {}", missing.join(", ")))
}

/// Condensed view for a status panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub ready: bool,
    pub items: Vec<String>,
    pub missing_count: usize,
    pub main_message: String,
}

pub fn summary(status: &ValidationStatus) -> StatusSummary {
    let checks = [
        (status.internet, "Conexión a internet", NO_INTERNET),
        (
            status.file_valid,
            "Archivo válido seleccionado",
            "Archivo no seleccionado o inválido",
        ),
        (
            status.dates_valid,
            "Fechas configuradas correctamente",
            "Fechas no configuradas o inválidas",
        ),
        (
            status.funds_valid,
            "Fondos configurados",
            "Fondos incompletos",
        ),
    ];

    let items = checks
        .iter()
        .map(|(ok, good, bad)| {
            let text = if *ok { *good } else { *bad };
            text.to_string()
        })
        .collect();
    let missing_count = checks.iter().filter(|(ok, _, _)| !ok).count();

    StatusSummary {
        ready: status.overall_valid,
        items,
        missing_count,
        main_message: if status.overall_valid {
            "Sistema listo para análisis".to_string()
        } else {
            format!("Faltan {missing_count} requisitos")
        },
    }
}

/// Report lines for the session log, each with the level it should be shown at.
pub fn debug_lines(status: &ValidationStatus) -> Vec<(LogLevel, String)> {
    fn line(ok: bool, label: &str, good: &str, bad: &str, bad_level: LogLevel) -> (LogLevel, String) {
        if ok {
            (LogLevel::Success, format!("{label}: ✓ {good}"))
        } else {
            (bad_level, format!("{label}: ✗ {bad}"))
        }
    }

    let mut lines = vec![
        line(status.internet, "Internet", "Conectado", "Sin conexión", LogLevel::Error),
        line(
            status.file_valid,
            "Archivo",
            "Válido",
            "No seleccionado/inválido",
            LogLevel::Error,
        ),
        line(
            status.dates_valid,
            "Fechas",
            "Configuradas",
            "No configuradas",
            LogLevel::Warning,
        ),
        line(
            status.funds_valid,
            "Fondos",
            "Configurados",
            "Incompletos",
            LogLevel::Warning,
        ),
    ];

    if status.overall_valid {
        lines.push((LogLevel::Success, "Estado General: ✓ LISTO PARA INICIAR".to_string()));
    } else {
        lines.push((LogLevel::Error, "Estado General: ✗ NO LISTO".to_string()));
        if !status.errors.is_empty() {
            lines.push((LogLevel::Warning, "Errores encontrados:".to_string()));
            lines.extend(
                status
                    .errors
                    .iter()
                    .map(|err| (LogLevel::Error, format!("  • {err}"))),
            );
        }
    }
    lines
}

/// Remembers the last status so repeated evaluations only surface changes.
#[derive(Debug, Default)]
pub struct StatusTracker {
    last: Option<ValidationStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ValidationStatus> {
        self.last.as_ref()
    }

    /// Store `status`; returns true when it differs from the previous one.
    pub fn observe(&mut self, status: &ValidationStatus) -> bool {
        if self.last.as_ref() == Some(status) {
            return false;
        }
        self.last = Some(status.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    struct Fixed(bool);

    impl ConnectivityProbe for Fixed {
        async fn check(&self) -> bool {
            self.0
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn ready_config() -> Configuration {
        Configuration {
            start_date: "01/01/2024".to_string(),
            end_date: "01/01/2025".to_string(),
            ..Configuration::default()
        }
    }

    #[test]
    fn nothing_ready() {
        let status = evaluate_with(false, &Configuration::default(), None, today());
        assert!(!status.overall_valid);
        assert!(!status.internet);
        assert!(!status.file_valid);
        assert!(!status.dates_valid);
        assert!(status.funds_valid);
        assert_eq!(
            status.errors,
            vec![
                "Sin conexión a internet".to_string(),
                "Debe seleccionar un archivo de links".to_string(),
                "Ambas fechas son requeridas".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn everything_ready() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("links.csv");
        fs::write(&file, "url\nhttps://example.com/a\n").unwrap();

        let system = SystemStatus::new(Fixed(true));
        let status = system.evaluate_at(&ready_config(), Some(&file), today()).await;
        assert!(status.overall_valid);
        assert!(status.errors.is_empty());
        assert!(ready_message(&status).0);
    }

    #[test]
    fn funds_gate_readiness() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("links.xls");
        fs::write(&file, b"x").unwrap();
        let mut config = ready_config();
        config.margin_allocation_percent.clear();

        let status = evaluate_with(true, &config, Some(&file), today());
        assert!(!status.overall_valid);
        assert!(!status.funds_valid);
        assert_eq!(status.errors, vec!["Fondos incompletos: Margin Allocation".to_string()]);

        let (ready, message) = ready_message(&status);
        assert!(!ready);
        assert_eq!(message, "Faltan: configuración de fondos");
    }

    #[test]
    fn summary_counts_missing_requirements() {
        let status = evaluate_with(false, &ready_config(), None, today());
        let summary = summary(&status);
        assert!(!summary.ready);
        assert_eq!(summary.missing_count, 2);
        assert_eq!(summary.main_message, "Faltan 2 requisitos");
        assert_eq!(summary.items[0], NO_INTERNET);
        assert_eq!(summary.items[2], "Fechas configuradas correctamente");
    }

    #[test]
    fn debug_lines_levels() {
        let status = evaluate_with(false, &ready_config(), None, today());
        let lines = debug_lines(&status);
        assert_eq!(lines[0], (LogLevel::Error, "Internet: ✗ Sin conexión".to_string()));
        assert_eq!(lines[2].0, LogLevel::Success);
        assert!(lines.iter().any(|(level, text)| *level == LogLevel::Error && text == "Estado General: ✗ NO LISTO"));
        assert_eq!(lines.last().unwrap().1, "  • Debe seleccionar un archivo de links");
    }

    #[test]
    fn tracker_reports_only_changes() {
        let mut tracker = StatusTracker::new();
        let offline = evaluate_with(false, &ready_config(), None, today());
        let online = evaluate_with(true, &ready_config(), None, today());

        assert!(tracker.observe(&offline));
        assert!(!tracker.observe(&offline));
        assert!(tracker.observe(&online));
        assert_eq!(tracker.last(), Some(&online));
    }
}
