use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::monitoring::{LogLevel, SessionLog};
use crate::storage::session_log::save_session_log;
use crate::storage::{AppDirs, ConfigStore};
use crate::strategy::strategy_selected;
use crate::types::{Configuration, Settings};
use crate::validation::{
    check_date_range, debug_lines, file_info, validate_file_path, FileError, SelectedFile,
    ValidationStatus, NO_INTERNET,
};

/// Everything a command works with: tool settings, the folder layout, the
/// user's configuration and the session log collected while the command runs.
pub struct AppContext {
    pub settings: Settings,
    store: ConfigStore,
    pub config: Configuration,
    selected_file: Option<PathBuf>,
    pub log: SessionLog,
}

impl AppContext {
    pub fn new(settings: Settings, dirs: AppDirs) -> Self {
        if let Err(err) = dirs.ensure() {
            warn!(target: "bot", error = %err, "failed to create application folders");
        }
        let store = ConfigStore::new(dirs);
        let config = store.load();
        let mut log = SessionLog::new();
        log.info("Iniciando OmegaBot");
        Self {
            settings,
            store,
            config,
            selected_file: None,
            log,
        }
    }

    pub fn dirs(&self) -> &AppDirs {
        self.store.dirs()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    /// Remember `path` as the links file. The path is kept even when invalid so
    /// readiness reports why it cannot be used.
    pub fn select_file(&mut self, path: PathBuf) -> Result<SelectedFile, FileError> {
        let result = validate_file_path(Some(&path));
        match &result {
            Ok(file) => self
                .log
                .success(format!("Archivo seleccionado: {}", file.file_name())),
            Err(err) => self.log.error(format!("Archivo rechazado: {err}")),
        }
        self.selected_file = Some(path);
        result
    }

    /// Persist the current configuration.
    pub fn commit(&mut self) -> bool {
        let saved = self.store.save(&mut self.config);
        if saved {
            self.log.success("Configuración guardada exitosamente");
        } else {
            self.log.error("No se pudo guardar la configuración");
        }
        saved
    }

    /// Re-read the configuration from disk; returns true when it changed.
    pub fn reload(&mut self) -> bool {
        let fresh = self.store.load();
        if fresh == self.config {
            return false;
        }
        self.config = fresh;
        true
    }

    /// Append the condensed readiness lines to the session log.
    pub fn report_status(&mut self, status: &ValidationStatus) {
        self.log.extend(debug_lines(status));
    }

    /// Append a full system report: each requirement with its details, the
    /// informational settings and the folder layout.
    pub fn report_system(&mut self, status: &ValidationStatus) {
        let lines = self.system_lines(status);
        self.log.extend(lines);
    }

    fn system_lines(&self, status: &ValidationStatus) -> Vec<(LogLevel, String)> {
        let config = &self.config;
        let mut lines = vec![(LogLevel::Info, "ESTADO COMPLETO DEL SISTEMA".to_string())];

        lines.push(if status.internet {
            (LogLevel::Success, "Internet: ✓ Conectado".to_string())
        } else {
            (LogLevel::Error, format!("Internet: ✗ {NO_INTERNET}"))
        });

        lines.push(match validate_file_path(self.selected_file()) {
            Ok(file) => {
                let detail = file_info(file.path())
                    .map(|info| format!(" ({})", info.size))
                    .unwrap_or_default();
                (LogLevel::Success, format!("Archivo: ✓ {}{detail}", file.file_name()))
            }
            Err(err) => (LogLevel::Error, format!("Archivo: ✗ {err}")),
        });

        lines.push(
            match check_date_range(&config.start_date, &config.end_date, chrono::Local::now().date_naive()) {
                Ok(range) => (
                    LogLevel::Success,
                    format!(
                        "Fechas: ✓ {} a {} ({} días)",
                        config.start_date,
                        config.end_date,
                        range.days()
                    ),
                ),
                Err(err) => (LogLevel::Warning, format!("Fechas: ✗ {err}")),
            },
        );

        let missing = config.missing_funds();
        lines.push(if missing.is_empty() {
            (LogLevel::Success, format!("Fondos: ✓ {}", config.funds_summary()))
        } else {
            (LogLevel::Warning, format!("Fondos: ✗ faltan {}", missing.join(", ")))
        });

        let strategy = if strategy_selected(&config.strategy) {
            format!("{} - {}", config.strategy, config.strategy_summary())
        } else {
            "sin seleccionar".to_string()
        };
        lines.push((LogLevel::Info, format!("Estrategia (informativa): {strategy}")));
        lines.push((LogLevel::Info, format!("Ticker: {}", config.ticker)));

        let output = if config.output_path.trim().is_empty() {
            self.dirs().output_dir().display().to_string()
        } else {
            config.output_path.clone()
        };
        lines.push((LogLevel::Info, format!("Carpeta de salida: {output}")));
        lines.push((
            LogLevel::Info,
            format!("Configuración: {}", self.store.path().display()),
        ));
        lines.push((
            LogLevel::Info,
            format!("Logs: {}", self.dirs().logs_dir().display()),
        ));

        lines.extend(
            debug_lines(status)
                .into_iter()
                .filter(|(_, text)| {
                    !["Internet", "Archivo", "Fechas", "Fondos"]
                        .iter()
                        .any(|label| text.starts_with(label))
                }),
        );
        lines
    }

    /// Write the session log with the configuration dump. Returns its path.
    pub fn finish(&self) -> Option<PathBuf> {
        match save_session_log(
            self.dirs(),
            &self.log,
            Some((&self.config, self.selected_file())),
        ) {
            Ok(path) => {
                info!(target: "bot", path = %path.display(), "session log saved");
                Some(path)
            }
            Err(err) => {
                warn!(target: "bot", error = %err, "failed to save session log");
                None
            }
        }
    }
}
