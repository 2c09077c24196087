use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::{AppDirs, StoreError, StoreResult};
use crate::monitoring::session::SessionLog;
use crate::types::Configuration;

const RULE_WIDTH: usize = 60;
const STAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// File name for a session started at `at`.
pub fn session_file_name(at: DateTime<Local>) -> String {
    at.format("omega_bot_session_%Y_%m_%d_%H-%M-%S.log").to_string()
}

/// Environment and configuration lines written at the top of a session log.
pub fn system_info_lines(config: &Configuration, selected_file: Option<&Path>) -> Vec<String> {
    let user = std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "N/A".to_string());
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "N/A".to_string());

    let mut lines = vec![
        format!(
            "Sistema operativo: {} ({})",
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
        format!("Usuario: {user}"),
        format!("Carpeta de trabajo: {cwd}"),
        format!(
            "Archivo seleccionado: {}",
            selected_file
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "Ninguno".to_string())
        ),
    ];

    if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(config) {
        lines.push("Configuración:".to_string());
        for (key, value) in map {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            lines.push(format!("  - {key}: {value}"));
        }
    }
    lines
}

/// Render the full session log document.
pub fn render_session_log(
    log: &SessionLog,
    context: Option<(&Configuration, Option<&Path>)>,
    finished_at: DateTime<Local>,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "=== OMEGABOT SESSION LOG ===");
    let _ = writeln!(out, "Fecha y hora de inicio: {}", log.started_at().format(STAMP_FORMAT));
    let _ = writeln!(out, "{rule}\n");

    if let Some((config, selected_file)) = context {
        for line in system_info_lines(config, selected_file) {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out, "\n{rule}\n");
    }

    let _ = writeln!(out, "LOGS DE LA SESIÓN");
    let _ = writeln!(out, "{rule}");
    out.push_str(&log.plain_text());
    let _ = write!(out, "\n\n{rule}\n");
    let _ = writeln!(out, "Sesión finalizada: {}", finished_at.format(STAMP_FORMAT));
    out
}

/// Write the session log into the `Logs` folder and return its path.
pub fn save_session_log(
    dirs: &AppDirs,
    log: &SessionLog,
    context: Option<(&Configuration, Option<&Path>)>,
) -> StoreResult<PathBuf> {
    let logs_dir = dirs.logs_dir();
    fs::create_dir_all(&logs_dir).map_err(|err| StoreError::io(&logs_dir, err))?;

    let path = logs_dir.join(session_file_name(log.started_at()));
    let contents = render_session_log(log, context, Local::now());
    fs::write(&path, contents).map_err(|err| StoreError::io(&path, err))?;
    Ok(path)
}
