use std::fs;
use std::future::pending;
use std::time::Duration;

use omegabot::app::AppContext;
use omegabot::execution::{run_bot, RunError, RunState};
use omegabot::storage::AppDirs;
use omegabot::types::Settings;
use omegabot::validation::ValidationStatus;

fn ready() -> ValidationStatus {
    ValidationStatus {
        internet: true,
        file_valid: true,
        dates_valid: true,
        funds_valid: true,
        overall_valid: true,
        errors: Vec::new(),
    }
}

fn context(tmp: &tempfile::TempDir) -> AppContext {
    AppContext::new(Settings::default(), AppDirs::new(tmp.path().join("AutoOmega Bot")))
}

fn messages(ctx: &AppContext) -> Vec<String> {
    ctx.log.entries().iter().map(|e| e.message.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn csv_links_drive_the_step_count() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("links.csv");
    let rows: String = (1..=7)
        .map(|i| format!("https://omega.example/bt/{i}\n"))
        .collect();
    fs::write(&file, format!("link\n{rows}")).unwrap();

    let mut ctx = context(&tmp);
    ctx.select_file(file).unwrap();

    let report = run_bot(&mut ctx, &ready(), pending()).await.unwrap();
    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.processed, 7);

    let lines = messages(&ctx);
    assert!(lines.contains(&"BOT INICIADO - Comenzando análisis...".to_string()));
    assert!(lines.contains(&"Archivo: links.csv".to_string()));
    assert!(lines.contains(&"Procesados 5 enlaces".to_string()));
    assert!(!lines.contains(&"Procesados 10 enlaces".to_string()));
    assert!(lines.contains(&"ANÁLISIS COMPLETADO EXITOSAMENTE".to_string()));
    assert!(lines.iter().any(|l| l.starts_with("RESUMEN DE EJECUCIÓN - Duración: ")));
}

#[tokio::test(start_paused = true)]
async fn excel_input_uses_step_budget() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("links.xlsx");
    fs::write(&file, b"PK").unwrap();

    let mut ctx = context(&tmp);
    ctx.settings.run.max_steps = 4;
    ctx.select_file(file).unwrap();

    let report = run_bot(&mut ctx, &ready(), pending()).await.unwrap();
    assert_eq!(report.processed, 4);
    assert_eq!(report.state, RunState::Completed);
}

#[tokio::test(start_paused = true)]
async fn stop_signal_ends_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    let mut ctx = context(&tmp);

    let stop = tokio::time::sleep(Duration::from_secs(10));
    let report = run_bot(&mut ctx, &ready(), stop).await.unwrap();
    assert_eq!(report.state, RunState::Stopped);
    // Steps at 2.0, 3.5, 5.0, 6.5, 8.0 and 9.5 seconds.
    assert_eq!(report.processed, 6);
    assert_eq!(
        messages(&ctx).last().map(String::as_str),
        Some("BOT DETENIDO por el usuario")
    );
}

#[tokio::test]
async fn refused_when_not_ready() {
    let tmp = tempfile::tempdir().unwrap();
    let mut ctx = context(&tmp);
    let status = ValidationStatus {
        dates_valid: false,
        overall_valid: false,
        ..ready()
    };

    let err = run_bot(&mut ctx, &status, pending()).await.unwrap_err();
    assert_eq!(
        err,
        RunError::NotReady("Faltan: configuración de fechas".to_string())
    );
    assert_eq!(
        messages(&ctx).last().map(String::as_str),
        Some("No se puede iniciar. Faltan: configuración de fechas")
    );
}

#[test]
fn session_log_lands_in_logs_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let mut ctx = context(&tmp);
    ctx.log.warning("BOT DETENIDO por el usuario");

    let path = ctx.finish().unwrap();
    assert!(path.starts_with(ctx.dirs().logs_dir()));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("omega_bot_session_"));
    assert!(name.ends_with(".log"));

    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains("WARNING: BOT DETENIDO por el usuario"));
}
