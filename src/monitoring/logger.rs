use serde::Serialize;
use tracing::info;

use crate::app::AppContext;

#[derive(Serialize)]
struct StartupLog<'a> {
    event: &'a str,
    base_dir: String,
    config_file: String,
    selected_file: Option<String>,
    probe_target: String,
    max_steps: u32,
}

pub fn log_startup(ctx: &AppContext) {
    let payload = StartupLog {
        event: "startup",
        base_dir: ctx.dirs().base().display().to_string(),
        config_file: ctx.dirs().config_file().display().to_string(),
        selected_file: ctx.selected_file().map(|p| p.display().to_string()),
        probe_target: format!("{}:{}", ctx.settings.probe.host, ctx.settings.probe.port),
        max_steps: ctx.settings.run.max_steps,
    };
    info!(target: "bot", startup = serde_json::to_string(&payload).unwrap_or_default().as_str());
}
