use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use omegabot::{
    app::AppContext,
    client::{connection_status, NetworkProbe},
    execution,
    monitoring::{self, metrics::METRICS},
    storage::AppDirs,
    strategy::{options_for, OPTION_KEYS},
    types::{Configuration, Settings},
    utils::time::to_display,
    validation::{ready_message, summary, validate_date_range, StatusTracker, SystemStatus},
};

#[derive(Parser, Debug)]
#[command(name = "omegabot")]
#[command(about = "AutoOmega Bot: readiness checks and simulated backtest runs", long_about = None)]
struct Cli {
    /// Application folder (defaults to $OMEGABOT_HOME, then <Documents>/AutoOmega Bot)
    #[arg(long)]
    home: Option<PathBuf>,

    /// Path to the tool settings file
    #[arg(short, long)]
    settings: Option<String>,

    /// Links file to analyze (CSV or Excel)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate readiness once and print the full report
    Status,
    /// Poll readiness and report only changes
    Watch {
        /// Seconds between checks
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Start the simulated bot run (Ctrl-C stops it)
    Run,
    /// Inspect or edit the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Validate a MM/DD/YYYY date range
    Dates { start: String, end: String },
    /// Check internet connectivity
    Probe,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the configuration as JSON
    Show,
    /// Print the configuration file location
    Path,
    /// List the accepted values of each choice key
    Options,
    /// Set one key and save
    Set { key: String, value: String },
    /// Restore every key to its default and save
    Reset,
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "bot", error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn watch(ctx: &mut AppContext, system: &SystemStatus<NetworkProbe>, interval_secs: u64) {
    let mut tracker = StatusTracker::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    let stop = ctrl_c();
    tokio::pin!(stop);

    ctx.log
        .info(format!("Monitoreando estado cada {interval_secs} s (Ctrl-C para salir)"));
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => {
                ctx.log.info("Monitoreo detenido");
                break;
            }
            _ = ticker.tick() => {
                if ctx.reload() {
                    ctx.log.info("Configuración recargada desde disco");
                }
                let status = system.evaluate(&ctx.config, ctx.selected_file()).await;
                if tracker.observe(&status) {
                    METRICS.record_status_change(status.overall_valid);
                    ctx.log.info("CAMBIO DETECTADO EN EL SISTEMA");
                    ctx.report_status(&status);
                }
            }
        }
    }
}

async fn dispatch(ctx: &mut AppContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Status => {
            let system = SystemStatus::new(NetworkProbe::new(ctx.settings.probe.clone())?);
            let status = system.evaluate(&ctx.config, ctx.selected_file()).await;
            ctx.report_system(&status);
            ctx.log.info(summary(&status).main_message);
        }
        Commands::Watch { interval } => {
            let system = SystemStatus::new(NetworkProbe::new(ctx.settings.probe.clone())?);
            let interval = interval.unwrap_or(ctx.settings.watch.interval_secs);
            watch(ctx, &system, interval).await;
        }
        Commands::Run => {
            let system = SystemStatus::new(NetworkProbe::new(ctx.settings.probe.clone())?);
            let status = system.evaluate(&ctx.config, ctx.selected_file()).await;
            ctx.report_status(&status);
            let (_, message) = ready_message(&status);
            ctx.log.info(message);

            // A refused start is already in the session log.
            if let Ok(report) = execution::run_bot(ctx, &status, ctrl_c()).await {
                tracing::info!(target: "bot", state = ?report.state, processed = report.processed, "run finished");
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            }
            ConfigAction::Path => {
                println!("{}", ctx.store().path().display());
            }
            ConfigAction::Options => {
                for key in OPTION_KEYS {
                    let values = options_for(key).unwrap_or_default();
                    println!("{key}: {}", values.join(" | "));
                }
            }
            ConfigAction::Set { key, value } => {
                ctx.config
                    .set_field(&key, &value)
                    .with_context(|| format!("cannot set configuration key `{key}`"))?;
                ctx.log.info(format!("{key} = {value}"));
                ctx.commit();
            }
            ConfigAction::Reset => {
                ctx.config = Configuration::default();
                ctx.log.warning("Configuración restablecida a valores por defecto");
                ctx.commit();
            }
        },
        Commands::Dates { start, end } => {
            let (valid, message) = validate_date_range(&to_display(&start), &to_display(&end));
            if valid {
                ctx.log.success(message);
            } else {
                ctx.log.error(message);
            }
        }
        Commands::Probe => {
            let probe = NetworkProbe::new(ctx.settings.probe.clone())?;
            let (online, label) = connection_status(&probe).await;
            let line = format!("Estado de conexión: {label}");
            if online {
                ctx.log.success(line);
            } else {
                ctx.log.error(line);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "omegabot=info,bot=info,session=info,run=info,warn");
    }
    let subscriber = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!(target: "bot", "omegabot starting");

    let settings = Settings::load(cli.settings.as_deref())?;
    let dirs = AppDirs::detect(cli.home);
    tracing::debug!(target: "bot", base = %dirs.base().display(), "application folder resolved");

    let mut ctx = AppContext::new(settings, dirs);
    if let Some(path) = cli.file {
        // Rejections are recorded in the session log.
        let _ = ctx.select_file(path);
    }
    monitoring::logger::log_startup(&ctx);

    let outcome = dispatch(&mut ctx, cli.command.unwrap_or(Commands::Status)).await;
    if let Err(err) = &outcome {
        ctx.log.error(format!("{err:#}"));
    }
    ctx.finish();
    outcome
}
