//! `dsed`: parses CLI flags, sets up logging and the single-instance
//! guard, restores persisted instances, and runs the host connection to
//! completion.

use clap::Parser;
use dsep_core::{InstanceName, SystemClock};
use dsep_engine::{MockEngine, ScriptEngine};
use dsep_host::bridge::BridgeState;
use dsep_host::connection::{self, ConnectionConfig};
use dsep_host::{HostBridge, SingleInstanceGuard};
use dsep_registry::{ProcessDefaults, Registry};
use dsep_store::ConnectorStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const PLUGIN_ID: &str = "dsep";

/// Dynamic Script Engine Plugin daemon.
#[derive(Parser, Debug)]
#[command(name = "dsed", version, about)]
struct Cli {
    /// Enable logging output to the system console/stdout at the given level.
    #[arg(short = 's', long, value_name = "LEVEL", default_value_t = 0)]
    stdout: u8,

    /// Enable logging to the primary plugin log file at the given level.
    #[arg(short = 'f', long, value_name = "LEVEL", default_value_t = 1)]
    file: u8,

    /// Enable script console.log logging to the jsfile at the given level.
    #[arg(short = 'j', long, value_name = "LEVEL", default_value_t = 0)]
    jsfile: u8,

    /// Keep this number of previous daily logs.
    #[arg(short = 'k', long, value_name = "DAYS", default_value_t = 3)]
    keep: usize,

    /// Path for log files and the settings file.
    #[arg(short = 'p', long, value_name = "DIR", default_value = "../logs")]
    path: PathBuf,

    /// Rotate log files on startup.
    #[arg(short = 'r', long)]
    rotate: bool,

    /// Exit without starting, e.g. just to rotate logs.
    #[arg(short = 'x', long)]
    exit: bool,

    /// Host address and optional port, "host[:port]". Default 127.0.0.1:12136.
    #[arg(short = 't', long, value_name = "HOST[:PORT]")]
    tphost: Option<String>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let _guards = match dsep_host::init_logging(
        dsep_host::level_from_u8(cli.stdout),
        dsep_host::level_from_u8(cli.file),
        dsep_host::level_from_u8(cli.jsfile),
        &cli.path,
        cli.rotate,
        cli.keep,
    ) {
        Ok(guards) => guards,
        Err(err) => {
            eprintln!("failed to initialize logging: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    if cli.exit {
        info!("exit flag set, shutting down without starting");
        return std::process::ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "dsed exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let _guard = SingleInstanceGuard::acquire(&cli.path)?;

    let settings_path = cli.path.join("settings.json");
    let persisted = dsep_host::load_settings(&settings_path)?;

    let defaults = ProcessDefaults::new();
    defaults.set_repeat_rate_ms(persisted.plugin.default_repeat_rate_ms);
    defaults.set_repeat_delay_ms(persisted.plugin.default_repeat_delay_ms);

    let factory: dsep_registry::EngineFactory =
        Arc::new(|| Box::new(MockEngine::new()) as Box<dyn ScriptEngine>);
    let registry = Arc::new(Registry::new(factory, defaults.clone()));

    let state = Arc::new(BridgeState::default());
    *state.scripts_base_dir.write() = persisted.plugin.scripts_base_dir.clone();
    *state.settings_path.write() = Some(settings_path);

    for (name, raw) in &persisted.dynamic_states {
        let Some(data) = dsep_host::load_instance_record(name, raw) else { continue };
        if let Err(err) = registry.get_or_create(InstanceName::from(name.as_str()), data).await {
            warn!(instance = name, error = %err, "failed to restore saved instance");
        }
    }

    let bridge = Arc::new(HostBridge::new(registry, ConnectorStore::new(), defaults, state, SystemClock));

    let mut config = ConnectionConfig { plugin_id: PLUGIN_ID.to_string(), ..ConnectionConfig::default() };
    if let Some(tphost) = &cli.tphost {
        config = config.with_tphost(tphost);
    }

    let shutdown = CancellationToken::new();
    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_shutdown.cancel();
        }
    });

    connection::run(&config, bridge, shutdown).await?;
    Ok(())
}
