use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use fixwatch_proto::PositionFix;
use fixwatch_source::shell::{ShellPositionSource, ShellSourceConfig, DEFAULT_SCRIPT};
use fixwatch_source::{doctor, PositionSource, SourceError, SourceEvent};

#[derive(Debug, Parser)]
#[command(name = "fixwatch", version, about = "Watch a position feed served by an external interpreter process")]
struct Cli {
    /// Optional TOML config file; built-in defaults apply otherwise.
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate interpreter, script and interval settings.
    Doctor,
    /// Stream continuous position updates until Ctrl-C.
    Watch,
    /// Ask for exactly one fix.
    Once {
        /// Timeout in milliseconds; 0 selects the generous cold-start default.
        #[arg(long, default_value_t = 0)]
        timeout_ms: u64,
    },
}

#[derive(Debug, Default, serde::Deserialize)]
struct Config {
    source: Option<SourceCfg>,
}

#[derive(Debug, serde::Deserialize)]
struct SourceCfg {
    program: Option<String>,
    args: Option<Vec<String>>,
    poll_command: Option<String>,
    keepalive_command: Option<String>,
    update_interval_ms: Option<u64>,
    /// Override for the bundled watcher script.
    script_path: Option<String>,
}

fn load_config(path: Option<&str>) -> Result<Config> {
    let Some(path) = path else { return Ok(Config::default()) };
    let s = std::fs::read_to_string(path).with_context(|| format!("read config {}", path))?;
    toml::from_str(&s).context("parse config toml")
}

fn source_config(cfg: &Config) -> ShellSourceConfig {
    let mut out = ShellSourceConfig::default();
    let Some(src) = &cfg.source else { return out };
    if let Some(program) = &src.program {
        out.program = program.clone();
    }
    if let Some(args) = &src.args {
        out.args = args.clone();
    }
    if let Some(poll) = &src.poll_command {
        out.poll_command = poll.clone();
    }
    if let Some(keepalive) = &src.keepalive_command {
        out.keepalive_command = keepalive.clone();
    }
    if let Some(ms) = src.update_interval_ms {
        out.update_interval = Duration::from_millis(ms);
    }
    out
}

fn load_script(cfg: &Config) -> Result<String> {
    match cfg.source.as_ref().and_then(|s| s.script_path.as_ref()) {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read watcher script {}", path))
        }
        None => Ok(DEFAULT_SCRIPT.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Doctor => run_doctor(&cfg),
        Command::Watch => watch(&cfg).await,
        Command::Once { timeout_ms } => once(&cfg, Duration::from_millis(timeout_ms)).await,
    }
}

fn run_doctor(cfg: &Config) -> Result<()> {
    let source_cfg = source_config(cfg);
    let script = load_script(cfg)?;

    let interpreter = doctor::check_interpreter(&source_cfg.program)?;
    doctor::check_script(&script)?;
    doctor::check_update_interval(source_cfg.update_interval)?;

    info!("doctor: interpreter {}", interpreter.display());
    info!("doctor: OK");
    Ok(())
}

async fn watch(cfg: &Config) -> Result<()> {
    let source = ShellPositionSource::with_script(source_config(cfg), load_script(cfg)?);
    let mut events = source.subscribe();

    source.start_updates();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SourceEvent::PositionUpdated(fix)) => print_fix(&fix),
                Ok(SourceEvent::Error(e)) => warn!("position source error: {}", e),
                Ok(SourceEvent::UpdateTimeout) => warn!("update timed out"),
                Err(_) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("stopping updates");
                source.stop_updates();
                break;
            }
        }
    }

    source.close().await;
    Ok(())
}

async fn once(cfg: &Config, timeout: Duration) -> Result<()> {
    let source = ShellPositionSource::with_script(source_config(cfg), load_script(cfg)?);
    let mut events = source.subscribe();

    source.request_update(timeout);
    let outcome = loop {
        match events.recv().await {
            Ok(SourceEvent::PositionUpdated(fix)) => break Ok(fix),
            // unavailable means no request is in flight and nothing will arrive
            Ok(SourceEvent::Error(e @ SourceError::SourceUnavailable)) => {
                break Err(anyhow::anyhow!(e))
            }
            Ok(SourceEvent::Error(e)) => warn!("position source error: {}", e),
            Ok(SourceEvent::UpdateTimeout) => break Err(anyhow::anyhow!("no fix within timeout")),
            Err(_) => break Err(anyhow::anyhow!("position source stopped")),
        }
    };
    source.close().await;

    let fix = outcome?;
    print_fix(&fix);
    Ok(())
}

fn print_fix(fix: &PositionFix) {
    let alt = fix
        .altitude
        .map(|a| format!("{:.1}", a))
        .unwrap_or_else(|| "-".into());
    let vacc = fix
        .vertical_accuracy
        .map(|a| format!("{:.1}", a))
        .unwrap_or_else(|| "-".into());
    println!(
        "{} lat={:.6} lon={:.6} alt={} hacc={:.1} vacc={}",
        fix.timestamp, fix.latitude, fix.longitude, alt, fix.horizontal_accuracy, vacc
    );
}
