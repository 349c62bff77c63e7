// src/main.rs
use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::{debug, error, info, Level};

use gesture_deck::config::EngineConfig;
use gesture_deck::controller::ModeFlags;
use gesture_deck::executor::{build_executor, PlatformFamily};
use gesture_deck::session::SessionLog;
use gesture_deck::source::FrameSource;
use gesture_deck::GestureEngine;

const METRICS_LOG_INTERVAL: u64 = 300;

#[derive(Parser, Debug)]
#[command(
    name = "gesture_deck",
    version,
    about = "Turns hand-landmark frames into media and file-browser actions"
)]
struct Cli {
    /// Config file (default: per-user config.json if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-lines frame file (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Executor family: macos, windows, linux or dry-run (default: detected)
    #[arg(long)]
    platform: Option<String>,

    /// Log actions instead of executing them
    #[arg(long)]
    dry_run: bool,

    /// Flip x coordinates of incoming frames
    #[arg(long)]
    mirror: bool,

    /// Start with the player already open
    #[arg(long)]
    player_open: bool,

    /// Start with the file browser already open
    #[arg(long)]
    browser_open: bool,

    /// Don't write dispatch_log.csv / summary.json
    #[arg(long)]
    no_session: bool,

    /// Directory for session output
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Session directory name (default: timestamped)
    #[arg(long)]
    session_name: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn apply_overrides(&self, config: &mut EngineConfig) -> Result<()> {
        if self.dry_run {
            config.executor.platform = Some(PlatformFamily::DryRun);
        } else if let Some(name) = &self.platform {
            match PlatformFamily::parse(name) {
                Some(family) => config.executor.platform = Some(family),
                None => bail!("Unknown platform: {}. Use: macos, windows, linux or dry-run", name),
            }
        }
        if self.mirror {
            config.source.mirror = true;
        }
        if self.no_session {
            config.session.enabled = false;
        }
        if let Some(dir) = &self.output_dir {
            config.session.output_dir = dir.clone();
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Frames arrive on stdin, so logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    info!("gesture_deck v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config)?;
    config.validate()?;

    let mut source = match &cli.input {
        Some(path) => FrameSource::new_file(path, config.source.mirror).await?,
        None => FrameSource::new_stdin(config.source.mirror),
    };
    info!("Reading frames from {}", source.info().origin.display());

    let initial_flags = ModeFlags {
        launcher_opened: cli.browser_open,
        player_opened: cli.player_open,
        selection_confirmed: false,
    };
    let executor = build_executor(&config.executor);
    let mut session = config
        .session
        .enabled
        .then(|| SessionLog::new(&config.session.output_dir, cli.session_name.clone()));
    let mut engine = GestureEngine::with_flags(config, executor, initial_flags);

    let stop = tokio::signal::ctrl_c();
    tokio::pin!(stop);

    loop {
        tokio::select! {
            frame = source.next_frame() => {
                let Some(frame) = frame else {
                    info!("Frame source closed");
                    break;
                };
                let (report, metrics) = engine.process_frame_with_metrics(&frame);
                if let Some(session) = session.as_mut() {
                    session.record(&report);
                }
                if metrics.frames % METRICS_LOG_INTERVAL == 0 {
                    debug!(
                        "{} frames, {:.0} fps, {:.2} ms/frame",
                        metrics.frames,
                        metrics.avg_fps,
                        metrics.avg_processing_time * 1000.0
                    );
                }
            }
            _ = &mut stop => {
                info!("Stop requested");
                break;
            }
        }
    }

    let metrics = engine.metrics();
    let source_info = source.info();
    info!(
        "Processed {} frames ({} malformed lines skipped), {} dispatches, {} failed",
        metrics.frames, source_info.malformed, metrics.dispatches, metrics.failed_dispatches
    );
    info!("Final state: {:?}", engine.flags());

    if let Some(session) = &session {
        if let Err(e) = session.export(engine.flags(), metrics) {
            error!("Failed to export session {}: {:#}", session.session_name(), e);
        }
    }

    Ok(())
}
