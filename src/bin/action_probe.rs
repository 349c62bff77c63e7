// src/bin/action_probe.rs - Fires a single action through the platform executor
use clap::Parser;
use std::path::PathBuf;

use gesture_deck::config::EngineConfig;
use gesture_deck::executor::{build_executor, PlatformFamily};
use gesture_deck::{Action, ActionDispatcher};

#[derive(Parser, Debug)]
#[command(name = "action_probe", about = "Check that an action works on this desktop")]
struct Cli {
    /// Action name, e.g. playpause or launch-browser
    action: String,

    /// Executor family to probe (default: detected)
    #[arg(long)]
    platform: Option<String>,

    /// Config file with launch targets
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(action) = Action::parse(&cli.action) else {
        println!("✗ Unknown action: {}", cli.action);
        println!("\nKnown actions:");
        for action in Action::ALL {
            println!("  {}", action);
        }
        std::process::exit(2);
    };

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;
    if let Some(name) = &cli.platform {
        match PlatformFamily::parse(name) {
            Some(family) => config.executor.platform = Some(family),
            None => anyhow::bail!("Unknown platform: {}", name),
        }
    }

    let mut executor = build_executor(&config.executor);
    println!("Testing {} via the {} executor...\n", action, executor.name());

    match executor.dispatch(action) {
        Ok(()) => println!("✓ {} dispatched - ACTION WORKING!", action),
        Err(e) => {
            println!("✗ {}", e);
            println!("\nPossible causes:");
            match config.executor.family() {
                PlatformFamily::MacOs => {
                    println!("1. Accessibility permission not granted to the terminal");
                    println!("2. Target application not installed");
                }
                PlatformFamily::Windows => {
                    println!("1. PowerShell execution blocked");
                    println!("2. Target executable path wrong in config");
                }
                PlatformFamily::Linux => {
                    println!("1. xdotool not installed");
                    println!("2. No X display available");
                    println!("3. Target program not on PATH");
                }
                PlatformFamily::DryRun => {}
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
