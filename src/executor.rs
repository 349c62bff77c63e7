// src/executor.rs - OS-level action executors, one per platform family
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::actions::{Action, ActionDispatcher};
use crate::config::{CommandLine, ExecutorConfig, LaunchTargets};
use crate::error::{GestureError, GestureResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformFamily {
    /// Bundle/app-name launches through `open`, keys through `osascript`.
    #[serde(rename = "macos")]
    MacOs,
    /// Executable-path launches, keys through PowerShell `SendKeys`.
    #[serde(rename = "windows")]
    Windows,
    /// Executable launches, keys through `xdotool`.
    #[serde(rename = "linux")]
    Linux,
    /// Logs actions without touching the desktop.
    #[serde(rename = "dry-run")]
    DryRun,
}

impl PlatformFamily {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::DryRun => "dry-run",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "mac" => Some(Self::MacOs),
            "windows" | "win" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "dry-run" | "dryrun" | "none" => Some(Self::DryRun),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the executor for the configured (or detected) platform family.
pub fn build_executor(config: &ExecutorConfig) -> Box<dyn ActionDispatcher> {
    let family = config.family();
    info!("Using {} action executor", family);
    match family {
        PlatformFamily::DryRun => Box::new(DryRunExecutor::default()),
        _ => Box::new(
            SystemExecutor::new(family, config.targets()).with_key_timeout(config.key_timeout()),
        ),
    }
}

const DEFAULT_KEY_TIMEOUT: Duration = Duration::from_millis(500);
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Runs real commands. Launches are spawned and reaped on later dispatches; key
/// strokes are awaited up to the key timeout so a failing or hung tool surfaces
/// as an error without stalling the frame loop.
pub struct SystemExecutor {
    family: PlatformFamily,
    targets: LaunchTargets,
    key_timeout: Duration,
    launched: Vec<Child>,
}

impl SystemExecutor {
    pub fn new(family: PlatformFamily, targets: LaunchTargets) -> Self {
        Self {
            family,
            targets,
            key_timeout: DEFAULT_KEY_TIMEOUT,
            launched: Vec::new(),
        }
    }

    pub fn with_key_timeout(mut self, key_timeout: Duration) -> Self {
        self.key_timeout = key_timeout;
        self
    }

    /// Launched applications that have not exited yet.
    pub fn running_launches(&self) -> usize {
        self.launched.len()
    }

    /// Collects launched applications that have exited.
    pub fn reap_launches(&mut self) {
        self.launched.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Launched process {} exited with {}", child.id(), status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Lost track of launched process {}: {}", child.id(), e);
                false
            }
        });
    }

    fn launch(&mut self, action: Action, command: &CommandLine) -> GestureResult<()> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .spawn()
            .map_err(|e| GestureError::Executor {
                action,
                reason: format!("failed launching {}: {}", command.program, e),
            })?;
        self.launched.push(child);
        Ok(())
    }

    fn run_key_tool(&self, action: Action, command: &CommandLine) -> GestureResult<()> {
        let failed = |reason: String| GestureError::Executor { action, reason };

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .spawn()
            .map_err(|e| failed(format!("failed running {}: {}", command.program, e)))?;

        let deadline = Instant::now() + self.key_timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(failed(format!("{} exited with {}", command.program, status)))
                }
                Ok(None) if Instant::now() >= deadline => {
                    // Kill errors only mean it exited meanwhile; wait reaps it either way.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(failed(format!(
                        "{} timed out after {} ms",
                        command.program,
                        self.key_timeout.as_millis()
                    )));
                }
                Ok(None) => thread::sleep(KEY_POLL_INTERVAL),
                Err(e) => return Err(failed(format!("failed waiting on {}: {}", command.program, e))),
            }
        }
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    /// The command line that carries out `action` on this platform.
    pub fn command_for(&self, action: Action) -> GestureResult<CommandLine> {
        match action {
            Action::LaunchPlayer => Ok(self.targets.player.clone()),
            Action::LaunchBrowser => Ok(self.targets.browser.clone()),
            _ => match self.family {
                PlatformFamily::MacOs => self.osascript(action),
                PlatformFamily::Windows => send_keys(action),
                PlatformFamily::Linux => xdotool(action),
                PlatformFamily::DryRun => None,
            }
            .ok_or(GestureError::Unsupported(action, self.family.as_str())),
        }
    }

    fn osascript(&self, action: Action) -> Option<CommandLine> {
        let script = match action {
            Action::ScrollUp => "tell application \"System Events\" to key code 126".to_string(),
            Action::ScrollDown => "tell application \"System Events\" to key code 125".to_string(),
            Action::ConfirmSelection => {
                "tell application \"System Events\" to key code 36".to_string()
            }
            Action::VolumeUp => {
                "set volume output volume ((output volume of (get volume settings)) + 6)"
                    .to_string()
            }
            Action::VolumeDown => {
                "set volume output volume ((output volume of (get volume settings)) - 6)"
                    .to_string()
            }
            Action::PlayPause => format!("tell application \"{}\" to play", self.targets.player_name),
            Action::NextTrack => format!("tell application \"{}\" to next", self.targets.player_name),
            Action::PrevTrack => {
                format!("tell application \"{}\" to previous", self.targets.player_name)
            }
            Action::LaunchPlayer | Action::LaunchBrowser => return None,
        };
        Some(CommandLine {
            program: "osascript".to_string(),
            args: vec!["-e".to_string(), script],
        })
    }
}

fn send_keys(action: Action) -> Option<CommandLine> {
    // Media keys have no SendKeys mnemonic, they go through their virtual-key char.
    let keys = match action {
        Action::ScrollUp => "'{UP}'",
        Action::ScrollDown => "'{DOWN}'",
        Action::ConfirmSelection => "'{ENTER}'",
        Action::VolumeUp => "[char]175",
        Action::VolumeDown => "[char]174",
        Action::PlayPause => "[char]179",
        Action::NextTrack => "[char]176",
        Action::PrevTrack => "[char]177",
        Action::LaunchPlayer | Action::LaunchBrowser => return None,
    };
    let script = format!(
        "$wshell = New-Object -ComObject WScript.Shell; $wshell.SendKeys({})",
        keys
    );
    Some(CommandLine::new(
        "powershell",
        &["-NoProfile", "-NonInteractive", "-Command", &script],
    ))
}

fn xdotool(action: Action) -> Option<CommandLine> {
    let key = match action {
        Action::ScrollUp => "Up",
        Action::ScrollDown => "Down",
        Action::ConfirmSelection => "Return",
        Action::VolumeUp => "XF86AudioRaiseVolume",
        Action::VolumeDown => "XF86AudioLowerVolume",
        Action::PlayPause => "XF86AudioPlay",
        Action::NextTrack => "XF86AudioNext",
        Action::PrevTrack => "XF86AudioPrev",
        Action::LaunchPlayer | Action::LaunchBrowser => return None,
    };
    Some(CommandLine::new("xdotool", &["key", key]))
}

impl ActionDispatcher for SystemExecutor {
    fn name(&self) -> &'static str {
        self.family.as_str()
    }

    fn dispatch(&mut self, action: Action) -> GestureResult<()> {
        self.reap_launches();

        let command = self.command_for(action)?;
        debug!("{} -> {} {:?}", action, command.program, command.args);

        if matches!(action, Action::LaunchPlayer | Action::LaunchBrowser) {
            self.launch(action, &command)
        } else {
            self.run_key_tool(action, &command)
        }
    }
}

/// Records what would have happened; never fails.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    pub dispatched: Vec<Action>,
}

impl ActionDispatcher for DryRunExecutor {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    fn dispatch(&mut self, action: Action) -> GestureResult<()> {
        info!("[dry-run] {}", action);
        self.dispatched.push(action);
        Ok(())
    }
}
