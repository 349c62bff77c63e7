// src/config.rs - Engine configuration: thresholds, rule options, launch targets
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::debounce::ActionChannel;
use crate::error::{GestureError, GestureResult};
use crate::executor::PlatformFamily;
use crate::landmarks::{FINGERTIPS, LANDMARK_COUNT};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub debounce: DebounceConfig,
    pub rules: RuleConfig,
    pub source: SourceConfig,
    pub executor: ExecutorConfig,
    pub session: SessionConfig,
}

/// Which horizontal direction counts as an extended thumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbExtension {
    /// Tip left of the IP joint (mirrored selfie view of a right hand).
    TowardSmallerX,
    TowardLargerX,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Thumb, index, middle, ring, pinky tip indices.
    pub fingertips: [usize; 5],
    pub thumb_extension: ThumbExtension,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fingertips: FINGERTIPS,
            thumb_extension: ThumbExtension::TowardSmallerX,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub launch_player_cooldown_s: f64,
    pub launch_browser_cooldown_s: f64,
    pub confirm_selection_cooldown_s: f64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            launch_player_cooldown_s: 2.0,
            launch_browser_cooldown_s: 2.0,
            confirm_selection_cooldown_s: 2.0,
        }
    }
}

impl DebounceConfig {
    pub fn cooldown(&self, channel: ActionChannel) -> f64 {
        match channel {
            ActionChannel::LaunchPlayer => self.launch_player_cooldown_s,
            ActionChannel::LaunchBrowser => self.launch_browser_cooldown_s,
            ActionChannel::ConfirmSelection => self.confirm_selection_cooldown_s,
        }
    }
}

/// Who owns a five-finger controller pose when selection and playback are both live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FivePrecedence {
    /// Playback mode wins: five fingers mean prevtrack, confirm-selection is skipped.
    Playback,
    /// Browser mode wins: five fingers confirm, prevtrack is skipped.
    Selection,
    /// Evaluate both rules independently.
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Thumb tip above this fraction of the height scrolls up.
    pub scroll_upper_fraction: f64,
    /// Thumb tip below this fraction of the height scrolls down.
    pub scroll_lower_fraction: f64,
    /// Height used for the scroll bands instead of the frame height.
    pub reference_height: Option<f64>,
    pub five_precedence: FivePrecedence,
    /// Set mode flags even when the launch itself failed.
    pub optimistic_flags: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            scroll_upper_fraction: 1.0 / 3.0,
            scroll_lower_fraction: 2.0 / 3.0,
            reference_height: None,
            five_precedence: FivePrecedence::Playback,
            optimistic_flags: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Flip x coordinates before classification (unmirrored camera feeds).
    pub mirror: bool,
}

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchTargets {
    pub player: CommandLine,
    pub browser: CommandLine,
    /// Application that receives playback commands where keys are app-scoped.
    pub player_name: String,
}

impl LaunchTargets {
    pub fn for_family(family: PlatformFamily) -> Self {
        match family {
            PlatformFamily::MacOs => Self {
                player: CommandLine::new("open", &["-a", "VLC"]),
                browser: CommandLine::new("open", &["/System/Library/CoreServices/Finder.app"]),
                player_name: "VLC".to_string(),
            },
            PlatformFamily::Windows => Self {
                player: CommandLine::new(r"C:\Program Files\VideoLAN\VLC\vlc.exe", &[]),
                browser: CommandLine::new("explorer.exe", &[]),
                player_name: "VLC".to_string(),
            },
            PlatformFamily::Linux | PlatformFamily::DryRun => Self {
                player: CommandLine::new("vlc", &[]),
                browser: CommandLine::new("xdg-open", &["."]),
                player_name: "vlc".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Forced platform family; detected from the build target when unset.
    pub platform: Option<PlatformFamily>,
    /// Overrides the family's default launch targets.
    pub targets: Option<LaunchTargets>,
    /// Longest a key-stroke tool may run before it is killed and reported as failed.
    pub key_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            platform: None,
            targets: None,
            key_timeout_ms: 500,
        }
    }
}

impl ExecutorConfig {
    pub fn key_timeout(&self) -> Duration {
        Duration::from_millis(self.key_timeout_ms)
    }

    pub fn family(&self) -> PlatformFamily {
        self.platform.unwrap_or_else(PlatformFamily::detect)
    }

    pub fn targets(&self) -> LaunchTargets {
        self.targets
            .clone()
            .unwrap_or_else(|| LaunchTargets::for_family(self.family()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: directories::UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|p| p.join("GestureDeck")))
                .unwrap_or_else(|| PathBuf::from("./sessions")),
        }
    }
}

impl EngineConfig {
    /// Location of the per-user config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gesturedeck", "GestureDeck")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// An explicit path must exist; the per-user default is optional.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(default) if default.exists() => Self::load(default),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> GestureResult<()> {
        let tips = &self.classifier.fingertips;
        if tips.iter().any(|&tip| tip >= LANDMARK_COUNT) {
            return Err(GestureError::InvalidConfig(format!(
                "fingertip indices must be below {}: {:?}",
                LANDMARK_COUNT, tips
            )));
        }
        if tips[0] < 1 || tips[1..].iter().any(|&tip| tip < 2) {
            return Err(GestureError::InvalidConfig(format!(
                "fingertip indices leave no joint to compare against: {:?}",
                tips
            )));
        }

        for channel in ActionChannel::ALL {
            let cooldown = self.debounce.cooldown(channel);
            if !cooldown.is_finite() || cooldown < 0.0 {
                return Err(GestureError::InvalidConfig(format!(
                    "cooldown for {} must be a non-negative number, got {}",
                    channel, cooldown
                )));
            }
        }

        let upper = self.rules.scroll_upper_fraction;
        let lower = self.rules.scroll_lower_fraction;
        if !(0.0..=1.0).contains(&upper) || !(0.0..=1.0).contains(&lower) || upper > lower {
            return Err(GestureError::InvalidConfig(format!(
                "scroll bands must satisfy 0 <= upper ({}) <= lower ({}) <= 1",
                upper, lower
            )));
        }
        if self.executor.key_timeout_ms == 0 {
            return Err(GestureError::InvalidConfig(
                "key timeout must be at least 1 ms".to_string(),
            ));
        }
        if let Some(height) = self.rules.reference_height {
            if height.is_nan() || height <= 0.0 {
                return Err(GestureError::InvalidConfig(format!(
                    "reference height must be positive, got {}",
                    height
                )));
            }
        }

        Ok(())
    }
}
