// src/debounce.rs - Per-channel cooldown timers for discrete actions
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::config::DebounceConfig;

/// Discrete actions that share a cooldown timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionChannel {
    LaunchPlayer,
    LaunchBrowser,
    ConfirmSelection,
}

impl ActionChannel {
    pub const ALL: [ActionChannel; 3] = [
        ActionChannel::LaunchPlayer,
        ActionChannel::LaunchBrowser,
        ActionChannel::ConfirmSelection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LaunchPlayer => "launch-player",
            Self::LaunchBrowser => "launch-browser",
            Self::ConfirmSelection => "confirm-selection",
        }
    }
}

impl fmt::Display for ActionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct GestureDebouncer {
    config: DebounceConfig,
    last_fire: HashMap<ActionChannel, f64>,
}

impl GestureDebouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            last_fire: HashMap::new(),
        }
    }

    /// True when a fire on `channel` at `now` would be allowed. Never-fired channels
    /// are always ready; otherwise strictly more than the cooldown must have passed.
    /// A `now` earlier than the last fire means the producer's clock was reset, and
    /// the old stamp no longer says anything about elapsed time.
    pub fn is_ready(&self, channel: ActionChannel, now: f64) -> bool {
        match self.last_fire.get(&channel) {
            Some(&last) if now < last => true,
            Some(&last) => now - last > self.config.cooldown(channel),
            None => true,
        }
    }

    /// Claims the channel at `now` if it is ready. A refused claim changes nothing.
    pub fn try_fire(&mut self, channel: ActionChannel, now: f64) -> bool {
        if !self.is_ready(channel, now) {
            return false;
        }
        self.last_fire.insert(channel, now);
        true
    }

    pub fn last_fire(&self, channel: ActionChannel) -> Option<f64> {
        self.last_fire.get(&channel).copied()
    }

    /// Seconds until `channel` accepts another fire, zero when ready.
    pub fn remaining(&self, channel: ActionChannel, now: f64) -> f64 {
        self.last_fire(channel)
            .filter(|&last| now >= last)
            .map(|last| (self.config.cooldown(channel) - (now - last)).max(0.0))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_fired_channel_is_ready() {
        let debouncer = GestureDebouncer::new(DebounceConfig::default());
        for channel in ActionChannel::ALL {
            assert!(debouncer.is_ready(channel, 0.0));
            assert_eq!(debouncer.last_fire(channel), None);
        }
    }

    #[test]
    fn fires_inside_window_are_refused() {
        let mut debouncer = GestureDebouncer::new(DebounceConfig::default());
        assert!(debouncer.try_fire(ActionChannel::LaunchPlayer, 0.0));
        assert!(!debouncer.try_fire(ActionChannel::LaunchPlayer, 1.0));
        assert_eq!(debouncer.last_fire(ActionChannel::LaunchPlayer), Some(0.0));
        assert!(debouncer.try_fire(ActionChannel::LaunchPlayer, 2.1));
        assert_eq!(debouncer.last_fire(ActionChannel::LaunchPlayer), Some(2.1));
    }

    #[test]
    fn exact_cooldown_boundary_is_still_refused() {
        let mut debouncer = GestureDebouncer::new(DebounceConfig::default());
        assert!(debouncer.try_fire(ActionChannel::ConfirmSelection, 10.0));
        assert!(!debouncer.try_fire(ActionChannel::ConfirmSelection, 12.0));
        assert!(debouncer.try_fire(ActionChannel::ConfirmSelection, 12.001));
    }

    #[test]
    fn channels_cool_down_independently() {
        let mut debouncer = GestureDebouncer::new(DebounceConfig::default());
        assert!(debouncer.try_fire(ActionChannel::LaunchPlayer, 0.0));
        assert!(debouncer.try_fire(ActionChannel::LaunchBrowser, 0.5));
        assert!(debouncer.try_fire(ActionChannel::ConfirmSelection, 0.5));
        assert!(!debouncer.is_ready(ActionChannel::LaunchPlayer, 1.0));
        assert!(debouncer.is_ready(ActionChannel::LaunchPlayer, 2.01));
        assert!(!debouncer.is_ready(ActionChannel::LaunchBrowser, 2.01));
    }

    #[test]
    fn clock_reset_restarts_the_window() {
        let mut debouncer = GestureDebouncer::new(DebounceConfig::default());
        assert!(debouncer.try_fire(ActionChannel::LaunchPlayer, 1_700_000_000.0));
        assert_eq!(debouncer.remaining(ActionChannel::LaunchPlayer, 10.0), 0.0);
        assert!(debouncer.try_fire(ActionChannel::LaunchPlayer, 10.0));
        assert_eq!(debouncer.last_fire(ActionChannel::LaunchPlayer), Some(10.0));
        assert!(!debouncer.try_fire(ActionChannel::LaunchPlayer, 11.0));
    }

    #[test]
    fn per_channel_cooldowns_apply() {
        let config = DebounceConfig {
            launch_browser_cooldown_s: 5.0,
            ..DebounceConfig::default()
        };
        let mut debouncer = GestureDebouncer::new(config);
        debouncer.try_fire(ActionChannel::LaunchBrowser, 0.0);
        assert!(!debouncer.is_ready(ActionChannel::LaunchBrowser, 3.0));
        assert!((debouncer.remaining(ActionChannel::LaunchBrowser, 3.0) - 2.0).abs() < 1e-9);
        assert!(debouncer.is_ready(ActionChannel::LaunchBrowser, 5.5));
        assert_eq!(debouncer.remaining(ActionChannel::LaunchBrowser, 6.0), 0.0);
    }
}
