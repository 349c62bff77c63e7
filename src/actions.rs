// src/actions.rs - Named actions and the executor seam
use serde::Serialize;
use std::fmt;

use crate::debounce::ActionChannel;
use crate::error::GestureResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    LaunchPlayer,
    LaunchBrowser,
    #[serde(rename = "volumeup")]
    VolumeUp,
    #[serde(rename = "volumedown")]
    VolumeDown,
    #[serde(rename = "playpause")]
    PlayPause,
    #[serde(rename = "nexttrack")]
    NextTrack,
    #[serde(rename = "prevtrack")]
    PrevTrack,
    ScrollUp,
    ScrollDown,
    ConfirmSelection,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::LaunchPlayer,
        Action::LaunchBrowser,
        Action::VolumeUp,
        Action::VolumeDown,
        Action::PlayPause,
        Action::NextTrack,
        Action::PrevTrack,
        Action::ScrollUp,
        Action::ScrollDown,
        Action::ConfirmSelection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LaunchPlayer => "launch-player",
            Self::LaunchBrowser => "launch-browser",
            Self::VolumeUp => "volumeup",
            Self::VolumeDown => "volumedown",
            Self::PlayPause => "playpause",
            Self::NextTrack => "nexttrack",
            Self::PrevTrack => "prevtrack",
            Self::ScrollUp => "scroll-up",
            Self::ScrollDown => "scroll-down",
            Self::ConfirmSelection => "confirm-selection",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }

    /// Debounced actions own a channel; continuous ones return `None`.
    pub fn channel(&self) -> Option<ActionChannel> {
        match self {
            Self::LaunchPlayer => Some(ActionChannel::LaunchPlayer),
            Self::LaunchBrowser => Some(ActionChannel::LaunchBrowser),
            Self::ConfirmSelection => Some(ActionChannel::ConfirmSelection),
            _ => None,
        }
    }

    /// Playback control for a given extended-finger count on the controller hand.
    pub fn for_media_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::VolumeUp),
            2 => Some(Self::VolumeDown),
            3 => Some(Self::PlayPause),
            4 => Some(Self::NextTrack),
            5 => Some(Self::PrevTrack),
            _ => None,
        }
    }
}

impl From<ActionChannel> for Action {
    fn from(channel: ActionChannel) -> Self {
        match channel {
            ActionChannel::LaunchPlayer => Self::LaunchPlayer,
            ActionChannel::LaunchBrowser => Self::LaunchBrowser,
            ActionChannel::ConfirmSelection => Self::ConfirmSelection,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns an abstract action into an OS effect (process launch, key press).
pub trait ActionDispatcher {
    fn name(&self) -> &'static str;

    fn dispatch(&mut self, action: Action) -> GestureResult<()>;
}

impl<D: ActionDispatcher + ?Sized> ActionDispatcher for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn dispatch(&mut self, action: Action) -> GestureResult<()> {
        (**self).dispatch(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
        assert_eq!(Action::parse("rewind"), None);
    }

    #[test]
    fn only_discrete_actions_have_channels() {
        let debounced: Vec<Action> = Action::ALL
            .into_iter()
            .filter(|action| action.channel().is_some())
            .collect();
        assert_eq!(
            debounced,
            vec![Action::LaunchPlayer, Action::LaunchBrowser, Action::ConfirmSelection]
        );
        for channel in ActionChannel::ALL {
            assert_eq!(Action::from(channel).channel(), Some(channel));
        }
    }

    #[test]
    fn media_counts_map_in_order() {
        assert_eq!(Action::for_media_count(0), None);
        assert_eq!(Action::for_media_count(1), Some(Action::VolumeUp));
        assert_eq!(Action::for_media_count(2), Some(Action::VolumeDown));
        assert_eq!(Action::for_media_count(3), Some(Action::PlayPause));
        assert_eq!(Action::for_media_count(4), Some(Action::NextTrack));
        assert_eq!(Action::for_media_count(5), Some(Action::PrevTrack));
        assert_eq!(Action::for_media_count(6), None);
    }
}
