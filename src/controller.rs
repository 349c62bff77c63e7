// src/controller.rs - Mode flags, cooldowns and the gesture-to-action rule table
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::actions::{Action, ActionDispatcher};
use crate::classifier::FingerState;
use crate::config::{DebounceConfig, FivePrecedence, RuleConfig};
use crate::debounce::{ActionChannel, GestureDebouncer};
use crate::error::GestureResult;
use crate::router::Role;

/// Application modes unlocked by launcher gestures and the palm confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModeFlags {
    /// File browser is open: scrolling and confirmation are live.
    pub launcher_opened: bool,
    pub player_opened: bool,
    pub selection_confirmed: bool,
}

impl ModeFlags {
    /// Playback controls need both an open player and a confirmed selection.
    pub fn media_live(&self) -> bool {
        self.player_opened && self.selection_confirmed
    }
}

/// What the controller hand contributes to rule evaluation this frame.
#[derive(Debug, Clone, Copy)]
pub struct ControllerHand {
    pub fingers: FingerState,
    pub thumb_tip_y: f64,
}

/// Classified, role-assigned input for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput {
    pub now: f64,
    /// Height the scroll bands are measured against.
    pub scroll_height: f64,
    pub launcher: Option<FingerState>,
    pub controller: Option<ControllerHand>,
}

/// One action handed to the dispatcher, with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dispatch {
    pub timestamp: f64,
    pub role: Role,
    pub action: Action,
    pub error: Option<String>,
}

impl Dispatch {
    fn new(timestamp: f64, role: Role, action: Action, result: &GestureResult<()>) -> Self {
        Self {
            timestamp,
            role,
            action,
            error: result.as_ref().err().map(|e| e.to_string()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Owned by exactly one processing loop. Flags only ever go from false to true.
#[derive(Debug, Clone)]
pub struct ControllerState {
    flags: ModeFlags,
    debouncer: GestureDebouncer,
    rules: RuleConfig,
}

impl ControllerState {
    pub fn new(debounce: DebounceConfig, rules: RuleConfig) -> Self {
        Self::with_flags(ModeFlags::default(), debounce, rules)
    }

    /// Starts with some applications already known to be open.
    pub fn with_flags(flags: ModeFlags, debounce: DebounceConfig, rules: RuleConfig) -> Self {
        Self {
            flags,
            debouncer: GestureDebouncer::new(debounce),
            rules,
        }
    }

    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    pub fn debouncer(&self) -> &GestureDebouncer {
        &self.debouncer
    }

    /// Evaluates the rule table for one frame, launcher rules first, and dispatches
    /// every action that survives the debouncer.
    pub fn apply<D: ActionDispatcher + ?Sized>(
        &mut self,
        input: &RuleInput,
        dispatcher: &mut D,
    ) -> Vec<Dispatch> {
        let mut dispatched = Vec::new();

        if let Some(fingers) = input.launcher {
            self.apply_launcher(fingers, input.now, dispatcher, &mut dispatched);
        }
        if let Some(hand) = input.controller {
            self.apply_controller(&hand, input, dispatcher, &mut dispatched);
        }

        dispatched
    }

    fn apply_launcher<D: ActionDispatcher + ?Sized>(
        &mut self,
        fingers: FingerState,
        now: f64,
        dispatcher: &mut D,
        out: &mut Vec<Dispatch>,
    ) {
        match fingers.count() {
            2 => self.fire_debounced(Role::Launcher, ActionChannel::LaunchPlayer, now, dispatcher, out),
            3 => self.fire_debounced(Role::Launcher, ActionChannel::LaunchBrowser, now, dispatcher, out),
            _ => {}
        }
    }

    fn apply_controller<D: ActionDispatcher + ?Sized>(
        &mut self,
        hand: &ControllerHand,
        input: &RuleInput,
        dispatcher: &mut D,
        out: &mut Vec<Dispatch>,
    ) {
        let count = hand.fingers.count();
        let five = count == 5;
        // Precedence is decided on the modes the frame started with.
        let at_start = self.flags;

        if self.flags.launcher_opened {
            // Without a usable height there are no screen bands to scroll from.
            if input.scroll_height.is_finite() && input.scroll_height > 0.0 {
                let upper = input.scroll_height * self.rules.scroll_upper_fraction;
                let lower = input.scroll_height * self.rules.scroll_lower_fraction;
                if hand.thumb_tip_y < upper {
                    self.fire_continuous(Role::Controller, Action::ScrollUp, input.now, dispatcher, out);
                } else if hand.thumb_tip_y > lower {
                    self.fire_continuous(Role::Controller, Action::ScrollDown, input.now, dispatcher, out);
                }
            }

            let confirm_allowed = match self.rules.five_precedence {
                FivePrecedence::Playback => !at_start.media_live(),
                FivePrecedence::Selection | FivePrecedence::Both => true,
            };
            if five && confirm_allowed {
                self.fire_debounced(
                    Role::Controller,
                    ActionChannel::ConfirmSelection,
                    input.now,
                    dispatcher,
                    out,
                );
            }
        }

        if self.flags.media_live() {
            let prevtrack_allowed = match self.rules.five_precedence {
                FivePrecedence::Playback => at_start.media_live(),
                FivePrecedence::Selection => !at_start.launcher_opened,
                FivePrecedence::Both => true,
            };
            if let Some(action) = Action::for_media_count(count) {
                if !five || prevtrack_allowed {
                    self.fire_continuous(Role::Controller, action, input.now, dispatcher, out);
                } else {
                    trace!("Five-finger pose reserved for confirm-selection, prevtrack skipped");
                }
            }
        }
    }

    fn fire_debounced<D: ActionDispatcher + ?Sized>(
        &mut self,
        role: Role,
        channel: ActionChannel,
        now: f64,
        dispatcher: &mut D,
        out: &mut Vec<Dispatch>,
    ) {
        if !self.debouncer.try_fire(channel, now) {
            trace!(
                "{} suppressed, {:.2}s of cooldown left",
                channel,
                self.debouncer.remaining(channel, now)
            );
            return;
        }

        let action = Action::from(channel);
        let result = dispatcher.dispatch(action);
        match &result {
            Ok(()) => info!("{} fired by {} hand at t={:.3}", action, role, now),
            Err(e) => warn!("{} failed: {}", action, e),
        }

        if result.is_ok() || self.rules.optimistic_flags {
            self.set_flag(channel);
        }
        out.push(Dispatch::new(now, role, action, &result));
    }

    fn fire_continuous<D: ActionDispatcher + ?Sized>(
        &mut self,
        role: Role,
        action: Action,
        now: f64,
        dispatcher: &mut D,
        out: &mut Vec<Dispatch>,
    ) {
        let result = dispatcher.dispatch(action);
        match &result {
            Ok(()) => debug!("{} from {} hand", action, role),
            Err(e) => warn!("{} failed: {}", action, e),
        }
        out.push(Dispatch::new(now, role, action, &result));
    }

    fn set_flag(&mut self, channel: ActionChannel) {
        match channel {
            ActionChannel::LaunchPlayer => self.flags.player_opened = true,
            ActionChannel::LaunchBrowser => self.flags.launcher_opened = true,
            ActionChannel::ConfirmSelection => self.flags.selection_confirmed = true,
        }
    }
}
