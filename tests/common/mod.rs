// tests/common/mod.rs - Shared poses and a recording dispatcher
#![allow(dead_code)]

use gesture_deck::landmarks::{LANDMARK_COUNT, THUMB_IP, THUMB_TIP};
use gesture_deck::{Action, ActionDispatcher, Frame, GestureError, GestureResult, HandObservation, Handedness};

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

/// Thumb tip height that sits in neither scroll band.
pub const MIDDLE_Y: f64 = 240.0;

const NON_THUMB_TIPS: [usize; 4] = [8, 12, 16, 20];

/// A 21-point hand with the given fingers (thumb first) extended.
pub fn pose(handedness: Handedness, extended: [bool; 5], thumb_tip_y: f64) -> HandObservation {
    let mut pixels = [(300.0, 300.0); LANDMARK_COUNT];
    pixels[THUMB_IP] = (250.0, 300.0);
    pixels[THUMB_TIP] = (if extended[0] { 200.0 } else { 280.0 }, thumb_tip_y);
    for (finger, &tip) in NON_THUMB_TIPS.iter().enumerate() {
        pixels[tip] = (300.0, if extended[finger + 1] { 200.0 } else { 320.0 });
    }
    HandObservation::from_pixels(handedness, &pixels)
}

/// First `count` fingers extended, thumb first.
pub fn count_pose(handedness: Handedness, count: usize, thumb_tip_y: f64) -> HandObservation {
    let mut extended = [false; 5];
    for finger in extended.iter_mut().take(count) {
        *finger = true;
    }
    pose(handedness, extended, thumb_tip_y)
}

pub fn left(count: usize) -> HandObservation {
    count_pose(Handedness::Left, count, MIDDLE_Y)
}

pub fn right(count: usize, thumb_tip_y: f64) -> HandObservation {
    count_pose(Handedness::Right, count, thumb_tip_y)
}

pub fn frame(t: f64, hands: Vec<HandObservation>) -> Frame {
    Frame::new(t, WIDTH, HEIGHT, hands)
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub actions: Vec<Action>,
    pub failing: Vec<Action>,
}

impl Recorder {
    pub fn failing(actions: &[Action]) -> Self {
        Self {
            actions: Vec::new(),
            failing: actions.to_vec(),
        }
    }

    pub fn count(&self, action: Action) -> usize {
        self.actions.iter().filter(|&&a| a == action).count()
    }
}

impl ActionDispatcher for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn dispatch(&mut self, action: Action) -> GestureResult<()> {
        self.actions.push(action);
        if self.failing.contains(&action) {
            return Err(GestureError::Executor {
                action,
                reason: "launch refused".to_string(),
            });
        }
        Ok(())
    }
}
