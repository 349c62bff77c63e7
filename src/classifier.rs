// src/classifier.rs - Finger extension state from raw landmark geometry
use serde::Serialize;

use crate::config::{ClassifierConfig, ThumbExtension};
use crate::landmarks::HandObservation;

/// Extension flags in thumb, index, middle, ring, pinky order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FingerState(pub [bool; 5]);

impl FingerState {
    pub fn thumb(&self) -> bool {
        self.0[0]
    }

    pub fn index(&self) -> bool {
        self.0[1]
    }

    pub fn middle(&self) -> bool {
        self.0[2]
    }

    pub fn ring(&self) -> bool {
        self.0[3]
    }

    pub fn pinky(&self) -> bool {
        self.0[4]
    }

    /// Number of extended fingers, always within 0..=5.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&up| up).count()
    }

    pub fn as_bits(&self) -> [u8; 5] {
        self.0.map(u8::from)
    }
}

/// Classifies a complete hand. Returns `None` unless the hand has exactly 21 landmarks.
///
/// The thumb is judged on the horizontal axis because it opens sideways from the
/// palm; the other four fingers are judged on the vertical axis against the joint
/// two landmarks closer to the wrist. Image y grows downward, so "above" means a
/// smaller y.
pub fn classify(hand: &HandObservation, config: &ClassifierConfig) -> Option<FingerState> {
    if !hand.is_complete() {
        return None;
    }

    let tips = config.fingertips;
    let mut fingers = [false; 5];

    let thumb_tip = hand.landmark(tips[0])?;
    let thumb_joint = hand.landmark(tips[0].checked_sub(1)?)?;
    fingers[0] = match config.thumb_extension {
        ThumbExtension::TowardSmallerX => thumb_tip.x() < thumb_joint.x(),
        ThumbExtension::TowardLargerX => thumb_tip.x() > thumb_joint.x(),
    };

    for finger in 1..5 {
        let tip = hand.landmark(tips[finger])?;
        let joint = hand.landmark(tips[finger].checked_sub(2)?)?;
        fingers[finger] = tip.y() < joint.y();
    }

    Some(FingerState(fingers))
}
