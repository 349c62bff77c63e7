// src/landmarks.rs - Per-frame hand observations as delivered by the landmark detector
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

// MediaPipe hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// Tip indices in thumb, index, middle, ring, pinky order.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Handedness label the tracker attached to a hand this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<String> for Handedness {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<&str> for Handedness {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkPoint {
    pub id: u8,
    pub position: Point2<f64>,
}

impl LandmarkPoint {
    pub fn new(id: u8, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point2::new(x, y),
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    pub handedness: Handedness,
    pub landmarks: Vec<LandmarkPoint>,
}

impl HandObservation {
    pub fn new(handedness: Handedness, landmarks: Vec<LandmarkPoint>) -> Self {
        Self { handedness, landmarks }
    }

    /// Builds an observation from pixel pairs, numbering landmarks by position.
    pub fn from_pixels(handedness: Handedness, pixels: &[(f64, f64)]) -> Self {
        let landmarks = pixels
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| LandmarkPoint::new(i as u8, x, y))
            .collect();
        Self { handedness, landmarks }
    }

    /// Only complete hands can be classified; anything else counts as no detection.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() == LANDMARK_COUNT
    }

    pub fn landmark(&self, index: usize) -> Option<&LandmarkPoint> {
        self.landmarks.get(index)
    }

    /// Reflects every landmark around the vertical centre line of a frame `width` wide.
    pub fn mirrored(&self, width: f64) -> Self {
        let landmarks = self
            .landmarks
            .iter()
            .map(|lm| LandmarkPoint::new(lm.id, width - lm.x(), lm.y()))
            .collect();
        Self {
            handedness: self.handedness,
            landmarks,
        }
    }
}

/// Everything the detector reported for one camera frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Seconds on the producer's clock; stamped by the engine when absent.
    pub timestamp: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub hands: Vec<HandObservation>,
}

impl Frame {
    pub fn new(timestamp: f64, width: u32, height: u32, hands: Vec<HandObservation>) -> Self {
        Self {
            timestamp: Some(timestamp),
            width,
            height,
            hands,
        }
    }

    pub fn mirrored(&self) -> Self {
        Self {
            hands: self
                .hands
                .iter()
                .map(|hand| hand.mirrored(self.width as f64))
                .collect(),
            ..self.clone()
        }
    }
}
