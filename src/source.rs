// src/source.rs - Frame sources: JSON lines from the landmark detector, via stdin or a file
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::{debug, warn};

use crate::error::{GestureError, GestureResult};
use crate::landmarks::{Frame, Handedness, HandObservation, LandmarkPoint};

#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(default)]
    timestamp: Option<f64>,
    width: u32,
    height: u32,
    #[serde(default)]
    hands: Vec<WireHand>,
}

#[derive(Debug, Deserialize)]
struct WireHand {
    #[serde(default = "unknown_hand")]
    handedness: Handedness,
    #[serde(default)]
    landmarks: Vec<WireLandmark>,
}

fn unknown_hand() -> Handedness {
    Handedness::Unknown
}

/// Detectors emit either `{"id", "x", "y"}` objects or bare `[x, y(, z)]` arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireLandmark {
    // Arrays first: a derived struct also accepts a sequence and would eat them.
    Coords(Vec<f64>),
    Point {
        #[serde(default)]
        id: Option<u8>,
        x: f64,
        y: f64,
    },
}

impl WireHand {
    /// Landmarks are placed by `id`, so detectors may list them in any order.
    fn into_observation(self) -> HandObservation {
        let mut landmarks: Vec<LandmarkPoint> = self
            .landmarks
            .into_iter()
            .enumerate()
            .filter_map(|(i, lm)| match lm {
                WireLandmark::Point { id, x, y } => {
                    Some(LandmarkPoint::new(id.unwrap_or(i as u8), x, y))
                }
                WireLandmark::Coords(coords) if coords.len() >= 2 => {
                    Some(LandmarkPoint::new(i as u8, coords[0], coords[1]))
                }
                // A short coordinate array leaves the hand incomplete, which skips it.
                WireLandmark::Coords(_) => None,
            })
            .collect();

        if !ids_match_positions(&landmarks) {
            landmarks.sort_by_key(|lm| lm.id);
            if !ids_match_positions(&landmarks) {
                debug!("Dropping {} hand with duplicate or missing landmark ids", self.handedness);
                landmarks.clear();
            }
        }
        HandObservation::new(self.handedness, landmarks)
    }
}

fn ids_match_positions(landmarks: &[LandmarkPoint]) -> bool {
    landmarks
        .iter()
        .enumerate()
        .all(|(i, lm)| lm.id as usize == i)
}

/// Parses one JSON line into a frame.
pub fn parse_frame(line: &str) -> GestureResult<Frame> {
    let wire: WireFrame = serde_json::from_str(line)?;
    if wire.width == 0 || wire.height == 0 {
        return Err(GestureError::InvalidFrame(format!(
            "empty frame size {}x{}",
            wire.width, wire.height
        )));
    }
    Ok(Frame {
        timestamp: wire.timestamp,
        width: wire.width,
        height: wire.height,
        hands: wire
            .hands
            .into_iter()
            .map(WireHand::into_observation)
            .collect(),
    })
}

#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub origin: PathBuf,
    pub lines_read: u64,
    pub frames: u64,
    pub malformed: u64,
}

/// Reads frames until the producer closes its end.
pub struct FrameSource {
    lines: Lines<BufReader<Box<dyn AsyncRead + Unpin + Send>>>,
    mirror: bool,
    info: SourceInfo,
}

impl FrameSource {
    pub fn new_stdin(mirror: bool) -> Self {
        Self::from_reader(Box::new(tokio::io::stdin()), PathBuf::from("stdin://"), mirror)
    }

    pub async fn new_file(path: impl AsRef<Path>, mirror: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("Failed to open frame file {}", path.display()))?;
        Ok(Self::from_reader(Box::new(file), path, mirror))
    }

    pub fn from_reader(reader: Box<dyn AsyncRead + Unpin + Send>, origin: PathBuf, mirror: bool) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            mirror,
            info: SourceInfo {
                origin,
                lines_read: 0,
                frames: 0,
                malformed: 0,
            },
        }
    }

    /// Next well-formed frame, or `None` once the source is exhausted or unreadable.
    /// Malformed lines are logged and skipped.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("Frame source {} exhausted", self.info.origin.display());
                    return None;
                }
                Err(e) => {
                    warn!("Frame source {} unreadable: {}", self.info.origin.display(), e);
                    return None;
                }
            };
            self.info.lines_read += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_frame(line) {
                Ok(frame) => {
                    self.info.frames += 1;
                    return Some(if self.mirror { frame.mirrored() } else { frame });
                }
                Err(e) => {
                    self.info.malformed += 1;
                    warn!("Skipping line {}: {}", self.info.lines_read, e);
                }
            }
        }
    }

    pub fn info(&self) -> &SourceInfo {
        &self.info
    }
}
