// src/engine.rs - Frame-synchronous classify -> route -> rules -> dispatch cycle
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, trace};

use crate::actions::ActionDispatcher;
use crate::classifier::{self, FingerState};
use crate::config::EngineConfig;
use crate::controller::{ControllerHand, ControllerState, Dispatch, ModeFlags, RuleInput};
use crate::landmarks::Frame;
use crate::router::{self, Role};

const METRICS_WINDOW: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub avg_fps: f32,
    pub avg_processing_time: f32,
    pub frames: u64,
    pub dispatches: u64,
    pub failed_dispatches: u64,
    #[serde(skip)]
    frame_times: VecDeque<f32>,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            avg_fps: 0.0,
            avg_processing_time: 0.0,
            frames: 0,
            dispatches: 0,
            failed_dispatches: 0,
            frame_times: VecDeque::with_capacity(METRICS_WINDOW),
        }
    }

    fn record(&mut self, elapsed: f32, report: &FrameReport) {
        self.frames += 1;
        self.dispatches += report.dispatched.len() as u64;
        self.failed_dispatches += report.dispatched.iter().filter(|d| !d.succeeded()).count() as u64;

        self.frame_times.push_front(elapsed);
        if self.frame_times.len() > METRICS_WINDOW {
            self.frame_times.pop_back();
        }
        self.avg_processing_time =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        self.avg_fps = if self.avg_processing_time > 0.0 {
            1.0 / self.avg_processing_time
        } else {
            0.0
        };
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub timestamp: f64,
    pub launcher: Option<FingerState>,
    pub controller: Option<FingerState>,
    /// Hands dropped for not carrying exactly 21 landmarks.
    pub skipped_hands: usize,
    pub dispatched: Vec<Dispatch>,
}

impl FrameReport {
    pub fn fingers(&self, role: Role) -> Option<FingerState> {
        match role {
            Role::Launcher => self.launcher,
            Role::Controller => self.controller,
        }
    }
}

/// One engine per frame stream; it owns its controller state outright.
pub struct GestureEngine<D: ActionDispatcher> {
    config: EngineConfig,
    state: ControllerState,
    dispatcher: D,
    metrics: PerformanceMetrics,
    started: Instant,
    /// Last producer timestamp and when it arrived; untimed frames extend it.
    last_stamp: Option<(f64, Instant)>,
    frame_counter: u64,
}

impl<D: ActionDispatcher> GestureEngine<D> {
    pub fn new(config: EngineConfig, dispatcher: D) -> Self {
        Self::with_flags(config, dispatcher, ModeFlags::default())
    }

    pub fn with_flags(config: EngineConfig, dispatcher: D, flags: ModeFlags) -> Self {
        let state =
            ControllerState::with_flags(flags, config.debounce.clone(), config.rules.clone());
        Self {
            config,
            state,
            dispatcher,
            metrics: PerformanceMetrics::new(),
            started: Instant::now(),
            last_stamp: None,
            frame_counter: 0,
        }
    }

    pub fn process_frame(&mut self, frame: &Frame) -> FrameReport {
        self.frame_counter += 1;
        let timestamp = self.stamp(frame.timestamp);

        let skipped_hands = frame.hands.iter().filter(|h| !h.is_complete()).count();
        if skipped_hands > 0 {
            debug!(
                "Frame {}: skipping {} hand(s) without 21 landmarks",
                self.frame_counter, skipped_hands
            );
        }

        let classifier_config = &self.config.classifier;
        let roles = router::route(&frame.hands);
        let launcher = roles
            .launcher
            .and_then(|hand| classifier::classify(hand, classifier_config));
        let controller = roles.controller.and_then(|hand| {
            let fingers = classifier::classify(hand, classifier_config)?;
            let thumb_tip = hand.landmark(classifier_config.fingertips[0])?;
            Some(ControllerHand {
                fingers,
                thumb_tip_y: thumb_tip.y(),
            })
        });

        trace!(
            "Frame {} t={:.3}: launcher={:?} controller={:?}",
            self.frame_counter,
            timestamp,
            launcher.map(|f| f.as_bits()),
            controller.map(|c| c.fingers.as_bits())
        );

        let input = RuleInput {
            now: timestamp,
            scroll_height: self
                .config
                .rules
                .reference_height
                .unwrap_or(frame.height as f64),
            launcher,
            controller,
        };
        let dispatched = self.state.apply(&input, &mut self.dispatcher);

        FrameReport {
            frame: self.frame_counter,
            timestamp,
            launcher,
            controller: controller.map(|c| c.fingers),
            skipped_hands,
            dispatched,
        }
    }

    /// Keeps untimed frames on the producer's clock once it has sent one timestamp.
    fn stamp(&mut self, timestamp: Option<f64>) -> f64 {
        match (timestamp, self.last_stamp) {
            (Some(t), _) => {
                self.last_stamp = Some((t, Instant::now()));
                t
            }
            (None, Some((t, seen))) => t + seen.elapsed().as_secs_f64(),
            (None, None) => self.started.elapsed().as_secs_f64(),
        }
    }

    pub fn process_frame_with_metrics(&mut self, frame: &Frame) -> (FrameReport, PerformanceMetrics) {
        let start = Instant::now();
        let report = self.process_frame(frame);
        let elapsed = start.elapsed().as_secs_f32();
        self.metrics.record(elapsed, &report);
        (report, self.metrics.clone())
    }

    pub fn flags(&self) -> ModeFlags {
        self.state.flags()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn into_dispatcher(self) -> D {
        self.dispatcher
    }
}
