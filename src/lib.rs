// src/lib.rs - Hand-gesture interpretation and action dispatch
pub mod actions;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod executor;
pub mod landmarks;
pub mod router;
pub mod session;
pub mod source;

pub use actions::{Action, ActionDispatcher};
pub use config::EngineConfig;
pub use controller::{ControllerState, Dispatch, ModeFlags};
pub use engine::{FrameReport, GestureEngine, PerformanceMetrics};
pub use error::{GestureError, GestureResult};
pub use landmarks::{Frame, HandObservation, Handedness, LandmarkPoint};
