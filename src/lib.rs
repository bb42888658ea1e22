//! Hand gesture control engine.
//!
//! Turns per-frame hand landmarks (21 points per hand, MediaPipe layout) into
//! discrete gesture labels and drives a 3D object from them:
//! - [`gesture::GestureClassifier`] picks one label per frame from an ordered
//!   predicate table and gates some labels behind a minimum hold time
//! - [`controller::InteractionController`] fires one-shot actions on gesture
//!   entry and applies continuous translate/zoom/rotate while a gesture is held
//! - [`controller::Renderer`] is the seam to whatever owns the object;
//!   [`controller::SceneState`] is the in-memory implementation
//!
//! # Example
//!
//! ```no_run
//! use gesture_control::{simulation, FramePipeline, EngineConfig, GestureLabel, SceneState};
//! use std::time::Instant;
//!
//! let mut pipeline = FramePipeline::from_config(&EngineConfig::default(), SceneState::default());
//! let hand = simulation::pose(GestureLabel::OpenPalm);
//! let out = pipeline.step_hand(Some(&hand), Instant::now());
//! println!("{} at scale {:.2}", out.gesture, out.state.scale);
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod hand;
pub mod pipeline;
pub mod replay;
pub mod session;
pub mod simulation;

pub use config::EngineConfig;
pub use controller::{Action, InteractionController, InteractionState, Renderer, SceneState};
pub use error::{Error, Result};
pub use gesture::{GestureClassifier, GestureData, GestureLabel};
pub use hand::Hand;
pub use pipeline::{FrameOutput, FramePipeline};
pub use session::SessionRecorder;
