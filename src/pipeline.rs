// src/pipeline.rs - Per-frame loop: landmarks -> gesture -> object
use crate::config::EngineConfig;
use crate::controller::{
    Action, ControlOutput, InteractionController, InteractionState, Motion, Renderer,
};
use crate::gesture::{derive_data, GestureClassifier, GestureLabel};
use crate::hand::Hand;
use crate::session::SessionRecorder;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::warn;

const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Frames seen within the trailing one-second window.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frame_times: VecDeque<Instant>,
}

impl FpsCounter {
    pub fn tick(&mut self, now: Instant) -> f64 {
        self.frame_times.push_back(now);
        while let Some(&oldest) = self.frame_times.front() {
            if now.saturating_duration_since(oldest) >= FPS_WINDOW {
                self.frame_times.pop_front();
            } else {
                break;
            }
        }
        self.fps()
    }

    pub fn fps(&self) -> f64 {
        self.frame_times.len() as f64
    }
}

/// `start` advanced by a source timestamp in ms. Negative stamps clamp to
/// `start`; non-finite or unrepresentable ones give `None`.
pub fn instant_at(start: Instant, t_ms: f64) -> Option<Instant> {
    if !t_ms.is_finite() {
        return None;
    }
    let offset = Duration::try_from_secs_f64(t_ms.max(0.0) / 1000.0).ok()?;
    start.checked_add(offset)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub gesture: GestureLabel,
    pub hand_present: bool,
    pub action: Option<Action>,
    pub motion: Option<Motion>,
    pub state: InteractionState,
    pub fps: f64,
}

pub struct FramePipeline<R: Renderer> {
    classifier: GestureClassifier,
    controller: InteractionController,
    renderer: R,
    recorder: Option<SessionRecorder>,
    fps: FpsCounter,
    dropped_frames: u64,
}

impl<R: Renderer> FramePipeline<R> {
    pub fn new(classifier: GestureClassifier, controller: InteractionController, renderer: R) -> Self {
        Self {
            classifier,
            controller,
            renderer,
            recorder: None,
            fps: FpsCounter::default(),
            dropped_frames: 0,
        }
    }

    pub fn from_config(config: &EngineConfig, renderer: R) -> Self {
        Self::new(
            GestureClassifier::new(config.classifier.clone()),
            InteractionController::new(config.control.clone()),
            renderer,
        )
    }

    pub fn with_recorder(mut self, recorder: SessionRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Process one detector result observed at `now`.
    ///
    /// Malformed landmark sets are logged and treated as an absent hand.
    pub fn step(&mut self, raw: Option<&[[f64; 3]]>, now: Instant) -> FrameOutput {
        let hand = match raw.map(Hand::from_points).transpose() {
            Ok(hand) => hand,
            Err(e) => {
                self.dropped_frames += 1;
                warn!("Dropping frame: {}", e);
                None
            }
        };
        self.step_hand(hand.as_ref(), now)
    }

    /// Same as [`step`](Self::step) for an already validated hand.
    ///
    /// A frame without a hand reports `None` but is not shown to the
    /// controller, so a detection dropout never re-fires the held gesture.
    pub fn step_hand(&mut self, hand: Option<&Hand>, now: Instant) -> FrameOutput {
        let gesture = self.classifier.update(hand, now);
        let control = match hand {
            Some(hand) => {
                let data = derive_data(hand);
                self.controller
                    .update_at(gesture, Some(&data), &mut self.renderer, now)
            }
            None => {
                self.controller.hand_lost();
                ControlOutput::default()
            }
        };
        self.renderer.tick();

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record_frame(gesture, hand.is_some(), control.action);
        }

        FrameOutput {
            gesture,
            hand_present: hand.is_some(),
            action: control.action,
            motion: control.motion,
            state: self.renderer.state(),
            fps: self.fps.tick(now),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn recorder(&self) -> Option<&SessionRecorder> {
        self.recorder.as_ref()
    }

    pub fn take_recorder(&mut self) -> Option<SessionRecorder> {
        self.recorder.take()
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn reset(&mut self) {
        self.classifier.reset();
        self.controller.reset();
        self.renderer.reset();
    }
}
