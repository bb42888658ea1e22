// src/controller.rs - Gesture-to-object interaction
use crate::config::{ControlConfig, SceneConfig};
use crate::geometry::{apply_deadzone, clamp, DeltaSmoother};
use crate::gesture::{GestureData, GestureLabel};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

pub const POSITION_LIMIT: f64 = 10.0;
pub const SCALE_MIN: f64 = 0.1;
pub const SCALE_MAX: f64 = 5.0;

pub const PALETTE: [u32; 5] = [0x667eea, 0xf56565, 0x48bb78, 0xecc94b, 0x9f7aea];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Cube,
    Sphere,
    Cone,
    Torus,
    Dodecahedron,
}

impl ObjectType {
    pub const ALL: [ObjectType; 5] = [
        ObjectType::Cube,
        ObjectType::Sphere,
        ObjectType::Cone,
        ObjectType::Torus,
        ObjectType::Dodecahedron,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cone => "cone",
            Self::Torus => "torus",
            Self::Dodecahedron => "dodecahedron",
        }
    }
}

/// Transform and appearance of the manipulated object.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    pub position: Vector3<f64>,
    /// Degrees per axis
    pub rotation: Vector3<f64>,
    pub scale: f64,
    pub object_type: ObjectType,
    pub color_index: usize,
    pub auto_rotate: bool,
    pub paused: bool,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: 1.0,
            object_type: ObjectType::Cube,
            color_index: 0,
            auto_rotate: false,
            paused: false,
        }
    }
}

impl InteractionState {
    pub fn color(&self) -> u32 {
        PALETTE[self.color_index % PALETTE.len()]
    }
}

/// Operations the controller drives on the object's owner.
///
/// `translate`, `rotate` and `zoom` must be no-ops while paused; the
/// remaining operations apply regardless.
pub trait Renderer {
    fn translate(&mut self, dx: f64, dy: f64, dz: f64);
    fn rotate(&mut self, dx: f64, dy: f64);
    fn zoom(&mut self, delta: f64);
    fn reset(&mut self);
    fn change_object_type(&mut self);
    fn change_color(&mut self);
    fn toggle_auto_rotate(&mut self);
    fn toggle_pause(&mut self);
    fn state(&self) -> InteractionState;

    /// Advance per-frame animation.
    fn tick(&mut self) {}
}

/// In-memory object model with the same update rules a scene graph applies.
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    config: SceneConfig,
    state: InteractionState,
}

impl SceneState {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            state: InteractionState::default(),
        }
    }

    pub fn current(&self) -> &InteractionState {
        &self.state
    }
}

impl Renderer for SceneState {
    fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        if self.state.paused {
            return;
        }

        let gain = self.config.translate_gain_xy;
        let p = &mut self.state.position;
        // Image y grows downward, scene y grows upward
        p.x = clamp(p.x + dx * gain, -POSITION_LIMIT, POSITION_LIMIT);
        p.y = clamp(p.y - dy * gain, -POSITION_LIMIT, POSITION_LIMIT);
        p.z = clamp(
            p.z + dz * self.config.translate_gain_z,
            -POSITION_LIMIT,
            POSITION_LIMIT,
        );
    }

    fn rotate(&mut self, dx: f64, dy: f64) {
        if self.state.paused {
            return;
        }

        let gain = self.config.rotate_gain;
        let r = &mut self.state.rotation;
        r.x = (r.x + dy * gain) % 360.0;
        r.y = (r.y + dx * gain) % 360.0;
    }

    fn zoom(&mut self, delta: f64) {
        if self.state.paused {
            return;
        }
        self.state.scale = clamp(self.state.scale + delta, SCALE_MIN, SCALE_MAX);
    }

    fn reset(&mut self) {
        self.state.position = Vector3::zeros();
        self.state.rotation = Vector3::zeros();
        self.state.scale = 1.0;
    }

    fn change_object_type(&mut self) {
        self.state.object_type = self.state.object_type.next();
    }

    fn change_color(&mut self) {
        self.state.color_index = (self.state.color_index + 1) % PALETTE.len();
    }

    fn toggle_auto_rotate(&mut self) {
        self.state.auto_rotate = !self.state.auto_rotate;
    }

    fn toggle_pause(&mut self) {
        self.state.paused = !self.state.paused;
    }

    fn state(&self) -> InteractionState {
        self.state.clone()
    }

    fn tick(&mut self) {
        if self.state.auto_rotate && !self.state.paused {
            self.state.rotation.y = (self.state.rotation.y + self.config.auto_rotate_step) % 360.0;
        }
    }
}

/// Discrete effect fired once when a gesture is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Reset,
    CycleColor,
    CycleObjectType,
    ToggleAutoRotate,
    TogglePause,
}

impl Action {
    pub fn for_gesture(label: GestureLabel) -> Option<Self> {
        match label {
            GestureLabel::Fist => Some(Self::Reset),
            GestureLabel::ThreeFingers => Some(Self::CycleColor),
            GestureLabel::VSign => Some(Self::CycleObjectType),
            GestureLabel::ThumbsUp => Some(Self::ToggleAutoRotate),
            GestureLabel::ThumbsDown => Some(Self::TogglePause),
            _ => None,
        }
    }

    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        match self {
            Self::Reset => renderer.reset(),
            Self::CycleColor => renderer.change_color(),
            Self::CycleObjectType => renderer.change_object_type(),
            Self::ToggleAutoRotate => renderer.toggle_auto_rotate(),
            Self::TogglePause => renderer.toggle_pause(),
        }
    }
}

/// Frame-to-frame delta handed to the renderer, before renderer gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Translate(Vector3<f64>),
    Zoom(f64),
    Rotate { dx: f64, dy: f64 },
}

impl Motion {
    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        match *self {
            Self::Translate(d) => renderer.translate(d.x, d.y, d.z),
            Self::Zoom(delta) => renderer.zoom(delta),
            Self::Rotate { dx, dy } => renderer.rotate(dx, dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlOutput {
    pub action: Option<Action>,
    /// Requested motion; the renderer drops it while paused
    pub motion: Option<Motion>,
}

pub struct InteractionController {
    config: ControlConfig,
    last_label: GestureLabel,
    last_data: Option<GestureData>,
    palm_smoother: DeltaSmoother,
    last_fired: HashMap<Action, Instant>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(ControlConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: ControlConfig) -> Self {
        let palm_smoother = DeltaSmoother::new(config.smoothing_window, config.smoothing_alpha);
        Self {
            config,
            last_label: GestureLabel::None,
            last_data: None,
            palm_smoother,
            last_fired: HashMap::new(),
        }
    }

    pub fn last_label(&self) -> GestureLabel {
        self.last_label
    }

    /// Drive `renderer` from this frame's gesture.
    ///
    /// `data` is `None` when no hand was seen. Entering a new non-`None` label
    /// fires its action; holding a label for a second consecutive frame
    /// produces motion from the change in `data`.
    pub fn update<R: Renderer + ?Sized>(
        &mut self,
        label: GestureLabel,
        data: Option<&GestureData>,
        renderer: &mut R,
    ) -> ControlOutput {
        self.update_at(label, data, renderer, Instant::now())
    }

    /// [`update`](Self::update) at an explicit time, used by the action cooldown.
    pub fn update_at<R: Renderer + ?Sized>(
        &mut self,
        label: GestureLabel,
        data: Option<&GestureData>,
        renderer: &mut R,
        now: Instant,
    ) -> ControlOutput {
        let mut output = ControlOutput::default();
        let entered = label != self.last_label;

        if entered {
            if let Some(action) = Action::for_gesture(label) {
                if self.cooling_down(action, now) {
                    debug!("Gesture {} -> {:?} suppressed by cooldown", label, action);
                } else {
                    info!("Gesture {} -> {:?}", label, action);
                    action.apply(renderer);
                    self.last_fired.insert(action, now);
                    output.action = Some(action);
                }
            }
            if label == GestureLabel::OpenPalm {
                self.palm_smoother.reset();
            }
        } else if let (Some(data), Some(prev)) = (data, self.last_data) {
            output.motion = self.continuous(label, data, &prev);
            if let Some(motion) = output.motion {
                debug!("{} motion {:?}", label, motion);
                motion.apply(renderer);
            }
        }

        self.last_label = label;
        self.last_data = data.copied();
        output
    }

    /// The detector lost the hand: forget the previous measurements but keep
    /// the current label, so the same gesture reappearing does not fire again.
    pub fn hand_lost(&mut self) {
        self.last_data = None;
    }

    fn cooling_down(&self, action: Action, now: Instant) -> bool {
        self.last_fired
            .get(&action)
            .is_some_and(|fired| now.saturating_duration_since(*fired) < self.config.action_cooldown())
    }

    fn continuous(
        &mut self,
        label: GestureLabel,
        data: &GestureData,
        prev: &GestureData,
    ) -> Option<Motion> {
        match label {
            GestureLabel::OpenPalm => {
                let delta = apply_deadzone(data.palm_center - prev.palm_center, self.config.deadzone);
                Some(Motion::Translate(self.palm_smoother.smooth(delta)))
            }
            GestureLabel::Pinch => {
                let delta = data.pinch_distance - prev.pinch_distance;
                if delta.abs() < self.config.zoom_deadzone {
                    return None;
                }
                Some(Motion::Zoom(delta * self.config.zoom_gain))
            }
            GestureLabel::TwoFingers => {
                let dx = data.two_finger_midpoint.x - prev.two_finger_midpoint.x;
                let dy = data.two_finger_midpoint.y - prev.two_finger_midpoint.y;
                if dx.abs() < self.config.deadzone && dy.abs() < self.config.deadzone {
                    return None;
                }
                Some(Motion::Rotate { dx, dy })
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.last_label = GestureLabel::None;
        self.last_data = None;
        self.palm_smoother.reset();
        self.last_fired.clear();
    }
}
