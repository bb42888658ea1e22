// src/simulation.rs - Synthetic hands for demo runs and tests
use crate::geometry::lerp;
use crate::gesture::GestureLabel;
use crate::hand::{Hand, LANDMARK_COUNT};
use nalgebra::Vector3;

const WRIST: (f64, f64) = (0.5, 0.8);
const MCP_Y: f64 = 0.65;
const PIP_Y: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Thumb {
    Tucked,
    Up,
    Down,
    /// Tip placed just below the index tip, `gap` apart
    Pinching { gap: f64 },
}

/// Parametric hand shape; every landmark is derived from these few knobs.
#[derive(Debug, Clone, Copy)]
struct Shape {
    thumb: Thumb,
    /// index, middle, ring, pinky
    extended: [bool; 4],
    index_x: f64,
    middle_x: f64,
}

impl Shape {
    fn new(thumb: Thumb, extended: [bool; 4]) -> Self {
        Self {
            thumb,
            extended,
            index_x: 0.45,
            middle_x: 0.5,
        }
    }

    fn for_gesture(label: GestureLabel) -> Self {
        match label {
            GestureLabel::OpenPalm => Self::new(Thumb::Up, [true, true, true, true]),
            GestureLabel::Pinch => {
                Self::new(Thumb::Pinching { gap: 0.02 }, [true, false, false, false])
            }
            GestureLabel::TwoFingers => Self::new(Thumb::Tucked, [true, true, false, false]),
            GestureLabel::Fist => Self::new(Thumb::Tucked, [false, false, false, false]),
            GestureLabel::ThreeFingers => Self::new(Thumb::Tucked, [true, true, true, false]),
            GestureLabel::VSign => Self {
                index_x: 0.4,
                middle_x: 0.56,
                ..Self::new(Thumb::Tucked, [true, true, false, false])
            },
            GestureLabel::ThumbsUp => Self::new(Thumb::Up, [false, false, false, false]),
            GestureLabel::ThumbsDown => Self::new(Thumb::Down, [false, false, false, false]),
            // Index and pinky: matches no predicate
            GestureLabel::None => Self::new(Thumb::Tucked, [true, false, false, true]),
        }
    }

    fn landmarks(&self, offset: Vector3<f64>) -> [Vector3<f64>; LANDMARK_COUNT] {
        let p = |x: f64, y: f64| Vector3::new(x, y, 0.0) + offset;
        let mut lm = [Vector3::zeros(); LANDMARK_COUNT];

        lm[0] = p(WRIST.0, WRIST.1);

        let fingers_x = [self.index_x, self.middle_x, 0.55, 0.6];
        for (i, (&x, &extended)) in fingers_x.iter().zip(self.extended.iter()).enumerate() {
            let base = 5 + i * 4;
            let (dip_y, tip_y) = if extended { (0.5, 0.45) } else { (0.58, 0.6) };
            lm[base] = p(x, MCP_Y);
            lm[base + 1] = p(x, PIP_Y);
            lm[base + 2] = p(x, dip_y);
            lm[base + 3] = p(x, tip_y);
        }

        let (cmc, mcp, ip, tip) = match self.thumb {
            Thumb::Tucked => ((0.44, 0.76), (0.4, 0.72), (0.35, 0.66), (0.45, 0.7)),
            Thumb::Up => ((0.44, 0.76), (0.4, 0.72), (0.35, 0.66), (0.3, 0.6)),
            Thumb::Down => ((0.44, 0.8), (0.42, 0.84), (0.37, 0.9), (0.3, 1.0)),
            Thumb::Pinching { gap } => {
                let index_tip_y = if self.extended[0] { 0.45 } else { 0.6 };
                ((0.44, 0.76), (0.4, 0.72), (0.35, 0.66), (self.index_x, index_tip_y + gap))
            }
        };
        lm[1] = p(cmc.0, cmc.1);
        lm[2] = p(mcp.0, mcp.1);
        lm[3] = p(ip.0, ip.1);
        lm[4] = p(tip.0, tip.1);

        lm
    }

    fn hand(&self, offset: Vector3<f64>) -> Hand {
        Hand::from_trusted(self.landmarks(offset))
    }
}

/// Canonical, centered hand for `label`.
///
/// Shadowed gestures still get their intended shape (a spread V, a lone thumb)
/// so their predicates can be exercised directly.
pub fn pose(label: GestureLabel) -> Hand {
    Shape::for_gesture(label).hand(Vector3::zeros())
}

/// Canonical hand for `label`, shifted by `offset` in normalized units.
pub fn pose_at(label: GestureLabel, offset: Vector3<f64>) -> Hand {
    Shape::for_gesture(label).hand(offset)
}

/// Pinching hand with the thumb tip `gap` below the index tip.
pub fn pinch_with_gap(gap: f64) -> Hand {
    Shape::new(Thumb::Pinching { gap }, [true, false, false, false]).hand(Vector3::zeros())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Still,
    /// Drift the whole hand along a circle of this radius
    Orbit { radius: f64 },
    /// Open and close the pinch gap between the two values
    PinchBreath { min_gap: f64, max_gap: f64 },
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    gesture: Option<GestureLabel>,
    duration_ms: f64,
    motion: Motion,
}

/// Scripted demo sequence: hands appear, drift, pinch, rotate, and hold the
/// gated gestures long enough to fire their actions.
#[derive(Debug, Clone)]
pub struct SimulatedHand {
    script: Vec<Segment>,
    total_ms: f64,
}

impl Default for SimulatedHand {
    fn default() -> Self {
        let seg = |gesture, duration_ms, motion| Segment {
            gesture,
            duration_ms,
            motion,
        };
        let script = vec![
            seg(None, 500.0, Motion::Still),
            seg(Some(GestureLabel::OpenPalm), 3000.0, Motion::Orbit { radius: 0.08 }),
            seg(
                Some(GestureLabel::Pinch),
                2500.0,
                Motion::PinchBreath {
                    min_gap: 0.005,
                    max_gap: 0.04,
                },
            ),
            seg(Some(GestureLabel::TwoFingers), 3000.0, Motion::Orbit { radius: 0.05 }),
            seg(Some(GestureLabel::ThreeFingers), 1000.0, Motion::Still),
            seg(Some(GestureLabel::OpenPalm), 500.0, Motion::Still),
            seg(Some(GestureLabel::Fist), 2500.0, Motion::Still),
            seg(None, 500.0, Motion::Still),
        ];
        Self::from_script(script)
    }
}

impl SimulatedHand {
    fn from_script(script: Vec<Segment>) -> Self {
        let total_ms = script.iter().map(|s| s.duration_ms).sum();
        Self { script, total_ms }
    }

    /// Length of one pass through the script.
    pub fn duration_ms(&self) -> f64 {
        self.total_ms
    }

    /// Hand visible at `t_ms`; the script loops.
    pub fn hand_at(&self, t_ms: f64) -> Option<Hand> {
        if self.total_ms <= 0.0 {
            return None;
        }

        let mut local = t_ms.rem_euclid(self.total_ms);
        for segment in &self.script {
            if local < segment.duration_ms {
                let gesture = segment.gesture?;
                let phase = local / segment.duration_ms * std::f64::consts::TAU;
                return Some(Self::render(gesture, segment.motion, phase));
            }
            local -= segment.duration_ms;
        }
        None
    }

    fn render(gesture: GestureLabel, motion: Motion, phase: f64) -> Hand {
        match motion {
            Motion::Still => pose(gesture),
            Motion::Orbit { radius } => pose_at(
                gesture,
                Vector3::new(radius * phase.cos(), radius * phase.sin(), 0.0),
            ),
            Motion::PinchBreath { min_gap, max_gap } => {
                let t = (1.0 - phase.cos()) / 2.0;
                pinch_with_gap(lerp(min_gap, max_gap, t))
            }
        }
    }
}
