// src/gesture.rs - Discrete gesture classification with hold-time hysteresis
use crate::config::ClassifierConfig;
use crate::geometry::distance;
use crate::hand::{Finger, Hand, INDEX_MCP, PINKY_MCP, WRIST};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    None,
    OpenPalm,
    Pinch,
    TwoFingers,
    Fist,
    ThreeFingers,
    VSign,
    ThumbsUp,
    ThumbsDown,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 9] = [
        GestureLabel::None,
        GestureLabel::OpenPalm,
        GestureLabel::Pinch,
        GestureLabel::TwoFingers,
        GestureLabel::Fist,
        GestureLabel::ThreeFingers,
        GestureLabel::VSign,
        GestureLabel::ThumbsUp,
        GestureLabel::ThumbsDown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OpenPalm => "open_palm",
            Self::Pinch => "pinch",
            Self::TwoFingers => "two_fingers",
            Self::Fist => "fist",
            Self::ThreeFingers => "three_fingers",
            Self::VSign => "v_sign",
            Self::ThumbsUp => "thumbs_up",
            Self::ThumbsDown => "thumbs_down",
        }
    }

    /// Minimum continuous hold before this gesture may be reported, if gated.
    pub fn hold_duration(&self, config: &ClassifierConfig) -> Option<Duration> {
        match self {
            Self::Fist => Some(config.fist_hold()),
            Self::ThreeFingers => Some(config.three_fingers_hold()),
            Self::VSign => Some(config.v_sign_hold()),
            _ => None,
        }
    }

    /// Evaluate this gesture's predicate alone, ignoring priority.
    ///
    /// `None` matches only when no other predicate does.
    pub fn matches(&self, hand: &Hand, config: &ClassifierConfig) -> bool {
        let pose = Pose::new(hand);
        match self {
            Self::None => first_match(&pose, config) == GestureLabel::None,
            label => PREDICATES
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, predicate)| predicate(&pose, config))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of fingers judged straight on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedFingers(u8);

impl ExtendedFingers {
    /// Thumb: tip farther from the wrist than its IP joint.
    /// Other fingers: tip above DIP above PIP (image y grows downward).
    pub fn detect(hand: &Hand) -> Self {
        let wrist = hand.wrist();
        let mut set = Self::default();

        for finger in Finger::ALL {
            let (tip, mid, base) = finger.joints();
            let tip = hand.point(tip);
            let mid = hand.point(mid);
            let base = hand.point(base);

            let extended = match finger {
                Finger::Thumb => distance(tip, wrist) > distance(mid, wrist),
                _ => tip.y < mid.y && mid.y < base.y,
            };
            if extended {
                set.insert(finger);
            }
        }

        set
    }

    pub fn from_fingers(fingers: &[Finger]) -> Self {
        let mut set = Self::default();
        for finger in fingers {
            set.insert(*finger);
        }
        set
    }

    fn bit(finger: Finger) -> u8 {
        1 << (finger as u8)
    }

    pub fn insert(&mut self, finger: Finger) {
        self.0 |= Self::bit(finger);
    }

    pub fn contains(&self, finger: Finger) -> bool {
        self.0 & Self::bit(finger) != 0
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_exactly(&self, fingers: &[Finger]) -> bool {
        *self == Self::from_fingers(fingers)
    }

    pub fn iter(&self) -> impl Iterator<Item = Finger> + '_ {
        Finger::ALL.into_iter().filter(move |f| self.contains(*f))
    }

    /// Landmark indices of the extended fingertips, thumb first.
    pub fn tips(&self) -> Vec<usize> {
        self.iter().map(Finger::tip).collect()
    }
}

/// Per-frame features shared by every predicate.
pub struct Pose<'a> {
    hand: &'a Hand,
    extended: ExtendedFingers,
}

impl<'a> Pose<'a> {
    pub fn new(hand: &'a Hand) -> Self {
        Self {
            hand,
            extended: ExtendedFingers::detect(hand),
        }
    }

    pub fn extended(&self) -> ExtendedFingers {
        self.extended
    }

    fn tip_distance(&self, a: Finger, b: Finger) -> f64 {
        distance(self.hand.tip(a), self.hand.tip(b))
    }
}

type Predicate = fn(&Pose<'_>, &ClassifierConfig) -> bool;

/// Evaluated top-down; the first matching entry wins.
///
/// `VSign` shares the finger-set test of `TwoFingers` and sits below it, so it
/// can never be selected here. `ThumbsUp`/`ThumbsDown` are single-finger poses
/// and `Fist` (at most one finger) claims them first. The order is kept as is.
const PREDICATES: [(GestureLabel, Predicate); 8] = [
    (GestureLabel::OpenPalm, is_open_palm),
    (GestureLabel::Pinch, is_pinch),
    (GestureLabel::TwoFingers, is_two_fingers),
    (GestureLabel::Fist, is_fist),
    (GestureLabel::ThreeFingers, is_three_fingers),
    (GestureLabel::VSign, is_v_sign),
    (GestureLabel::ThumbsUp, is_thumbs_up),
    (GestureLabel::ThumbsDown, is_thumbs_down),
];

fn is_open_palm(pose: &Pose<'_>, _: &ClassifierConfig) -> bool {
    pose.extended.count() >= 4
}

fn is_pinch(pose: &Pose<'_>, config: &ClassifierConfig) -> bool {
    pose.tip_distance(Finger::Thumb, Finger::Index) < config.pinch_threshold
}

fn is_two_fingers(pose: &Pose<'_>, _: &ClassifierConfig) -> bool {
    pose.extended.is_exactly(&[Finger::Index, Finger::Middle])
}

fn is_fist(pose: &Pose<'_>, _: &ClassifierConfig) -> bool {
    pose.extended.count() <= 1
}

fn is_three_fingers(pose: &Pose<'_>, _: &ClassifierConfig) -> bool {
    pose.extended.count() == 3
}

fn is_v_sign(pose: &Pose<'_>, config: &ClassifierConfig) -> bool {
    is_two_fingers(pose, config)
        && pose.tip_distance(Finger::Index, Finger::Middle) > config.v_sign_separation
}

fn is_thumbs_up(pose: &Pose<'_>, _: &ClassifierConfig) -> bool {
    pose.extended.is_exactly(&[Finger::Thumb])
}

// Palm-down check only; a sideways thumb below the wrist also passes.
fn is_thumbs_down(pose: &Pose<'_>, config: &ClassifierConfig) -> bool {
    is_thumbs_up(pose, config) && pose.hand.tip(Finger::Thumb).y > pose.hand.wrist().y
}

fn first_match(pose: &Pose<'_>, config: &ClassifierConfig) -> GestureLabel {
    PREDICATES
        .iter()
        .find(|(_, predicate)| predicate(pose, config))
        .map(|(label, _)| *label)
        .unwrap_or(GestureLabel::None)
}

/// Every gesture whose predicate holds for `hand`, in priority order.
pub fn matching_gestures(hand: &Hand, config: &ClassifierConfig) -> Vec<GestureLabel> {
    let pose = Pose::new(hand);
    PREDICATES
        .iter()
        .filter(|(_, predicate)| predicate(&pose, config))
        .map(|(label, _)| *label)
        .collect()
}

/// Continuous measurements taken from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureData {
    /// Mean of wrist, index MCP and pinky MCP
    pub palm_center: Vector3<f64>,
    pub index_position: Vector3<f64>,
    pub thumb_position: Vector3<f64>,
    pub pinch_distance: f64,
    /// Wrist z as reported by the detector
    pub hand_depth: f64,
    pub two_finger_midpoint: Vector3<f64>,
}

pub fn derive_data(hand: &Hand) -> GestureData {
    let wrist = hand.point(WRIST);
    let index_tip = hand.tip(Finger::Index);
    let thumb_tip = hand.tip(Finger::Thumb);
    let middle_tip = hand.tip(Finger::Middle);

    GestureData {
        palm_center: (wrist + hand.point(INDEX_MCP) + hand.point(PINKY_MCP)) / 3.0,
        index_position: *index_tip,
        thumb_position: *thumb_tip,
        pinch_distance: distance(thumb_tip, index_tip),
        hand_depth: wrist.z,
        two_finger_midpoint: (index_tip + middle_tip) / 2.0,
    }
}

/// Majority vote over the last few raw labels.
///
/// Ties go to the label that appears first in the window.
#[derive(Debug, Clone)]
pub struct LabelVoter {
    window: usize,
    recent: VecDeque<GestureLabel>,
}

impl LabelVoter {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            recent: VecDeque::with_capacity(window),
        }
    }

    pub fn vote(&mut self, label: GestureLabel) -> GestureLabel {
        if self.recent.len() >= self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(label);

        let mut best = label;
        let mut best_count = 0;
        for candidate in &self.recent {
            let count = self.recent.iter().filter(|l| *l == candidate).count();
            if count > best_count {
                best = *candidate;
                best_count = count;
            }
        }
        best
    }

    pub fn reset(&mut self) {
        self.recent.clear();
    }
}

/// Owns the reported gesture and at most one pending hold.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: ClassifierConfig,
    current: GestureLabel,
    pending: Option<(GestureLabel, Instant)>,
    voter: LabelVoter,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let voter = LabelVoter::new(config.vote_window);
        Self {
            config,
            current: GestureLabel::None,
            pending: None,
            voter,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one frame observed at `now`.
    ///
    /// A gated gesture only replaces the reported label once it has matched
    /// continuously for its hold duration; until then the previous label is
    /// reported unchanged.
    pub fn update(&mut self, hand: Option<&Hand>, now: Instant) -> GestureLabel {
        let Some(hand) = hand else {
            self.voter.reset();
            self.set_current(GestureLabel::None);
            return self.current;
        };

        let candidate = self.voter.vote(first_match(&Pose::new(hand), &self.config));

        match candidate.hold_duration(&self.config) {
            Some(hold) => {
                let start = match self.pending {
                    Some((label, start)) if label == candidate => start,
                    _ => {
                        debug!("Holding {} for {:?}", candidate, hold);
                        self.pending = Some((candidate, now));
                        now
                    }
                };

                if now.saturating_duration_since(start) >= hold {
                    self.set_current(candidate);
                }
            }
            None => {
                self.pending = None;
                self.set_current(candidate);
            }
        }

        self.current
    }

    /// [`update`](Self::update) stamped with the wall clock.
    pub fn classify(&mut self, hand: Option<&Hand>) -> GestureLabel {
        self.update(hand, Instant::now())
    }

    pub fn current(&self) -> GestureLabel {
        self.current
    }

    pub fn pending(&self) -> Option<(GestureLabel, Instant)> {
        self.pending
    }

    pub fn reset(&mut self) {
        self.current = GestureLabel::None;
        self.pending = None;
        self.voter.reset();
    }

    fn set_current(&mut self, label: GestureLabel) {
        if self.current != label {
            debug!("Gesture {} -> {}", self.current, label);
            self.current = label;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::pose;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_extended_fingers_of_canonical_poses() {
        let open = ExtendedFingers::detect(&pose(GestureLabel::OpenPalm));
        assert_eq!(open.count(), 5);
        assert_eq!(open.tips(), vec![4, 8, 12, 16, 20]);

        let fist = ExtendedFingers::detect(&pose(GestureLabel::Fist));
        assert_eq!(fist.count(), 0);

        let two = ExtendedFingers::detect(&pose(GestureLabel::TwoFingers));
        assert!(two.is_exactly(&[Finger::Index, Finger::Middle]));

        let thumb = ExtendedFingers::detect(&pose(GestureLabel::ThumbsUp));
        assert_eq!(thumb.tips(), vec![4]);
    }

    #[test]
    fn test_first_match_follows_priority() {
        let config = ClassifierConfig::default();
        let first = |label| first_match(&Pose::new(&pose(label)), &config);

        assert_eq!(first(GestureLabel::OpenPalm), GestureLabel::OpenPalm);
        assert_eq!(first(GestureLabel::Pinch), GestureLabel::Pinch);
        assert_eq!(first(GestureLabel::TwoFingers), GestureLabel::TwoFingers);
        assert_eq!(first(GestureLabel::Fist), GestureLabel::Fist);
        assert_eq!(first(GestureLabel::ThreeFingers), GestureLabel::ThreeFingers);
        assert_eq!(first(GestureLabel::None), GestureLabel::None);

        // Shadowed predicates
        assert_eq!(first(GestureLabel::VSign), GestureLabel::TwoFingers);
        assert_eq!(first(GestureLabel::ThumbsUp), GestureLabel::Fist);
        assert_eq!(first(GestureLabel::ThumbsDown), GestureLabel::Fist);
    }

    #[test]
    fn test_shadowed_predicates_still_evaluate() {
        let config = ClassifierConfig::default();

        let v = pose(GestureLabel::VSign);
        assert!(GestureLabel::VSign.matches(&v, &config));
        assert!(!GestureLabel::VSign.matches(&pose(GestureLabel::TwoFingers), &config));

        let up = pose(GestureLabel::ThumbsUp);
        assert!(GestureLabel::ThumbsUp.matches(&up, &config));
        assert!(!GestureLabel::ThumbsDown.matches(&up, &config));

        let down = pose(GestureLabel::ThumbsDown);
        assert_eq!(
            matching_gestures(&down, &config),
            vec![GestureLabel::Fist, GestureLabel::ThumbsUp, GestureLabel::ThumbsDown]
        );

        assert!(GestureLabel::None.matches(&pose(GestureLabel::None), &config));
        assert!(!GestureLabel::None.matches(&up, &config));
    }

    #[test]
    fn test_absent_hand_reports_none_and_keeps_pending() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();

        assert_eq!(classifier.update(Some(&pose(GestureLabel::OpenPalm)), t0), GestureLabel::OpenPalm);
        classifier.update(Some(&pose(GestureLabel::Fist)), t0 + ms(10));
        assert!(classifier.pending().is_some());

        assert_eq!(classifier.update(None, t0 + ms(20)), GestureLabel::None);
        assert_eq!(classifier.pending().map(|(l, _)| l), Some(GestureLabel::Fist));
    }

    #[test]
    fn test_fist_requires_hold() {
        let mut classifier = GestureClassifier::default();
        let fist = pose(GestureLabel::Fist);
        let t0 = Instant::now();

        assert_eq!(classifier.update(Some(&fist), t0), GestureLabel::None);
        assert_eq!(classifier.update(Some(&fist), t0 + ms(1999)), GestureLabel::None);
        assert_eq!(classifier.update(Some(&fist), t0 + ms(2000)), GestureLabel::Fist);
        assert_eq!(classifier.update(Some(&fist), t0 + ms(2500)), GestureLabel::Fist);
    }

    #[test]
    fn test_pending_hold_keeps_previous_label() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();

        classifier.update(Some(&pose(GestureLabel::Pinch)), t0);
        let label = classifier.update(Some(&pose(GestureLabel::ThreeFingers)), t0 + ms(100));
        assert_eq!(label, GestureLabel::Pinch);

        let label = classifier.update(Some(&pose(GestureLabel::ThreeFingers)), t0 + ms(700));
        assert_eq!(label, GestureLabel::ThreeFingers);
    }

    #[test]
    fn test_switching_gated_gesture_restarts_hold() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();

        classifier.update(Some(&pose(GestureLabel::ThreeFingers)), t0);
        classifier.update(Some(&pose(GestureLabel::Fist)), t0 + ms(500));
        assert_eq!(classifier.pending(), Some((GestureLabel::Fist, t0 + ms(500))));

        // 600ms after the three-finger start, but the record now belongs to the fist
        let label = classifier.update(Some(&pose(GestureLabel::ThreeFingers)), t0 + ms(600));
        assert_eq!(label, GestureLabel::None);
        assert_eq!(classifier.pending(), Some((GestureLabel::ThreeFingers, t0 + ms(600))));
    }

    #[test]
    fn test_zero_hold_promotes_immediately() {
        let config = ClassifierConfig {
            fist_hold_ms: 0,
            ..ClassifierConfig::default()
        };
        let mut classifier = GestureClassifier::new(config);
        assert_eq!(
            classifier.update(Some(&pose(GestureLabel::Fist)), Instant::now()),
            GestureLabel::Fist
        );
    }

    #[test]
    fn test_voter_majority_and_ties() {
        let mut voter = LabelVoter::new(3);
        assert_eq!(voter.vote(GestureLabel::Pinch), GestureLabel::Pinch);
        // One each: the earliest wins
        assert_eq!(voter.vote(GestureLabel::OpenPalm), GestureLabel::Pinch);
        assert_eq!(voter.vote(GestureLabel::OpenPalm), GestureLabel::OpenPalm);
        // Window is [OpenPalm, OpenPalm, Pinch]
        assert_eq!(voter.vote(GestureLabel::Pinch), GestureLabel::OpenPalm);

        let mut single = LabelVoter::new(1);
        for label in GestureLabel::ALL {
            assert_eq!(single.vote(label), label);
        }
    }

    #[test]
    fn test_vote_window_suppresses_flicker() {
        let config = ClassifierConfig {
            vote_window: 3,
            ..ClassifierConfig::default()
        };
        let mut classifier = GestureClassifier::new(config);
        let palm = pose(GestureLabel::OpenPalm);
        let pinch = pose(GestureLabel::Pinch);
        let t0 = Instant::now();

        classifier.update(Some(&palm), t0);
        classifier.update(Some(&palm), t0 + ms(33));
        assert_eq!(classifier.update(Some(&pinch), t0 + ms(66)), GestureLabel::OpenPalm);
        assert_eq!(classifier.update(Some(&pinch), t0 + ms(99)), GestureLabel::Pinch);
    }

    #[test]
    fn test_derive_data() {
        let hand = pose(GestureLabel::Pinch);
        let data = derive_data(&hand);

        let expected_palm = (hand.point(0) + hand.point(5) + hand.point(17)) / 3.0;
        assert!((data.palm_center - expected_palm).norm() < 1e-12);
        assert_eq!(data.index_position, *hand.point(8));
        assert_eq!(data.thumb_position, *hand.point(4));
        assert!(data.pinch_distance < 0.05);
        assert_eq!(data.hand_depth, hand.point(0).z);

        let mid = data.two_finger_midpoint;
        assert!((mid.x - (hand.point(8).x + hand.point(12).x) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_label_serializes_snake_case() {
        let json = serde_json::to_string(&GestureLabel::ThumbsDown).unwrap();
        assert_eq!(json, "\"thumbs_down\"");
        for label in GestureLabel::ALL {
            assert_eq!(
                serde_json::to_string(&label).unwrap(),
                format!("\"{}\"", label.as_str())
            );
        }
    }
}
