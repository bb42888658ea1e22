// src/hand.rs - Validated 21-point hand skeleton
use crate::error::{Error, Result};
use nalgebra::Vector3;

/// Number of landmarks the detector reports per hand.
pub const LANDMARK_COUNT: usize = 21;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// (tip, middle joint, base joint) used by the extension test.
    pub fn joints(self) -> (usize, usize, usize) {
        match self {
            Finger::Thumb => (THUMB_TIP, THUMB_IP, THUMB_MCP),
            Finger::Index => (INDEX_TIP, INDEX_DIP, INDEX_PIP),
            Finger::Middle => (MIDDLE_TIP, MIDDLE_DIP, MIDDLE_PIP),
            Finger::Ring => (RING_TIP, RING_DIP, RING_PIP),
            Finger::Pinky => (PINKY_TIP, PINKY_DIP, PINKY_PIP),
        }
    }

    pub fn tip(self) -> usize {
        self.joints().0
    }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

/// One detected hand. Always holds exactly [`LANDMARK_COUNT`] finite points.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    landmarks: [Vector3<f64>; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(landmarks: [Vector3<f64>; LANDMARK_COUNT]) -> Result<Self> {
        for (index, lm) in landmarks.iter().enumerate() {
            if !(lm.x.is_finite() && lm.y.is_finite() && lm.z.is_finite()) {
                return Err(Error::NonFiniteLandmark { index });
            }
        }
        Ok(Self { landmarks })
    }

    /// Skips validation; only for landmarks generated in-crate.
    pub(crate) fn from_trusted(landmarks: [Vector3<f64>; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build a hand from raw detector output (`[x, y, z]` triples).
    pub fn from_points(points: &[[f64; 3]]) -> Result<Self> {
        if points.len() != LANDMARK_COUNT {
            return Err(Error::InvalidHandData {
                expected: LANDMARK_COUNT,
                found: points.len(),
            });
        }

        let mut landmarks = [Vector3::zeros(); LANDMARK_COUNT];
        for (slot, p) in landmarks.iter_mut().zip(points) {
            *slot = Vector3::new(p[0], p[1], p[2]);
        }
        Self::new(landmarks)
    }

    pub fn from_vectors(points: &[Vector3<f64>]) -> Result<Self> {
        let landmarks: [Vector3<f64>; LANDMARK_COUNT] =
            points.try_into().map_err(|_| Error::InvalidHandData {
                expected: LANDMARK_COUNT,
                found: points.len(),
            })?;
        Self::new(landmarks)
    }

    /// Landmark at `index`, or `None` past [`LANDMARK_COUNT`].
    pub fn landmark(&self, index: usize) -> Option<&Vector3<f64>> {
        self.landmarks.get(index)
    }

    /// In-crate access by the index constants above.
    pub(crate) fn point(&self, index: usize) -> &Vector3<f64> {
        &self.landmarks[index]
    }

    pub fn landmarks(&self) -> &[Vector3<f64>; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn wrist(&self) -> &Vector3<f64> {
        self.point(WRIST)
    }

    pub fn tip(&self, finger: Finger) -> &Vector3<f64> {
        self.point(finger.tip())
    }

    pub fn to_points(&self) -> Vec<[f64; 3]> {
        self.landmarks.iter().map(|lm| [lm.x, lm.y, lm.z]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<[f64; 3]> {
        (0..n).map(|i| [i as f64 * 0.01, 0.5, 0.0]).collect()
    }

    #[test]
    fn test_from_points_accepts_21() {
        let hand = Hand::from_points(&points(21)).unwrap();
        assert_eq!(hand.landmark(INDEX_TIP).map(|p| p.x), Some(0.08));
        assert_eq!(hand.to_points().len(), LANDMARK_COUNT);
    }

    #[test]
    fn test_short_hand_is_rejected() {
        match Hand::from_points(&points(20)) {
            Err(Error::InvalidHandData { expected, found }) => {
                assert_eq!(expected, 21);
                assert_eq!(found, 20);
            }
            other => panic!("expected InvalidHandData, got {:?}", other),
        }
        assert!(Hand::from_points(&[]).is_err());
        assert!(Hand::from_points(&points(22)).is_err());
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let mut pts = points(21);
        pts[7][1] = f64::NAN;
        let err = Hand::from_points(&pts).unwrap_err();
        assert!(matches!(err, Error::NonFiniteLandmark { index: 7 }));
        assert!(err.is_invalid_hand());
    }

    #[test]
    fn test_landmark_out_of_range_is_none() {
        let hand = Hand::from_points(&points(21)).unwrap();
        assert!(hand.landmark(PINKY_TIP).is_some());
        assert!(hand.landmark(LANDMARK_COUNT).is_none());
        assert!(hand.landmark(usize::MAX).is_none());
    }

    #[test]
    fn test_finger_joints() {
        assert_eq!(Finger::Thumb.joints(), (4, 3, 2));
        assert_eq!(Finger::Index.joints(), (8, 7, 6));
        assert_eq!(Finger::Pinky.joints(), (20, 19, 18));
        let tips: Vec<usize> = Finger::ALL.iter().map(|f| f.tip()).collect();
        assert_eq!(tips, vec![4, 8, 12, 16, 20]);
    }
}
