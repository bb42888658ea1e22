//! Randomised input properties for hand validation, classification and object bounds

use gesture_control::controller::{POSITION_LIMIT, SCALE_MAX, SCALE_MIN};
use gesture_control::gesture::derive_data;
use gesture_control::hand::LANDMARK_COUNT;
use gesture_control::simulation::pose_at;
use gesture_control::{
    Error, GestureClassifier, GestureLabel, Hand, InteractionController, Renderer, SceneState,
};
use nalgebra::Vector3;
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn in_bounds(scene: &SceneState) -> bool {
    let s = scene.state();
    (0..3).all(|axis| s.position[axis].abs() <= POSITION_LIMIT && s.rotation[axis].abs() < 360.0)
        && s.scale >= SCALE_MIN
        && s.scale <= SCALE_MAX
}

fn point() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-2.0f64..2.0)
}

proptest! {
    #[test]
    fn prop_any_finite_hand_classifies(points in prop::collection::vec(point(), LANDMARK_COUNT)) {
        let hand = Hand::from_points(&points);
        prop_assert!(hand.is_ok());
        let hand = hand.unwrap();

        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        for i in 0..3 {
            let label = classifier.update(Some(&hand), t0 + Duration::from_secs(i));
            prop_assert!(GestureLabel::ALL.contains(&label));
        }
    }

    #[test]
    fn prop_wrong_length_is_rejected(
        n in (0usize..100).prop_filter("not a full hand", |n| *n != LANDMARK_COUNT),
    ) {
        let points = vec![[0.5, 0.5, 0.0]; n];
        match Hand::from_points(&points) {
            Err(Error::InvalidHandData { expected, found }) => {
                prop_assert_eq!(expected, LANDMARK_COUNT);
                prop_assert_eq!(found, n);
            }
            other => prop_assert!(false, "unexpected result {:?}", other),
        }
    }

    #[test]
    fn prop_renderer_stays_in_bounds(
        ops in prop::collection::vec((0u8..4, -1e6f64..1e6, -1e6f64..1e6, -1e6f64..1e6), 1..200),
    ) {
        let mut scene = SceneState::default();
        for (op, a, b, c) in ops {
            match op {
                0 => scene.translate(a, b, c),
                1 => scene.rotate(a, b),
                2 => scene.zoom(c),
                _ => scene.tick(),
            }
            prop_assert!(in_bounds(&scene), "state {:?}", scene.state());
        }
    }

    #[test]
    fn prop_controller_stays_in_bounds(
        frames in prop::collection::vec((0usize..3, prop::array::uniform3(-50.0f64..50.0)), 1..120),
    ) {
        let labels = [GestureLabel::OpenPalm, GestureLabel::TwoFingers, GestureLabel::Pinch];
        let mut controller = InteractionController::default();
        let mut scene = SceneState::default();

        for (which, [x, y, z]) in frames {
            let label = labels[which];
            let data = derive_data(&pose_at(label, Vector3::new(x, y, z)));
            controller.update(label, Some(&data), &mut scene);
            prop_assert!(in_bounds(&scene), "state {:?}", scene.state());
        }
    }
}
