// src/bin/pose_probe.rs - Print how each synthetic pose is classified
use gesture_control::config::ClassifierConfig;
use gesture_control::geometry::angle_between;
use gesture_control::gesture::{matching_gestures, ExtendedFingers, GestureClassifier};
use gesture_control::hand::Finger;
use gesture_control::simulation::pose;
use gesture_control::GestureLabel;
use std::time::Instant;

fn main() {
    let config = ClassifierConfig::default();
    println!("Probing canonical poses...\n");

    for label in GestureLabel::ALL {
        let hand = pose(label);
        let extended = ExtendedFingers::detect(&hand);
        let names: Vec<&str> = extended.iter().map(|f| f.name()).collect();

        // Fresh classifier per pose so no hold carries over
        let mut classifier = GestureClassifier::new(config.clone());
        let reported = classifier.update(Some(&hand), Instant::now());
        let all = matching_gestures(&hand, &config);
        let first = all.first().copied().unwrap_or(GestureLabel::None);

        let marker = if first == label { "✓" } else { "✗" };
        println!("{} {:<14} -> {:<14} reported now: {}", marker, label.as_str(), first.as_str(), reported);
        println!("    extended: [{}] tips {:?}", names.join(", "), extended.tips());
        let bends: Vec<String> = Finger::ALL
            .iter()
            .map(|f| {
                let (tip, mid, base) = f.joints();
                let lm = hand.landmarks();
                let angle = angle_between(&lm[tip], &lm[mid], &lm[base]);
                format!("{} {:.0}°", f.name(), angle)
            })
            .collect();
        println!("    joint angles: {}", bends.join(", "));
        if let Some(hold) = label.hold_duration(&config) {
            println!("    hold: {:?}", hold);
        }
        if all.len() > 1 {
            let all: Vec<&str> = all.iter().map(|l| l.as_str()).collect();
            println!("    matches: {}", all.join(", "));
        }
    }
}
