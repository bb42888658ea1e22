// src/replay.rs - Recorded landmark streams (JSON lines)
use crate::error::Result;
use crate::hand::Hand;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::info;

/// One line of a recording: `{"t_ms": 33.3, "landmarks": [[x, y, z], ...]}`.
/// `landmarks` is `null` when no hand was detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub t_ms: f64,
    #[serde(default)]
    pub landmarks: Option<Vec<[f64; 3]>>,
}

impl RecordedFrame {
    pub fn from_hand(t_ms: f64, hand: Option<&Hand>) -> Self {
        Self {
            t_ms,
            landmarks: hand.map(Hand::to_points),
        }
    }

    /// Validate the raw points; malformed landmark sets are an error.
    pub fn to_hand(&self) -> Result<Option<Hand>> {
        self.landmarks
            .as_deref()
            .map(Hand::from_points)
            .transpose()
    }

    pub fn points(&self) -> Option<&[[f64; 3]]> {
        self.landmarks.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LandmarkRecording {
    frames: Vec<RecordedFrame>,
}

impl LandmarkRecording {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self { frames }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let recording = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} frames from {}",
            recording.len(),
            path.as_ref().display()
        );
        Ok(recording)
    }

    /// Blank lines are skipped; any other unparsable line is an error.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            frames.push(serde_json::from_str(&line)?);
        }
        Ok(Self { frames })
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for frame in &self.frames {
            serde_json::to_writer(&mut writer, frame)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn push(&mut self, frame: RecordedFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// Frame `index`, wrapping around past the end. Each further pass is
    /// shifted by the last timestamp plus `frame_gap_ms` so time keeps moving
    /// forward.
    pub fn looped_frame(&self, index: usize, frame_gap_ms: f64) -> Option<(f64, Option<&[[f64; 3]]>)> {
        let last = self.frames.last()?;
        let frame = self.frames.get(index % self.frames.len())?;
        let pass = (index / self.frames.len()) as f64;
        let offset = pass * (last.t_ms.max(0.0) + frame_gap_ms);
        Some((frame.t_ms + offset, frame.points()))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gesture::GestureLabel;
    use crate::simulation::pose;

    #[test]
    fn test_reads_json_lines() {
        let hand = pose(GestureLabel::OpenPalm);
        let mut input = String::new();
        input.push_str(&serde_json::to_string(&RecordedFrame::from_hand(0.0, Some(&hand))).unwrap());
        input.push_str("\n\n{\"t_ms\": 33.0, \"landmarks\": null}\n{\"t_ms\": 66.0}\n");

        let recording = LandmarkRecording::from_reader(input.as_bytes()).unwrap();
        assert_eq!(recording.len(), 3);
        assert_eq!(recording.frames()[0].to_hand().unwrap(), Some(hand));
        assert_eq!(recording.frames()[1].to_hand().unwrap(), None);
        assert_eq!(recording.frames()[2].t_ms, 66.0);
        assert!(recording.frames()[2].points().is_none());
    }

    #[test]
    fn test_short_frame_fails_to_convert() {
        let frame: RecordedFrame =
            serde_json::from_str(r#"{"t_ms": 1.0, "landmarks": [[0.1, 0.2, 0.0]]}"#).unwrap();
        let err = frame.to_hand().unwrap_err();
        assert!(err.is_invalid_hand());
    }

    #[test]
    fn test_garbage_line_is_error() {
        let result = LandmarkRecording::from_reader("not json\n".as_bytes());
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_looped_frames_keep_advancing() {
        let mut recording = LandmarkRecording::default();
        recording.push(RecordedFrame::from_hand(0.0, None));
        recording.push(RecordedFrame::from_hand(33.0, Some(&pose(GestureLabel::Pinch))));
        recording.push(RecordedFrame::from_hand(66.0, None));

        let times: Vec<f64> = (0..7)
            .map(|i| recording.looped_frame(i, 33.0).unwrap().0)
            .collect();
        assert_eq!(times, vec![0.0, 33.0, 66.0, 99.0, 132.0, 165.0, 198.0]);
        assert!(recording.looped_frame(4, 33.0).unwrap().1.is_some());
        assert!(recording.looped_frame(5, 33.0).unwrap().1.is_none());

        assert!(LandmarkRecording::default().looped_frame(0, 33.0).is_none());
    }

    #[test]
    fn test_write_then_read() {
        let mut recording = LandmarkRecording::default();
        recording.push(RecordedFrame::from_hand(0.0, None));
        recording.push(RecordedFrame::from_hand(16.0, Some(&pose(GestureLabel::Fist))));

        let mut buffer = Vec::new();
        recording.write_to(&mut buffer).unwrap();
        let read = LandmarkRecording::from_reader(buffer.as_slice()).unwrap();
        assert_eq!(read.frames(), recording.frames());
    }
}
