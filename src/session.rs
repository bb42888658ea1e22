// src/session.rs - Per-session gesture event log and export
use crate::controller::Action;
use crate::error::Result;
use crate::gesture::GestureLabel;
use chrono::{Local, SecondsFormat};
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// One rising-edge gesture, in the shape the remote gesture logger accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureEvent {
    pub gesture: GestureLabel,
    /// RFC 3339 local time
    pub timestamp: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub action: Option<Action>,
    pub frame: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub session_name: String,
    pub total_frames: u64,
    pub frames_with_hand: u64,
    pub events: usize,
    /// Frames spent reporting each gesture
    pub gesture_frames: BTreeMap<String, u64>,
}

pub struct SessionRecorder {
    output_dir: PathBuf,
    session_id: String,
    session_name: String,
    events: Vec<GestureEvent>,
    total_frames: u64,
    frames_with_hand: u64,
    gesture_frames: BTreeMap<String, u64>,
    last_gesture: GestureLabel,
}

impl SessionRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_id: Uuid::new_v4().to_string(),
            session_name,
            events: Vec::new(),
            total_frames: 0,
            frames_with_hand: 0,
            gesture_frames: BTreeMap::new(),
            last_gesture: GestureLabel::None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn events(&self) -> &[GestureEvent] {
        &self.events
    }

    /// Account for one frame; logs an event when a new non-`None` gesture
    /// starts being reported. Frames without a hand leave the edge state alone.
    pub fn record_frame(&mut self, gesture: GestureLabel, hand_present: bool, action: Option<Action>) {
        let frame = self.total_frames;
        self.total_frames += 1;
        *self.gesture_frames.entry(gesture.to_string()).or_insert(0) += 1;

        if !hand_present {
            return;
        }
        self.frames_with_hand += 1;
        if gesture != self.last_gesture && gesture != GestureLabel::None {
            self.events.push(GestureEvent {
                gesture,
                timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
                session_id: self.session_id.clone(),
                action,
                frame,
            });
        }
        self.last_gesture = gesture;
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            session_name: self.session_name.clone(),
            total_frames: self.total_frames,
            frames_with_hand: self.frames_with_hand,
            events: self.events.len(),
            gesture_frames: self.gesture_frames.clone(),
        }
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("gesture_events.csv");

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&csv_path)?;
        let mut writer = Writer::from_writer(file);
        for event in &self.events {
            writer.serialize(EventRecord::from(event))?;
        }
        writer.flush()?;

        info!("Wrote {} gesture events to {}", self.events.len(), csv_path.display());
        Ok(csv_path)
    }

    pub fn export_summary(&self) -> Result<PathBuf> {
        let summary_path = self.session_dir().join("summary.json");

        if let Some(parent) = summary_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&summary_path, serde_json::to_string_pretty(&self.summary())?)?;
        Ok(summary_path)
    }
}

/// Flat CSV row; csv cannot serialize a nested `Option<enum>` header-wise.
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    frame: u64,
    timestamp: &'a str,
    session_id: &'a str,
    gesture: &'static str,
    action: Option<Action>,
}

impl<'a> From<&'a GestureEvent> for EventRecord<'a> {
    fn from(event: &'a GestureEvent) -> Self {
        Self {
            frame: event.frame,
            timestamp: &event.timestamp,
            session_id: &event.session_id,
            gesture: event.gesture.as_str(),
            action: event.action,
        }
    }
}
