// src/main.rs - Drive the gesture engine from a recording or the simulated hand
use anyhow::{Context, Result};
use clap::Parser;
use gesture_control::pipeline::instant_at;
use gesture_control::replay::LandmarkRecording;
use gesture_control::simulation::SimulatedHand;
use gesture_control::{EngineConfig, FramePipeline, Hand, SceneState, SessionRecorder};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines landmark recording to replay (simulated hand if omitted)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Frames per second for pacing and simulation timestamps
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Number of frames to process (defaults to one pass of the source)
    #[arg(short = 'n', long)]
    frames: Option<usize>,

    /// Path to a JSON configuration file
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Session output directory (overrides the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not record or export the session
    #[arg(long)]
    no_record: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

enum FrameSource {
    Replay(LandmarkRecording),
    Simulated(SimulatedHand),
}

impl FrameSource {
    fn frame_count(&self, fps: u32) -> usize {
        match self {
            FrameSource::Replay(recording) => recording.len(),
            FrameSource::Simulated(sim) => (sim.duration_ms() * fps as f64 / 1000.0).ceil() as usize,
        }
    }

    /// Timestamp in ms and raw landmarks for frame `index`. Replays loop
    /// when more frames are requested than recorded.
    fn frame(&self, index: usize, fps: u32) -> (f64, Option<Vec<[f64; 3]>>) {
        let frame_ms = 1000.0 / fps as f64;
        match self {
            FrameSource::Replay(recording) => match recording.looped_frame(index, frame_ms) {
                Some((t_ms, points)) => (t_ms, points.map(|p| p.to_vec())),
                None => (index as f64 * frame_ms, None),
            },
            FrameSource::Simulated(sim) => {
                let t_ms = index as f64 * frame_ms;
                (t_ms, sim.hand_at(t_ms).as_ref().map(Hand::to_points))
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("Gesture control engine starting");

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(output) = args.output {
        config.session.output_directory = output;
    }
    if args.no_record {
        config.session.record = false;
    }

    let source = match &args.replay {
        Some(path) => {
            let recording = LandmarkRecording::from_file(path)
                .with_context(|| format!("Failed to read recording {}", path.display()))?;
            if recording.is_empty() {
                anyhow::bail!("Recording {} has no frames", path.display());
            }
            FrameSource::Replay(recording)
        }
        None => {
            info!("No recording given, using the simulated hand");
            FrameSource::Simulated(SimulatedHand::default())
        }
    };

    let fps = args.fps.max(1);
    let total = args.frames.unwrap_or_else(|| source.frame_count(fps));

    let mut pipeline = FramePipeline::from_config(&config, SceneState::new(config.scene.clone()));
    if config.session.record {
        let recorder = SessionRecorder::new(&config.session.output_directory, None);
        info!("Recording session {} ({})", recorder.session_name(), recorder.session_id());
        pipeline = pipeline.with_recorder(recorder);
    }

    let start = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));

    for index in 0..total {
        ticker.tick().await;

        let (t_ms, landmarks) = source.frame(index, fps);
        // Source timestamps drive the hold timers so replays are reproducible
        let Some(now) = instant_at(start, t_ms) else {
            warn!("Skipping frame {} with unusable timestamp {}", index, t_ms);
            continue;
        };
        let out = pipeline.step(landmarks.as_deref(), now);

        if let Some(action) = out.action {
            info!("Frame {}: {} -> {:?}", index, out.gesture, action);
        }
        if index % fps as usize == 0 {
            let s = &out.state;
            info!(
                "Frame {}: gesture={} pos=({:.2}, {:.2}, {:.2}) rot=({:.0}, {:.0}) scale={:.2} {} #{:06x}{}",
                index,
                out.gesture,
                s.position.x,
                s.position.y,
                s.position.z,
                s.rotation.x,
                s.rotation.y,
                s.scale,
                s.object_type.as_str(),
                s.color(),
                if s.paused { " paused" } else { "" },
            );
        }
    }

    if pipeline.dropped_frames() > 0 {
        warn!("Dropped {} malformed frames", pipeline.dropped_frames());
    }

    if let Some(recorder) = pipeline.take_recorder() {
        let summary = recorder.summary();
        info!(
            "Session finished: {} frames, {} with a hand, {} gesture events",
            summary.total_frames, summary.frames_with_hand, summary.events
        );

        let csv_path = recorder.export_csv().context("Failed to export gesture events")?;
        let summary_path = recorder
            .export_summary()
            .context("Failed to export session summary")?;
        info!("Exported {} and {}", csv_path.display(), summary_path.display());
    }

    Ok(())
}
