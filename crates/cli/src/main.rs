mod settings;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use serde::Serialize;

use textlens_core::camera::camera_session::CameraSession;
use textlens_core::camera::domain::camera_source::CameraConfig;
use textlens_core::camera::infrastructure::directory_camera_source::DirectoryCameraSource;
use textlens_core::overlay::infrastructure::snapshot_overlay::{PlacedText, SnapshotOverlay};
use textlens_core::pipeline::text_recognition_processor::TextRecognitionProcessor;
use textlens_core::recognition::domain::text_recognizer::TextRecognizer;
use textlens_core::recognition::infrastructure::replay_text_recognizer::ReplayTextRecognizer;
use textlens_core::recognition::infrastructure::threaded_text_detector::ThreadedTextDetector;
use textlens_core::shared::frame::{CameraFacing, Rotation};

use settings::Settings;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Streams a directory of camera frames through live text recognition and
/// prints every overlay update as a JSON line.
#[derive(Parser)]
#[command(name = "textlens")]
struct Cli {
    /// Directory of frames (jpg, png, ...), delivered in file-name order.
    frames: PathBuf,

    /// JSON fixture of recognition results keyed by frame index.
    #[arg(long)]
    results: Option<PathBuf>,

    /// Frames per second delivered by the camera.
    #[arg(long)]
    fps: Option<f64>,

    /// Frame rotation in degrees: 0, 90, 180 or 270.
    #[arg(long)]
    rotation: Option<u32>,

    /// Camera facing: back or front (front mirrors the overlay).
    #[arg(long)]
    facing: Option<String>,

    /// Artificial recognition latency in milliseconds.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Overlay view size as WIDTHxHEIGHT.
    #[arg(long)]
    view: Option<String>,

    /// Restart from the first frame after the last one.
    #[arg(long = "loop")]
    looping: bool,

    /// Stop after this many seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Persist the effective settings as the new defaults.
    #[arg(long)]
    save_settings: bool,
}

#[derive(Serialize)]
struct OverlayLine {
    generation: u64,
    texts: Vec<PlacedText>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = apply_overrides(&cli, Settings::load())?;
    validate(&cli, &settings)?;

    if cli.save_settings {
        settings.save();
        if let Some(path) = Settings::config_path() {
            log::info!("Settings saved to {}", path.display());
        }
    }

    let recognizer = build_recognizer(cli.results.as_deref(), &settings)?;
    let detector = Arc::new(ThreadedTextDetector::with_capacity(
        recognizer,
        settings.queue_capacity,
    )?);
    let processor = Arc::new(TextRecognitionProcessor::new(detector));

    let (repaint_tx, repaint_rx) = crossbeam_channel::unbounded::<u64>();
    let overlay = Arc::new(
        SnapshotOverlay::new(settings.view_width, settings.view_height)
            .with_repaint_notifier(repaint_tx),
    );

    let camera = DirectoryCameraSource::new(
        &cli.frames,
        CameraConfig {
            fps: settings.fps,
            rotation: settings.rotation,
            facing: settings.facing,
            looping: cli.looping,
        },
    );
    let mut session = CameraSession::new(Box::new(camera), processor.clone(), overlay.clone());

    session.resume();
    if !session.is_available() {
        return Err(format!("Camera unavailable for {}", cli.frames.display()).into());
    }

    let deadline = cli
        .duration
        .map(|secs| Instant::now() + Duration::from_secs_f64(secs));
    let mut out = io::stdout().lock();
    let mut last_printed = 0;

    loop {
        match repaint_rx.recv_timeout(POLL_INTERVAL) {
            Ok(_) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        print_if_changed(&mut out, &overlay, &mut last_printed)?;

        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        if !session.is_running() && !processor.is_busy() {
            break;
        }
    }

    session.destroy();
    print_if_changed(&mut out, &overlay, &mut last_printed)?;

    let stats = processor.stats();
    log::info!(
        "Delivered {} frames: {} recognized, {} failed, {} throttled",
        stats.delivered(),
        stats.succeeded,
        stats.failed,
        stats.throttled
    );
    Ok(())
}

fn build_recognizer(
    results: Option<&Path>,
    settings: &Settings,
) -> Result<Box<dyn TextRecognizer>, Box<dyn std::error::Error>> {
    let recognizer = match results {
        Some(path) => {
            let replay = ReplayTextRecognizer::from_json_file(path)?;
            log::info!("Loaded {} recorded results from {}", replay.len(), path.display());
            replay
        }
        None => {
            log::warn!("No --results fixture given; every frame recognizes as empty");
            ReplayTextRecognizer::new(Arc::default())
        }
    };
    Ok(Box::new(
        recognizer.with_latency(Duration::from_millis(settings.latency_ms)),
    ))
}

fn print_if_changed(
    out: &mut impl Write,
    overlay: &SnapshotOverlay,
    last_printed: &mut u64,
) -> io::Result<()> {
    let generation = overlay.generation();
    if generation == *last_printed {
        return Ok(());
    }
    *last_printed = generation;

    let line = OverlayLine {
        generation,
        texts: overlay.view_boxes(),
    };
    serde_json::to_writer(&mut *out, &line)?;
    writeln!(out)?;
    out.flush()
}

fn apply_overrides(
    cli: &Cli,
    mut settings: Settings,
) -> Result<Settings, Box<dyn std::error::Error>> {
    if let Some(fps) = cli.fps {
        settings.fps = fps;
    }
    if let Some(degrees) = cli.rotation {
        settings.rotation = Rotation::try_from(degrees)?;
    }
    if let Some(facing) = &cli.facing {
        settings.facing = facing.parse::<CameraFacing>()?;
    }
    if let Some(latency) = cli.latency_ms {
        settings.latency_ms = latency;
    }
    if let Some(view) = &cli.view {
        let (width, height) = parse_view(view)?;
        settings.view_width = width;
        settings.view_height = height;
    }
    Ok(settings)
}

fn parse_view(view: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("View size must look like 1080x1920, got '{view}'");
    let (w, h) = view.split_once(|c| c == 'x' || c == 'X').ok_or_else(invalid)?;
    let width = w.trim().parse().map_err(|_| invalid())?;
    let height = h.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

fn validate(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames.is_dir() {
        return Err(format!("Frame directory not found: {}", cli.frames.display()).into());
    }
    if let Some(results) = &cli.results {
        if !results.exists() {
            return Err(format!("Results fixture not found: {}", results.display()).into());
        }
    }
    if !(settings.fps > 0.0 && settings.fps.is_finite()) {
        return Err(format!("FPS must be a positive number, got {}", settings.fps).into());
    }
    if settings.view_width == 0 || settings.view_height == 0 {
        return Err(format!(
            "View size must be positive, got {}x{}",
            settings.view_width, settings.view_height
        )
        .into());
    }
    if settings.queue_capacity == 0 {
        return Err("Queue capacity must be at least 1".into());
    }
    if let Some(secs) = cli.duration {
        if !(secs > 0.0 && secs.is_finite()) {
            return Err(format!("Duration must be a positive number, got {secs}").into());
        }
    }
    if cli.looping && cli.duration.is_none() {
        return Err("--loop requires --duration".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use textlens_core::overlay::domain::graphic_overlay::GraphicOverlay;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["textlens"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_parse_view_accepts_either_separator() {
        assert_eq!(parse_view("640x480"), Ok((640, 480)));
        assert_eq!(parse_view("640X480"), Ok((640, 480)));
        assert!(parse_view("640").is_err());
        assert!(parse_view("ax480").is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = cli(&[
            "frames",
            "--fps",
            "30",
            "--rotation",
            "90",
            "--facing",
            "front",
            "--view",
            "720x1280",
            "--latency-ms",
            "250",
        ]);

        let settings = apply_overrides(&cli, Settings::default()).unwrap();

        assert_eq!(settings.fps, 30.0);
        assert_eq!(settings.rotation, Rotation::Deg90);
        assert_eq!(settings.facing, CameraFacing::Front);
        assert_eq!((settings.view_width, settings.view_height), (720, 1280));
        assert_eq!(settings.latency_ms, 250);
    }

    #[test]
    fn test_unset_flags_keep_settings() {
        let saved = Settings {
            fps: 5.0,
            ..Settings::default()
        };

        let settings = apply_overrides(&cli(&["frames"]), saved.clone()).unwrap();

        assert_eq!(settings, saved);
    }

    #[test]
    fn test_invalid_rotation_is_rejected() {
        let cli = cli(&["frames", "--rotation", "45"]);
        assert!(apply_overrides(&cli, Settings::default()).is_err());
    }

    #[test]
    fn test_validate_rejects_loop_without_duration() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().to_str().unwrap();

        let err = validate(&cli(&[frames, "--loop"]), &Settings::default()).unwrap_err();

        assert!(err.to_string().contains("--loop requires --duration"));
        let bounded = cli(&[frames, "--loop", "--duration", "1"]);
        assert!(validate(&bounded, &Settings::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_frame_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let err = validate(&cli(&[missing.to_str().unwrap()]), &Settings::default()).unwrap_err();

        assert!(err.to_string().contains("Frame directory not found"));
    }

    #[test]
    fn test_print_if_changed_skips_repeated_generation() {
        let overlay = SnapshotOverlay::new(10, 10);
        let mut out = Vec::new();
        let mut last = 0;

        print_if_changed(&mut out, &overlay, &mut last).unwrap();
        assert!(out.is_empty());

        overlay.set_camera_info(10, 10, CameraFacing::Back);
        print_if_changed(&mut out, &overlay, &mut last).unwrap();
        print_if_changed(&mut out, &overlay, &mut last).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "{\"generation\":1,\"texts\":[]}\n");
    }
}
