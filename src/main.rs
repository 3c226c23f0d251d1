// Frame runner: feeds a directory of still frames through the controller, as if
// they arrived from a camera one after another, and writes the annotated frames
// out next to the log of what the controller decided.

use anyhow::{Context, Result};
use servo_vision::actuator::{Actuator, LoggingRelay, SysfsRelay, parse_relay_pin};
use servo_vision::command_link::{ChannelCommandSink, run_loopback_server};
use servo_vision::core_modules::annotate::{annotate, load_frame, save_png};
use servo_vision::core_modules::fire_sequencer::FireState;
use servo_vision::core_modules::segmentation::ParameterHandle;
use servo_vision::logger;
use servo_vision::{PipelineConfig, Report, ServoPipeline};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    logger::init(logger::parse_level(&env::var("SERVO_LOG").unwrap_or_default()));

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: servo_vision <input_dir> <output_dir> [config.json]");
        return Ok(());
    }
    let input_dir = Path::new(&args[1]);
    let output_dir = Path::new(&args[2]);
    let config = match args.get(3) {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {path}"))?,
        None => PipelineConfig::default(),
    };

    // --- 2. Runtime & Collaborators ---
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .context("starting tokio runtime")?;

    let (sink, receiver) = ChannelCommandSink::new(config.command_queue, runtime.handle().clone());
    runtime.spawn(run_loopback_server(receiver));

    // Unset: no relay. Set but blank: the relay on the default pin.
    let actuator: Arc<dyn Actuator> = match env::var("SERVO_RELAY_GPIO") {
        Ok(setting) => {
            let pin = parse_relay_pin(&setting).context("reading SERVO_RELAY_GPIO")?;
            let relay = SysfsRelay::open(pin).with_context(|| format!("opening GPIO {pin}"))?;
            log::info!("Firing through the relay on GPIO {}", relay.pin());
            Arc::new(relay)
        }
        Err(_) => Arc::new(LoggingRelay),
    };

    // --- 3. Pipeline Initialization ---
    let params = ParameterHandle::new(config.segmentation);
    let (expected_width, expected_height) = (config.frame_width, config.frame_height);
    let mut pipeline = ServoPipeline::new(config, actuator, Arc::new(sink), runtime.handle().clone());

    let frames = list_frames(input_dir)?;
    fs::create_dir_all(output_dir).with_context(|| format!("creating {}", output_dir.display()))?;
    log::info!("Processing {} frames from {}", frames.len(), input_dir.display());

    // --- 4. Main Processing Loop ---
    let mut fired = 0usize;
    let mut commanded = 0usize;
    for path in &frames {
        let mut frame = match load_frame(path) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("Skipping {}: {err}", path.display());
                continue;
            }
        };
        if frame.dimensions() != (expected_width, expected_height) {
            log::warn!(
                "{} is {}x{}, controller expects {expected_width}x{expected_height}",
                path.display(),
                frame.width(),
                frame.height()
            );
        }

        let analysis = pipeline.process_color_frame(&frame, &params);
        match &analysis.report {
            Report::Fired { .. } => fired += 1,
            Report::Commanded { .. } => commanded += 1,
            _ => {}
        }

        // --- 5. Visualization ---
        annotate(&mut frame, &analysis.blobs);
        let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let output_path = output_dir.join(format!("{name}.png"));
        if let Err(err) = save_png(&output_path, &frame) {
            log::warn!("Could not write {}: {err}", output_path.display());
        }
    }

    log::info!(
        "Processed {} frames: {fired} fire sequences started, {commanded} motion commands sent",
        pipeline.frames_processed()
    );

    if pipeline.fire_state() == FireState::Firing {
        log::info!("Waiting for the running fire sequence to finish");
        runtime.block_on(pipeline.sequencer().wait_idle());
    }
    println!("Processing complete. Output saved to {}", output_dir.display());
    Ok(())
}

/// PNG and JPEG files in `dir`, sorted by file name.
fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false)
        })
        .collect();
    frames.sort();
    Ok(frames)
}
