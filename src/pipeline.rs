// THEORY:
// The `pipeline` module is the top-level API of the controller. One call to
// `process_frame` takes one mask through the whole decision chain:
//
//   mask -> blob detector -> first qualifying blob -> centering -> fire | command
//
// Key architectural principles:
// 1.  **One Frame at a Time**: `process_frame` takes `&mut self`, so frames are
//     strictly serialized. Each frame is independent; nothing about the target
//     is remembered from one frame to the next.
// 2.  **First Blob Wins**: Blobs are considered in detection order and only the
//     first one drives an action. The others are reported for annotation only.
// 3.  **Exclusive Actions**: A frame either triggers the fire sequencer or
//     dispatches exactly one motion command, never both, and never waits for
//     either to finish.
// 4.  **Nothing Is Fatal**: Sink and actuator trouble show up in the `Report`
//     and in the log. The caller's frame loop keeps running.

use crate::actuator::Actuator;
use crate::command_link::CommandSink;
use crate::core_modules::blob_detector::{SizeFilter, blob_detector};
use crate::core_modules::centering::{self, ControlZone, DEFAULT_DEAD_ZONE};
use crate::core_modules::fire_sequencer::{FireSequencer, FireState, PulseTiming, TriggerOutcome};
use crate::core_modules::mask::Mask;
use crate::core_modules::motion_command::{self, CommandMagnitudes, MotionCommand};
use crate::core_modules::segmentation::{self, HsvRange, ParameterHandle};
use crate::core_modules::smart_blob::{Blob, Point};
use crate::error::{Result, ServoError};
use image::RgbImage;
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Configuration for the `ServoPipeline`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    /// Pixel tolerance around the frame center, per axis.
    pub dead_zone: i32,
    pub size_filter: SizeFilter,
    pub magnitudes: CommandMagnitudes,
    pub pulse: PulseTiming,
    /// Initial segmentation bounds; live changes go through a `ParameterHandle`.
    pub segmentation: HsvRange,
    /// Capacity of the outgoing command queue.
    pub command_queue: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            dead_zone: DEFAULT_DEAD_ZONE,
            size_filter: SizeFilter::default(),
            magnitudes: CommandMagnitudes::default(),
            pulse: PulseTiming::default(),
            segmentation: HsvRange::default(),
            command_queue: 10,
        }
    }
}

impl PipelineConfig {
    pub fn frame_center(&self) -> Point {
        Point::new((self.frame_width / 2) as i32, (self.frame_height / 2) as i32)
    }

    /// Loads a JSON config. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ServoError::Config("frame size must be non-zero".into()));
        }
        if self.dead_zone <= 0 {
            return Err(ServoError::Config(format!("dead_zone must be positive, got {}", self.dead_zone)));
        }
        let filter = &self.size_filter;
        // Both bounds are exclusive, so they need a gap of at least two.
        if filter.min_width.saturating_add(1) >= filter.max_width
            || filter.min_height.saturating_add(1) >= filter.max_height
        {
            return Err(ServoError::Config(format!("size filter admits nothing: {filter:?}")));
        }
        if self.pulse.count == 0 || self.pulse.unit_ms == 0 {
            return Err(ServoError::Config("pulse count and unit must be non-zero".into()));
        }
        Ok(())
    }
}

/// What the pipeline did with one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// No qualifying blob; nothing was done.
    NoTarget,
    /// The target was centered and a firing sequence started.
    Fired { target: Blob },
    /// The target was centered but a sequence was already running.
    FireSuppressed { target: Blob },
    /// A motion command was handed to the sink.
    Commanded {
        target: Blob,
        zone: ControlZone,
        command: MotionCommand,
    },
    /// The sink could not take the command; it was dropped.
    CommandDropped {
        target: Blob,
        zone: ControlZone,
        command: MotionCommand,
    },
}

impl Report {
    pub fn target(&self) -> Option<&Blob> {
        match self {
            Report::NoTarget => None,
            Report::Fired { target }
            | Report::FireSuppressed { target }
            | Report::Commanded { target, .. }
            | Report::CommandDropped { target, .. } => Some(target),
        }
    }
}

/// The primary output of the pipeline for a single frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub frame_id: u64,
    /// Every qualifying blob in detection order, for annotation.
    pub blobs: Vec<Blob>,
    pub report: Report,
}

/// The main, top-level struct of the controller.
pub struct ServoPipeline {
    config: PipelineConfig,
    sequencer: FireSequencer,
    sink: Arc<dyn CommandSink>,
    frame_count: u64,
}

impl ServoPipeline {
    /// Builds a pipeline whose firing sequences run on `runtime`.
    pub fn new(
        config: PipelineConfig,
        actuator: Arc<dyn Actuator>,
        sink: Arc<dyn CommandSink>,
        runtime: Handle,
    ) -> Self {
        let sequencer = FireSequencer::new(actuator, config.pulse, runtime);
        Self {
            config,
            sequencer,
            sink,
            frame_count: 0,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn fire_state(&self) -> FireState {
        self.sequencer.state()
    }

    pub fn sequencer(&self) -> &FireSequencer {
        &self.sequencer
    }

    pub fn frames_processed(&self) -> u64 {
        self.frame_count
    }

    /// Segments a color frame with the current parameter snapshot, then processes the mask.
    pub fn process_color_frame(&mut self, frame: &RgbImage, params: &ParameterHandle) -> FrameAnalysis {
        let range = params.snapshot();
        let mask = segmentation::segment(frame, &range);
        self.process_frame(&mask)
    }

    /// Runs one mask through detection, centering and the resulting action.
    pub fn process_frame(&mut self, mask: &Mask) -> FrameAnalysis {
        self.frame_count += 1;
        let frame_id = self.frame_count;

        let blobs: Vec<Blob> = blob_detector::extract(mask, &self.config.size_filter)
            .into_iter()
            .map(Blob::from)
            .collect();

        let Some(target) = blobs.first().copied() else {
            return FrameAnalysis {
                frame_id,
                blobs,
                report: Report::NoTarget,
            };
        };

        for blob in &blobs[1..] {
            debug!(
                "frame {frame_id}: ignoring extra blob at ({}, {})",
                blob.centroid.x, blob.centroid.y
            );
        }
        info!("Tracking block at ({}, {})", target.centroid.x, target.centroid.y);

        let report = self.act_on(target);
        FrameAnalysis {
            frame_id,
            blobs,
            report,
        }
    }

    fn act_on(&self, target: Blob) -> Report {
        let center = self.config.frame_center();
        let dead_zone = self.config.dead_zone;

        if centering::is_on_target(target.centroid, center, dead_zone) {
            return match self.sequencer.trigger() {
                TriggerOutcome::Started(_) => Report::Fired { target },
                TriggerOutcome::AlreadyFiring => Report::FireSuppressed { target },
            };
        }

        let zone = centering::classify(target.centroid, center, dead_zone);
        let command = motion_command::map(zone, &self.config.magnitudes);
        match self.sink.dispatch(command) {
            Ok(()) => {
                debug!("dispatched {} for {zone:?}", command.name());
                Report::Commanded {
                    target,
                    zone,
                    command,
                }
            }
            Err(err) => {
                warn!("Dropping {} command: {err}", command.name());
                Report::CommandDropped {
                    target,
                    zone,
                    command,
                }
            }
        }
    }
}
