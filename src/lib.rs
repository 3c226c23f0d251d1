// THEORY:
// This file is the entry point for the `servo_vision` library crate. It exposes
// the `ServoPipeline` and its configuration as the high-level interface of a
// color-tracking turret controller: masks go in, and each frame ends in either
// one motion command or one (guarded) firing sequence.
//
// The collaborators the controller talks to, the command transport and the
// actuator, sit behind the `CommandSink` and `Actuator` traits so the binary,
// the tests and real hardware can plug in their own.

pub mod actuator;
pub mod command_link;
pub mod core_modules;
pub mod error;
pub mod logger;
pub mod pipeline;

pub use error::ServoError;
pub use pipeline::{FrameAnalysis, PipelineConfig, Report, ServoPipeline};
