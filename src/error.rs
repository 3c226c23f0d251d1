// THEORY:
// Every failure the controller can observe is recoverable. A dropped command, a
// rejected goal or a relay that stops answering must never take the frame loop
// down with it. `ServoError` is therefore something callers log and move past;
// the pipeline itself never propagates it out of `process_frame`.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServoError {
    /// The command transport could not take the request right now (queue full or closed).
    #[error("command sink unavailable")]
    SinkUnavailable,
    /// The remote side accepted the transport request but refused the goal.
    #[error("command rejected: {0}")]
    RejectedCommand(String),
    /// The actuator failed while a firing sequence was running.
    #[error("actuator fault: {0}")]
    ActuatorFault(#[source] io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    /// No tokio runtime was reachable from the calling thread.
    #[error("no tokio runtime available to run background tasks")]
    NoRuntime,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ServoError>;
