// THEORY:
// The command link carries motion commands from the controller to whatever
// drives the wheels. From the controller's side it is strictly fire-and-forget:
// `dispatch` either hands the request over right now or reports the sink as
// unavailable, and it never waits for the drive base.
//
// The drive base answers in two steps, like an action server: first it accepts
// or rejects the goal, later an accepted goal reports a result. Both answers are
// followed by a small task on the runtime that only logs them. Nothing the drive
// base says changes what the controller does on the next frame.

use crate::core_modules::motion_command::MotionCommand;
use crate::error::ServoError;
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

/// Anything the pipeline can hand a motion command to.
pub trait CommandSink: Send + Sync {
    /// Hands `command` over without blocking. A full or missing transport is `SinkUnavailable`.
    fn dispatch(&self, command: MotionCommand) -> Result<(), ServoError>;
}

/// First answer of the drive base to a request.
#[derive(Debug)]
pub enum GoalResponse {
    /// The goal was accepted; its result text arrives on the receiver later.
    Accepted(oneshot::Receiver<String>),
    Rejected(String),
}

/// One dispatched command as seen by the transport side.
#[derive(Debug)]
pub struct CommandRequest {
    pub command: MotionCommand,
    /// The JSON list the drive base consumes, e.g. `[{"T":1,"type":"spin","data":-1}]`.
    pub payload: String,
    reply: oneshot::Sender<GoalResponse>,
}

impl CommandRequest {
    /// Accepts the goal. Send the result text on the returned sender once the goal is done.
    pub fn accept(self) -> oneshot::Sender<String> {
        let (result_tx, result_rx) = oneshot::channel();
        let _ = self.reply.send(GoalResponse::Accepted(result_rx));
        result_tx
    }

    pub fn reject(self, reason: impl Into<String>) {
        let _ = self.reply.send(GoalResponse::Rejected(reason.into()));
    }
}

/// A `CommandSink` backed by a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelCommandSink {
    sender: mpsc::Sender<CommandRequest>,
    runtime: Handle,
}

impl ChannelCommandSink {
    /// Creates the sink and the receiver the transport side drains.
    pub fn new(capacity: usize, runtime: Handle) -> (Self, mpsc::Receiver<CommandRequest>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender, runtime }, receiver)
    }
}

impl CommandSink for ChannelCommandSink {
    fn dispatch(&self, command: MotionCommand) -> Result<(), ServoError> {
        let payload = command.to_payload()?;
        let (reply, response) = oneshot::channel();
        self.sender
            .try_send(CommandRequest {
                command,
                payload,
                reply,
            })
            .map_err(|_| ServoError::SinkUnavailable)?;

        self.runtime.spawn(follow_goal(command.name(), response));
        Ok(())
    }
}

/// Logs the drive base's answers for one goal.
async fn follow_goal(kind: &'static str, response: oneshot::Receiver<GoalResponse>) {
    match response.await {
        Ok(GoalResponse::Accepted(result)) => {
            info!("Goal accepted: {kind}");
            match result.await {
                Ok(text) => info!("Result: {text}"),
                Err(_) => debug!("goal {kind} finished without a result"),
            }
        }
        Ok(GoalResponse::Rejected(reason)) => warn!("{}", ServoError::RejectedCommand(reason)),
        Err(_) => debug!("goal {kind} dropped without a response"),
    }
}

/// In-process drive base: logs every payload, accepts it and reports it done.
pub async fn run_loopback_server(mut receiver: mpsc::Receiver<CommandRequest>) {
    while let Some(request) = receiver.recv().await {
        info!("Drive command {}", request.payload);
        let kind = request.command.name();
        let result = request.accept();
        let _ = result.send(format!("{kind} done"));
    }
    debug!("command link closed");
}
