// THEORY:
// The `FireSequencer` owns the actuator and the only piece of state shared
// between the frame loop and anything running in the background: whether a
// firing sequence is in progress.
//
// Key architectural principles:
// 1.  **Single Entry Point**: `trigger()` is the only way to change the state.
//     Idle -> Firing is one compare-and-swap, so two triggers racing each other
//     (or racing the tail end of a finishing sequence) can never both win.
// 2.  **Fire and Forget**: The pulse train runs as a task on a tokio runtime
//     handle. `trigger()` returns immediately; the frame loop never waits on it.
// 3.  **Drop, Don't Queue**: A trigger that arrives while a sequence is running
//     is silently dropped. It is not an error and it is not remembered.
// 4.  **Scoped Release**: The way back to Idle is a guard owned by the task.
//     Whether the sequence completes, the relay fails, the task panics or the
//     runtime shuts down under it, dropping the guard stores Idle. A stuck
//     Firing state would block the turret for the rest of the run.
// 5.  **Blocking I/O Off the Workers**: Relay writes are plain blocking calls
//     and go through `spawn_blocking`, so a slow GPIO line delays only its own
//     pulse and never a runtime worker.

use crate::actuator::Actuator;
use crate::error::ServoError;
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::io;
use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::{self, JoinHandle};
use tokio::time::sleep;

const IDLE: u8 = 0;
const FIRING: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireState {
    Idle,
    Firing,
}

/// Shape of one firing sequence, in whole time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PulseTiming {
    /// Number of on/off pulses per sequence.
    pub count: u32,
    /// Units the actuator is held on in each pulse.
    pub on_units: u32,
    /// Units the actuator is held off after each pulse.
    pub off_units: u32,
    /// Length of one unit in milliseconds.
    pub unit_ms: u64,
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            count: 4,
            on_units: 1,
            off_units: 4,
            unit_ms: 1000,
        }
    }
}

impl PulseTiming {
    pub fn unit(&self) -> Duration {
        Duration::from_millis(self.unit_ms)
    }

    pub fn on_duration(&self) -> Duration {
        self.unit() * self.on_units
    }

    pub fn off_duration(&self) -> Duration {
        self.unit() * self.off_units
    }

    /// Nominal length of a full sequence (20 units with the defaults).
    pub fn total(&self) -> Duration {
        (self.on_duration() + self.off_duration()) * self.count
    }
}

/// What a call to [`FireSequencer::trigger`] did.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A new sequence was started. The handle may be awaited by tests or shutdown code.
    Started(JoinHandle<()>),
    /// A sequence was already running; this request was dropped.
    AlreadyFiring,
}

impl TriggerOutcome {
    pub fn started(&self) -> bool {
        matches!(self, TriggerOutcome::Started(_))
    }
}

struct SharedState {
    state: AtomicU8,
    released: Notify,
}

/// Puts the sequencer back to Idle when dropped, on every exit path of the firing task.
struct FiringGuard {
    shared: Arc<SharedState>,
}

impl Drop for FiringGuard {
    fn drop(&mut self) {
        self.shared.state.store(IDLE, Ordering::Release);
        self.shared.released.notify_waiters();
        debug!("fire sequencer released to Idle");
    }
}

pub struct FireSequencer {
    shared: Arc<SharedState>,
    actuator: Arc<dyn Actuator>,
    timing: PulseTiming,
    runtime: Handle,
}

impl FireSequencer {
    /// Creates an idle sequencer whose firing tasks are spawned on `runtime`.
    pub fn new(actuator: Arc<dyn Actuator>, timing: PulseTiming, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(SharedState {
                state: AtomicU8::new(IDLE),
                released: Notify::new(),
            }),
            actuator,
            timing,
            runtime,
        }
    }

    /// Like [`FireSequencer::new`], using the runtime the caller is running in.
    pub fn on_current_runtime(actuator: Arc<dyn Actuator>, timing: PulseTiming) -> Result<Self, ServoError> {
        let runtime = Handle::try_current().map_err(|_| ServoError::NoRuntime)?;
        Ok(Self::new(actuator, timing, runtime))
    }

    pub fn state(&self) -> FireState {
        match self.shared.state.load(Ordering::Acquire) {
            IDLE => FireState::Idle,
            _ => FireState::Firing,
        }
    }

    pub fn timing(&self) -> &PulseTiming {
        &self.timing
    }

    /// Starts a firing sequence unless one is already running. Never blocks.
    pub fn trigger(&self) -> TriggerOutcome {
        if self
            .shared
            .state
            .compare_exchange(IDLE, FIRING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("fire trigger dropped, sequence already running");
            return TriggerOutcome::AlreadyFiring;
        }

        let guard = FiringGuard {
            shared: Arc::clone(&self.shared),
        };
        let actuator = Arc::clone(&self.actuator);
        let timing = self.timing;

        info!("Target centered, firing {} pulses", timing.count);
        let handle = self.runtime.spawn(async move {
            let _guard = guard;
            if let Err(err) = run_sequence(&actuator, &timing).await {
                error!("Fire sequence aborted: {err}");
                if let Err(off_err) = switch(&actuator, false).await {
                    warn!("Could not switch actuator off after fault: {off_err}");
                }
            }
        });
        TriggerOutcome::Started(handle)
    }

    /// Resolves once the sequencer is Idle. Returns immediately if nothing is firing.
    pub async fn wait_idle(&self) {
        loop {
            let released = self.shared.released.notified();
            if self.state() == FireState::Idle {
                return;
            }
            released.await;
        }
    }
}

/// Drives the actuator through one full pulse train.
async fn run_sequence(actuator: &Arc<dyn Actuator>, timing: &PulseTiming) -> Result<(), ServoError> {
    for pulse in 1..=timing.count {
        switch(actuator, true).await?;
        sleep(timing.on_duration()).await;
        switch(actuator, false).await?;
        debug!("pulse {pulse}/{} done", timing.count);
        sleep(timing.off_duration()).await;
    }
    info!("Fire sequence complete");
    Ok(())
}

/// Sets the actuator on the blocking pool. A panic in the driver is re-raised in the firing task.
async fn switch(actuator: &Arc<dyn Actuator>, on: bool) -> Result<(), ServoError> {
    let actuator = Arc::clone(actuator);
    let written = task::spawn_blocking(move || if on { actuator.on() } else { actuator.off() }).await;
    match written {
        Ok(result) => result.map_err(ServoError::ActuatorFault),
        Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
        Err(_) => Err(ServoError::ActuatorFault(io::Error::other("actuator write cancelled"))),
    }
}
