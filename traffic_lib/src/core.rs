//! The traffic light phase state machine.
//!
//! This module provides [`Phase`] and [`PhaseController`], which cycles a light between
//! its phases on a background thread and lets other threads wait for it to turn green.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::CycleConfig;
use crate::error::{Error, Result};
use crate::utils::queue::BlockingQueue;
use crate::utils::shutdown::ShutdownSignal;

/// The phase a traffic light is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Traffic must wait.
    #[default]
    Red,
    /// Traffic may pass.
    Green,
}

impl Phase {
    /// Returns the other phase.
    pub fn toggled(self) -> Phase {
        match self {
            Phase::Red => Phase::Green,
            Phase::Green => Phase::Red,
        }
    }

    /// Returns `true` for [`Phase::Green`].
    pub fn is_green(self) -> bool {
        self == Phase::Green
    }

    /// Returns `true` for [`Phase::Red`].
    pub fn is_red(self) -> bool {
        self == Phase::Red
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Red => f.write_str("red"),
            Phase::Green => f.write_str("green"),
        }
    }
}

static NEXT_LIGHT_ID: AtomicUsize = AtomicUsize::new(0);

/// Identifies a traffic light. Every [`PhaseController`] gets a distinct id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(usize);

impl LightId {
    fn next() -> Self {
        LightId(NEXT_LIGHT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The numeric value of the id.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State shared between a controller and its cycle thread.
struct Shared {
    phase: Mutex<Phase>,
    queue: BlockingQueue<Phase>,
}

impl Shared {
    fn phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flips the current phase and publishes the new one.
    ///
    /// The phase lock is held across the send so that the cell and the queue never
    /// disagree about which transitions happened. Lock order is always phase then
    /// queue, and consumers only ever take the queue lock.
    fn flip(&self) -> Phase {
        let mut phase = self.phase();
        *phase = phase.toggled();
        self.queue.send(*phase);
        *phase
    }
}

/// A traffic light that alternates between red and green on a randomized timer.
///
/// The light starts red. [`simulate`](Self::simulate) starts a background thread that
/// flips the phase whenever a randomly drawn cycle duration has elapsed, publishing every
/// new phase into an internal [`BlockingQueue`]. Threads call
/// [`wait_for_green`](Self::wait_for_green) to block until a green phase is delivered.
///
/// Dropping the controller stops the background thread and joins it.
///
/// ```no_run
/// use traffic_lib::core::{Phase, PhaseController};
///
/// let light = PhaseController::new();
/// assert_eq!(light.get_current_phase(), Phase::Red);
/// light.simulate().unwrap();
/// light.wait_for_green().unwrap();
/// ```
pub struct PhaseController {
    id: LightId,
    config: CycleConfig,
    shared: Arc<Shared>,
    shutdown: ShutdownSignal,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl PhaseController {
    /// Creates a red light with the default cycle configuration.
    pub fn new() -> Self {
        Self::with_config(CycleConfig::default())
    }

    /// Creates a red light with the given cycle configuration.
    pub fn with_config(config: CycleConfig) -> Self {
        Self::with_shutdown(config, ShutdownSignal::new())
    }

    /// Creates a red light that stops when `shutdown` fires.
    ///
    /// Firing the signal ends the cycle thread within one tick. The thread then closes
    /// the phase queue, which releases every pending `wait_for*` call with
    /// [`Error::Stopped`].
    pub fn with_shutdown(config: CycleConfig, shutdown: ShutdownSignal) -> Self {
        PhaseController {
            id: LightId::next(),
            config,
            shared: Arc::new(Shared {
                phase: Mutex::new(Phase::Red),
                queue: BlockingQueue::new(),
            }),
            shutdown,
            threads: Mutex::new(Vec::new()),
        }
    }

    /// The identity of this light.
    pub fn id(&self) -> LightId {
        self.id
    }

    /// The cycle configuration this light runs with.
    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    fn threads(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts cycling through phases on a dedicated thread and returns immediately.
    ///
    /// Only one cycle thread may run per light: a second call fails with
    /// [`Error::AlreadySimulating`], and a call after [`stop`](Self::stop) fails with
    /// [`Error::Stopped`].
    pub fn simulate(&self) -> Result<()> {
        let mut threads = self.threads();
        if self.shutdown.is_shutdown() {
            return Err(Error::Stopped(self.id));
        }
        if !threads.is_empty() {
            tracing::warn!(light = %self.id, "rejecting second simulate call");
            return Err(Error::AlreadySimulating(self.id));
        }
        let handle = {
            let id = self.id;
            let config = self.config;
            let shared = self.shared.clone();
            let shutdown = self.shutdown.clone();
            thread::Builder::new()
                .name(format!("traffic-light-{}", id.get()))
                .spawn(move || cycle_through_phases(id, config, &shared, &shutdown))?
        };
        threads.push(handle);
        Ok(())
    }

    /// Returns `true` while the cycle thread is running.
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_shutdown() && self.threads().iter().any(|t| !t.is_finished())
    }

    /// Returns the current phase.
    ///
    /// The value may change the moment after it is read.
    pub fn get_current_phase(&self) -> Phase {
        *self.shared.phase()
    }

    /// Blocks until the next delivery of `target` from the phase queue.
    ///
    /// Deliveries of the other phase are consumed and discarded. The wait is driven by
    /// delivered messages only, so a light that is already in `target` still waits for
    /// the next transition into it. Fails with [`Error::Stopped`] once the light has
    /// been stopped and every pending delivery has been consumed.
    pub fn wait_for(&self, target: Phase) -> Result<()> {
        loop {
            match self.shared.queue.receive_or_closed() {
                Some(phase) if phase == target => return Ok(()),
                Some(phase) => {
                    tracing::trace!(light = %self.id, %phase, %target, "discarding phase");
                }
                None => return Err(Error::Stopped(self.id)),
            }
        }
    }

    /// Blocks until the light turns green.
    ///
    /// See [`wait_for`](Self::wait_for).
    pub fn wait_for_green(&self) -> Result<()> {
        self.wait_for(Phase::Green)
    }

    /// Stops the cycle thread, releases waiting callers and joins the thread.
    ///
    /// Calling `stop` more than once is harmless.
    pub fn stop(&self) {
        self.shutdown.shutdown();
        self.shared.queue.close();
        let handles: Vec<_> = self.threads().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!(light = %self.id, "phase cycle thread panicked");
            }
        }
    }
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PhaseController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of the cycle thread. Runs until `shutdown` fires.
fn cycle_through_phases(
    id: LightId,
    config: CycleConfig,
    shared: &Shared,
    shutdown: &ShutdownSignal,
) {
    let current = thread::current();
    tracing::info!(
        light = %id,
        thread = current.name().unwrap_or_default(),
        "cycling through phases"
    );
    let mut rng = rand::thread_rng();
    let mut cycle_duration = config.draw_cycle_duration(&mut rng);
    let mut last_update = Instant::now();
    while !shutdown.wait_timeout(config.tick()) {
        if last_update.elapsed() < cycle_duration {
            continue;
        }
        let phase = shared.flip();
        tracing::debug!(light = %id, %phase, after = ?cycle_duration, "phase changed");
        last_update = Instant::now();
        cycle_duration = config.draw_cycle_duration(&mut rng);
    }
    shared.queue.close();
    tracing::info!(light = %id, "stopped cycling");
}
