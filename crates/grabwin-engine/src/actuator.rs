//! The actuator owns every geometry write.
//!
//! Taps hand it [`Operation`]s through an [`ActuatorHandle`]. A single worker
//! thread wakes once per tick (or when kicked by a submit or a mouse-up),
//! drains each record and applies the coalesced delta through the window
//! backend, so the backend sees at most one write per gesture per tick.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use mac_winops::WindowBackend;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, trace, warn};

use crate::{
    error::{Error, Result},
    operation::Operation,
};

/// 120 Hz.
pub const DEFAULT_TICK: Duration = Duration::from_micros(8_333);

/// Longest accepted tick, the period of 1 Hz.
pub const MAX_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorConfig {
    /// Upper bound between two applies of the same gesture.
    pub tick: Duration,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self { tick: DEFAULT_TICK }
    }
}

impl ActuatorConfig {
    /// Tick period for a rate in Hz. Zero is treated as 1 Hz.
    pub fn from_hz(hz: u32) -> Self {
        let hz = u64::from(hz.max(1));
        Self {
            tick: Duration::from_nanos(1_000_000_000 / hz),
        }
    }
}

struct State {
    queue: VecDeque<Arc<Operation>>,
    /// Set by submit/wake, cleared by the worker.
    kicked: bool,
    stopping: bool,
}

struct Shared {
    state: Mutex<State>,
    cv: Condvar,
    backend: Arc<dyn WindowBackend>,
    tick: Duration,
    stopped: AtomicBool,
}

/// Cloneable producer side of the actuator, held by every tap.
#[derive(Clone)]
pub struct ActuatorHandle {
    shared: Arc<Shared>,
}

impl ActuatorHandle {
    /// Queue a freshly started gesture and kick the worker.
    pub fn submit(&self, op: Arc<Operation>) -> Result<()> {
        {
            let mut st = self.shared.state.lock();
            if st.stopping {
                return Err(Error::ActuatorStopped);
            }
            trace!(id = op.id(), kind = %op.kind(), "actuator_submit");
            st.queue.push_back(op);
            st.kicked = true;
        }
        self.shared.cv.notify_one();
        Ok(())
    }

    /// Wake the worker without waiting for the next tick. Used after a
    /// gesture completes so its final delta lands promptly.
    pub fn wake(&self) {
        self.shared.state.lock().kicked = true;
        self.shared.cv.notify_one();
    }

    pub fn backend(&self) -> &Arc<dyn WindowBackend> {
        &self.shared.backend
    }

    /// Number of records still queued, including completed ones awaiting
    /// their final pass.
    pub fn active(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }
}

/// The worker service. Construct once at startup; dropping it forces every
/// queued gesture complete, runs a last pass and joins the thread.
pub struct Actuator {
    shared: Arc<Shared>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Actuator {
    /// Start the worker thread.
    pub fn spawn(backend: Arc<dyn WindowBackend>, config: ActuatorConfig) -> Result<Self> {
        let shared = Self::shared(backend, config);
        let tick = shared.tick;
        let worker = shared.clone();
        let thread = thread::Builder::new()
            .name("actuator".into())
            .spawn(move || run(&worker))
            .map_err(|e| Error::Spawn(e.to_string()))?;
        info!(?tick, "actuator_started");
        Ok(Self {
            shared,
            thread: Some(thread),
        })
    }

    /// An actuator without a thread. Passes run only when [`Actuator::tick`]
    /// is called.
    pub fn detached(backend: Arc<dyn WindowBackend>, config: ActuatorConfig) -> Self {
        Self {
            shared: Self::shared(backend, config),
            thread: None,
        }
    }

    fn shared(backend: Arc<dyn WindowBackend>, config: ActuatorConfig) -> Arc<Shared> {
        Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                kicked: false,
                stopping: false,
            }),
            cv: Condvar::new(),
            backend,
            tick: config.tick.min(MAX_TICK),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn handle(&self) -> ActuatorHandle {
        ActuatorHandle {
            shared: self.shared.clone(),
        }
    }

    /// Run one full pass on the calling thread: adopt, drain and apply every
    /// record, then retire completed ones.
    pub fn tick(&self) {
        pass(&self.shared, true);
    }

    /// Stop accepting gestures, finish the queued ones and join the worker.
    /// Idempotent.
    pub fn shutdown(&mut self) {
        {
            let mut st = self.shared.state.lock();
            if st.stopping {
                return;
            }
            st.stopping = true;
        }
        self.shared.cv.notify_one();
        match self.thread.take() {
            Some(t) => {
                if t.join().is_err() {
                    warn!("actuator_thread_panicked");
                }
            }
            None => drain_all(&self.shared),
        }
        self.shared.stopped.store(true, Ordering::SeqCst);
        debug!("actuator_stopped");
    }
}

impl Drop for Actuator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(shared: &Shared) {
    let mut next = Instant::now() + shared.tick;
    loop {
        let full = {
            let mut st = shared.state.lock();
            while !st.kicked && !st.stopping && Instant::now() < next {
                let _ = shared.cv.wait_until(&mut st, next);
            }
            if st.stopping {
                break;
            }
            st.kicked = false;
            Instant::now() >= next
        };
        if full {
            next = Instant::now() + shared.tick;
        }
        pass(shared, full);
    }
    drain_all(shared);
}

/// Teardown: everything still queued is forced complete and gets one last
/// best-effort apply.
fn drain_all(shared: &Shared) {
    let forced = {
        let st = shared.state.lock();
        st.queue.iter().filter(|op| op.complete()).count()
    };
    if forced > 0 {
        debug!(forced, "actuator_forcing_completion");
    }
    pass(shared, true);
}

/// One sweep over the queue. Off-tick passes (`full == false`) only adopt new
/// records and finish completed ones, which keeps writes per gesture bounded
/// by the tick rate.
fn pass(shared: &Shared, full: bool) {
    let ops: Vec<Arc<Operation>> = shared.state.lock().queue.iter().cloned().collect();
    if ops.is_empty() {
        return;
    }
    let mut retired = Vec::new();
    for op in ops {
        if op.adopt() {
            adopt(shared, &op);
        }
        // Completion must be observed before the drain: every accumulate
        // that preceded it is then visible to the drain below.
        let done = op.is_completed();
        if !(full || done) {
            continue;
        }
        if let Err(e) = apply(shared, &op) {
            warn!(id = op.id(), kind = %op.kind(), error = %e, "gesture_apply_failed");
            op.complete();
            retired.push(op);
            continue;
        }
        if done {
            retired.push(op);
        }
    }
    if retired.is_empty() {
        return;
    }
    shared
        .state
        .lock()
        .queue
        .retain(|q| !retired.iter().any(|r| Arc::ptr_eq(q, r)));
    for op in retired {
        retire(&op);
    }
}

fn adopt(shared: &Shared, op: &Operation) {
    debug!(id = op.id(), kind = %op.kind(), window = ?op.window(), "gesture_adopted");
    if op.raise()
        && let Err(e) = shared.backend.raise(op.window())
    {
        warn!(id = op.id(), error = %e, "raise_failed");
    }
}

fn apply(shared: &Shared, op: &Operation) -> Result<()> {
    let mut anchor = op.anchor();
    let (dx, dy) = op.drain();
    if dx == 0 && dy == 0 {
        return Ok(());
    }
    let Some(current) = *anchor else {
        return Ok(());
    };
    *anchor = Some(
        op.hooks()
            .drag(shared.backend.as_ref(), op.window(), current, dx, dy)?,
    );
    Ok(())
}

fn retire(op: &Operation) {
    op.hooks().end(op.window());
    op.anchor().take();
    debug!(id = op.id(), kind = %op.kind(), "gesture_retired");
}
