//! The background thread that keeps the [`DrawCallList`](crate::DrawCallList) in
//! sync with the scene.
//!
//! The worker sleeps until [`DrawCallWorker::invalidate`] is called, then rebuilds
//! every draw call with its [`DrawCallBuilder`]. Invalidations that arrive while it
//! is still asleep, or while it's busy, collapse into a single following rebuild.

use crate::batching::DrawCallBuilder;
use crate::error::{SpawnErr, WorkerError};
use crate::gpu::GpuBackend;
use parking_lot::{Condvar, Mutex};
use snafu::ResultExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawCallWorkerState {
    Idle,
    Building,
    Stopped,
}

struct WorkerStatus {
    state: DrawCallWorkerState,
    invalidated: bool,
    paused: usize,
    stop: bool,
}

struct WorkerShared {
    status: Mutex<WorkerStatus>,
    wake: Condvar,
    idle: Condvar,
    rebuilds: AtomicUsize,
}

impl WorkerShared {
    /// Blocks until there is work. Returns `false` once the worker should exit.
    fn wait_for_invalidation(&self) -> bool {
        let mut status = self.status.lock();
        while (!status.invalidated || status.paused > 0) && !status.stop {
            self.wake.wait(&mut status);
        }

        if status.stop {
            status.state = DrawCallWorkerState::Stopped;
            self.idle.notify_all();
            return false;
        }

        status.invalidated = false;
        status.state = DrawCallWorkerState::Building;
        true
    }

    fn finish_rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::AcqRel);

        let mut status = self.status.lock();
        if status.state == DrawCallWorkerState::Building {
            status.state = DrawCallWorkerState::Idle;
        }
        self.idle.notify_all();
    }

    fn run<B: GpuBackend>(&self, builder: DrawCallBuilder<B>) {
        while self.wait_for_invalidation() {
            trace!("Rebuilding draw calls");
            builder.generate_draw_calls();
            self.finish_rebuild();
        }
        debug!("Draw call worker exited");
    }
}

pub struct DrawCallWorker {
    shared: Arc<WorkerShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl DrawCallWorker {
    pub const THREAD_NAME: &'static str = "strata-draw-calls";

    pub fn spawn<B: GpuBackend>(builder: DrawCallBuilder<B>) -> Result<Self, WorkerError> {
        let shared = Arc::new(WorkerShared {
            status: Mutex::new(WorkerStatus {
                state: DrawCallWorkerState::Idle,
                invalidated: false,
                paused: 0,
                stop: false,
            }),
            wake: Condvar::new(),
            idle: Condvar::new(),
            rebuilds: AtomicUsize::new(0),
        });

        let thread_shared = shared.clone();
        let thread = std::thread::Builder::new()
            .name(Self::THREAD_NAME.to_string())
            .spawn(move || {
                profiling::register_thread!();
                thread_shared.run(builder);
            })
            .context(SpawnErr {
                name: Self::THREAD_NAME,
            })?;

        Ok(DrawCallWorker {
            shared,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Schedules a full rebuild. Cheap, can be called from any thread and as often
    /// as needed.
    pub fn invalidate(&self) {
        let mut status = self.shared.status.lock();
        if status.stop {
            return;
        }
        status.invalidated = true;
        self.shared.wake.notify_one();
    }

    /// Holds back new rebuild passes until the returned guard is dropped. A pass that
    /// is already running finishes. Invalidations made meanwhile collapse into one
    /// pass after the last guard is gone.
    pub fn pause(&self) -> PausedRebuilds<'_> {
        self.shared.status.lock().paused += 1;
        PausedRebuilds { worker: self }
    }

    pub fn state(&self) -> DrawCallWorkerState {
        self.shared.status.lock().state
    }

    /// Number of finished rebuild passes.
    pub fn rebuild_count(&self) -> usize {
        self.shared.rebuilds.load(Ordering::Acquire)
    }

    /// Waits until no rebuild is running or pending. Returns `false` on timeout, which
    /// is what happens while rebuilds are paused with an invalidation pending.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut status = self.shared.status.lock();

        while (status.invalidated || status.state == DrawCallWorkerState::Building) && !status.stop
        {
            if self.shared.idle.wait_until(&mut status, deadline).timed_out() {
                return !(status.invalidated || status.state == DrawCallWorkerState::Building);
            }
        }
        true
    }

    /// Stops the worker after its current pass and joins it.
    pub fn stop(&self) {
        {
            let mut status = self.shared.status.lock();
            status.stop = true;
            self.shared.wake.notify_all();
        }

        if let Some(thread) = self.thread.lock().take()
            && thread.join().is_err()
        {
            error!("The draw call worker panicked");
        }
    }
}

impl Drop for DrawCallWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Returned by [`DrawCallWorker::pause`].
#[must_use = "rebuilds resume as soon as the guard is dropped"]
pub struct PausedRebuilds<'a> {
    worker: &'a DrawCallWorker,
}

impl Drop for PausedRebuilds<'_> {
    fn drop(&mut self) {
        let mut status = self.worker.shared.status.lock();
        status.paused -= 1;
        if status.paused == 0 {
            self.worker.shared.wake.notify_one();
        }
    }
}
