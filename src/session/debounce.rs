use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::foundation::error::{JayverseError, JayverseResult};

/// Token issued per submitted parameter state. Later submissions get larger values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// Counters describing what the worker has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunnerStats {
    /// Jobs actually executed.
    pub runs_started: u64,
    /// Finished runs thrown away because a newer generation had been issued.
    pub discarded: u64,
}

struct Slot<R> {
    visible: Option<(Generation, R)>,
    last_error: Option<String>,
    settled: u64,
    stats: RunnerStats,
}

struct Shared<R> {
    slot: Mutex<Slot<R>>,
    settled_cv: Condvar,
    latest: AtomicU64,
}

impl<R> Shared<R> {
    fn lock(&self) -> MutexGuard<'_, Slot<R>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs a job after parameters stop changing, keeping only the newest result.
///
/// One worker thread owns the job. Submissions arriving within the quiet period replace the
/// pending parameters; when the period elapses the job runs once with the newest ones. A run
/// whose generation is no longer the latest when it finishes is discarded instead of
/// committed. Dropping the runner stops the worker.
pub struct DebouncedRunner<P, R> {
    tx: Option<mpsc::Sender<(Generation, P)>>,
    worker: Option<JoinHandle<()>>,
    shared: Arc<Shared<R>>,
    name: &'static str,
}

impl<P, R> DebouncedRunner<P, R>
where
    P: Send + 'static,
    R: Clone + Send + 'static,
{
    /// Spawn the worker. `name` labels log events and the thread.
    pub fn new<F>(name: &'static str, quiet: Duration, job: F) -> JayverseResult<Self>
    where
        F: FnMut(&P) -> JayverseResult<R> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<(Generation, P)>();
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                visible: None,
                last_error: None,
                settled: 0,
                stats: RunnerStats::default(),
            }),
            settled_cv: Condvar::new(),
            latest: AtomicU64::new(0),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name(format!("jayverse-{name}"))
            .spawn(move || worker_loop(name, quiet, rx, worker_shared, job))
            .map_err(|e| JayverseError::render(format!("spawn {name} worker: {e}")))?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            shared,
            name,
        })
    }

    /// Queue new parameters and return their generation.
    pub fn submit(&self, params: P) -> JayverseResult<Generation> {
        let generation = Generation(self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1);
        let sent = self
            .tx
            .as_ref()
            .map(|tx| tx.send((generation, params)).is_ok())
            .unwrap_or(false);
        if !sent {
            return Err(JayverseError::render(format!(
                "{} worker is not running",
                self.name
            )));
        }
        Ok(generation)
    }

    /// Latest generation handed out by [`Self::submit`].
    pub fn latest(&self) -> Generation {
        Generation(self.shared.latest.load(Ordering::SeqCst))
    }

    /// Block until `generation` (or a later one) has finished or `timeout` elapses.
    /// Returns whether it settled.
    pub fn wait_settled(&self, generation: Generation, timeout: Duration) -> bool {
        let guard = self.shared.lock();
        let (guard, _) = self
            .shared
            .settled_cv
            .wait_timeout_while(guard, timeout, |s| s.settled < generation.0)
            .unwrap_or_else(PoisonError::into_inner);
        guard.settled >= generation.0
    }

    /// Most recently committed result.
    pub fn visible(&self) -> Option<(Generation, R)> {
        self.shared.lock().visible.clone()
    }

    /// Message of the latest failed run, cleared by the next successful one.
    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().last_error.clone()
    }

    /// Run counters.
    pub fn stats(&self) -> RunnerStats {
        self.shared.lock().stats
    }
}

impl<P, R> Drop for DebouncedRunner<P, R> {
    fn drop(&mut self) {
        // Closing the channel wakes the worker, which exits without running pending work.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!(runner = self.name, "worker panicked");
            }
        }
    }
}

fn worker_loop<P, R, F>(
    name: &'static str,
    quiet: Duration,
    rx: mpsc::Receiver<(Generation, P)>,
    shared: Arc<Shared<R>>,
    mut job: F,
) where
    F: FnMut(&P) -> JayverseResult<R>,
{
    while let Ok(mut pending) = rx.recv() {
        let mut collapsed = 0u32;
        loop {
            match rx.recv_timeout(quiet) {
                Ok(newer) => {
                    pending = newer;
                    collapsed += 1;
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        let (generation, params) = pending;
        tracing::debug!(runner = name, generation = generation.0, collapsed, "run started");
        {
            shared.lock().stats.runs_started += 1;
        }
        let outcome = job(&params);

        let latest = shared.latest.load(Ordering::SeqCst);
        let mut slot = shared.lock();
        if generation.0 == latest {
            match outcome {
                Ok(result) => {
                    slot.visible = Some((generation, result));
                    slot.last_error = None;
                }
                Err(e) => {
                    tracing::warn!(runner = name, generation = generation.0, error = %e, "run failed");
                    slot.last_error = Some(e.to_string());
                }
            }
        } else {
            slot.stats.discarded += 1;
            tracing::warn!(
                runner = name,
                generation = generation.0,
                latest,
                "discarding stale run"
            );
        }
        slot.settled = slot.settled.max(generation.0);
        drop(slot);
        shared.settled_cv.notify_all();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/debounce.rs"]
mod tests;
