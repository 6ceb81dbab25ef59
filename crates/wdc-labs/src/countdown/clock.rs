use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::breakdown::CountdownBreakdown;
use super::time::TimeSource;

pub const TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Unread emissions kept for a reader. Once full, new ticks are only visible
/// through [`CountdownClock::latest`] until the reader catches up.
pub const TICK_BUFFER: usize = 32;

/// Receiving end of a clock's emissions: one at start, then one per tick.
#[derive(Debug)]
pub struct CountdownTicks {
    rx: mpsc::Receiver<CountdownBreakdown>,
}

impl CountdownTicks {
    pub async fn recv(&mut self) -> Option<CountdownBreakdown> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<CountdownBreakdown> {
        self.rx.try_recv().ok()
    }

    /// Everything emitted so far that has not been read yet.
    pub fn drain(&mut self) -> Vec<CountdownBreakdown> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[derive(Debug)]
struct Emitted {
    latest: CountdownBreakdown,
    /// Bumped on every start and stop; a tick from an older run is dropped.
    run: u64,
}

#[derive(Clone)]
struct Emitter {
    time: Arc<dyn TimeSource>,
    emitted: Arc<Mutex<Emitted>>,
    sink: mpsc::Sender<CountdownBreakdown>,
}

impl Emitter {
    fn lock(&self) -> MutexGuard<'_, Emitted> {
        self.emitted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new run and returns its id; any older run stops emitting.
    fn next_run(&self) -> u64 {
        let mut emitted = self.lock();
        emitted.run += 1;
        emitted.run
    }

    fn emit(&self, deadline: DateTime<Utc>, run: u64) -> Option<CountdownBreakdown> {
        let mut emitted = self.lock();
        if emitted.run != run {
            return None;
        }

        let breakdown = CountdownBreakdown::until(deadline, self.time.now());
        emitted.latest = breakdown;
        // A full buffer or a dropped reader is fine; `latest()` still reflects the tick.
        let _ = self.sink.try_send(breakdown);
        Some(breakdown)
    }
}

/// Live countdown to a fixed deadline, recomputed once per second.
///
/// At most one tick task exists per clock. Starting again replaces it, and
/// stopping or dropping the clock aborts it. `start` must be called from
/// within a tokio runtime.
pub struct CountdownClock {
    emitter: Emitter,
    deadline: Option<DateTime<Utc>>,
    task: Option<JoinHandle<()>>,
}

impl CountdownClock {
    pub fn new(time: Arc<dyn TimeSource>) -> (Self, CountdownTicks) {
        let (sink, rx) = mpsc::channel(TICK_BUFFER);
        let clock = Self {
            emitter: Emitter {
                time,
                emitted: Arc::new(Mutex::new(Emitted {
                    latest: CountdownBreakdown::ZERO,
                    run: 0,
                })),
                sink,
            },
            deadline: None,
            task: None,
        };
        (clock, CountdownTicks { rx })
    }

    pub fn start(&mut self, deadline: DateTime<Utc>) -> CountdownBreakdown {
        self.stop();

        let run = self.emitter.next_run();
        // `run` is current while `&mut self` is held, so this always emits.
        let initial = self
            .emitter
            .emit(deadline, run)
            .unwrap_or(CountdownBreakdown::ZERO);
        debug!(%deadline, remaining = %initial, "countdown started");

        let emitter = self.emitter.clone();
        let first_tick = Instant::now() + TICK_PERIOD;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if emitter.emit(deadline, run).is_none() {
                    break;
                }
            }
        }));
        self.deadline = Some(deadline);

        initial
    }

    /// Safe to call when the clock was never started. Once this returns no
    /// further breakdown from the stopped run is emitted, even if its task is
    /// still mid-tick on another worker.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            self.emitter.next_run();
            task.abort();
            debug!("countdown stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn latest(&self) -> CountdownBreakdown {
        self.emitter.lock().latest
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CountdownClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownClock")
            .field("deadline", &self.deadline)
            .field("running", &self.is_running())
            .finish()
    }
}
