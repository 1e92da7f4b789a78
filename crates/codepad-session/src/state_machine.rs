//! Run lifecycle: `Idle → Compiling → Running → Completed | Failed → Idle`.
//!
//! [`ExecutionStateMachine::start`] is the single entry point for every run
//! affordance. The active-run guard and the transition to `Compiling` happen
//! under one lock, so two triggers fired together can never both get through.
//!
//! After a terminal phase a reset task returns the machine to `Idle` once the
//! display window elapses. An accepted `start` aborts that task, and the task
//! itself only resets the run it was scheduled for, so a stale reset never
//! overwrites a newer run.
//!
//! Observers read state through a `tokio::sync::watch` channel of
//! [`RunSnapshot`]s; the internal lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use codepad_client::ExecutionService;
use codepad_core::{
    format_output, EditorError, ExecutionPhase, ExecutionRequest, ExecutionResult, OutputLine,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::timer::Timer;

pub const PROGRESS_COMPILING: u8 = 25;
pub const PROGRESS_RUNNING: u8 = 50;
pub const PROGRESS_PROCESSING: u8 = 75;
pub const PROGRESS_COMPLETED: u8 = 100;

const PROCESSING_LABEL: &str = "Processing output...";

/// Delays applied around a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTiming {
    /// Cosmetic pause spent in `Compiling` before the request is sent. The
    /// execution service has no separate compile step.
    pub compile_delay: Duration,
    /// How long a terminal phase stays visible before resetting to `Idle`.
    pub display_duration: Duration,
}

impl Default for RunTiming {
    fn default() -> Self {
        RunTiming {
            compile_delay: Duration::from_millis(500),
            display_duration: Duration::from_millis(2000),
        }
    }
}

/// UI-facing view of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSnapshot {
    /// Increments on every accepted `start`; 0 before the first run.
    pub run_id: u64,
    pub phase: ExecutionPhase,
    pub progress: u8,
    pub status: &'static str,
    /// Lines of the latest response. Cleared when a run starts and left in
    /// place by the reset to `Idle`.
    pub output: Option<Arc<[OutputLine]>>,
    /// Failure message when the latest run ended without a response.
    pub error: Option<String>,
}

/// How a finished run ended.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: u64,
    /// `Completed` or `Failed`.
    pub phase: ExecutionPhase,
    pub result: Option<ExecutionResult>,
    pub output: Option<Arc<[OutputLine]>>,
    pub error: Option<EditorError>,
}

#[derive(Debug, Clone)]
pub enum StartOutcome {
    Finished(RunOutcome),
    /// Another run holds the machine in this phase.
    Rejected { phase: ExecutionPhase },
    /// The machine was torn down.
    Closed,
}

impl StartOutcome {
    pub fn finished(&self) -> Option<&RunOutcome> {
        match self {
            StartOutcome::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: RunSnapshot,
    reset: Option<JoinHandle<()>>,
    closed: bool,
}

struct Shared {
    executor: Arc<dyn ExecutionService>,
    timer: Arc<dyn Timer>,
    timing: RunTiming,
    inner: Mutex<Inner>,
    updates: watch::Sender<RunSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` to the snapshot of `run_id` and publishes it.
    /// Returns `false` when a different run owns the machine.
    fn transition(&self, run_id: u64, change: impl FnOnce(&mut RunSnapshot)) -> bool {
        let mut inner = self.lock();
        if inner.snapshot.run_id != run_id {
            return false;
        }
        change(&mut inner.snapshot);
        self.updates.send_replace(inner.snapshot.clone());
        true
    }

    fn reset_to_idle(&self, run_id: u64) {
        let mut inner = self.lock();
        if inner.snapshot.run_id != run_id || !inner.snapshot.phase.is_terminal() {
            return;
        }
        inner.reset = None;
        inner.snapshot.phase = ExecutionPhase::Idle;
        inner.snapshot.progress = 0;
        inner.snapshot.status = ExecutionPhase::Idle.status_label();
        self.updates.send_replace(inner.snapshot.clone());
        tracing::debug!(run_id, "run state reset to idle");
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = inner.reset.take() {
            handle.abort();
        }
    }
}

/// Guarded run lifecycle shared by every run trigger. Cheap to clone.
#[derive(Clone)]
pub struct ExecutionStateMachine {
    shared: Arc<Shared>,
}

impl ExecutionStateMachine {
    pub fn new(
        executor: Arc<dyn ExecutionService>,
        timer: Arc<dyn Timer>,
        timing: RunTiming,
    ) -> Self {
        let (updates, _) = watch::channel(RunSnapshot::default());
        ExecutionStateMachine {
            shared: Arc::new(Shared {
                executor,
                timer,
                timing,
                inner: Mutex::new(Inner::default()),
                updates,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.shared.lock().snapshot.clone()
    }

    pub fn phase(&self) -> ExecutionPhase {
        self.shared.lock().snapshot.phase
    }

    pub fn timing(&self) -> RunTiming {
        self.shared.timing
    }

    /// Runs `request` to a terminal phase.
    ///
    /// Refused while another run is `Compiling` or `Running`. Accepted from
    /// `Idle` and from a terminal phase whose reset is still pending; the
    /// pending reset is cancelled.
    ///
    /// An accepted run is driven on its own task. Dropping the returned
    /// future stops waiting for the outcome but the run, its execute call and
    /// the reset that follows carry on.
    pub async fn start(&self, request: ExecutionRequest) -> StartOutcome {
        let run_id = match self.begin() {
            Ok(run_id) => run_id,
            Err(outcome) => return outcome,
        };
        tracing::info!(
            run_id,
            language = %request.language,
            version = %request.version,
            "run started"
        );

        let machine = self.clone();
        let run = tokio::spawn(async move { machine.drive(run_id, request).await });
        match run.await {
            Ok(outcome) => StartOutcome::Finished(outcome),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => {
                tracing::debug!(run_id, "run task cancelled by runtime shutdown");
                StartOutcome::Closed
            }
        }
    }

    async fn drive(&self, run_id: u64, request: ExecutionRequest) -> RunOutcome {
        let shared = &self.shared;
        shared.timer.sleep(shared.timing.compile_delay).await;
        shared.transition(run_id, |s| {
            s.phase = ExecutionPhase::Running;
            s.progress = PROGRESS_RUNNING;
            s.status = ExecutionPhase::Running.status_label();
        });

        let outcome = match shared.executor.execute(&request).await {
            Ok(result) => {
                shared.transition(run_id, |s| {
                    s.progress = PROGRESS_PROCESSING;
                    s.status = PROCESSING_LABEL;
                });

                let lines: Arc<[OutputLine]> =
                    format_output(&result.raw_output, result.succeeded).into();
                let phase = if result.succeeded {
                    ExecutionPhase::Completed
                } else {
                    ExecutionPhase::Failed
                };
                shared.transition(run_id, |s| {
                    s.phase = phase;
                    if result.succeeded {
                        s.progress = PROGRESS_COMPLETED;
                    }
                    s.status = phase.status_label();
                    s.output = Some(Arc::clone(&lines));
                });
                tracing::info!(run_id, exit_code = result.exit_code, %phase, "run finished");

                RunOutcome {
                    run_id,
                    phase,
                    result: Some(result),
                    output: Some(lines),
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(run_id, error = %err, "run failed before producing output");
                shared.transition(run_id, |s| {
                    s.phase = ExecutionPhase::Failed;
                    s.status = ExecutionPhase::Failed.status_label();
                    s.error = Some(err.message().to_string());
                });

                RunOutcome {
                    run_id,
                    phase: ExecutionPhase::Failed,
                    result: None,
                    output: None,
                    error: Some(err),
                }
            }
        };

        self.schedule_reset(run_id);
        outcome
    }

    /// Cancels the pending reset and refuses further runs. An execute call
    /// already in flight is left to finish.
    pub fn teardown(&self) {
        let mut inner = self.shared.lock();
        inner.closed = true;
        if let Some(handle) = inner.reset.take() {
            handle.abort();
        }
        tracing::debug!("execution state machine torn down");
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Guard check plus transition to `Compiling`, under one lock.
    fn begin(&self) -> Result<u64, StartOutcome> {
        let mut inner = self.shared.lock();
        if inner.closed {
            return Err(StartOutcome::Closed);
        }
        let phase = inner.snapshot.phase;
        if phase.is_active() {
            tracing::debug!(%phase, "run rejected: another run is active");
            return Err(StartOutcome::Rejected { phase });
        }
        if let Some(handle) = inner.reset.take() {
            handle.abort();
        }

        let run_id = inner.snapshot.run_id + 1;
        inner.snapshot = RunSnapshot {
            run_id,
            phase: ExecutionPhase::Compiling,
            progress: PROGRESS_COMPILING,
            status: ExecutionPhase::Compiling.status_label(),
            output: None,
            error: None,
        };
        self.shared.updates.send_replace(inner.snapshot.clone());
        Ok(run_id)
    }

    fn schedule_reset(&self, run_id: u64) {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let timer = Arc::clone(&self.shared.timer);
        let delay = self.shared.timing.display_duration;

        let mut inner = self.shared.lock();
        if inner.closed || inner.snapshot.run_id != run_id {
            return;
        }
        let handle = tokio::spawn(async move {
            timer.sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                shared.reset_to_idle(run_id);
            }
        });
        if let Some(previous) = inner.reset.replace(handle) {
            previous.abort();
        }
    }
}
