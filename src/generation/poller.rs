use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::sleep;

use super::classify::{ErrorKind, FetchOutcome, PollOutcome, classify};
use super::session::JobHandle;

/// Capability to fetch the raw generation status of one job.
///
/// Infallible by construction: transport problems are reported as
/// [`FetchOutcome::TransportFailure`], never as an `Err`.
pub trait StatusFetch {
    async fn fetch_status(&self, job: &JobHandle) -> FetchOutcome;
}

/// Scheduling knobs for the poll loop.
#[derive(Debug, Clone)]
pub struct PollerOptions {
    /// Delay between consecutive status checks.
    pub interval_ms: u64,
    /// Give up with a TIMEOUT failure after this many attempts. `None` polls
    /// until a terminal outcome arrives.
    pub max_attempts: Option<u32>,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            max_attempts: None,
        }
    }
}

/// Cooperative cancellation flag shared between a session owner and its
/// running poll loop. Cancelling clears nothing by force; the loop consults
/// the flag before every fetch and again before acting on a response, so a
/// reply that arrives after cancellation is discarded unread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How one poll run ended. `attempts` counts fetch calls actually performed.
#[derive(Debug, Clone, PartialEq)]
pub enum PollRun {
    /// The loop classified a terminal outcome (guaranteed terminal).
    Terminal { outcome: PollOutcome, attempts: u32 },
    /// The token was cancelled; no outcome was produced.
    Cancelled { attempts: u32 },
}

/// Owns the fetch/classify/reschedule loop for one job.
///
/// At most one fetch is in flight at any time: attempt `n + 1` is never
/// scheduled before attempt `n` has been classified.
pub struct JobPoller {
    options: PollerOptions,
}

impl JobPoller {
    pub fn new(options: PollerOptions) -> Self {
        Self { options }
    }

    /// Poll until a terminal outcome, attempt exhaustion, or cancellation.
    ///
    /// Exhausting `max_attempts` synthesizes a `Fatal` TIMEOUT outcome, so
    /// callers see exactly one terminal `PollRun::Terminal` per run unless
    /// the run was cancelled.
    pub async fn run<F: StatusFetch>(
        &self,
        job: &JobHandle,
        fetch: &F,
        token: &CancelToken,
    ) -> PollRun {
        let mut attempts: u32 = 0;

        loop {
            if token.is_cancelled() {
                return PollRun::Cancelled { attempts };
            }

            let raw = fetch.fetch_status(job).await;
            attempts += 1;

            // A response that lands after cancellation belongs to an
            // abandoned session and must not reach anyone.
            if token.is_cancelled() {
                return PollRun::Cancelled { attempts };
            }

            let outcome = classify(&raw);
            if outcome.is_terminal() {
                return PollRun::Terminal { outcome, attempts };
            }

            if let Some(max) = self.options.max_attempts
                && attempts >= max
            {
                return PollRun::Terminal {
                    outcome: PollOutcome::Fatal {
                        kind: ErrorKind::Timeout,
                        message: format!("no terminal status after {attempts} attempts"),
                    },
                    attempts,
                };
            }

            sleep(Duration::from_millis(self.options.interval_ms)).await;
        }
    }
}
