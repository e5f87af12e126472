use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classify::{ErrorKind, PollOutcome};
use super::document::{GeneratedDocument, normalize};
use super::poller::{CancelToken, JobPoller, PollRun, PollerOptions, StatusFetch};

/// Identifies one generation job for the life of a session. The id is opaque
/// and assigned by the backend when the draft is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.job_id)
    }
}

/// Lifecycle of one generation session.
///
/// `Succeeded` and `Failed` are terminal: a new job requires a new session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Submitting,
    Processing {
        attempts: u32,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        document: GeneratedDocument,
    },
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Succeeded { .. } | SessionState::Failed { .. }
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Submitting => write!(f, "SUBMITTING"),
            SessionState::Processing { .. } => write!(f, "PROCESSING"),
            SessionState::Succeeded { .. } => write!(f, "SUCCEEDED"),
            SessionState::Failed { .. } => write!(f, "FAILED"),
        }
    }
}

/// State machine bound to one [`JobHandle`].
///
/// Drives a [`JobPoller`] run to completion and holds the normalized document
/// or the terminal error for the presentation layer.
pub struct GenerationSession {
    id: Uuid,
    job: JobHandle,
    state: SessionState,
    attempts: u32,
    poller: JobPoller,
    cancel: CancelToken,
}

impl GenerationSession {
    pub fn new(job: JobHandle, options: PollerOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            job,
            state: SessionState::Submitting,
            attempts: 0,
            poller: JobPoller::new(options),
            cancel: CancelToken::new(),
        }
    }

    /// Session id for diagnostics; unrelated to the backend job id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn job(&self) -> &JobHandle {
        &self.job
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Status fetches performed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Clonable token for abandoning the session from outside the run, e.g.
    /// when the owning page goes away.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the poll loop to completion and settle into a terminal state.
    ///
    /// Moves synchronously into `Processing`, then awaits the poller. A
    /// cancelled run leaves the session in `Processing` with its attempt
    /// count updated but applies no outcome. Calling `run` on a terminal
    /// session is a no-op.
    pub async fn run<F: StatusFetch>(&mut self, fetch: &F) -> &SessionState {
        if !matches!(self.state, SessionState::Submitting) {
            return &self.state;
        }

        let started_at = Utc::now();
        self.state = SessionState::Processing {
            attempts: 0,
            started_at,
        };

        match self.poller.run(&self.job, fetch, &self.cancel).await {
            PollRun::Cancelled { attempts } => {
                self.attempts = attempts;
                self.state = SessionState::Processing {
                    attempts,
                    started_at,
                };
            }
            PollRun::Terminal { outcome, attempts } => {
                self.attempts = attempts;
                self.state = settle(&self.job, outcome);
            }
        }

        &self.state
    }
}

/// Map a terminal poll outcome onto the session's terminal state.
fn settle(job: &JobHandle, outcome: PollOutcome) -> SessionState {
    match outcome {
        PollOutcome::Succeeded { payload } => match normalize(job, &payload) {
            Ok(document) => SessionState::Succeeded { document },
            // Normalization failure must never crash the loop; it becomes a
            // terminal failure like any other.
            Err(err) => SessionState::Failed {
                kind: ErrorKind::MalformedResult,
                message: err.to_string(),
            },
        },
        PollOutcome::Fatal { kind, message } => SessionState::Failed { kind, message },
        // The poller only surfaces terminal outcomes; reaching this arm is a
        // poller bug.
        PollOutcome::StillProcessing | PollOutcome::RetryableConflict => SessionState::Failed {
            kind: ErrorKind::UnexpectedStatus,
            message: "poll loop ended on a non-terminal outcome".to_string(),
        },
    }
}
