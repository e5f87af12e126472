mod classify;
mod document;
mod poller;
mod session;

pub use classify::{ErrorKind, FetchOutcome, PollOutcome, classify};
pub use document::{DocumentSection, GeneratedDocument, MalformedResult, normalize};
pub use poller::{CancelToken, JobPoller, PollRun, PollerOptions, StatusFetch};
pub use session::{GenerationSession, JobHandle, SessionState};
