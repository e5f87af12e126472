use std::fmt;

use serde_json::Value;

/// Raw result of one status fetch against the backend, before classification.
///
/// Produced by whatever implements the fetch capability (the real HTTP client
/// or a test fake). Infallible: transport problems are data here, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The request reached the server and an HTTP response came back.
    Response { status: u16, body: Option<Value> },
    /// The request never reached the server (DNS, refused connection, timeout).
    TransportFailure { message: String },
}

/// Terminal failure categories surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    NetworkUnreachable,
    NotFound,
    Unauthorized,
    UnexpectedStatus,
    ServerError,
    Timeout,
    MalformedResult,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NetworkUnreachable => write!(f, "NETWORK_UNREACHABLE"),
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorKind::UnexpectedStatus => write!(f, "UNEXPECTED_STATUS"),
            ErrorKind::ServerError => write!(f, "SERVER_ERROR"),
            ErrorKind::Timeout => write!(f, "TIMEOUT"),
            ErrorKind::MalformedResult => write!(f, "MALFORMED_RESULT"),
        }
    }
}

/// Classified result of one poll attempt.
///
/// `StillProcessing` and `RetryableConflict` are the only non-terminal
/// variants; everything else ends the polling loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job finished and the body carries the result payload.
    Succeeded { payload: Value },
    /// The job exists and is still running.
    StillProcessing,
    /// The job was accepted but has not materialized yet (HTTP 409).
    RetryableConflict,
    /// The job cannot complete; polling must stop.
    Fatal { kind: ErrorKind, message: String },
}

impl PollOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            PollOutcome::StillProcessing | PollOutcome::RetryableConflict
        )
    }
}

/// Map a raw fetch outcome to exactly one `PollOutcome`.
///
/// Total and pure: every input lands in one row of the decision table and the
/// same input always yields the same variant. The backend does not distinguish
/// "job not yet created" (409) from "job still running" (200 + PROCESSING), so
/// both classify as non-terminal and the loop keeps waiting.
pub fn classify(outcome: &FetchOutcome) -> PollOutcome {
    let (status, body) = match outcome {
        FetchOutcome::TransportFailure { message } => {
            return PollOutcome::Fatal {
                kind: ErrorKind::NetworkUnreachable,
                message: message.clone(),
            };
        }
        FetchOutcome::Response { status, body } => (*status, body.as_ref()),
    };

    match status {
        409 => PollOutcome::RetryableConflict,
        404 => PollOutcome::Fatal {
            kind: ErrorKind::NotFound,
            message: body_message(body).unwrap_or_else(|| "cover letter not found".to_string()),
        },
        401 | 403 => PollOutcome::Fatal {
            kind: ErrorKind::Unauthorized,
            message: body_message(body).unwrap_or_else(|| "sign-in required".to_string()),
        },
        200..=299 => match body_status(body) {
            Some("PROCESSING") => PollOutcome::StillProcessing,
            Some("SUCCESS") => PollOutcome::Succeeded {
                // body_status returned Some, so a body is present.
                payload: body.cloned().unwrap_or(Value::Null),
            },
            _ => PollOutcome::Fatal {
                kind: ErrorKind::UnexpectedStatus,
                message: match body_status(body) {
                    Some(other) => format!("unrecognized generation status: {other}"),
                    None => "response carries no generation status".to_string(),
                },
            },
        },
        _ => PollOutcome::Fatal {
            kind: ErrorKind::ServerError,
            message: body_message(body).unwrap_or_else(|| format!("HTTP {status}")),
        },
    }
}

fn body_status(body: Option<&Value>) -> Option<&str> {
    body?.get("status")?.as_str()
}

fn body_message(body: Option<&Value>) -> Option<String> {
    Some(body?.get("message")?.as_str()?.to_string())
}
