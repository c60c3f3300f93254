use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http::error::TransportError;
use crate::notify::status::ErrorPayload;
use crate::workflow::gate::GateName;

/// Successful completion body: `{message, download}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub download: Option<String>,
}

/// Why a submit action did not produce a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRefusal {
    /// A submission from this form is already in flight
    Busy,
    /// The prerequisite step has not succeeded yet
    GateViolation(GateName),
}

impl fmt::Display for SubmitRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitRefusal::Busy => write!(f, "A submission is already in progress"),
            SubmitRefusal::GateViolation(gate) => write!(f, "{}", gate.blocked_notice()),
        }
    }
}

impl std::error::Error for SubmitRefusal {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    GateViolation,
    TransportFailure,
    ServerRejection,
    MalformedResponse,
}

impl FailureKind {
    pub fn classify(error: &TransportError) -> Self {
        match error {
            TransportError::Server { .. } => FailureKind::ServerRejection,
            TransportError::Malformed { .. } => FailureKind::MalformedResponse,
            TransportError::Network(_)
            | TransportError::InvalidEndpoint { .. }
            | TransportError::InvalidBody(_) => FailureKind::TransportFailure,
        }
    }

    /// Malformed responses are shown like connection problems.
    pub fn displays_as_transport(&self) -> bool {
        matches!(
            self,
            FailureKind::TransportFailure | FailureKind::MalformedResponse
        )
    }
}

pub const NETWORK_ERROR_NOTICE: &str = "Network error, please try again later";

/// Convert a transport failure into what the form displays.
pub fn failure_payload(error: &TransportError) -> (FailureKind, ErrorPayload) {
    let kind = FailureKind::classify(error);
    let payload = match error {
        TransportError::Server { body, .. } => ErrorPayload::from_body(body),
        other => ErrorPayload::text(format!("{} ({})", NETWORK_ERROR_NOTICE, other)),
    };
    (kind, payload)
}

/// Terminal result of one submit action.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// No request was sent
    Refused(SubmitRefusal),
    Succeeded(CompletionPayload),
    Failed {
        kind: FailureKind,
        payload: ErrorPayload,
    },
    /// Settle arrived for a submission that is no longer current; the view
    /// was left alone
    Stale,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmitOutcome::Refused(SubmitRefusal::Busy) => "refused_busy",
            SubmitOutcome::Refused(SubmitRefusal::GateViolation(_)) => "refused_gate",
            SubmitOutcome::Succeeded(_) => "success",
            SubmitOutcome::Failed { .. } => "error",
            SubmitOutcome::Stale => "stale",
        }
    }
}
