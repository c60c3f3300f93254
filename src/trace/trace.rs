use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::form::session::FormPhase;

/// One line of the submission trace.
#[derive(Debug, Serialize)]
pub struct SubmissionEvent {
    pub timestamp_ms: u128,
    pub form_id: String,
    pub event: String,
    pub phase: String,

    pub ticket: Option<u64>,
    pub endpoint: Option<String>,
    pub outcome: Option<String>,
    pub detail: Option<String>,
    pub files: Vec<String>,
}

impl SubmissionEvent {
    pub fn now(form_id: &str, event: &str, phase: FormPhase) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            form_id: form_id.to_string(),
            event: event.to_string(),
            phase: format!("{:?}", phase),
            ticket: None,
            endpoint: None,
            outcome: None,
            detail: None,
            files: vec![],
        }
    }

    pub fn with_ticket(mut self, ticket: u64) -> Self {
        self.ticket = Some(ticket);
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    /// `slot=name@sha1` entries for each uploaded file.
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }
}
