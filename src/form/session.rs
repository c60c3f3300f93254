use serde::Serialize;

use crate::notify::status::ErrorPayload;
use crate::workflow::catalogue::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormPhase {
    Idle,
    Validating,
    Submitting { ticket: u64 },
}

/// Per-form submission state. Lives for the whole page; each submission
/// reuses it.
#[derive(Debug, Clone)]
pub struct FormSession {
    pub form_id: String,
    pub endpoint: String,
    phase: FormPhase,
    next_ticket: u64,
    last_error: Option<ErrorPayload>,
    submissions: u64,
}

impl FormSession {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            form_id: workflow.form_id().to_string(),
            endpoint: workflow.endpoint().to_string(),
            phase: FormPhase::Idle,
            next_ticket: 1,
            last_error: None,
            submissions: 0,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, FormPhase::Submitting { .. })
    }

    pub fn in_flight(&self) -> Option<u64> {
        match self.phase {
            FormPhase::Submitting { ticket } => Some(ticket),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&ErrorPayload> {
        self.last_error.as_ref()
    }

    /// Requests actually handed to the transport.
    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    pub(crate) fn validate(&mut self) {
        self.phase = FormPhase::Validating;
    }

    /// Validation refused the submission; back to idle with nothing sent.
    pub(crate) fn refuse(&mut self) {
        self.phase = FormPhase::Idle;
    }

    pub(crate) fn start(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.submissions += 1;
        self.phase = FormPhase::Submitting { ticket };
        ticket
    }

    /// Whether `ticket` is the submission currently in flight.
    pub fn owns(&self, ticket: u64) -> bool {
        self.in_flight() == Some(ticket)
    }

    /// Settle: always returns to idle.
    pub(crate) fn finish(&mut self, error: Option<ErrorPayload>) {
        self.phase = FormPhase::Idle;
        self.last_error = error;
    }
}
