use serde_json::Value;

use crate::form::outcome::{
    CompletionPayload, FailureKind, NETWORK_ERROR_NOTICE, SubmitOutcome, SubmitRefusal,
    failure_payload,
};
use crate::form::session::FormSession;
use crate::form::view::FormView;
use crate::http::client::Transport;
use crate::http::error::TransportError;
use crate::http::progress::ProgressHandle;
use crate::http::request::Request;
use crate::notify::status::{ErrorPayload, InlineStatus};
use crate::notify::toast::Severity;
use crate::page::context::PageContext;
use crate::render::result::{render_image, render_video};
use crate::trace::trace::SubmissionEvent;
use crate::workflow::catalogue::{ResultKind, Workflow};

/// A request that left the form and has not settled yet.
#[derive(Debug, Clone)]
pub struct Submission {
    pub workflow: Workflow,
    pub ticket: u64,
    pub request: Request,
    pub progress: Option<ProgressHandle>,
}

/// Controller for one workflow form: gating, busy state, progress,
/// settle handling and result rendering.
///
/// `begin` and `settle` are split so an event loop can keep several forms
/// in flight at once; `submit` runs both around a blocking transport call.
#[derive(Debug, Clone)]
pub struct FormOrchestrator {
    workflow: Workflow,
    session: FormSession,
    view: FormView,
}

impl FormOrchestrator {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            session: FormSession::new(workflow),
            view: FormView::bind(workflow),
        }
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut FormView {
        &mut self.view
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    pub fn progress_percent(&self) -> u8 {
        self.view.progress().map(|p| p.percent()).unwrap_or(0)
    }

    /// Idle → Validating → Submitting, or back to Idle when refused.
    pub fn begin(&mut self, ctx: &mut PageContext) -> Result<Submission, SubmitRefusal> {
        let form_id = self.workflow.form_id();

        // The disabled submit control swallows the click.
        if self.session.is_busy() || !self.view.submit_enabled() {
            ctx.trace.log(
                &SubmissionEvent::now(form_id, "refused", self.session.phase())
                    .with_outcome("busy"),
            );
            return Err(SubmitRefusal::Busy);
        }

        self.session.validate();

        if let Some(gate) = self.workflow.requires() {
            if !ctx.gate.check(gate) {
                self.session.refuse();
                ctx.toasts.toast(gate.blocked_notice(), Severity::Warning);
                ctx.trace.log(
                    &SubmissionEvent::now(form_id, "refused", self.session.phase())
                        .with_outcome("gate_violation")
                        .with_detail(gate.as_str()),
                );
                log::info!("{}: blocked by gate {}", form_id, gate.as_str());
                return Err(SubmitRefusal::GateViolation(gate));
            }
        }

        let payload = self.view.payload();
        let files = payload
            .files
            .iter()
            .map(|(slot, f)| format!("{}={}@{}", slot, f.name, f.digest()))
            .collect();
        let request = Request::multipart(self.workflow.endpoint(), payload);

        let ticket = self.session.start();
        self.view.set_submit_enabled(false);
        self.view
            .set_status(InlineStatus::Busy(self.workflow.busy_message().to_string()));
        let progress = self.view.start_progress();

        ctx.trace.log(
            &SubmissionEvent::now(form_id, "begin", self.session.phase())
                .with_ticket(ticket)
                .with_endpoint(self.workflow.endpoint())
                .with_files(files),
        );
        log::debug!("{}: submitting ticket {}", form_id, ticket);

        Ok(Submission {
            workflow: self.workflow,
            ticket,
            request,
            progress,
        })
    }

    /// Submitting → Settled → Idle.
    ///
    /// A settle for a ticket that is not the one in flight (duplicate
    /// completion, or a submission this form no longer tracks) is dropped
    /// without touching the view.
    pub fn settle(
        &mut self,
        ticket: u64,
        result: Result<Value, TransportError>,
        ctx: &mut PageContext,
    ) -> SubmitOutcome {
        let form_id = self.workflow.form_id();

        if !self.session.owns(ticket) {
            log::warn!("{}: dropping stale settle for ticket {}", form_id, ticket);
            ctx.trace.log(
                &SubmissionEvent::now(form_id, "stale_settle", self.session.phase())
                    .with_ticket(ticket),
            );
            return SubmitOutcome::Stale;
        }

        let decoded = result
            .map_err(|e| failure_payload(&e))
            .and_then(|value| self.decode_completion(value));

        self.view.set_submit_enabled(true);

        let outcome = match decoded {
            Ok(done) => {
                self.session.finish(None);
                let message = if done.message.is_empty() {
                    "Done".to_string()
                } else {
                    done.message.clone()
                };
                self.view.set_status(InlineStatus::Success(message.clone()));
                self.on_success(&done, ctx);
                ctx.toasts.toast(&message, Severity::Success);
                SubmitOutcome::Succeeded(done)
            }
            Err((kind, payload)) => {
                self.session.finish(Some(payload.clone()));
                self.view.set_status(InlineStatus::Error(payload.clone()));
                let notice = if kind.displays_as_transport() {
                    NETWORK_ERROR_NOTICE.to_string()
                } else {
                    payload.summary()
                };
                ctx.toasts.toast(&notice, Severity::Error);
                log::info!("{}: {:?}: {}", form_id, kind, payload.summary());
                SubmitOutcome::Failed { kind, payload }
            }
        };

        let mut event = SubmissionEvent::now(form_id, "settled", self.session.phase())
            .with_ticket(ticket)
            .with_endpoint(self.workflow.endpoint())
            .with_outcome(outcome.label());
        if let SubmitOutcome::Failed { payload, .. } = &outcome {
            event = event.with_detail(payload.summary());
        }
        ctx.trace.log(&event);

        outcome
    }

    /// begin + blocking send + settle. A refused submit sends nothing.
    pub fn submit(&mut self, ctx: &mut PageContext, transport: &dyn Transport) -> SubmitOutcome {
        let submission = match self.begin(ctx) {
            Ok(s) => s,
            Err(refusal) => return SubmitOutcome::Refused(refusal),
        };
        let result = transport.send(&submission.request, submission.progress.as_ref());
        self.settle(submission.ticket, result, ctx)
    }

    fn decode_completion(&self, value: Value) -> Result<CompletionPayload, (FailureKind, ErrorPayload)> {
        let malformed = |reason: String| {
            (
                FailureKind::MalformedResponse,
                ErrorPayload::text(format!("{} (unexpected response: {})", NETWORK_ERROR_NOTICE, reason)),
            )
        };

        let done: CompletionPayload =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;

        let needs_download = self.workflow.result_kind() != ResultKind::None;
        let has_download = done.download.as_deref().is_some_and(|d| !d.is_empty());
        if needs_download && !has_download {
            return Err(malformed("missing download URL".to_string()));
        }
        Ok(done)
    }

    /// Workflow-specific continuation: open the gate this form unlocks
    /// and mount the result card.
    fn on_success(&mut self, done: &CompletionPayload, ctx: &mut PageContext) {
        if let Some(gate) = self.workflow.unlocks() {
            ctx.gate.set(gate);
        }

        let (Some(url), Some(container)) = (done.download.as_deref(), self.view.result_mut()) else {
            return;
        };
        let title = self.workflow.result_title();
        match self.workflow.result_kind() {
            ResultKind::Image => render_image(container, title, url),
            ResultKind::Video => render_video(container, title, url),
            ResultKind::None => {}
        }
    }
}
