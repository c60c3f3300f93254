use std::collections::BTreeMap;

use serde_json::Value;

use crate::assist::overlay::AssistOverlay;
use crate::form::orchestrator::{FormOrchestrator, Submission};
use crate::form::outcome::{SubmitOutcome, SubmitRefusal};
use crate::http::client::Transport;
use crate::http::error::TransportError;
use crate::notify::status::InlineStatus;
use crate::page::context::PageContext;
use crate::presets::loader::PresetLoader;
use crate::trace::logger::TraceLogger;
use crate::workflow::catalogue::Workflow;

/// What `boot` managed to load. Either half may be missing independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootReport {
    pub config_loaded: bool,
    pub presets_loaded: bool,
}

/// One loaded page: the forms present on it, their shared collaborators,
/// the snapshot cache and the assist overlay.
#[derive(Debug)]
pub struct Page {
    pub ctx: PageContext,
    pub loader: PresetLoader,
    pub assist: AssistOverlay,
    forms: BTreeMap<Workflow, FormOrchestrator>,
}

impl Page {
    /// Page-ready: bind an orchestrator for each form element present.
    pub fn ready(forms: &[Workflow], trace: TraceLogger) -> Self {
        Self {
            ctx: PageContext::new(trace),
            loader: PresetLoader::new(),
            assist: AssistOverlay::default(),
            forms: forms
                .iter()
                .map(|w| (*w, FormOrchestrator::new(*w)))
                .collect(),
        }
    }

    /// Every workflow form on one page.
    pub fn full(trace: TraceLogger) -> Self {
        Self::ready(&Workflow::ALL, trace)
    }

    /// Eager snapshot loading. Config and presets are fetched independently;
    /// a failure in one leaves the other unaffected and nothing is shown
    /// to the user.
    pub fn boot(&mut self, transport: &dyn Transport) -> BootReport {
        let mut report = BootReport::default();

        if let Some(config) = self.loader.load_config(transport) {
            for form in self.forms.values_mut() {
                form.view_mut().apply_config(&config);
            }
            report.config_loaded = true;
        }

        if let Some(presets) = self.loader.load_presets(transport) {
            self.assist.apply_presets(&presets);
            report.presets_loaded = true;
        }

        log::debug!(
            "page boot: config={} presets={}",
            report.config_loaded,
            report.presets_loaded
        );
        report
    }

    pub fn form(&self, workflow: Workflow) -> Option<&FormOrchestrator> {
        self.forms.get(&workflow)
    }

    pub fn form_mut(&mut self, workflow: Workflow) -> Option<&mut FormOrchestrator> {
        self.forms.get_mut(&workflow)
    }

    pub fn forms(&self) -> impl Iterator<Item = &FormOrchestrator> {
        self.forms.values()
    }

    /// `None` when the page has no such form.
    pub fn submit(&mut self, workflow: Workflow, transport: &dyn Transport) -> Option<SubmitOutcome> {
        let form = self.forms.get_mut(&workflow)?;
        Some(form.submit(&mut self.ctx, transport))
    }

    pub fn begin(&mut self, workflow: Workflow) -> Option<Result<Submission, SubmitRefusal>> {
        let form = self.forms.get_mut(&workflow)?;
        Some(form.begin(&mut self.ctx))
    }

    pub fn settle(
        &mut self,
        workflow: Workflow,
        ticket: u64,
        result: Result<Value, TransportError>,
    ) -> Option<SubmitOutcome> {
        let form = self.forms.get_mut(&workflow)?;
        Some(form.settle(ticket, result, &mut self.ctx))
    }

    /// Set a form's status line directly. `false` when the page has no
    /// such form.
    pub fn set_inline_status(&mut self, workflow: Workflow, status: InlineStatus) -> bool {
        match self.forms.get_mut(&workflow) {
            Some(form) => {
                form.view_mut().set_status(status);
                true
            }
            None => false,
        }
    }

    /// "Fill negative defaults" action: lazily loads presets and fills the
    /// form's empty `negative` field. Returns whether the field was filled.
    pub fn fill_negative_default(&mut self, workflow: Workflow, transport: &dyn Transport) -> bool {
        let Some(presets) = self.loader.load_presets(transport) else {
            return false;
        };
        if presets.negative_default.is_empty() {
            return false;
        }
        let Some(form) = self.forms.get_mut(&workflow) else {
            return false;
        };
        let view = form.view_mut();
        match view.field("negative") {
            Some(current) if current.trim().is_empty() => {
                view.set_field("negative", &presets.negative_default)
            }
            _ => false,
        }
    }

    /// Click on a form's result card; opens the shared preview overlay for
    /// image results.
    pub fn click_result(&mut self, workflow: Workflow) -> bool {
        let Some(container) = self.forms.get(&workflow).and_then(|f| f.view().result()) else {
            return false;
        };
        container.click(&mut self.ctx.overlay)
    }
}
