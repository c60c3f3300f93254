use std::collections::BTreeMap;

use crate::form::input::{DropTarget, FileInput, Preview};
use crate::http::progress::ProgressHandle;
use crate::http::request::{FileRef, FormPayload};
use crate::notify::status::InlineStatus;
use crate::presets::model::ConfigSnapshot;
use crate::render::result::ResultContainer;
use crate::workflow::catalogue::{ResultKind, Workflow};

/// Upload progress bar. Hidden until the first submission.
#[derive(Debug, Clone, Default)]
pub struct ProgressIndicator {
    handle: ProgressHandle,
    visible: bool,
}

impl ProgressIndicator {
    pub fn handle(&self) -> &ProgressHandle {
        &self.handle
    }

    pub fn percent(&self) -> u8 {
        self.handle.percent()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn show_reset(&mut self) {
        self.handle.reset();
        self.visible = true;
    }
}

/// Typed binding to one form's own controls, built once when the page is
/// ready. Nothing outside the owning orchestrator touches these.
#[derive(Debug, Clone)]
pub struct FormView {
    form_id: String,
    submit_enabled: bool,
    status: InlineStatus,
    progress: Option<ProgressIndicator>,
    inputs: Vec<FileInput>,
    fields: BTreeMap<String, String>,
    choices: BTreeMap<String, Vec<String>>,
    result: Option<ResultContainer>,
}

impl FormView {
    pub fn bind(workflow: Workflow) -> Self {
        let fields = workflow
            .fields()
            .iter()
            .map(|name| (name.to_string(), String::new()))
            .collect();

        let result = match workflow.result_kind() {
            ResultKind::None => None,
            _ => Some(ResultContainer::new(&format!("{}-result", workflow.form_id()))),
        };

        Self {
            form_id: workflow.form_id().to_string(),
            submit_enabled: true,
            status: InlineStatus::Idle,
            progress: workflow.has_progress().then(ProgressIndicator::default),
            inputs: workflow.file_slots().iter().map(|s| FileInput::new(s)).collect(),
            fields,
            choices: BTreeMap::new(),
            result,
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    // ---- submit control ----

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub(crate) fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    // ---- inline status ----

    pub fn status(&self) -> &InlineStatus {
        &self.status
    }

    pub(crate) fn set_status(&mut self, status: InlineStatus) {
        self.status = status;
    }

    // ---- progress ----

    pub fn progress(&self) -> Option<&ProgressIndicator> {
        self.progress.as_ref()
    }

    /// Show and zero the progress bar; returns the handle the transport
    /// should report into.
    pub(crate) fn start_progress(&mut self) -> Option<ProgressHandle> {
        let indicator = self.progress.as_mut()?;
        indicator.show_reset();
        Some(indicator.handle.clone())
    }

    /// Replace the progress handle, e.g. with one carrying a listener.
    pub fn set_progress_handle(&mut self, handle: ProgressHandle) {
        if let Some(indicator) = self.progress.as_mut() {
            indicator.handle = handle;
        }
    }

    // ---- text fields ----

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    /// Set a known field. Unknown names are rejected so typos surface.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn choices(&self, field: &str) -> &[String] {
        self.choices.get(field).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// Populate the model dropdowns. A value the user already picked is kept.
    pub fn apply_config(&mut self, config: &ConfigSnapshot) {
        self.fill_dropdown("ckpt_name", &config.ckpt_choices, config.default_ckpt());
        self.fill_dropdown("vae_name", &config.vae_choices, config.default_vae());
    }

    fn fill_dropdown(&mut self, field: &str, options: &[String], default: Option<&str>) {
        let Some(current) = self.fields.get_mut(field) else {
            return;
        };
        if current.is_empty() {
            if let Some(default) = default {
                *current = default.to_string();
            }
        }
        self.choices.insert(field.to_string(), options.to_vec());
    }

    // ---- file inputs ----

    pub fn input(&self, slot: &str) -> Option<&FileInput> {
        self.inputs.iter().find(|i| i.slot() == slot)
    }

    pub fn file(&self, slot: &str) -> Option<&FileRef> {
        self.input(slot).and_then(|i| i.file())
    }

    pub fn preview(&self, slot: &str) -> Option<&Preview> {
        self.input(slot).and_then(|i| i.preview())
    }

    pub fn select_files(&mut self, slot: &str, files: Vec<FileRef>) -> bool {
        match self.inputs.iter_mut().find(|i| i.slot() == slot) {
            Some(input) => input.select(files),
            None => false,
        }
    }

    /// Drop onto the form surface: the first file goes to the form's
    /// primary input through the same path as a manual selection. Drops
    /// outside the form boundary are ignored.
    pub fn drop_files(&mut self, target: DropTarget, files: Vec<FileRef>) -> bool {
        if target != DropTarget::Form {
            return false;
        }
        let Some(primary) = self.inputs.first_mut() else {
            return false;
        };
        primary.select(files)
    }

    // ---- result ----

    pub fn result(&self) -> Option<&ResultContainer> {
        self.result.as_ref()
    }

    pub(crate) fn result_mut(&mut self) -> Option<&mut ResultContainer> {
        self.result.as_mut()
    }

    // ---- submission ----

    /// Snapshot the form into a multipart body. Empty text fields and
    /// empty file slots are left out.
    pub fn payload(&self) -> FormPayload {
        let fields = self
            .fields
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .collect();

        let files = self
            .inputs
            .iter()
            .filter_map(|i| i.file().map(|f| (i.slot().to_string(), f.clone())))
            .collect();

        FormPayload { fields, files }
    }
}
