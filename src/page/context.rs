use crate::notify::toast::ToastQueue;
use crate::render::result::PreviewOverlay;
use crate::trace::logger::TraceLogger;
use crate::workflow::gate::WorkflowGate;

/// Page-wide collaborators shared by every form orchestrator.
#[derive(Debug, Default)]
pub struct PageContext {
    pub gate: WorkflowGate,
    pub toasts: ToastQueue,
    pub overlay: PreviewOverlay,
    pub trace: TraceLogger,
}

impl PageContext {
    pub fn new(trace: TraceLogger) -> Self {
        Self {
            trace,
            ..Self::default()
        }
    }
}
