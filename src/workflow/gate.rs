use std::collections::BTreeSet;

use serde::Serialize;

/// Named cross-form prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GateName {
    /// The server holds a person image for this session
    PersonImageUploaded,
}

impl GateName {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateName::PersonImageUploaded => "personImageUploaded",
        }
    }

    /// Notice shown when a submission is refused because this gate is closed.
    pub fn blocked_notice(&self) -> &'static str {
        match self {
            GateName::PersonImageUploaded => "Please upload the person image first",
        }
    }
}

/// Process-wide gate flags. Flags only ever go from closed to open; nothing
/// within a page session closes them again.
#[derive(Debug, Default, Clone)]
pub struct WorkflowGate {
    open: BTreeSet<GateName>,
}

impl WorkflowGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, name: GateName) -> bool {
        self.open.contains(&name)
    }

    /// Open a gate. Returns true only on the closed → open transition.
    pub fn set(&mut self, name: GateName) -> bool {
        let opened = self.open.insert(name);
        if opened {
            log::info!("gate {} opened", name.as_str());
        }
        opened
    }
}
