use crate::assist::chat::ChatPanel;
use crate::assist::prompt::PromptPanel;
use crate::presets::model::PresetSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistTab {
    #[default]
    Prompt,
    Chat,
}

/// Floating assistant widget. Independent of forms and gates.
#[derive(Debug, Clone, Default)]
pub struct AssistOverlay {
    visible: bool,
    tab: AssistTab,
    pub prompt: PromptPanel,
    pub chat: ChatPanel,
}

impl AssistOverlay {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn tab(&self) -> AssistTab {
        self.tab
    }

    pub fn switch_tab(&mut self, tab: AssistTab) {
        self.tab = tab;
    }

    pub fn apply_presets(&mut self, presets: &PresetSnapshot) {
        self.prompt.apply_presets(presets);
    }
}
