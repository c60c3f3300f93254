use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Model choices from `/models/options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub ckpt_choices: Vec<String>,
    #[serde(default)]
    pub vae_choices: Vec<String>,
    #[serde(default)]
    pub recommended_ckpt: Option<String>,
    #[serde(default)]
    pub recommended_vae: Option<String>,
    #[serde(default)]
    pub selected_ckpt: Option<String>,
    #[serde(default)]
    pub selected_vae: Option<String>,
}

impl ConfigSnapshot {
    /// Default checkpoint: the server's selection, else its recommendation,
    /// else the first choice.
    pub fn default_ckpt(&self) -> Option<&str> {
        pick_default(&self.selected_ckpt, &self.recommended_ckpt, &self.ckpt_choices)
    }

    pub fn default_vae(&self) -> Option<&str> {
        pick_default(&self.selected_vae, &self.recommended_vae, &self.vae_choices)
    }
}

fn pick_default<'a>(
    selected: &'a Option<String>,
    recommended: &'a Option<String>,
    choices: &'a [String],
) -> Option<&'a str> {
    selected
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(recommended.as_deref().filter(|s| !s.is_empty()))
        .or(choices.first().map(|s| s.as_str()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePreset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub positive: Vec<String>,
}

/// Prompt presets from `/prompt/presets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetSnapshot {
    #[serde(default)]
    pub quality: Vec<String>,
    #[serde(default)]
    pub negative_default: String,
    #[serde(default)]
    pub styles: BTreeMap<String, StylePreset>,
}

impl PresetSnapshot {
    /// `(key, display name)` pairs; a style without a name shows its key.
    pub fn style_options(&self) -> Vec<(String, String)> {
        self.styles
            .iter()
            .map(|(key, style)| {
                let name = if style.name.is_empty() {
                    key.clone()
                } else {
                    style.name.clone()
                };
                (key.clone(), name)
            })
            .collect()
    }
}
