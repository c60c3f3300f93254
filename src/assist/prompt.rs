use serde::{Deserialize, Serialize};

use crate::http::client::Transport;
use crate::http::error::TransportError;
use crate::http::request::Request;
use crate::presets::model::PresetSnapshot;

pub const EXPAND_ENDPOINT: &str = "/prompt/expand";

#[derive(Debug, Serialize)]
struct ExpandRequest<'a> {
    prompt: &'a str,
    style: &'a str,
    include_quality: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct ExpandResponse {
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    negative_suggestion: String,
}

/// Prompt-expansion panel of the assist overlay.
#[derive(Debug, Clone)]
pub struct PromptPanel {
    pub input: String,
    /// Selected style key; empty means "let the server detect it"
    pub style: String,
    pub include_quality: bool,
    pub output: String,
    pub negative_output: String,
    quality_chips: Vec<String>,
    style_options: Vec<(String, String)>,
    negative_default: String,
}

impl Default for PromptPanel {
    fn default() -> Self {
        Self {
            input: String::new(),
            style: String::new(),
            include_quality: true,
            output: String::new(),
            negative_output: String::new(),
            quality_chips: Vec::new(),
            style_options: vec![auto_style_option()],
            negative_default: String::new(),
        }
    }
}

fn auto_style_option() -> (String, String) {
    (String::new(), "Style (auto-detect)".to_string())
}

impl PromptPanel {
    pub fn quality_chips(&self) -> &[String] {
        &self.quality_chips
    }

    pub fn style_options(&self) -> &[(String, String)] {
        &self.style_options
    }

    pub fn negative_default(&self) -> &str {
        &self.negative_default
    }

    pub fn apply_presets(&mut self, presets: &PresetSnapshot) {
        self.quality_chips = presets.quality.clone();
        self.negative_default = presets.negative_default.clone();
        self.style_options = std::iter::once(auto_style_option())
            .chain(presets.style_options())
            .collect();
    }

    /// Append a tag to the input, comma-separated.
    pub fn add_to_prompt(&mut self, tag: &str) {
        if self.input.is_empty() {
            self.input = tag.to_string();
        } else {
            self.input = format!("{}, {}", self.input, tag);
        }
    }

    /// Click on the quality chip at `index`.
    pub fn click_chip(&mut self, index: usize) -> bool {
        match self.quality_chips.get(index).cloned() {
            Some(tag) => {
                self.add_to_prompt(&tag);
                true
            }
            None => false,
        }
    }

    /// Send the input for expansion. Failures land in the output field as
    /// an apology; nothing propagates.
    pub fn expand(&mut self, transport: &dyn Transport) -> bool {
        let response = Request::json(
            EXPAND_ENDPOINT,
            &ExpandRequest {
                prompt: &self.input,
                style: &self.style,
                include_quality: if self.include_quality { "1" } else { "0" },
            },
        )
        .and_then(|request| transport.send(&request, None))
        .and_then(|value| {
            serde_json::from_value::<ExpandResponse>(value).map_err(|e| TransportError::Malformed {
                body: String::new(),
                reason: e.to_string(),
            })
        });

        match response {
            Ok(expanded) => {
                self.output = expanded.prompt;
                self.negative_output = expanded.negative_suggestion;
                true
            }
            Err(e) => {
                self.output = format!("Could not expand prompt: {}", describe(&e));
                false
            }
        }
    }
}

/// Server failures show the raw response text.
pub(crate) fn describe(error: &TransportError) -> String {
    match error {
        TransportError::Server { body, .. } => body.clone(),
        other => other.to_string(),
    }
}
