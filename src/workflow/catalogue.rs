use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::workflow::gate::GateName;

/// What a successful submission mounts in the form's result container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultKind {
    None,
    Image,
    Video,
}

/// The six workflow forms and their endpoint contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Workflow {
    PersonUpload,
    GarmentUpload,
    TextToImage,
    ImageToImage,
    Inpaint,
    ImageToVideo,
}

pub const IMG2VID_MOTIONS: &[&str] = &[
    "zoom_in",
    "zoom_out",
    "pan_left",
    "pan_right",
    "pan_up",
    "pan_down",
];

impl Workflow {
    pub const ALL: [Workflow; 6] = [
        Workflow::PersonUpload,
        Workflow::GarmentUpload,
        Workflow::TextToImage,
        Workflow::ImageToImage,
        Workflow::Inpaint,
        Workflow::ImageToVideo,
    ];

    pub fn form_id(&self) -> &'static str {
        match self {
            Workflow::PersonUpload => "form1",
            Workflow::GarmentUpload => "form2",
            Workflow::TextToImage => "text2image",
            Workflow::ImageToImage => "img2img",
            Workflow::Inpaint => "inpaint",
            Workflow::ImageToVideo => "img2vid",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Workflow::PersonUpload => "/upload1",
            Workflow::GarmentUpload => "/upload2",
            Workflow::TextToImage => "/text2image",
            Workflow::ImageToImage => "/img2img",
            Workflow::Inpaint => "/inpaint",
            Workflow::ImageToVideo => "/img2vid",
        }
    }

    /// Multipart file part names, in submission order.
    pub fn file_slots(&self) -> &'static [&'static str] {
        match self {
            Workflow::TextToImage => &[],
            Workflow::Inpaint => &["image", "mask"],
            _ => &["image"],
        }
    }

    /// Text fields the form carries. Empty values are not sent.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Workflow::PersonUpload | Workflow::GarmentUpload => &[],
            Workflow::TextToImage => &[
                "prompt",
                "negative",
                "width",
                "height",
                "seed",
                "steps",
                "cfg",
                "sampler_name",
                "scheduler",
                "ckpt_name",
                "vae_name",
            ],
            Workflow::ImageToImage => &[
                "prompt",
                "negative",
                "seed",
                "steps",
                "cfg",
                "denoise",
                "ckpt_name",
                "vae_name",
            ],
            Workflow::Inpaint => &["prompt", "negative"],
            Workflow::ImageToVideo => &["duration", "fps", "motion", "width", "height"],
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields().contains(&name)
    }

    /// Gate that must be open before this form may submit.
    pub fn requires(&self) -> Option<GateName> {
        match self {
            Workflow::GarmentUpload => Some(GateName::PersonImageUploaded),
            _ => None,
        }
    }

    /// Gate opened by this form's successful submission.
    pub fn unlocks(&self) -> Option<GateName> {
        match self {
            Workflow::PersonUpload => Some(GateName::PersonImageUploaded),
            _ => None,
        }
    }

    pub fn result_kind(&self) -> ResultKind {
        match self {
            Workflow::PersonUpload => ResultKind::None,
            Workflow::ImageToVideo => ResultKind::Video,
            _ => ResultKind::Image,
        }
    }

    pub fn result_title(&self) -> &'static str {
        match self {
            Workflow::ImageToVideo => "Latest video",
            _ => "Latest result",
        }
    }

    pub fn busy_message(&self) -> &'static str {
        match self {
            Workflow::PersonUpload => "Uploading...",
            Workflow::GarmentUpload => "Compositing...",
            Workflow::ImageToVideo => "Rendering video...",
            _ => "Generating...",
        }
    }

    /// Forms with file inputs show an upload progress bar.
    pub fn has_progress(&self) -> bool {
        !self.file_slots().is_empty()
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_id())
    }
}

impl FromStr for Workflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Workflow::ALL
            .iter()
            .copied()
            .find(|w| w.form_id() == s || w.endpoint().trim_start_matches('/') == s)
            .ok_or_else(|| format!("unknown workflow '{}'", s))
    }
}
