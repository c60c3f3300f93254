use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::cli::preferences::Theme;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "tryon-studio",
    version,
    about = "Client for the virtual try-on and media generation service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base URL of the generation service
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to config file (default: tryon-studio.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append submission trace events (JSONL) to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

/// Prompt and sampler fields shared by the image generation commands.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Positive prompt
    #[arg(long)]
    pub prompt: String,

    /// Negative prompt
    #[arg(long)]
    pub negative: Option<String>,

    /// Fill an empty negative prompt from the server's preset default
    #[arg(long, default_value_t = false)]
    pub fill_negative: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub steps: Option<u32>,

    #[arg(long)]
    pub cfg: Option<f32>,

    /// Checkpoint name (default: the server's selected/recommended model)
    #[arg(long)]
    pub ckpt: Option<String>,

    /// VAE name (default: the server's selected/recommended VAE)
    #[arg(long)]
    pub vae: Option<String>,

    /// Write the result asset to this path
    #[arg(long)]
    pub save: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a person image, then composite a garment onto it
    TryOn {
        /// Person image file
        #[arg(long)]
        person: String,

        /// Garment image file
        #[arg(long)]
        garment: String,

        /// Write the composite to this path
        #[arg(long)]
        save: Option<String>,
    },

    /// Upload the person image only
    UploadPerson {
        #[arg(long)]
        image: String,
    },

    /// Generate an image from a prompt
    Text2image {
        #[command(flatten)]
        generation: GenerationArgs,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,

        #[arg(long)]
        sampler: Option<String>,

        #[arg(long)]
        scheduler: Option<String>,
    },

    /// Generate an image from an image and a prompt
    Img2img {
        #[arg(long)]
        image: String,

        #[command(flatten)]
        generation: GenerationArgs,

        /// Denoising strength (0.0 - 1.0)
        #[arg(long)]
        denoise: Option<f32>,
    },

    /// Repaint the masked area of an image
    Inpaint {
        #[arg(long)]
        image: String,

        #[arg(long)]
        mask: String,

        #[arg(long)]
        prompt: String,

        #[arg(long)]
        negative: Option<String>,

        #[arg(long, default_value_t = false)]
        fill_negative: bool,

        #[arg(long)]
        save: Option<String>,
    },

    /// Turn a still image into a short video clip
    Img2vid {
        #[arg(long)]
        image: String,

        /// Clip length in seconds
        #[arg(long)]
        duration: Option<f32>,

        #[arg(long)]
        fps: Option<u32>,

        /// zoom_in, zoom_out, pan_left, pan_right, pan_up, pan_down
        #[arg(long)]
        motion: Option<String>,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,

        #[arg(long)]
        save: Option<String>,
    },

    /// Show model choices and prompt presets
    Presets,

    /// Expand a prompt with quality tags and a style
    Expand {
        #[arg(long)]
        prompt: String,

        /// Style key (default: auto-detect)
        #[arg(long, default_value = "")]
        style: String,

        /// Do not add quality tags
        #[arg(long, default_value_t = false)]
        no_quality: bool,
    },

    /// Ask the site assistant; each message is one turn of the same chat
    Chat {
        #[arg(required = true)]
        messages: Vec<String>,

        /// Page path reported to the assistant
        #[arg(long, default_value = "/")]
        path: String,
    },

    /// Show or set the theme preference
    Theme {
        #[arg(value_enum)]
        value: Option<Theme>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `tryon-studio.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub generation: GenerationDefaults,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Generation requests block until the backend finishes
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    pub path: Option<String>,
}

/// Form values used when the command line leaves them out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationDefaults {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub steps: Option<u32>,
    pub cfg: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_prefs_path")]
    pub path: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_prefs_path(),
        }
    }
}

// Serde default helpers
fn default_base_url() -> String { "http://127.0.0.1:5000".to_string() }
fn default_timeout() -> u64 { 600 }
fn default_prefs_path() -> String { ".tryon-studio-prefs.yaml".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("tryon-studio.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Settings after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub base_url: String,
    pub timeout_secs: u64,
    pub trace_path: Option<String>,
    pub prefs_path: String,
    pub generation: GenerationDefaults,
    pub verbose: u8,
}

pub fn resolve(cli: &Cli, config: AppConfig) -> Resolved {
    Resolved {
        base_url: cli.base_url.clone().unwrap_or(config.server.base_url),
        timeout_secs: config.server.timeout_secs,
        trace_path: cli.trace.clone().or(config.trace.path),
        prefs_path: config.preferences.path,
        generation: config.generation,
        verbose: cli.verbose,
    }
}
