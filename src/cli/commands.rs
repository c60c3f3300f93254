use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::assist::overlay::AssistOverlay;
use crate::cli::config::{GenerationArgs, GenerationDefaults, Resolved};
use crate::cli::preferences::{Theme, load_preferences, save_preferences};
use crate::form::outcome::SubmitOutcome;
use crate::http::client::HttpTransport;
use crate::http::progress::ProgressHandle;
use crate::http::request::FileRef;
use crate::page::page::Page;
use crate::presets::loader::PresetLoader;
use crate::render::result::ResultCard;
use crate::trace::logger::TraceLogger;
use crate::workflow::catalogue::{IMG2VID_MOTIONS, Workflow};

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Resolved settings plus the transport every command talks through.
pub struct CommandContext {
    pub settings: Resolved,
    pub transport: HttpTransport,
}

impl CommandContext {
    pub fn new(settings: Resolved) -> CmdResult<Self> {
        let transport = HttpTransport::new(
            &settings.base_url,
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self {
            settings,
            transport,
        })
    }

    fn page(&self, forms: &[Workflow]) -> Page {
        let trace = match &self.settings.trace_path {
            Some(path) => TraceLogger::new(path),
            None => TraceLogger::disabled(),
        };
        let mut page = Page::ready(forms, trace);
        let report = page.boot(&self.transport);
        if self.settings.verbose > 1 {
            eprintln!(
                "Loaded model options: {}, prompt presets: {}",
                report.config_loaded, report.presets_loaded
            );
        }
        page
    }
}

// ============================================================================
// try-on / upload-person
// ============================================================================

pub fn cmd_try_on(ctx: &CommandContext, person: &str, garment: &str, save: Option<&str>) -> CmdResult<bool> {
    let mut page = ctx.page(&[Workflow::PersonUpload, Workflow::GarmentUpload]);

    select_file(&mut page, Workflow::PersonUpload, "image", person)?;
    run_form(ctx, &mut page, Workflow::PersonUpload)?;

    select_file(&mut page, Workflow::GarmentUpload, "image", garment)?;
    let outcome = run_form(ctx, &mut page, Workflow::GarmentUpload)?;

    finish(ctx, &page, Workflow::GarmentUpload, &outcome, save)
}

pub fn cmd_upload_person(ctx: &CommandContext, image: &str) -> CmdResult<bool> {
    let mut page = ctx.page(&[Workflow::PersonUpload]);
    select_file(&mut page, Workflow::PersonUpload, "image", image)?;
    let outcome = run_form(ctx, &mut page, Workflow::PersonUpload)?;
    Ok(outcome.is_success())
}

// ============================================================================
// generation forms
// ============================================================================

pub fn cmd_text2image(
    ctx: &CommandContext,
    generation: &GenerationArgs,
    width: Option<u32>,
    height: Option<u32>,
    sampler: Option<&str>,
    scheduler: Option<&str>,
) -> CmdResult<bool> {
    let wf = Workflow::TextToImage;
    let mut page = ctx.page(&[wf]);
    let defaults = &ctx.settings.generation;

    fill_generation(ctx, &mut page, wf, generation, defaults)?;
    let view = form_view(&mut page, wf)?;
    set_opt(view, "width", width.or(defaults.width))?;
    set_opt(view, "height", height.or(defaults.height))?;
    set_opt(view, "sampler_name", sampler)?;
    set_opt(view, "scheduler", scheduler)?;

    let outcome = run_form(ctx, &mut page, wf)?;
    finish(ctx, &page, wf, &outcome, generation.save.as_deref())
}

pub fn cmd_img2img(
    ctx: &CommandContext,
    image: &str,
    generation: &GenerationArgs,
    denoise: Option<f32>,
) -> CmdResult<bool> {
    let wf = Workflow::ImageToImage;
    let mut page = ctx.page(&[wf]);

    select_file(&mut page, wf, "image", image)?;
    fill_generation(ctx, &mut page, wf, generation, &ctx.settings.generation)?;
    set_opt(form_view(&mut page, wf)?, "denoise", denoise)?;

    let outcome = run_form(ctx, &mut page, wf)?;
    finish(ctx, &page, wf, &outcome, generation.save.as_deref())
}

pub fn cmd_inpaint(
    ctx: &CommandContext,
    image: &str,
    mask: &str,
    prompt: &str,
    negative: Option<&str>,
    fill_negative: bool,
    save: Option<&str>,
) -> CmdResult<bool> {
    let wf = Workflow::Inpaint;
    let mut page = ctx.page(&[wf]);

    select_file(&mut page, wf, "image", image)?;
    select_file(&mut page, wf, "mask", mask)?;
    let view = form_view(&mut page, wf)?;
    set_opt(view, "prompt", Some(prompt))?;
    set_opt(view, "negative", negative)?;
    if fill_negative {
        fill_negative_or_warn(ctx, &mut page, wf);
    }

    let outcome = run_form(ctx, &mut page, wf)?;
    finish(ctx, &page, wf, &outcome, save)
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_img2vid(
    ctx: &CommandContext,
    image: &str,
    duration: Option<f32>,
    fps: Option<u32>,
    motion: Option<&str>,
    width: Option<u32>,
    height: Option<u32>,
    save: Option<&str>,
) -> CmdResult<bool> {
    if let Some(m) = motion {
        if !IMG2VID_MOTIONS.contains(&m) {
            return Err(format!("unknown motion '{}' (expected one of {})", m, IMG2VID_MOTIONS.join(", ")).into());
        }
    }

    let wf = Workflow::ImageToVideo;
    let mut page = ctx.page(&[wf]);

    select_file(&mut page, wf, "image", image)?;
    let view = form_view(&mut page, wf)?;
    set_opt(view, "duration", duration)?;
    set_opt(view, "fps", fps)?;
    set_opt(view, "motion", motion)?;
    set_opt(view, "width", width)?;
    set_opt(view, "height", height)?;

    let outcome = run_form(ctx, &mut page, wf)?;
    finish(ctx, &page, wf, &outcome, save)
}

// ============================================================================
// presets / expand / chat / theme
// ============================================================================

pub fn cmd_presets(ctx: &CommandContext) -> CmdResult<bool> {
    let mut loader = PresetLoader::new();

    match loader.load_config(&ctx.transport) {
        Some(config) => {
            println!("Checkpoints:");
            for c in &config.ckpt_choices {
                let marker = if Some(c.as_str()) == config.default_ckpt() { "*" } else { " " };
                println!("  {} {}", marker, c);
            }
            println!("VAEs:");
            for v in &config.vae_choices {
                let marker = if Some(v.as_str()) == config.default_vae() { "*" } else { " " };
                println!("  {} {}", marker, v);
            }
        }
        None => println!("Model options unavailable"),
    }

    match loader.load_presets(&ctx.transport) {
        Some(presets) => {
            println!("Quality tags: {}", presets.quality.join(", "));
            println!("Default negative: {}", presets.negative_default);
            println!("Styles:");
            for (key, name) in presets.style_options() {
                println!("  {:<14} {}", key, name);
            }
        }
        None => println!("Prompt presets unavailable"),
    }

    Ok(true)
}

pub fn cmd_expand(ctx: &CommandContext, prompt: &str, style: &str, no_quality: bool) -> CmdResult<bool> {
    let mut overlay = AssistOverlay::default();
    let panel = &mut overlay.prompt;
    panel.input = prompt.to_string();
    panel.style = style.to_string();
    panel.include_quality = !no_quality;

    let ok = panel.expand(&ctx.transport);
    println!("{}", panel.output);
    if ok && !panel.negative_output.is_empty() {
        println!("Negative: {}", panel.negative_output);
    }
    Ok(ok)
}

pub fn cmd_chat(ctx: &CommandContext, messages: &[String], path: &str) -> CmdResult<bool> {
    let mut overlay = AssistOverlay::default();
    for message in messages {
        println!("> {}", message);
        if let Some(reply) = overlay.chat.send(message, path, &ctx.transport) {
            println!("{}", reply);
        }
    }
    Ok(!overlay.chat.last_turn_failed())
}

pub fn cmd_theme(prefs_path: &str, value: Option<Theme>) -> CmdResult<bool> {
    let mut prefs = load_preferences(prefs_path);
    if let Some(theme) = value {
        prefs.theme = theme;
        save_preferences(prefs_path, &prefs)?;
    }
    println!("{}", prefs.theme);
    Ok(true)
}

// ============================================================================
// Helpers
// ============================================================================

fn form_view(page: &mut Page, wf: Workflow) -> CmdResult<&mut crate::form::view::FormView> {
    page.form_mut(wf)
        .map(|f| f.view_mut())
        .ok_or_else(|| format!("form {} is not on this page", wf).into())
}

fn set_opt<T: ToString>(
    view: &mut crate::form::view::FormView,
    field: &str,
    value: Option<T>,
) -> CmdResult<()> {
    if let Some(v) = value {
        if !view.set_field(field, &v.to_string()) {
            return Err(format!("form {} has no field '{}'", view.form_id(), field).into());
        }
    }
    Ok(())
}

fn select_file(page: &mut Page, wf: Workflow, slot: &str, path: &str) -> CmdResult<()> {
    let file = FileRef::from_path(std::path::Path::new(path))
        .map_err(|e| format!("cannot read {}: {}", path, e))?;
    let view = form_view(page, wf)?;
    if !view.select_files(slot, vec![file]) {
        return Err(format!("form {} has no '{}' input", wf, slot).into());
    }
    if let Some(preview) = view.preview(slot) {
        log::info!("{} {}: {}", wf, slot, preview.describe());
    }
    Ok(())
}

fn fill_generation(
    ctx: &CommandContext,
    page: &mut Page,
    wf: Workflow,
    args: &GenerationArgs,
    defaults: &GenerationDefaults,
) -> CmdResult<()> {
    let view = form_view(page, wf)?;
    set_opt(view, "prompt", Some(&args.prompt))?;
    set_opt(view, "negative", args.negative.as_ref())?;
    set_opt(view, "seed", args.seed)?;
    set_opt(view, "steps", args.steps.or(defaults.steps))?;
    set_opt(view, "cfg", args.cfg.or(defaults.cfg))?;
    set_opt(view, "ckpt_name", args.ckpt.as_ref())?;
    set_opt(view, "vae_name", args.vae.as_ref())?;

    if args.fill_negative {
        fill_negative_or_warn(ctx, page, wf);
    }
    Ok(())
}

/// `--fill-negative` for any form with a `negative` field. Returns whether
/// the field was filled.
fn fill_negative_or_warn(ctx: &CommandContext, page: &mut Page, wf: Workflow) -> bool {
    let filled = page.fill_negative_default(wf, &ctx.transport);
    if !filled {
        eprintln!("Negative prompt defaults unavailable; leaving the field as is");
    }
    filled
}

/// Submit one form with a terminal progress bar and print its feedback.
fn run_form(ctx: &CommandContext, page: &mut Page, wf: Workflow) -> CmdResult<SubmitOutcome> {
    let bar = if wf.has_progress() && ctx.settings.verbose > 0 {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:30}] {pos}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(format!("{} upload", wf));
        let listener = bar.clone();
        form_view(page, wf)?
            .set_progress_handle(ProgressHandle::new().with_listener(move |p| listener.set_position(p as u64)));
        Some(bar)
    } else {
        None
    };

    let outcome = page
        .submit(wf, &ctx.transport)
        .ok_or_else(|| format!("form {} is not on this page", wf))?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    for toast in page.ctx.toasts.take_unseen() {
        eprintln!("[{}] {}", toast.severity.marker(), toast.message);
    }
    if let Some(form) = page.form(wf) {
        let status = form.view().status().render_text();
        if !status.is_empty() {
            println!("{}: {}", wf, status);
        }
    }
    Ok(outcome)
}

/// Print the mounted result and optionally download it.
fn finish(
    ctx: &CommandContext,
    page: &Page,
    wf: Workflow,
    outcome: &SubmitOutcome,
    save: Option<&str>,
) -> CmdResult<bool> {
    if !outcome.is_success() {
        return Ok(false);
    }

    let Some(card) = page
        .form(wf)
        .and_then(|f| f.view().result())
        .and_then(|r| r.current())
    else {
        return Ok(true);
    };

    let url = ctx.transport.resolve(card.url())?;
    match card {
        ResultCard::Image { title, .. } => println!("{} (image): {}", title, url),
        ResultCard::Video { title, .. } => println!("{} (video): {}", title, url),
    }

    if let Some(path) = save {
        let bytes = ctx.transport.download(card.url())?;
        std::fs::write(path, &bytes)?;
        println!("Saved {} bytes to {}", bytes.len(), path);
    }
    Ok(true)
}
