use clap::Parser;
use tryon_studio::cli::commands::{
    CommandContext, cmd_chat, cmd_expand, cmd_img2img, cmd_img2vid, cmd_inpaint, cmd_presets,
    cmd_text2image, cmd_theme, cmd_try_on, cmd_upload_person,
};
use tryon_studio::cli::config::{Cli, Commands, load_config, resolve};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(cli.config.as_deref());
    let settings = resolve(&cli, config);

    // Theme never talks to the server.
    if let Commands::Theme { value } = &cli.command {
        cmd_theme(&settings.prefs_path, *value)?;
        return Ok(());
    }

    let ctx = CommandContext::new(settings)?;

    let ok = match &cli.command {
        Commands::TryOn {
            person,
            garment,
            save,
        } => cmd_try_on(&ctx, person, garment, save.as_deref())?,
        Commands::UploadPerson { image } => cmd_upload_person(&ctx, image)?,
        Commands::Text2image {
            generation,
            width,
            height,
            sampler,
            scheduler,
        } => cmd_text2image(
            &ctx,
            generation,
            *width,
            *height,
            sampler.as_deref(),
            scheduler.as_deref(),
        )?,
        Commands::Img2img {
            image,
            generation,
            denoise,
        } => cmd_img2img(&ctx, image, generation, *denoise)?,
        Commands::Inpaint {
            image,
            mask,
            prompt,
            negative,
            fill_negative,
            save,
        } => cmd_inpaint(
            &ctx,
            image,
            mask,
            prompt,
            negative.as_deref(),
            *fill_negative,
            save.as_deref(),
        )?,
        Commands::Img2vid {
            image,
            duration,
            fps,
            motion,
            width,
            height,
            save,
        } => cmd_img2vid(
            &ctx,
            image,
            *duration,
            *fps,
            motion.as_deref(),
            *width,
            *height,
            save.as_deref(),
        )?,
        Commands::Presets => cmd_presets(&ctx)?,
        Commands::Expand {
            prompt,
            style,
            no_quality,
        } => cmd_expand(&ctx, prompt, style, *no_quality)?,
        Commands::Chat { messages, path } => cmd_chat(&ctx, messages, path)?,
        Commands::Theme { .. } => true,
    };

    if !ok {
        std::process::exit(1);
    }

    Ok(())
}
