use crate::cli_args::GenerateArgs;
use crate::load_config_for_command;
use crate::output::{self, format_bytes};
use anyhow::{Context, Result};
use assetpack_core::{self as core, Config, Generator};
use colored::Colorize;
use log;

pub fn handle_generate_command(args: GenerateArgs, quiet: bool, verbose: u8) -> Result<()> {
    let work_dir = Config::determine_work_dir().context("Failed to determine working directory")?;
    log::info!("Working directory: {}", work_dir.display());

    let config = load_config_for_command(
        &work_dir,
        &args.config_file,
        &args.input,
        Some(&args),
    )
    .context("Failed to load configuration")?;

    let generator =
        Generator::new(config, &work_dir, verbose > 0).context("Invalid configuration")?;

    log::debug!("Collecting and packing {} inputs...", generator.inputs().len());
    let generated = generator
        .generate()
        .context("Failed to bundle the input files")?;
    log::debug!(
        "Packed {} files: {} bytes read, {} bytes compressed.",
        generated.file_count,
        generated.bytes_read,
        generated.blob.len()
    );

    let text = generator
        .render(&generated)
        .context("Failed to render generated source")?;

    if args.stdout {
        log::debug!("Writing generated source to stdout.");
        return output::write_to_stdout(&text);
    }

    let output_path = generator.output_path();
    core::write_output(&output_path, &text)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if !quiet {
        println!(
            "{} Bundled {} files ({} -> {}) into {}",
            "✅".green(),
            generated.file_count.to_string().cyan(),
            format_bytes(generated.bytes_read),
            format_bytes(generated.blob.len() as u64),
            output_path.display().to_string().blue()
        );
    }
    Ok(())
}
