use crate::cli_args::ListArgs;
use crate::load_config_for_command;
use crate::output::{self, ManifestListing};
use anyhow::{Context, Result};
use assetpack_core::{Config, Generator};
use log;

pub fn handle_list_command(args: ListArgs, quiet: bool, verbose: u8) -> Result<()> {
    let work_dir = Config::determine_work_dir().context("Failed to determine working directory")?;

    let config = load_config_for_command(&work_dir, &args.config_file, &args.input, None)
        .context("Failed to load configuration for list command")?;
    let generator =
        Generator::new(config, &work_dir, verbose > 0).context("Invalid configuration")?;

    log::debug!("List: collecting manifest...");
    let manifest = generator
        .collect()
        .context("Failed to collect the input files")?;
    log::debug!("List: {} files selected.", manifest.len());

    let listing = ManifestListing::from_manifest(&manifest, &work_dir);
    if args.json {
        output::print_listing_json(&listing)
    } else {
        if !quiet {
            output::print_listing_table(&listing);
        }
        Ok(())
    }
}
