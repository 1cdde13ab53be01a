mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::Path;
use std::process;

use assetpack_core::{AppError, Config};
use cli_args::{Cli, Commands, ConfigFileOpts, GenerateArgs, InputOpts};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;
    let verbose = cli_args.verbose;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet, verbose) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(err) if err.is_config_error() => 1,
                Some(AppError::NotFound(_)) => 2,
                Some(AppError::DuplicatePath(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::WalkDir { .. }) => 2,
                Some(AppError::Io(_)) => 2,
                Some(AppError::Pack(_)) => 3,
                Some(AppError::PackageDiscovery(_)) => 4,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool, verbose: u8) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(Commands::Generate(args)) => {
            log::debug!("Executing 'generate' command...");
            commands::generate::handle_generate_command(args, quiet, verbose)?;
        }
        Some(Commands::List(args)) => {
            log::debug!("Executing 'list' command...");
            commands::list::handle_list_command(args, quiet, verbose)?;
        }
        Some(Commands::Completion(args)) => {
            log::debug!("Executing 'completion' command...");
            commands::completion::handle_completion_command(&args)?;
        }
    }
    Ok(())
}

fn merge_config_with_cli_overrides(
    mut config: Config,
    input: &InputOpts,
    generate_args: Option<&GenerateArgs>,
) -> Config {
    log::trace!("Applying CLI overrides to config...");

    config.input.paths.extend(input.inputs.iter().cloned());
    if let Some(include) = &input.include {
        config.input.include = Some(include.clone());
    }
    if let Some(exclude) = &input.exclude {
        config.input.exclude = Some(exclude.clone());
    }
    if input.gitignore {
        config.input.use_gitignore = true;
    }
    if input.no_gitignore {
        config.input.use_gitignore = false;
    }

    if let Some(args) = generate_args {
        if let Some(output) = &args.output {
            config.output.path = output.clone();
        }
        if let Some(variable) = &args.variable {
            config.output.variable = variable.clone();
        }
        if let Some(package) = &args.package {
            config.output.package = Some(package.clone());
        }
        if args.decompress {
            config.output.decompress = true;
        }
        if let Some(quality) = args.quality {
            config.output.quality = quality;
        }
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

pub fn load_config_for_command(
    work_dir: &Path,
    config_opts: &ConfigFileOpts,
    input: &InputOpts,
    generate_args: Option<&GenerateArgs>,
) -> Result<Config> {
    let config_path =
        Config::resolve_config_path(work_dir, config_opts.config.as_ref(), config_opts.no_config)
            .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    Ok(merge_config_with_cli_overrides(config, input, generate_args))
}
