use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigFileOpts {
    #[arg(
        long,
        help = "Path of the TOML config file (default: ./assetpack.toml if present).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Configuration"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Do not load any TOML config file.",
        conflicts_with = "config",
        help_heading = "Configuration"
    )]
    pub no_config: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputOpts {
    #[arg(
        value_name = "INPUT",
        help = "Input files and directories (appended to config file inputs).",
        help_heading = "Inputs"
    )]
    pub inputs: Vec<PathBuf>,

    #[arg(
        short = 'i',
        long,
        value_name = "PATTERNS",
        help = "Comma-separated globs; only matching files are bundled.",
        help_heading = "Inputs"
    )]
    pub include: Option<String>,

    #[arg(
        short = 'e',
        long,
        value_name = "PATTERNS",
        help = "Comma-separated globs; matching files are not bundled (ignored with --include).",
        help_heading = "Inputs"
    )]
    pub exclude: Option<String>,

    #[arg(
        long,
        help = "Apply every .gitignore found under the working directory.",
        overrides_with = "no_gitignore",
        help_heading = "Inputs"
    )]
    pub gitignore: bool,

    #[arg(
        long,
        help = "Do not apply .gitignore files [default].",
        overrides_with = "gitignore",
        help_heading = "Inputs"
    )]
    pub no_gitignore: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "assetpack",
    author,
    version,
    about = "Bundle asset files into a compressed blob embedded in generated Rust source.",
    long_about = "assetpack collects files from the given inputs, filters directory \
                  contents with include/exclude globs and optional .gitignore rules, \
                  packs them into a single brotli blob and writes a Rust source file \
                  embedding it.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = concat!(
        "EXAMPLES:\n",
        "  assetpack generate public -e '*.map' -o src/assets.gen.rs\n",
        "  assetpack list public --gitignore\n",
        "  assetpack completion bash"
    ),
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase message verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Bundle the inputs and write the generated source file."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "ls",
        about = "Show which files would be bundled, without packing."
    )]
    List(ListArgs),

    #[command(about = "Print a shell completion script.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub config_file: ConfigFileOpts,
    #[clap(flatten)]
    pub input: InputOpts,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Generated source file [default: assets.gen.rs].",
        help_heading = "Output",
        conflicts_with = "stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Print the generated source to standard output.",
        help_heading = "Output"
    )]
    pub stdout: bool,

    #[arg(
        long = "var",
        value_name = "NAME",
        help = "Name of the generated static [default: ASSETS].",
        help_heading = "Output"
    )]
    pub variable: Option<String>,

    #[arg(
        long,
        value_name = "CRATE",
        help = "Crate name written in the header (default: read from ./Cargo.toml).",
        help_heading = "Output"
    )]
    pub package: Option<String>,

    #[arg(
        long,
        help = "Mark the bundle for decompression on read.",
        help_heading = "Output"
    )]
    pub decompress: bool,

    #[arg(
        long,
        value_name = "1-11",
        value_parser = clap::value_parser!(u32).range(1..=11),
        help = "Brotli compression quality [default: 11].",
        help_heading = "Output"
    )]
    pub quality: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    pub config_file: ConfigFileOpts,
    #[clap(flatten)]
    pub input: InputOpts,

    #[arg(long, help = "Print the file list as JSON.")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(value_enum, help = "Target shell.")]
    pub shell: Shell,
}
