//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use vcmatrix::util::ColorChoice;

/// vcmatrix - drive MSBuild across a platform/configuration matrix
#[derive(Parser)]
#[command(name = "vcmatrix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = parse_color)]
    pub color: ColorChoice,

    /// Output format for phase events (defaults to [output] message_format, else human)
    #[arg(long, global = true, value_enum)]
    pub message_format: Option<MessageFormat>,

    /// Path to vcmatrix.toml (defaults to searching upward from the current directory)
    #[arg(long, global = true, env = "VCMATRIX_MANIFEST")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

fn parse_color(s: &str) -> Result<ColorChoice, String> {
    s.parse()
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every platform/configuration pair with MSBuild
    Build,

    /// Run the Clean target for every pair
    Clean,

    /// Build the CxxTest test targets for every pair
    Testbuild,

    /// Generate CxxTest runner sources
    Testgen,

    /// Generate, build and run the CxxTest suites, pair by pair
    Test,

    /// Run cppcheck over every project
    Cppcheck,

    /// Run vera++ over every project
    Vera,

    /// Run cppcheck and vera++
    Check,

    /// Write Sonar configuration for every pair
    Sonar(SonarArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct SonarArgs {
    /// Directory receiving the properties files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
