//! Command-line front end for pbxforge.

pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod patch;
pub mod strategy;

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

pub use config::Config;
pub use error::CliError;
pub use error::Result;

/// Generate and patch Xcode projects
#[derive(Parser, Debug)]
#[command(name = "pbxforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./pbxforge.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project and shared scheme from a source directory
    Generate(GenerateArgs),
    /// Register the configured source files in an existing project
    Patch(PatchArgs),
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Application name; also the source directory scanned under --root
    #[arg(long)]
    pub name: Option<String>,

    /// Bundle identifier, e.g. com.example.app
    #[arg(long)]
    pub bundle_id: Option<String>,

    /// Directory that holds the source directory and receives the bundle
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Try xcodegen before assembling the project manually
    #[arg(long)]
    pub xcodegen: bool,

    /// Use reproducible identifiers
    #[arg(long)]
    pub deterministic: bool,
}

#[derive(Args, Debug, Default)]
pub struct PatchArgs {
    /// Path to project.pbxproj
    #[arg(long, value_name = "FILE")]
    pub project: Option<PathBuf>,

    /// Target to add the files to (defaults to the first target)
    #[arg(long)]
    pub target: Option<String>,

    /// Print the patched project instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

/// Load configuration and dispatch `cli.command`.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Command::Generate(args) => {
            let outcome = generate::run_generate(&config, &args)?;
            println!(
                "✅ Xcode project generated with {}: {}",
                outcome.strategy,
                outcome.project_file.display()
            );
            if let Some(scheme) = &outcome.scheme_file {
                println!("   scheme: {}", scheme.display());
            }
        }
        Command::Patch(args) => {
            let outcome = patch::run_patch(&config, &args)?;
            match &outcome.dry_run_output {
                Some(text) => print!("{text}"),
                None => {
                    println!(
                        "✅ Added {} files to {} ({})",
                        outcome.report.added.len(),
                        outcome.report.target,
                        outcome.project_file.display()
                    );
                    for file in &outcome.report.added {
                        println!("  - {}", file.name);
                    }
                }
            }
        }
    }
    Ok(())
}
