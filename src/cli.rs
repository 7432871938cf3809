// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use pinject::config::PullPolicy;
use pinject::runtime::RuntimeType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pinject")]
#[command(about = "Patch container images with their distribution's latest updates")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: pinject.yml in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Container runtime to use (docker or podman)
    #[arg(long, global = true)]
    pub runtime: Option<RuntimeType>,

    /// Engine socket path
    #[arg(long, global = true)]
    pub socket: Option<String>,

    /// When to pull the source image (always, missing, never)
    #[arg(long, global = true)]
    pub pull: Option<PullPolicy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build TAG from SOURCE with the distribution's updates applied
    Build {
        /// Image to patch
        source: String,

        /// Tag for the patched image
        tag: String,

        /// Print the recipe instead of building it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the distribution, version and user of an image
    Detect {
        /// Image to inspect
        source: String,
    },

    /// Initialize a new pinject.yml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
