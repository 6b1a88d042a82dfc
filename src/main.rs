#![deny(
    warnings,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! `findup` - Find files or directories by walking up or down the tree.

use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_cargo::style::CLAP_STYLING;
use findup::{DownOptions, PathType, Result, Strategy, Target, UpOptions};
use tracing_subscriber::EnvFilter;

/// CLI arguments for `findup`
#[derive(Parser, Debug)]
#[command(author, version, about, styles = CLAP_STYLING)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by both directions
#[derive(Args, Debug)]
struct Common {
    /// Names to look for, tried in order in every directory
    #[arg(required = true)]
    names:       Vec<PathBuf>,
    /// Directory to start from
    #[arg(long)]
    cwd:         Option<PathBuf>,
    /// Kind of entry to accept: file, directory or both
    #[arg(long = "type", default_value = "file")]
    path_type:   PathType,
    /// Do not count symlinks as matches
    #[arg(long)]
    no_symlinks: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Search the starting directory and its parents
    Up {
        #[command(flatten)]
        common:  Common,
        /// Last directory to check
        #[arg(long)]
        stop_at: Option<PathBuf>,
        /// Print every match up to this many, nearest first
        #[arg(long)]
        limit:   Option<usize>,
        /// Print every match instead of the nearest one
        #[arg(long)]
        all:     bool,
    },
    /// Search the starting directory and its subdirectories
    Down {
        #[command(flatten)]
        common:   Common,
        /// Levels below the starting directory to descend into
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        depth:    i64,
        /// Traversal order: breadth or depth
        #[arg(long, default_value = "breadth")]
        strategy: Strategy,
    },
}

/// Run an upward search and return the matches to print
fn search_up(
    common: Common,
    stop_at: Option<PathBuf>,
    limit: Option<usize>,
    all: bool,
) -> Result<Vec<PathBuf>> {
    let mut options = UpOptions::new()
        .path_type(common.path_type)
        .allow_symlinks(!common.no_symlinks);
    options.cwd = common.cwd;
    options.stop_at = stop_at;
    options.limit = limit;

    let target = Target::from(common.names);
    if all || limit.is_some() {
        findup::find_up_multiple(target, &options)
    } else {
        Ok(findup::find_up(target, &options)?.into_iter().collect())
    }
}

/// Run a downward search and return the match to print
fn search_down(common: Common, depth: i64, strategy: Strategy) -> Result<Vec<PathBuf>> {
    let mut options = DownOptions::new()
        .path_type(common.path_type)
        .allow_symlinks(!common.no_symlinks)
        .depth(depth)
        .strategy(strategy);
    options.cwd = common.cwd;

    Ok(findup::find_down(common.names, &options)?.into_iter().collect())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Up { common, stop_at, limit, all } => search_up(common, stop_at, limit, all),
        Command::Down { common, depth, strategy } => search_down(common, depth, strategy),
    };

    match result {
        Ok(found) if found.is_empty() => std::process::exit(1),
        Ok(found) => {
            for path in found {
                println!("{}", path.display());
            }
        },
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(2);
        },
    }
}
