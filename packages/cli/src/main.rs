mod commands;
mod config;
mod point;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    annotate, list, remove, remove_all, AnnotateArgs, ListArgs, RemoveAllArgs, RemoveArgs,
};
use tracing_subscriber::EnvFilter;

/// Marginalia CLI - annotate regions of HTML documents
#[derive(Parser, Debug)]
#[command(name = "marginalia")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate a selection
    Annotate(AnnotateArgs),

    /// Remove the annotation at a caret, everywhere its uid occurs
    Remove(RemoveArgs),

    /// Remove every annotation with a name
    RemoveAll(RemoveAllArgs),

    /// List the annotations in a document
    List(ListArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Annotate(args) => annotate(args, &cwd),
        Command::Remove(args) => remove(args, &cwd),
        Command::RemoveAll(args) => remove_all(args, &cwd),
        Command::List(args) => list(args, &cwd),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
