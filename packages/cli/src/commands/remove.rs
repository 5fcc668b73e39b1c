use super::DocumentArgs;
use crate::point::Point;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use marginalia_editor::Range;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Annotation name
    #[arg(short, long)]
    pub name: String,

    /// Caret inside the annotation to remove (PATH:OFFSET)
    #[arg(long)]
    pub at: Point,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RemoveAllArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Annotation name
    #[arg(short, long)]
    pub name: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn remove(args: RemoveArgs, cwd: &str) -> Result<()> {
    let mut session = args.document.open(cwd)?;
    let caret = args.at.resolve(session.editor.document())?;
    session.editor.set_selection(Range::new(caret, caret))?;

    if session.annotator.remove(&mut session.editor, &args.name)? {
        eprintln!("  {} Removed {} at {}", "✓".green(), args.name.bright_white(), args.at);
    } else {
        eprintln!("  {} No {} annotation at {}", "⚠️".yellow(), args.name, args.at);
    }

    session.save(args.output.as_deref())
}

pub fn remove_all(args: RemoveAllArgs, cwd: &str) -> Result<()> {
    let mut session = args.document.open(cwd)?;
    let removed = session.annotator.remove_all(&mut session.editor, &args.name)?;
    eprintln!(
        "  {} Removed {} {} annotation(s)",
        "✓".green(),
        removed,
        args.name.bright_white()
    );

    session.save(args.output.as_deref())
}
