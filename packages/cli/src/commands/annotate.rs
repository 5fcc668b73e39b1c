use super::DocumentArgs;
use crate::point::Point;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use marginalia_annotate::DecoratorData;
use marginalia_editor::{Editor, Range};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Annotation name
    #[arg(short, long)]
    pub name: String,

    /// Selection start (PATH:OFFSET)
    #[arg(long, conflicts_with = "select_all")]
    pub start: Option<Point>,

    /// Selection end (defaults to the start)
    #[arg(long, requires = "start")]
    pub end: Option<Point>,

    /// Annotate the whole document
    #[arg(long)]
    pub select_all: bool,

    /// Decorator data as key=value (repeatable)
    #[arg(short, long = "data", value_parser = parse_data_entry)]
    pub data: Vec<(String, String)>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_data_entry(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn select(
    editor: &mut Editor,
    start: Option<&Point>,
    end: Option<&Point>,
    select_all: bool,
) -> Result<()> {
    if select_all {
        editor.select_all();
        return Ok(());
    }
    let start = start.ok_or_else(|| anyhow!("Specify --start or --select-all"))?;
    let start = start.resolve(editor.document())?;
    let end = match end {
        Some(end) => end.resolve(editor.document())?,
        None => start,
    };
    editor.set_selection(Range::new(start, end))?;
    Ok(())
}

fn decorator_data(entries: &[(String, String)]) -> DecoratorData {
    entries
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}

pub fn annotate(args: AnnotateArgs, cwd: &str) -> Result<()> {
    let mut session = args.document.open(cwd)?;
    select(
        &mut session.editor,
        args.start.as_ref(),
        args.end.as_ref(),
        args.select_all,
    )?;

    let state = session.annotator.annotate(
        &mut session.editor,
        &args.name,
        decorator_data(&args.data),
    )?;
    eprintln!(
        "  {} Annotated {} ({}) → {} elements",
        "✓".green(),
        args.name.bright_white(),
        state.uid,
        state.nodes.len()
    );

    session.save(args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Session;
    use crate::config::Config;

    #[test]
    fn test_parse_data_entry() {
        assert_eq!(
            parse_data_entry("author=ana=b").unwrap(),
            ("author".to_string(), "ana=b".to_string())
        );
        assert!(parse_data_entry("author").is_err());
        assert!(parse_data_entry("=x").is_err());
    }

    #[test]
    fn test_annotate_points() {
        let mut session = Session::from_html(&Config::default(), "<p>one two</p>").unwrap();
        let start: Point = "0.0:4".parse().unwrap();
        let end: Point = "0.0:7".parse().unwrap();
        select(&mut session.editor, Some(&start), Some(&end), false).unwrap();

        let data = decorator_data(&[("uid".to_string(), "fixed".to_string())]);
        session
            .annotator
            .annotate(&mut session.editor, "comment", data)
            .unwrap();

        assert_eq!(
            session.annotator.get_content(&session.editor).unwrap(),
            r#"<p>one <span class="mce-annotation" data-mce-annotation-uid="fixed" data-mce-annotation="comment">two</span></p>"#
        );
    }

    #[test]
    fn test_selection_is_required() {
        let mut session = Session::from_html(&Config::default(), "<p>x</p>").unwrap();
        assert!(select(&mut session.editor, None, None, false).is_err());
        assert!(select(&mut session.editor, None, None, true).is_ok());
    }
}
