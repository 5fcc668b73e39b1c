use super::DocumentArgs;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use marginalia_annotate::Annotator;
use marginalia_editor::Editor;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Only list this annotation name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedAnnotation {
    pub name: String,
    pub uid: String,
    pub elements: usize,
    pub text: String,
}

fn collect(annotator: &Annotator, editor: &Editor, only: Option<&str>) -> Vec<ListedAnnotation> {
    let names: Vec<String> = match only {
        Some(name) => vec![name.to_string()],
        None => annotator
            .registry()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let doc = editor.document();
    let mut listed = Vec::new();
    for name in names {
        for (uid, elements) in annotator.get_all(editor, &name) {
            let text: String = elements.iter().map(|id| doc.text_content(*id)).collect();
            listed.push(ListedAnnotation {
                name: name.clone(),
                uid,
                elements: elements.len(),
                text,
            });
        }
    }
    listed
}

pub fn list(args: ListArgs, cwd: &str) -> Result<()> {
    let session = args.document.open(cwd)?;
    let listed = collect(&session.annotator, &session.editor, args.name.as_deref());

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&listed)?),
        "text" => {
            if listed.is_empty() {
                println!("{}", "No annotations found".yellow());
            }
            for item in &listed {
                println!(
                    "{} {} ({} elements) {:?}",
                    item.name.bright_white().bold(),
                    item.uid,
                    item.elements,
                    item.text
                );
            }
        }
        other => return Err(anyhow!("Unknown format: {}. Use: text or json", other)),
    }
    Ok(())
}
