pub mod annotate;
pub mod list;
pub mod remove;

pub use annotate::{annotate, AnnotateArgs};
pub use list::{list, ListArgs};
pub use remove::{remove, remove_all, RemoveAllArgs, RemoveArgs};

use crate::config::Config;
use anyhow::Result;
use clap::Args;
use marginalia_annotate::Annotator;
use marginalia_editor::Editor;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Arguments shared by every command that opens a document
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// HTML file to open
    pub file: PathBuf,

    /// Config file (defaults to marginalia.config.json in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl DocumentArgs {
    pub fn open(&self, cwd: &str) -> Result<Session> {
        let config = Config::load(cwd, self.config.as_deref())?;
        let html = fs::read_to_string(&self.file)?;
        debug!(file = %self.file.display(), bytes = html.len(), "opened document");
        Session::from_html(&config, &html)
    }
}

/// An editor with the configured annotator attached
pub struct Session {
    pub annotator: Annotator,
    pub editor: Editor,
}

impl Session {
    pub fn from_html(config: &Config, html: &str) -> Result<Self> {
        let annotator = config.annotator()?;
        let mut editor = Editor::from_html(html)?;
        annotator.setup(&mut editor);
        Ok(Self { annotator, editor })
    }

    /// Serialize the document to `output`, or to stdout
    pub fn save(&self, output: Option<&Path>) -> Result<()> {
        let content = self.annotator.get_content(&self.editor)?;
        match output {
            Some(path) => fs::write(path, content)?,
            None => println!("{}", content),
        }
        Ok(())
    }
}
