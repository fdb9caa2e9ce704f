use super::load_document;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use strata_compiler_html::{compile_to_html, CompileOptions};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Document JSON file
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Wrap the output in a complete HTML page
    #[arg(long)]
    pub full_document: bool,

    /// Skip indentation and newlines
    #[arg(long)]
    pub compact: bool,

    /// Page title (with --full-document)
    #[arg(long)]
    pub title: Option<String>,
}

impl ExportArgs {
    /// Command line flags win over the config file.
    fn options(&self, config: &Config) -> CompileOptions {
        let mut options = config.export.clone();
        if self.full_document {
            options.full_document = true;
        }
        if self.compact {
            options.pretty = false;
        }
        if let Some(title) = &self.title {
            options.title = Some(title.clone());
        }
        options
    }
}

pub fn export(args: ExportArgs, config: &Config) -> Result<()> {
    let document = load_document(&args.input)?;
    let html = compile_to_html(&document, &args.options(config))?;

    match &args.output {
        Some(path) => {
            fs::write(path, &html)?;
            eprintln!(
                "  {} {} → {}",
                "✓".green(),
                args.input.display(),
                path.display()
            );
        }
        None => print!("{}", html),
    }

    Ok(())
}
