use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use strata_model::{BlockKind, ContainerNode, InlineRun, TextNode, DEFAULT_ROOT_ID};

pub const STARTER_DOCUMENT_NAME: &str = "document.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn starter_document() -> ContainerNode {
    ContainerNode::new(DEFAULT_ROOT_ID)
        .with_child(TextNode::new("title", BlockKind::heading(1)).with_content("Untitled"))
        .with_child(TextNode::paragraph("intro", "").with_runs(vec![
            InlineRun::plain("Start writing, or run "),
            InlineRun::plain("strata export document.json").with_class("code"),
            InlineRun::plain("."),
        ]))
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let dir = cwd.join(&args.dir);
    let config_path = dir.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Strata document...".bright_blue().bold());

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        println!("  {} Created {}/", "✓".green(), args.dir.display());
    }

    let config_json = serde_json::to_string_pretty(&Config::default())?;
    fs::write(&config_path, config_json)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let document_path = dir.join(STARTER_DOCUMENT_NAME);
    if !document_path.exists() || args.force {
        fs::write(&document_path, starter_document().to_json_pretty()?)?;
        println!("  {} Created {}", "✓".green(), STARTER_DOCUMENT_NAME);
    }

    println!();
    println!("{}", "✅ Ready!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", STARTER_DOCUMENT_NAME);
    println!("  2. Run: strata export {} -o document.html", STARTER_DOCUMENT_NAME);

    Ok(())
}
