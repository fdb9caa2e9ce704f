use super::load_document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use strata_model::NodeStats;
use strata_surface::render_tree;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Document JSON file
    pub input: PathBuf,

    /// Print the view tree as JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let document = load_document(&args.input)?;
    let view = render_tree(&document, false);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print!("{}", view.outline());

    let stats = NodeStats::of(&document);
    let duplicates = document.duplicate_ids();
    println!();
    println!(
        "{} containers, {} leaves, depth {}",
        stats.containers, stats.leaves, stats.max_depth
    );
    if !duplicates.is_empty() {
        println!(
            "{} duplicate ids: {}",
            "⚠️".yellow(),
            duplicates.join(", ").yellow()
        );
    }

    Ok(())
}
