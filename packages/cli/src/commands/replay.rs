use super::load_document;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use strata_editor::{Action, ActionError, DispatchOutcome, Editor};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// JSON array of actions to dispatch in order
    pub actions: PathBuf,

    /// Write the resulting document here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Per-outcome counts of one replay.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub committed: usize,
    pub moved: usize,
    pub updated: usize,
    /// Position in the action list, action name, reason
    pub ignored: Vec<(usize, &'static str, ActionError)>,
}

pub fn run_actions(editor: &mut Editor, actions: Vec<Action>) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (index, action) in actions.into_iter().enumerate() {
        let name = action.name();
        match editor.dispatch(action) {
            DispatchOutcome::Committed { .. } => summary.committed += 1,
            DispatchOutcome::Moved { .. } => summary.moved += 1,
            DispatchOutcome::Updated => summary.updated += 1,
            DispatchOutcome::Ignored(reason) => summary.ignored.push((index, name, reason)),
        }
    }
    summary
}

pub fn replay(args: ReplayArgs, config: &Config) -> Result<()> {
    let document = load_document(&args.document)?;
    let content = fs::read_to_string(&args.actions)
        .with_context(|| format!("Cannot read {}", args.actions.display()))?;
    let actions: Vec<Action> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid actions in {}", args.actions.display()))?;

    println!(
        "{}",
        format!("▶ Replaying {} actions...", actions.len()).bright_blue().bold()
    );

    let mut editor = Editor::new(document, config.editor.clone())?;
    let summary = run_actions(&mut editor, actions);

    for (index, name, reason) in &summary.ignored {
        println!("  {} #{} {} - {}", "✗".red(), index, name, reason.to_string().dimmed());
    }

    println!();
    println!(
        "{} committed, {} undo/redo, {} ignored",
        summary.committed.to_string().green(),
        summary.moved,
        summary.ignored.len().to_string().yellow()
    );
    let state = editor.state();
    println!(
        "History: {}/{}",
        state.history_index() + 1,
        state.history().len()
    );

    if let Some(path) = &args.output {
        fs::write(path, editor.to_json()?)?;
        println!("  {} Wrote {}", "✓".green(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_editor::EditorConfig;
    use strata_model::{ContainerNode, TextNode};

    #[test]
    fn test_counts_each_outcome() {
        let mut editor = Editor::new(
            ContainerNode::new("root").with_child(TextNode::paragraph("p1", "a")),
            EditorConfig::default(),
        )
        .unwrap();

        let actions: Vec<Action> = serde_json::from_value(serde_json::json!([
            { "type": "INSERT_NODE", "node": { "type": "p", "id": "p2", "content": "b" }, "targetId": "p1", "position": "after" },
            { "type": "DELETE_NODE", "id": "missing" },
            { "type": "UNDO" },
            { "type": "REDO" },
            { "type": "SET_ACTIVE_NODE", "id": "p2" }
        ]))
        .unwrap();

        let summary = run_actions(&mut editor, actions);

        assert_eq!(summary.committed, 1);
        assert_eq!(summary.moved, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.ignored.len(), 1);
        assert_eq!(summary.ignored[0].0, 1);
        assert_eq!(summary.ignored[0].1, "DELETE_NODE");
        assert_eq!(editor.state().history_index(), 1);
        assert!(editor.container().find("p2").is_some());
    }
}
