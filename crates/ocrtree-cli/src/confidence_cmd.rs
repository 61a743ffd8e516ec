use std::path::Path;

use ocrtree_core::ConfidenceSummary;

use crate::cli::OutputFormat;
use crate::shared::load_tree;

fn format_summary(summary: &ConfidenceSummary) -> String {
    format!(
        "avg_confidence: {:.2}\ntotal_letters: {}\navg_letters_per_box: {:.2}",
        summary.avg_confidence, summary.total_letters, summary.avg_letters_per_box
    )
}

pub fn run(tree_path: &Path, format: &OutputFormat) -> Result<(), i32> {
    let tree = load_tree(tree_path)?;
    let summary = tree.confidence_summary();

    match format {
        OutputFormat::Text => println!("{}", format_summary(&summary)),
        OutputFormat::Json => {
            let json = serde_json::to_string(&summary).map_err(|e| {
                eprintln!("Error: {e}");
                1
            })?;
            println!("{json}");
        }
    }
    Ok(())
}
