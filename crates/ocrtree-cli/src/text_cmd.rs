use std::path::Path;

use ocrtree_core::{BoxTree, NodeId};

use crate::cli::OutputFormat;
use crate::shared::load_tree;

/// Line boxes of the tree in reading order, or every root child when the
/// tree has no line-level boxes.
fn text_units(tree: &BoxTree) -> Vec<NodeId> {
    let lines: Vec<NodeId> = tree
        .iter()
        .filter(|&n| tree[n].box_type.is_line())
        .collect();
    if lines.is_empty() {
        tree.children(tree.root()).to_vec()
    } else {
        lines
    }
}

pub fn run(tree_path: &Path, format: &OutputFormat) -> Result<(), i32> {
    let tree = load_tree(tree_path)?;

    for node in text_units(&tree) {
        let text = tree.full_text(node);
        match format {
            OutputFormat::Text => println!("{text}"),
            OutputFormat::Json => {
                let obj = serde_json::json!({
                    "box_id": tree[node].id,
                    "box_type": tree[node].box_type,
                    "text": text,
                });
                println!("{obj}");
            }
        }
    }
    Ok(())
}
