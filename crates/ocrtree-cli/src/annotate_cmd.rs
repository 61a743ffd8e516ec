use std::path::Path;

use ocrtree_core::{Feature, builtin_features, examine_lines, load_features};
use tracing::info;

use crate::cli::TreeFormat;
use crate::shared::{load_tree, print_tree, save_tree};

/// Features from the configuration file, plus the built-in catalog when
/// asked for or when no file is given.
fn collect_features(config: Option<&Path>, builtin: bool) -> Result<Vec<Box<dyn Feature>>, i32> {
    let mut features = match config {
        Some(path) => load_features(path).map_err(|e| {
            eprintln!("Error: failed to load features from {}: {e}", path.display());
            1
        })?,
        None => Vec::new(),
    };
    if builtin || config.is_none() {
        let catalog = builtin_features().map_err(|e| {
            eprintln!("Error: failed to build built-in features: {e}");
            1
        })?;
        features.extend(catalog);
    }
    Ok(features)
}

pub fn run(
    tree_path: &Path,
    config: Option<&Path>,
    builtin: bool,
    format: Option<TreeFormat>,
    output: Option<&Path>,
) -> Result<(), i32> {
    let mut tree = load_tree(tree_path)?;
    let features = collect_features(config, builtin)?;
    info!(features = features.len(), boxes = tree.len() - 1, "annotating tree");

    examine_lines(&mut tree, &features).map_err(|e| {
        eprintln!("Error: annotation failed: {e}");
        1
    })?;

    match output {
        Some(path) => save_tree(&tree, path, format),
        None => print_tree(&tree, format.unwrap_or(TreeFormat::Json)),
    }
}
