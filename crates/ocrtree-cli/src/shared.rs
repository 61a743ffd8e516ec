use std::io;
use std::path::Path;

use ocrtree_core::BoxTree;

use crate::cli::TreeFormat;

/// Tree format implied by a file extension.
pub fn format_from_path(path: &Path) -> Option<TreeFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "json" => Some(TreeFormat::Json),
        "csv" => Some(TreeFormat::Csv),
        _ => None,
    }
}

fn required_format(path: &Path) -> Result<TreeFormat, i32> {
    format_from_path(path).ok_or_else(|| {
        eprintln!(
            "Error: cannot tell the tree format of {} (expected .json or .csv)",
            path.display()
        );
        1
    })
}

/// Load a tree with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is not found,
/// has an unknown extension or does not hold a valid tree.
pub fn load_tree(path: &Path) -> Result<BoxTree, i32> {
    if !path.exists() {
        eprintln!("Error: file not found: {}", path.display());
        return Err(1);
    }
    let loaded = match required_format(path)? {
        TreeFormat::Json => BoxTree::from_json_file(path),
        TreeFormat::Csv => BoxTree::from_csv_file(path),
    };
    loaded.map_err(|e| {
        eprintln!("Error: failed to load {}: {e}", path.display());
        1
    })
}

/// Write a tree to `path`, in `format` or the one implied by the extension.
pub fn save_tree(tree: &BoxTree, path: &Path, format: Option<TreeFormat>) -> Result<(), i32> {
    let format = match format {
        Some(format) => format,
        None => required_format(path)?,
    };
    let saved = match format {
        TreeFormat::Json => tree.to_json_file(path),
        TreeFormat::Csv => tree.to_csv_file(path),
    };
    saved.map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", path.display());
        1
    })
}

/// Write a tree to stdout.
pub fn print_tree(tree: &BoxTree, format: TreeFormat) -> Result<(), i32> {
    let stdout = io::stdout().lock();
    let printed = match format {
        TreeFormat::Json => tree.write_json(stdout).map(|()| println!()),
        TreeFormat::Csv => tree.write_csv(stdout, &Default::default()),
    };
    printed.map_err(|e| {
        eprintln!("Error: failed to write tree: {e}");
        1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(format_from_path(Path::new("a/tree.json")), Some(TreeFormat::Json));
        assert_eq!(format_from_path(Path::new("tree.CSV")), Some(TreeFormat::Csv));
        assert_eq!(format_from_path(Path::new("tree.xlsx")), None);
        assert_eq!(format_from_path(Path::new("tree")), None);
    }

    #[test]
    fn load_tree_file_not_found() {
        let result = load_tree(Path::new("/nonexistent/tree.json"));
        assert_eq!(result.err(), Some(1));
    }

    #[test]
    fn load_tree_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.txt");
        std::fs::write(&path, "x").unwrap();
        assert_eq!(load_tree(&path).err(), Some(1));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let tree = BoxTree::new();
        for name in ["tree.json", "tree.csv"] {
            let path = dir.path().join(name);
            save_tree(&tree, &path, None).unwrap();
            assert_eq!(load_tree(&path).unwrap(), tree);
        }
    }
}
