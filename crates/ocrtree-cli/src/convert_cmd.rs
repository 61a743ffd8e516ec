use std::path::Path;

use crate::shared::{load_tree, save_tree};

pub fn run(input: &Path, output: &Path) -> Result<(), i32> {
    let tree = load_tree(input)?;
    save_tree(&tree, output, None)
}
