//! Persisted tree format.
//!
//! A tree is stored as its root record, every record carrying the box fields
//! and a `children` list of nested records. Loading re-inserts every record
//! through [`BoxTree::add_child`], so the root index is rebuilt and ids are
//! validated on the way in.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::box_type::BoxType;
use crate::error::{Result, StructureError};
use crate::ocr_box::OcrBox;
use crate::tree::{BoxTree, NodeId};

#[derive(Serialize)]
struct NodeRef<'a> {
    #[serde(flatten)]
    data: &'a OcrBox,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeRef<'a>>,
}

impl<'a> NodeRef<'a> {
    fn new(tree: &'a BoxTree, node: NodeId) -> Self {
        Self {
            data: &tree[node],
            children: tree
                .children(node)
                .iter()
                .map(|&child| NodeRef::new(tree, child))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct NodeRecord {
    #[serde(flatten)]
    data: OcrBox,
    #[serde(default)]
    children: Vec<NodeRecord>,
}

fn attach(tree: &mut BoxTree, parent: NodeId, records: Vec<NodeRecord>) -> Result<()> {
    for record in records {
        let node = tree.add_child(parent, record.data)?;
        attach(tree, node, record.children)?;
    }
    Ok(())
}

impl BoxTree {
    /// Write the tree as pretty-printed JSON.
    pub fn write_json<W: io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &NodeRef::new(self, self.root()))?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&NodeRef::new(self, self.root()))?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.write_json(io::BufWriter::new(file))
    }

    /// Rebuild a tree from its persisted JSON form.
    ///
    /// The top-level record must be a root box. Every nested record is
    /// checked like any other insertion: a second root, a missing id or a
    /// duplicate id is a [`StructureError`].
    pub fn read_json<R: io::Read>(reader: R) -> Result<BoxTree> {
        let record: NodeRecord = serde_json::from_reader(reader)?;
        Self::from_record(record)
    }

    pub fn from_json_str(json: &str) -> Result<BoxTree> {
        let record: NodeRecord = serde_json::from_str(json)?;
        Self::from_record(record)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<BoxTree> {
        let file = File::open(path)?;
        Self::read_json(io::BufReader::new(file))
    }

    fn from_record(record: NodeRecord) -> Result<BoxTree> {
        let NodeRecord { mut data, children } = record;
        if data.box_type != BoxType::Root {
            return Err(StructureError::WrongBoxType {
                expected: BoxType::Root,
                found: data.box_type,
            }
            .into());
        }
        data.id = None;

        let mut tree = BoxTree::new();
        let root = tree.root();
        tree[root] = data;
        attach(&mut tree, root, children)?;
        debug!(boxes = tree.len() - 1, "loaded persisted tree");
        Ok(tree)
    }
}
