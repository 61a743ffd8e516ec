//! Hierarchical box tree.
//!
//! A [`BoxTree`] is an arena of [`OcrBox`] payloads addressed by [`NodeId`].
//! Children are owned by their parent through the arena's child lists; the
//! parent link and the root index (box id to node) are non-owning relations
//! that every mutating operation keeps consistent.
//!
//! Exactly one node, [`BoxTree::root`], has [`BoxType::Root`]. Nodes are
//! attached either explicitly with [`BoxTree::add_child`] or by level with
//! [`BoxTree::insert_by_type`], which follows [`BoxType::preceding`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::attributes::{AttrValue, PAGE_NUMBER_KEY};
use crate::box_type::BoxType;
use crate::error::{Result, StructureError};
use crate::ocr_box::OcrBox;

/// Handle to a node of a [`BoxTree`].
///
/// Handles stay valid for the lifetime of the tree. A node removed by
/// [`BoxTree::merge_children`] or [`BoxTree::replace_children`] becomes
/// detached: its handle still resolves but it is no longer reachable from the
/// root or registered in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Node {
    data: OcrBox,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

/// Length-weighted confidence statistics over the leaves of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceSummary {
    /// Mean leaf confidence weighted by leaf text length.
    pub avg_confidence: f64,
    /// Total number of characters over all leaves.
    pub total_letters: f64,
    /// Mean number of characters per leaf.
    pub avg_letters_per_box: f64,
}

/// A document as a tree of boxes rooted at a synthetic root.
#[derive(Debug, Clone)]
pub struct BoxTree {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl Default for BoxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxTree {
    const ROOT: NodeId = NodeId(0);

    /// Create a tree holding only an empty root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: OcrBox::root(),
                parent: None,
                children: Vec::new(),
                attached: true,
            }],
            index: HashMap::new(),
        }
    }

    /// The synthetic root node.
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Number of nodes reachable from the root, root included.
    pub fn len(&self) -> usize {
        self.index.len() + 1
    }

    /// True when the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&OcrBox> {
        self.nodes.get(node.0).map(|n| &n.data)
    }

    /// Mutable access to a payload.
    ///
    /// Changing `id` or `box_type` through this reference desynchronizes the
    /// root index; call [`recalculate_index`](Self::recalculate_index) after.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut OcrBox> {
        self.nodes.get_mut(node.0).map(|n| &mut n.data)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.attached)
    }

    /// Look up a node by box id through the root index.
    pub fn find(&self, box_id: &str) -> Option<NodeId> {
        self.index.get(box_id).copied()
    }

    /// Like [`find`](Self::find) but reports a missing id as an error.
    pub fn subbox_by_id(&self, box_id: &str) -> Result<NodeId> {
        self.find(box_id)
            .ok_or_else(|| StructureError::NodeNotFound(box_id.to_string()).into())
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if self.is_attached(node) {
            Ok(())
        } else {
            Err(StructureError::NodeNotFound(node.to_string()).into())
        }
    }

    fn push_node(&mut self, parent: NodeId, data: OcrBox) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(box_id) = &data.id {
            self.index.insert(box_id.clone(), id);
        }
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
            attached: true,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn check_insertable(&self, data: &OcrBox) -> std::result::Result<(), StructureError> {
        if data.box_type.is_root() {
            return Err(StructureError::SecondRoot);
        }
        match &data.id {
            None => Err(StructureError::MissingId),
            Some(id) if self.index.contains_key(id) => Err(StructureError::DuplicateId(id.clone())),
            Some(_) => Ok(()),
        }
    }

    /// Append `child` to `parent`'s children and register it in the index.
    ///
    /// Fails if `child` is root-typed, has no id, or its id is already used.
    pub fn add_child(&mut self, parent: NodeId, child: OcrBox) -> Result<NodeId> {
        self.check_node(parent)?;
        self.check_insertable(&child)?;
        Ok(self.push_node(parent, child))
    }

    /// Copy the subtree of `other` rooted at `source` under `parent`.
    ///
    /// The whole subtree is validated before anything is attached: a
    /// root-typed node anywhere in it or an id collision leaves `self`
    /// unchanged.
    pub fn graft(&mut self, parent: NodeId, other: &BoxTree, source: NodeId) -> Result<NodeId> {
        self.check_node(parent)?;
        other.check_node(source)?;
        self.check_graftable(other, &[source], &HashSet::new())?;
        Ok(self.copy_subtree(parent, other, source))
    }

    fn check_graftable(
        &self,
        other: &BoxTree,
        sources: &[NodeId],
        released: &HashSet<String>,
    ) -> std::result::Result<(), StructureError> {
        let mut seen = HashSet::new();
        for &source in sources {
            for node in other.preorder(source) {
                let data = &other[node];
                if data.box_type.is_root() {
                    return Err(StructureError::SecondRoot);
                }
                let id = data.id.as_ref().ok_or(StructureError::MissingId)?;
                let taken = self.index.contains_key(id) && !released.contains(id);
                if taken || !seen.insert(id.clone()) {
                    return Err(StructureError::DuplicateId(id.clone()));
                }
            }
        }
        Ok(())
    }

    fn copy_subtree(&mut self, parent: NodeId, other: &BoxTree, source: NodeId) -> NodeId {
        let copied = self.push_node(parent, other[source].clone());
        for &child in other.children(source) {
            self.copy_subtree(copied, other, child);
        }
        copied
    }

    /// Attach `child` under the nearest node of its preceding type.
    ///
    /// The search runs in reverse order from the root, so the most recently
    /// added matching node wins.
    pub fn insert_by_type(&mut self, child: OcrBox) -> Result<NodeId> {
        let expected = child.box_type.preceding();
        let slot = expected.and_then(|wanted| {
            self.reverse_order(Self::ROOT)
                .find(|&node| self[node].box_type == wanted)
        });
        match slot {
            Some(parent) => self.add_child(parent, child),
            None => Err(StructureError::NoParentSlot {
                box_type: child.box_type,
                expected,
            }
            .into()),
        }
    }

    /// Preorder traversal starting at `start`: self, then each child subtree
    /// in order.
    pub fn preorder(&self, start: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![start],
        }
    }

    /// Reverse-order traversal starting at `start`: each child subtree in
    /// reverse child order, then self. Exactly the reverse of
    /// [`preorder`](Self::preorder).
    ///
    /// Replacing the children of a visited node never affects the nodes still
    /// to be visited, which makes this the order to collect before rewriting
    /// the tree.
    pub fn reverse_order(&self, start: NodeId) -> ReverseOrder<'_> {
        let remaining = self.children(start).len();
        ReverseOrder {
            tree: self,
            stack: vec![(start, remaining)],
        }
    }

    /// Preorder traversal of the whole tree.
    pub fn iter(&self) -> Preorder<'_> {
        self.preorder(Self::ROOT)
    }

    /// All descendants of `node` in preorder, optionally filtered by type.
    pub fn subboxes(&self, node: NodeId, box_type: Option<BoxType>) -> Vec<NodeId> {
        self.preorder(node)
            .skip(1)
            .filter(|&n| box_type.is_none_or(|t| self[n].box_type == t))
            .collect()
    }

    /// Space-joined non-empty texts of the subtree, in preorder.
    pub fn full_text(&self, node: NodeId) -> String {
        self.preorder(node)
            .map(|n| self[n].text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the subtree holds any non-whitespace text.
    pub fn has_any_text(&self, node: NodeId) -> bool {
        self.preorder(node)
            .any(|n| self[n].text.chars().any(|c| !c.is_whitespace()))
    }

    fn extent(&self, node: NodeId) -> Option<(i64, i64, i64, i64)> {
        self.preorder(node)
            .filter(|&n| !self[n].box_type.is_root())
            .map(|n| self[n].rect)
            .fold(None, |acc, r| match acc {
                None => Some((r.left, r.top, r.right, r.bottom)),
                Some((l, t, rt, b)) => {
                    Some((l.min(r.left), t.min(r.top), rt.max(r.right), b.max(r.bottom)))
                }
            })
    }

    /// Vertical extent of the subtree's non-root boxes.
    pub fn full_height(&self, node: NodeId) -> Option<i64> {
        self.extent(node).map(|(_, top, _, bottom)| bottom - top)
    }

    /// Horizontal extent of the subtree's non-root boxes.
    pub fn full_width(&self, node: NodeId) -> Option<i64> {
        self.extent(node).map(|(left, _, right, _)| right - left)
    }

    /// Position of `node` among its siblings; 0 for the root.
    pub fn position_in_parent(&self, node: NodeId) -> usize {
        self.parent(node)
            .and_then(|p| self.children(p).iter().position(|&c| c == node))
            .unwrap_or(0)
    }

    /// Topmost ancestor of `node` (the root for attached nodes).
    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Nearest value of `key` on `node` or one of its ancestors.
    ///
    /// An explicit `Null` stops the walk; absence everywhere yields `None`.
    pub fn ancestor_attribute(&self, node: NodeId, key: &str) -> Option<&AttrValue> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(value) = self.get(n)?.attribute(key) {
                return Some(value);
            }
            current = self.parent(n);
        }
        None
    }

    /// Rebuild the id index from the nodes reachable from the root.
    pub fn recalculate_index(&mut self, node: NodeId) -> Result<()> {
        if node != Self::ROOT {
            return Err(StructureError::NotRoot("recalculate_index").into());
        }
        let mut index = HashMap::new();
        for n in self.preorder(Self::ROOT).skip(1) {
            let id = self[n].id.clone().ok_or(StructureError::MissingId)?;
            if index.insert(id.clone(), n).is_some() {
                return Err(StructureError::DuplicateId(id).into());
            }
        }
        self.index = index;
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        let subtree: Vec<NodeId> = self.preorder(node).collect();
        for n in subtree {
            if let Some(id) = &self.nodes[n.0].data.id {
                self.index.remove(id);
            }
            self.nodes[n.0].attached = false;
        }
        self.nodes[node.0].parent = None;
    }

    /// Merge child `j` of `parent` into child `i`.
    ///
    /// Child `i` gets the concatenated text and the union of both rectangles
    /// and keeps its own confidence. Child `j` is removed together with its
    /// subtree.
    pub fn merge_children(&mut self, parent: NodeId, i: usize, j: usize) -> Result<()> {
        self.check_node(parent)?;
        let len = self.children(parent).len();
        for index in [i, j] {
            if index >= len {
                return Err(StructureError::ChildIndex { index, len }.into());
            }
        }
        if i == j {
            return Err(StructureError::ChildIndex { index: j, len }.into());
        }
        let first = self.children(parent)[i];
        let second = self.children(parent)[j];
        let (text, rect) = {
            let other = &self[second];
            (other.text.clone(), other.rect)
        };
        let target = &mut self[first];
        target.text.push_str(&text);
        target.rect = target.rect.union(&rect);

        self.nodes[parent.0].children.remove(j);
        self.detach(second);
        Ok(())
    }

    /// Replace the children of `node` by copies of the children of
    /// `replacement`'s root.
    ///
    /// Ids of the old children are released before the new ones are checked,
    /// so a replacement may reuse them. On error nothing changes.
    pub fn replace_children(&mut self, node: NodeId, replacement: &BoxTree) -> Result<()> {
        self.check_node(node)?;
        let released: HashSet<String> = self
            .subboxes(node, None)
            .into_iter()
            .filter_map(|n| self[n].id.clone())
            .collect();
        let sources = replacement.children(replacement.root()).to_vec();
        self.check_graftable(replacement, &sources, &released)?;

        let old = std::mem::take(&mut self.nodes[node.0].children);
        for child in old {
            self.detach(child);
        }
        for source in sources {
            self.copy_subtree(node, replacement, source);
        }
        Ok(())
    }

    /// Append the predicted pages of each tree as new pages of this one.
    ///
    /// Pages are renumbered by their position under the root. Any root child
    /// that is not a predicted page is rejected before anything is appended.
    pub fn add_pages(&mut self, trees: &[BoxTree]) -> Result<()> {
        for tree in trees {
            for &page in tree.children(tree.root()) {
                let found = tree[page].box_type;
                if found != BoxType::PredictedPage {
                    return Err(StructureError::WrongBoxType {
                        expected: BoxType::PredictedPage,
                        found,
                    }
                    .into());
                }
            }
        }
        for tree in trees {
            for &page in tree.children(tree.root()) {
                let page_number = self.children(Self::ROOT).len();
                let copied = self.graft(Self::ROOT, tree, page)?;
                self[copied].set_attribute(PAGE_NUMBER_KEY, page_number);
            }
        }
        Ok(())
    }

    /// Confidence statistics over the subtree's childless non-root boxes.
    ///
    /// A leaf without confidence counts toward letters but adds nothing to
    /// the weighted sum. An empty subtree yields an all-zero summary.
    pub fn confidence_summary_of(&self, node: NodeId) -> ConfidenceSummary {
        let leaves: Vec<&OcrBox> = self
            .preorder(node)
            .filter(|&n| !self[n].box_type.is_root() && self.children(n).is_empty())
            .map(|n| &self[n])
            .collect();
        if leaves.is_empty() {
            return ConfidenceSummary::default();
        }
        let total_letters: usize = leaves.iter().map(|b| b.text_len()).sum();
        let weighted: f64 = leaves
            .iter()
            .map(|b| b.conf.unwrap_or(0.0) * b.text_len() as f64)
            .sum();
        ConfidenceSummary {
            avg_confidence: weighted / total_letters.max(1) as f64,
            total_letters: total_letters as f64,
            avg_letters_per_box: total_letters as f64 / leaves.len() as f64,
        }
    }

    /// Confidence statistics over the whole tree.
    pub fn confidence_summary(&self) -> ConfidenceSummary {
        self.confidence_summary_of(Self::ROOT)
    }

    /// Flattened records of every non-root node, in preorder.
    pub fn records(&self) -> Vec<Vec<(String, AttrValue)>> {
        self.iter()
            .skip(1)
            .map(|n| self[n].record(!self.children(n).is_empty()))
            .collect()
    }

    fn subtree_eq(&self, a: NodeId, other: &BoxTree, b: NodeId) -> bool {
        let (ca, cb) = (self.children(a), other.children(b));
        self[a].record(!ca.is_empty()) == other[b].record(!cb.is_empty())
            && ca.len() == cb.len()
            && ca
                .iter()
                .zip(cb)
                .all(|(&x, &y)| self.subtree_eq(x, other, y))
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, node: NodeId, depth: usize) -> fmt::Result {
        let data = &self[node];
        let r = data.rect;
        writeln!(
            f,
            "{:indent$}{:?} [{}, {}, {}, {}] {:?}",
            "",
            data.box_type,
            r.left,
            r.top,
            r.right,
            r.bottom,
            data.text,
            indent = depth * 2
        )?;
        for &child in self.children(node) {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl Index<NodeId> for BoxTree {
    type Output = OcrBox;

    fn index(&self, node: NodeId) -> &OcrBox {
        &self.nodes[node.0].data
    }
}

impl IndexMut<NodeId> for BoxTree {
    fn index_mut(&mut self, node: NodeId) -> &mut OcrBox {
        &mut self.nodes[node.0].data
    }
}

impl PartialEq for BoxTree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root(), other, other.root())
    }
}

impl fmt::Display for BoxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root(), 0)
    }
}

/// Lazy preorder iterator, see [`BoxTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a BoxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(node).iter().rev().copied());
        Some(node)
    }
}

/// Lazy reverse-order iterator, see [`BoxTree::reverse_order`].
pub struct ReverseOrder<'a> {
    tree: &'a BoxTree,
    // (node, children not yet visited, counted from the front)
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for ReverseOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let top = self.stack.last_mut()?;
            if top.1 == 0 {
                return self.stack.pop().map(|(node, _)| node);
            }
            top.1 -= 1;
            let child = self.tree.children(top.0)[top.1];
            let remaining = self.tree.children(child).len();
            self.stack.push((child, remaining));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::FEATURE_KEY;
    use crate::geometry::Rect;

    fn word(text: &str, conf: f64) -> OcrBox {
        OcrBox::new(BoxType::TesseractWord, Rect::new(0, 0, 10, 10), Some(conf), text)
    }

    fn structural(box_type: BoxType) -> OcrBox {
        OcrBox::new(box_type, Rect::new(0, 0, 100, 100), None, "")
    }

    /// document > page > paragraph > line > [12, Ala] ; page > paragraph > line > [+48]
    fn sample_tree() -> BoxTree {
        let mut tree = BoxTree::new();
        tree.insert_by_type(structural(BoxType::TesseractDocument)).unwrap();
        for words in [&["12", "Ala"][..], &["+48"][..]] {
            tree.insert_by_type(structural(BoxType::TesseractPage)).unwrap();
            tree.insert_by_type(structural(BoxType::TesseractParagraph)).unwrap();
            tree.insert_by_type(structural(BoxType::TesseractLine)).unwrap();
            for w in words {
                tree.insert_by_type(word(w, 95.0)).unwrap();
            }
        }
        tree
    }

    fn codes(tree: &BoxTree, nodes: impl Iterator<Item = NodeId>) -> Vec<i64> {
        nodes.map(|n| tree[n].box_type.code()).collect()
    }

    #[test]
    fn new_tree_is_empty_root() {
        let tree = BoxTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[tree.root()].box_type, BoxType::Root);
        assert!(tree[tree.root()].id.is_none());
    }

    #[test]
    fn preorder_follows_insertion_levels() {
        let tree = sample_tree();
        assert_eq!(
            codes(&tree, tree.iter()),
            vec![0, 1, 2, 3, 4, 5, 5, 2, 3, 4, 5]
        );
    }

    #[test]
    fn reverse_order_is_reversed_preorder() {
        let tree = sample_tree();
        let mut pre: Vec<NodeId> = tree.iter().collect();
        pre.reverse();
        let rev: Vec<NodeId> = tree.reverse_order(tree.root()).collect();
        assert_eq!(pre, rev);
        assert_eq!(rev.last(), Some(&tree.root()));
    }

    #[test]
    fn traversal_is_restartable() {
        let tree = sample_tree();
        let first: Vec<NodeId> = tree.iter().collect();
        let second: Vec<NodeId> = tree.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn insert_by_type_uses_nearest_ancestor() {
        let tree = sample_tree();
        let pages = tree.subboxes(tree.root(), Some(BoxType::TesseractPage));
        assert_eq!(pages.len(), 2);
        // the last word went under the second page's line
        let last_line = tree.subboxes(pages[1], Some(BoxType::TesseractLine))[0];
        assert_eq!(tree.full_text(last_line), "+48");
    }

    #[test]
    fn insert_by_type_without_ancestor_fails() {
        let mut tree = BoxTree::new();
        let err = tree.insert_by_type(word("x", 1.0)).unwrap_err();
        assert_eq!(
            err.as_structure(),
            Some(&StructureError::NoParentSlot {
                box_type: BoxType::TesseractWord,
                expected: Some(BoxType::TesseractLine),
            })
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn add_child_registers_in_index() {
        let mut tree = BoxTree::new();
        let page = tree.add_child(tree.root(), OcrBox::page(0, None).with_id("p0")).unwrap();
        let w = tree.add_child(page, word("x", 50.0).with_id("w0")).unwrap();
        assert_eq!(tree.find("p0"), Some(page));
        assert_eq!(tree.find("w0"), Some(w));
        assert_eq!(tree.parent(w), Some(page));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn add_child_rejects_second_root() {
        let mut tree = BoxTree::new();
        let err = tree.add_child(tree.root(), OcrBox::root()).unwrap_err();
        assert_eq!(err.as_structure(), Some(&StructureError::SecondRoot));
    }

    #[test]
    fn add_child_rejects_duplicate_id() {
        let mut tree = BoxTree::new();
        tree.add_child(tree.root(), word("a", 1.0).with_id("same")).unwrap();
        let err = tree
            .add_child(tree.root(), word("b", 1.0).with_id("same"))
            .unwrap_err();
        assert_eq!(
            err.as_structure(),
            Some(&StructureError::DuplicateId("same".to_string()))
        );
    }

    #[test]
    fn graft_copies_subtree_and_indexes_every_node() {
        let source = sample_tree();
        let mut tree = BoxTree::new();
        let doc = source.children(source.root())[0];
        let copied = tree.graft(tree.root(), &source, doc).unwrap();
        assert_eq!(tree.len(), source.len());
        for n in source.iter().skip(1) {
            let id = source[n].id.as_deref().unwrap();
            assert!(tree.find(id).is_some());
        }
        assert_eq!(tree.full_text(copied), "12 Ala +48");
    }

    #[test]
    fn graft_rejects_root_subtree() {
        let source = sample_tree();
        let mut tree = BoxTree::new();
        let err = tree.graft(tree.root(), &source, source.root()).unwrap_err();
        assert_eq!(err.as_structure(), Some(&StructureError::SecondRoot));
        assert!(tree.is_empty());
    }

    #[test]
    fn graft_collision_leaves_tree_unchanged() {
        let source = sample_tree();
        let mut tree = source.clone();
        let doc = source.children(source.root())[0];
        let before = tree.len();
        assert!(tree.graft(tree.root(), &source, doc).is_err());
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn subboxes_and_full_text() {
        let tree = sample_tree();
        let doc = tree.children(tree.root())[0];
        assert_eq!(
            codes(&tree, tree.subboxes(doc, None).into_iter()),
            vec![2, 3, 4, 5, 5, 2, 3, 4, 5]
        );
        assert_eq!(tree.subboxes(doc, Some(BoxType::TesseractWord)).len(), 3);
        assert_eq!(tree.full_text(tree.root()), "12 Ala +48");
        assert!(tree.has_any_text(tree.root()));
        assert!(!BoxTree::new().has_any_text(BoxTree::new().root()));
    }

    #[test]
    fn merge_children_joins_text_and_geometry() {
        let mut tree = BoxTree::new();
        let root = tree.root();
        tree.add_child(
            root,
            OcrBox::new(BoxType::IdrsWord, Rect::new(10, 20, 30, 25), Some(100.0), "t1"),
        )
        .unwrap();
        let second = tree
            .add_child(
                root,
                OcrBox::new(BoxType::IdrsWord, Rect::new(110, 120, 130, 125), Some(50.0), "t2"),
            )
            .unwrap();
        let second_id = tree[second].id.clone().unwrap();

        tree.merge_children(root, 0, 1).unwrap();

        assert_eq!(tree.children(root).len(), 1);
        let merged = &tree[tree.children(root)[0]];
        assert_eq!(merged.rect, Rect::new(10, 20, 130, 125));
        assert_eq!(merged.conf, Some(100.0));
        assert_eq!(merged.text, "t1t2");
        assert!(tree.find(&second_id).is_none());
        assert!(!tree.is_attached(second));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn merge_children_checks_indices() {
        let mut tree = sample_tree();
        let root = tree.root();
        let err = tree.merge_children(root, 0, 3).unwrap_err();
        assert_eq!(
            err.as_structure(),
            Some(&StructureError::ChildIndex { index: 3, len: 1 })
        );
        assert!(tree.merge_children(root, 0, 0).is_err());
    }

    #[test]
    fn confidence_summary_weights_by_length() {
        let mut tree = BoxTree::new();
        let root = tree.root();
        tree.add_child(root, word("ab", 100.0)).unwrap();
        tree.add_child(root, word("cde", 90.0)).unwrap();
        let summary = tree.confidence_summary();
        assert!((summary.avg_confidence - 94.0).abs() < 1e-9);
        assert_eq!(summary.total_letters, 5.0);
        assert_eq!(summary.avg_letters_per_box, 2.5);
    }

    #[test]
    fn confidence_summary_of_empty_tree_is_zero() {
        assert_eq!(
            BoxTree::new().confidence_summary(),
            ConfidenceSummary {
                avg_confidence: 0.0,
                total_letters: 0.0,
                avg_letters_per_box: 0.0,
            }
        );
    }

    #[test]
    fn confidence_summary_ignores_inner_nodes() {
        let tree = sample_tree();
        let summary = tree.confidence_summary();
        assert!((summary.avg_confidence - 95.0).abs() < 1e-9);
        assert_eq!(summary.total_letters, 8.0);
    }

    #[test]
    fn ancestor_attribute_walks_to_root() {
        let mut tree = BoxTree::new();
        let page = tree
            .add_child(tree.root(), OcrBox::page(4, Some((100, 200))))
            .unwrap();
        let line = tree.add_child(page, structural(BoxType::Custom)).unwrap();
        let w = tree.add_child(line, word("x", 1.0)).unwrap();
        assert_eq!(
            tree.ancestor_attribute(w, PAGE_NUMBER_KEY),
            Some(&AttrValue::Int(4))
        );
        assert_eq!(tree.ancestor_attribute(w, "missing"), None);
    }

    #[test]
    fn recalculate_index_only_on_root() {
        let mut tree = sample_tree();
        let doc = tree.children(tree.root())[0];
        let err = tree.recalculate_index(doc).unwrap_err();
        assert_eq!(
            err.as_structure(),
            Some(&StructureError::NotRoot("recalculate_index"))
        );
        let w = tree.subboxes(tree.root(), Some(BoxType::TesseractWord))[0];
        tree[w].id = Some("renamed".to_string());
        tree.recalculate_index(tree.root()).unwrap();
        assert_eq!(tree.find("renamed"), Some(w));
        assert_eq!(tree.len(), 11);
    }

    #[test]
    fn replace_children_swaps_subtree() {
        let mut tree = sample_tree();
        let line = tree.subboxes(tree.root(), Some(BoxType::TesseractLine))[0];
        let old_words: Vec<String> = tree
            .children(line)
            .iter()
            .map(|&w| tree[w].id.clone().unwrap())
            .collect();

        let mut replacement = BoxTree::new();
        replacement.add_child(replacement.root(), word("new", 80.0)).unwrap();
        tree.replace_children(line, &replacement).unwrap();

        assert_eq!(tree.full_text(line), "new");
        for id in old_words {
            assert!(tree.find(&id).is_none());
        }
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn add_pages_renumbers() {
        let mut first = BoxTree::new();
        first.add_child(first.root(), OcrBox::page(0, None)).unwrap();
        let mut second = BoxTree::new();
        let p = second.add_child(second.root(), OcrBox::page(0, None)).unwrap();
        second.add_child(p, word("c1-13:6", 90.0)).unwrap();

        first.add_pages(&[second]).unwrap();

        let pages = first.children(first.root()).to_vec();
        assert_eq!(pages.len(), 2);
        for (i, &page) in pages.iter().enumerate() {
            assert_eq!(first[page].attribute(PAGE_NUMBER_KEY), Some(&AttrValue::Int(i as i64)));
        }
        assert_eq!(first.full_text(pages[1]), "c1-13:6");
    }

    #[test]
    fn add_pages_rejects_non_pages() {
        let mut tree = BoxTree::new();
        let err = tree.add_pages(&[sample_tree()]).unwrap_err();
        assert!(matches!(
            err.as_structure(),
            Some(StructureError::WrongBoxType { .. })
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn full_extent() {
        let mut tree = BoxTree::new();
        let root = tree.root();
        tree.add_child(root, OcrBox::new(BoxType::Custom, Rect::new(5, 10, 20, 30), None, ""))
            .unwrap();
        tree.add_child(root, OcrBox::new(BoxType::Custom, Rect::new(0, 40, 15, 50), None, ""))
            .unwrap();
        assert_eq!(tree.full_height(root), Some(40));
        assert_eq!(tree.full_width(root), Some(20));
        assert_eq!(BoxTree::new().full_width(root), None);
    }

    #[test]
    fn position_in_parent() {
        let tree = sample_tree();
        let line = tree.subboxes(tree.root(), Some(BoxType::TesseractLine))[0];
        let words = tree.children(line);
        assert_eq!(tree.position_in_parent(words[1]), 1);
        assert_eq!(tree.position_in_parent(tree.root()), 0);
        assert_eq!(tree.root_of(words[1]), tree.root());
    }

    #[test]
    fn equality_is_structural() {
        let tree = sample_tree();
        let copy = tree.clone();
        assert_eq!(tree, copy);

        let mut changed = tree.clone();
        let w = changed.subboxes(changed.root(), Some(BoxType::TesseractWord))[0];
        changed[w].text = "13".to_string();
        assert_ne!(tree, changed);
    }

    #[test]
    fn equality_treats_null_attribute_as_absent() {
        let tree = sample_tree();
        let mut marked = tree.clone();
        let w = marked.subboxes(marked.root(), Some(BoxType::TesseractWord))[0];
        marked[w].set_attribute(FEATURE_KEY, AttrValue::Null);
        assert_eq!(tree, marked);
        marked[w].set_attribute(FEATURE_KEY, "Number");
        assert_ne!(tree, marked);
    }

    #[test]
    fn display_outline() {
        let mut tree = BoxTree::new();
        tree.add_child(tree.root(), OcrBox::new(BoxType::Custom, Rect::new(1, 2, 3, 4), None, "hi"))
            .unwrap();
        let rendered = tree.to_string();
        assert_eq!(
            rendered,
            "Root [-1, -1, -1, -1] \"\"\n  Custom [1, 2, 3, 4] \"hi\"\n"
        );
    }
}
