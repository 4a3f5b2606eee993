//! Model tree for Horizon Designer.
//!
//! Provides the object graph the designer keeps in sync with source code:
//! - Unique node identifiers via arena-based storage
//! - Parent-child relationships with cascade destroy
//! - Ordered children (order is meaningful, it mirrors source order)
//! - A per-node annotation side table for transient data
//!
//! # Key Types
//!
//! - [`NodeId`] - Stable identifier for each node
//! - [`ModelTree`] - The arena owning every node and its payload
//! - [`PayloadSnapshot`] - Saved payloads used to undo an aborted edit
//!
//! The tree is generic over its payload. The designer crate stores component
//! strategies in it; tests use plain strings.

use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};

use slotmap::{new_key_type, SlotMap};

use crate::error::{ModelError, ModelResult};

new_key_type! {
    /// A unique identifier for a node in a [`ModelTree`].
    ///
    /// `NodeId`s stay valid while the tree is edited and become invalid when
    /// the node is destroyed. A destroyed id never aliases another node.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    ///
    /// Useful for interop with callers that need a numeric id (canvas, outline).
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a NodeId from a raw u64 value.
    ///
    /// This does not check that the node exists in any tree.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Internal data stored in the arena for each node.
struct NodeData<T> {
    payload: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Transient annotations, never persisted to source.
    annotations: HashMap<String, Box<dyn Any + Send>>,
}

impl<T> NodeData<T> {
    fn new(payload: T, parent: Option<NodeId>) -> Self {
        Self {
            payload,
            parent,
            children: Vec::new(),
            annotations: HashMap::new(),
        }
    }
}

/// The arena that owns every node of one design and its relationships.
///
/// Exactly one node is the root; every other node has exactly one parent.
///
/// # Example
///
/// ```
/// use horizon_designer_core::ModelTree;
///
/// let mut tree = ModelTree::new();
/// let root = tree.set_root("frame").unwrap();
/// let button = tree.push_child(root, "button").unwrap();
///
/// assert_eq!(tree.parent(button).unwrap(), Some(root));
/// assert_eq!(tree.children(root).unwrap(), &[button]);
/// ```
pub struct ModelTree<T> {
    nodes: SlotMap<NodeId, NodeData<T>>,
    root: Option<NodeId>,
}

impl<T> ModelTree<T> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    /// Install the root node.
    pub fn set_root(&mut self, payload: T) -> ModelResult<NodeId> {
        if self.root.is_some() {
            return Err(ModelError::RootAlreadySet);
        }
        let id = self.nodes.insert(NodeData::new(payload, None));
        self.root = Some(id);
        tracing::trace!(target: "horizon_designer_core::model", ?id, "installed root node");
        Ok(id)
    }

    /// The root node, if one has been installed.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Insert a new node as the child of `parent` at `index`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, payload: T) -> ModelResult<NodeId> {
        let len = self.children(parent)?.len();
        if index > len {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }
        let id = self.nodes.insert(NodeData::new(payload, Some(parent)));
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.insert(index, id);
        }
        tracing::trace!(target: "horizon_designer_core::model", ?id, ?parent, index, "inserted node");
        Ok(id)
    }

    /// Append a new node as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, payload: T) -> ModelResult<NodeId> {
        let len = self.children(parent)?.len();
        self.insert_child(parent, len, payload)
    }

    /// Move a node under `new_parent` at `index`.
    ///
    /// `index` is interpreted after the node was removed from its old parent,
    /// so moving within the same parent uses final positions. Returns the old
    /// parent and the old index.
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        index: usize,
    ) -> ModelResult<(NodeId, usize)> {
        let old_parent = self.parent(id)?.ok_or(ModelError::RootIsDetached)?;
        if !self.nodes.contains_key(new_parent) {
            return Err(ModelError::InvalidNodeId);
        }
        if self.is_ancestor_of(id, new_parent)? {
            return Err(ModelError::CircularParentage);
        }
        let old_index = self.index_of(id)?.ok_or(ModelError::InvalidNodeId)?;
        let new_len = if old_parent == new_parent {
            self.children(new_parent)?.len() - 1
        } else {
            self.children(new_parent)?.len()
        };
        if index > new_len {
            return Err(ModelError::IndexOutOfBounds {
                index,
                len: new_len,
            });
        }

        if let Some(parent_data) = self.nodes.get_mut(old_parent) {
            parent_data.children.retain(|&child| child != id);
        }
        if let Some(parent_data) = self.nodes.get_mut(new_parent) {
            parent_data.children.insert(index, id);
        }
        if let Some(data) = self.nodes.get_mut(id) {
            data.parent = Some(new_parent);
        }
        tracing::trace!(
            target: "horizon_designer_core::model",
            ?id, ?old_parent, old_index, ?new_parent, index,
            "moved node"
        );
        Ok((old_parent, old_index))
    }

    /// Remove a node and all its descendants from the tree.
    ///
    /// Returns the removed ids in post-order (children before parents).
    #[tracing::instrument(skip(self), target = "horizon_designer_core::model", level = "trace")]
    pub fn destroy(&mut self, id: NodeId) -> ModelResult<Vec<NodeId>> {
        let removed = self.depth_first_postorder(id)?;
        tracing::trace!(target: "horizon_designer_core::model", ?id, count = removed.len(), "destroying subtree");

        if let Some(parent_id) = self.nodes.get(id).and_then(|d| d.parent) {
            if let Some(parent_data) = self.nodes.get_mut(parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
        }
        for &node in &removed {
            self.nodes.remove(node);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        Ok(removed)
    }

    /// Check if a node exists in the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// The number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow the payload of a node.
    pub fn get(&self, id: NodeId) -> ModelResult<&T> {
        self.nodes
            .get(id)
            .map(|d| &d.payload)
            .ok_or(ModelError::InvalidNodeId)
    }

    /// Mutably borrow the payload of a node.
    pub fn get_mut(&mut self, id: NodeId) -> ModelResult<&mut T> {
        self.nodes
            .get_mut(id)
            .map(|d| &mut d.payload)
            .ok_or(ModelError::InvalidNodeId)
    }

    /// Iterate over all nodes with their payloads, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.nodes.iter().map(|(id, d)| (id, &d.payload))
    }

    /// Iterate mutably over all payloads, in arena order.
    pub fn payloads_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.nodes.values_mut().map(|d| &mut d.payload)
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> ModelResult<Option<NodeId>> {
        self.nodes
            .get(id)
            .map(|d| d.parent)
            .ok_or(ModelError::InvalidNodeId)
    }

    /// Get the ordered children of a node.
    pub fn children(&self, id: NodeId) -> ModelResult<&[NodeId]> {
        self.nodes
            .get(id)
            .map(|d| d.children.as_slice())
            .ok_or(ModelError::InvalidNodeId)
    }

    /// Get the index of a node among its siblings.
    ///
    /// Returns `None` for the root.
    pub fn index_of(&self, id: NodeId) -> ModelResult<Option<usize>> {
        let data = self.nodes.get(id).ok_or(ModelError::InvalidNodeId)?;
        let Some(parent_id) = data.parent else {
            return Ok(None);
        };
        let parent_data = self.nodes.get(parent_id).ok_or(ModelError::InvalidNodeId)?;
        Ok(parent_data.children.iter().position(|&child| child == id))
    }

    /// Get the next sibling.
    pub fn next_sibling(&self, id: NodeId) -> ModelResult<Option<NodeId>> {
        let Some(parent) = self.parent(id)? else {
            return Ok(None);
        };
        let siblings = self.children(parent)?;
        Ok(siblings
            .iter()
            .position(|&c| c == id)
            .and_then(|pos| siblings.get(pos + 1).copied()))
    }

    /// Get the previous sibling.
    pub fn previous_sibling(&self, id: NodeId) -> ModelResult<Option<NodeId>> {
        let Some(parent) = self.parent(id)? else {
            return Ok(None);
        };
        let siblings = self.children(parent)?;
        Ok(siblings
            .iter()
            .position(|&c| c == id)
            .and_then(|pos| pos.checked_sub(1))
            .map(|pos| siblings[pos]))
    }

    /// Check if `potential_ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_of(&self, potential_ancestor: NodeId, id: NodeId) -> ModelResult<bool> {
        if !self.nodes.contains_key(id) {
            return Err(ModelError::InvalidNodeId);
        }
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return Ok(true);
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        Ok(false)
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Attach a transient annotation to a node.
    pub fn set_annotation<V: Any + Send>(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: V,
    ) -> ModelResult<()> {
        let data = self.nodes.get_mut(id).ok_or(ModelError::InvalidNodeId)?;
        data.annotations.insert(key.into(), Box::new(value));
        Ok(())
    }

    /// Read an annotation, if present and of type `V`.
    pub fn annotation<V: Any>(&self, id: NodeId, key: &str) -> ModelResult<Option<&V>> {
        let data = self.nodes.get(id).ok_or(ModelError::InvalidNodeId)?;
        Ok(data.annotations.get(key).and_then(|v| v.downcast_ref::<V>()))
    }

    /// Remove an annotation from a node.
    pub fn remove_annotation(
        &mut self,
        id: NodeId,
        key: &str,
    ) -> ModelResult<Option<Box<dyn Any + Send>>> {
        let data = self.nodes.get_mut(id).ok_or(ModelError::InvalidNodeId)?;
        Ok(data.annotations.remove(key))
    }

    /// Names of all annotations on a node.
    pub fn annotation_keys(&self, id: NodeId) -> ModelResult<Vec<&str>> {
        let data = self.nodes.get(id).ok_or(ModelError::InvalidNodeId)?;
        Ok(data.annotations.keys().map(String::as_str).collect())
    }

    // =========================================================================
    // Tree Traversal
    // =========================================================================

    /// Get all ancestors of a node from immediate parent to root.
    pub fn ancestors(&self, id: NodeId) -> ModelResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = self.parent(id)?;
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Depth-first pre-order traversal: node, then its children recursively.
    pub fn depth_first_preorder(&self, id: NodeId) -> ModelResult<Vec<NodeId>> {
        let mut result = Vec::new();
        self.preorder_recursive(id, &mut result)?;
        Ok(result)
    }

    fn preorder_recursive(&self, id: NodeId, result: &mut Vec<NodeId>) -> ModelResult<()> {
        let data = self.nodes.get(id).ok_or(ModelError::InvalidNodeId)?;
        result.push(id);
        for &child_id in &data.children {
            self.preorder_recursive(child_id, result)?;
        }
        Ok(())
    }

    /// Depth-first post-order traversal: children recursively, then the node.
    pub fn depth_first_postorder(&self, id: NodeId) -> ModelResult<Vec<NodeId>> {
        let mut result = Vec::new();
        self.postorder_recursive(id, &mut result)?;
        Ok(result)
    }

    fn postorder_recursive(&self, id: NodeId, result: &mut Vec<NodeId>) -> ModelResult<()> {
        let data = self.nodes.get(id).ok_or(ModelError::InvalidNodeId)?;
        for &child_id in &data.children {
            self.postorder_recursive(child_id, result)?;
        }
        result.push(id);
        Ok(())
    }

    /// Breadth-first (level-order) traversal.
    pub fn breadth_first(&self, id: NodeId) -> ModelResult<Vec<NodeId>> {
        if !self.nodes.contains_key(id) {
            return Err(ModelError::InvalidNodeId);
        }
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(id);
        while let Some(current_id) = queue.pop_front() {
            result.push(current_id);
            if let Some(data) = self.nodes.get(current_id) {
                queue.extend(data.children.iter().copied());
            }
        }
        Ok(result)
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    /// Verify the single-parent invariant over the whole arena.
    ///
    /// Every node except the root must appear in exactly one children list,
    /// and that list must belong to its recorded parent.
    pub fn check_integrity(&self) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for (id, data) in &self.nodes {
            for &child in &data.children {
                if !seen.insert(child) {
                    return Err(ModelError::Integrity(format!("{child:?} listed twice")));
                }
                let child_parent = self.nodes.get(child).and_then(|d| d.parent);
                if child_parent != Some(id) {
                    return Err(ModelError::Integrity(format!(
                        "{child:?} listed under {id:?} but parent is {child_parent:?}"
                    )));
                }
            }
        }
        for (id, data) in &self.nodes {
            match data.parent {
                None if self.root != Some(id) => {
                    return Err(ModelError::Integrity(format!("{id:?} has no parent")));
                }
                Some(_) if !seen.contains(&id) => {
                    return Err(ModelError::Integrity(format!("{id:?} is not listed by its parent")));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl<T: Clone> ModelTree<T> {
    /// Save every payload so an aborted edit can restore them.
    pub fn snapshot(&self) -> PayloadSnapshot<T> {
        PayloadSnapshot {
            payloads: self
                .nodes
                .iter()
                .map(|(id, d)| (id, d.payload.clone()))
                .collect(),
        }
    }

    /// Restore payloads saved by [`snapshot`](Self::snapshot).
    ///
    /// Nodes destroyed since the snapshot are ignored.
    pub fn restore(&mut self, snapshot: PayloadSnapshot<T>) {
        for (id, payload) in snapshot.payloads {
            if let Some(data) = self.nodes.get_mut(id) {
                data.payload = payload;
            }
        }
    }
}

impl<T> Default for ModelTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Payloads saved before an edit, keyed by node.
pub struct PayloadSnapshot<T> {
    payloads: Vec<(NodeId, T)>,
}

impl<T> PayloadSnapshot<T> {
    /// Number of saved payloads.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Whether no payload was saved.
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //       root
    //      /    \
    //   child1  child2
    //     |
    //  grandchild
    fn sample() -> (ModelTree<&'static str>, [NodeId; 4]) {
        let mut tree = ModelTree::new();
        let root = tree.set_root("root").unwrap();
        let child1 = tree.push_child(root, "child1").unwrap();
        let child2 = tree.push_child(root, "child2").unwrap();
        let grandchild = tree.push_child(child1, "grandchild").unwrap();
        (tree, [root, child1, child2, grandchild])
    }

    #[test]
    fn test_single_root() {
        let mut tree = ModelTree::new();
        tree.set_root(1).unwrap();
        assert_eq!(tree.set_root(2), Err(ModelError::RootAlreadySet));
    }

    #[test]
    fn test_insert_at_index() {
        let (mut tree, [root, child1, child2, _]) = sample();
        let first = tree.insert_child(root, 0, "first").unwrap();
        assert_eq!(tree.children(root).unwrap(), &[first, child1, child2]);
        assert_eq!(tree.index_of(child2).unwrap(), Some(2));
        assert!(matches!(
            tree.insert_child(root, 9, "x"),
            Err(ModelError::IndexOutOfBounds { index: 9, len: 3 })
        ));
    }

    #[test]
    fn test_cascade_destroy() {
        let (mut tree, [root, child1, child2, grandchild]) = sample();
        let removed = tree.destroy(child1).unwrap();
        assert_eq!(removed, vec![grandchild, child1]);
        assert!(!tree.contains(child1));
        assert!(!tree.contains(grandchild));
        assert_eq!(tree.children(root).unwrap(), &[child2]);
        assert_eq!(tree.get(grandchild), Err(ModelError::InvalidNodeId));
        tree.check_integrity().unwrap();
    }

    #[test]
    fn test_move_within_parent() {
        let (mut tree, [root, child1, child2, _]) = sample();
        let (old_parent, old_index) = tree.move_node(child2, root, 0).unwrap();
        assert_eq!((old_parent, old_index), (root, 1));
        assert_eq!(tree.children(root).unwrap(), &[child2, child1]);
        tree.check_integrity().unwrap();
    }

    #[test]
    fn test_reparent() {
        let (mut tree, [root, child1, child2, _]) = sample();
        tree.move_node(child2, child1, 0).unwrap();
        assert_eq!(tree.parent(child2).unwrap(), Some(child1));
        assert_eq!(tree.children(root).unwrap(), &[child1]);
        tree.check_integrity().unwrap();
    }

    #[test]
    fn test_circular_parentage_rejected() {
        let (mut tree, [_, child1, _, grandchild]) = sample();
        assert_eq!(
            tree.move_node(child1, grandchild, 0),
            Err(ModelError::CircularParentage)
        );
    }

    #[test]
    fn test_root_cannot_move() {
        let (mut tree, [root, child1, _, _]) = sample();
        assert_eq!(tree.move_node(root, child1, 0), Err(ModelError::RootIsDetached));
    }

    #[test]
    fn test_siblings() {
        let (tree, [root, child1, child2, _]) = sample();
        assert_eq!(tree.next_sibling(child1).unwrap(), Some(child2));
        assert_eq!(tree.previous_sibling(child2).unwrap(), Some(child1));
        assert_eq!(tree.previous_sibling(child1).unwrap(), None);
        assert_eq!(tree.next_sibling(root).unwrap(), None);
    }

    #[test]
    fn test_traversals() {
        let (tree, [root, child1, child2, grandchild]) = sample();
        assert_eq!(
            tree.depth_first_preorder(root).unwrap(),
            vec![root, child1, grandchild, child2]
        );
        assert_eq!(
            tree.depth_first_postorder(root).unwrap(),
            vec![grandchild, child1, child2, root]
        );
        assert_eq!(
            tree.breadth_first(root).unwrap(),
            vec![root, child1, child2, grandchild]
        );
        assert_eq!(tree.ancestors(grandchild).unwrap(), vec![child1, root]);
    }

    #[test]
    fn test_annotations() {
        let (mut tree, [_, child1, _, _]) = sample();
        tree.set_annotation(child1, "decoration", 7u32).unwrap();
        assert_eq!(tree.annotation::<u32>(child1, "decoration").unwrap(), Some(&7));
        assert_eq!(tree.annotation::<String>(child1, "decoration").unwrap(), None);
        assert!(tree.remove_annotation(child1, "decoration").unwrap().is_some());
        assert!(tree.annotation_keys(child1).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut tree, [root, child1, _, _]) = sample();
        let snapshot = tree.snapshot();
        assert_eq!(snapshot.len(), 4);
        *tree.get_mut(child1).unwrap() = "changed";
        tree.restore(snapshot);
        assert_eq!(*tree.get(child1).unwrap(), "child1");
        assert_eq!(*tree.get(root).unwrap(), "root");
    }

    #[test]
    fn test_raw_id_roundtrip() {
        let (_, [root, ..]) = sample();
        assert_eq!(NodeId::from_raw(root.as_raw()), root);
    }
}
