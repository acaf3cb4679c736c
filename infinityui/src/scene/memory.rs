//! In-memory scene graph host.
//!
//! [`MemoryScene`] stands in for a real UI runtime: a tree of named display
//! nodes whose members are either child nodes or scalar values. Stacking
//! orders follow the display-list rules interface runtimes use: authored
//! nodes sit at negative depths, new nodes go above the highest depth, and a
//! node left at a negative depth cannot be removed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::snapshot::{SceneSnapshot, SnapshotMember};
use super::SceneHost;
use crate::address::NodeAddress;

/// Identifier of a node in a [`MemoryScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A non-node member value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Undefined,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Undefined => f.write_str("undefined"),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Number(n) => write!(f, "{}", n),
            ScalarValue::Text(s) => f.write_str(s),
        }
    }
}

/// A value resolved from a [`MemoryScene`].
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryValue {
    Node(NodeId),
    Scalar(ScalarValue),
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::Node(id) => write!(f, "[node {}]", id),
            MemoryValue::Scalar(value) => value.fmt(f),
        }
    }
}

#[derive(Debug, Clone)]
enum Member {
    Node(NodeId),
    Scalar(ScalarValue),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    name: String,
    parent: Option<NodeId>,
    depth: i32,
    asset: Option<String>,
    members: BTreeMap<String, Member>,
}

impl NodeEntry {
    fn new(name: &str, parent: Option<NodeId>, depth: i32) -> Self {
        Self {
            name: name.to_string(),
            parent,
            depth,
            asset: None,
            members: BTreeMap::new(),
        }
    }
}

/// Scene graph held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: HashMap<NodeId, NodeEntry>,
    root: NodeId,
    next_id: u32,
    refused_removals: usize,
}

impl MemoryScene {
    /// Create a scene holding only the root node.
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, NodeEntry::new("_root", None, 0));
        Self {
            nodes,
            root,
            next_id: 1,
            refused_removals: 0,
        }
    }

    /// Build a scene from a snapshot.
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Self {
        let mut scene = Self::new();
        let root = scene.root;
        if let Some(entry) = scene.nodes.get_mut(&root) {
            entry.asset = snapshot.asset.clone();
        }

        let mut stack = vec![(snapshot, root)];
        while let Some((node, id)) = stack.pop() {
            for (name, member) in &node.members {
                match member {
                    SnapshotMember::Node(child) => {
                        let child_id = scene.add_node(id, name, child.depth);
                        if let Some(entry) = scene.nodes.get_mut(&child_id) {
                            entry.asset = child.asset.clone();
                        }
                        stack.push((child, child_id));
                    }
                    SnapshotMember::Scalar(value) => scene.set_scalar(id, name, value.clone()),
                }
            }
        }

        scene
    }

    /// Capture the current tree as a snapshot.
    pub fn to_snapshot(&self) -> SceneSnapshot {
        // Post-order over an explicit stack: children are finished before
        // their parent collects them.
        let mut finished: HashMap<NodeId, SceneSnapshot> = HashMap::new();
        let mut stack = vec![(self.root, false)];

        while let Some((id, expanded)) = stack.pop() {
            let Some(entry) = self.nodes.get(&id) else {
                continue;
            };

            if !expanded {
                stack.push((id, true));
                stack.extend(entry.members.values().filter_map(|m| match m {
                    Member::Node(child) => Some((*child, false)),
                    Member::Scalar(_) => None,
                }));
                continue;
            }

            let members = entry
                .members
                .iter()
                .filter_map(|(name, member)| {
                    let member = match member {
                        Member::Node(child) => SnapshotMember::Node(finished.remove(child)?),
                        Member::Scalar(value) => SnapshotMember::Scalar(value.clone()),
                    };
                    Some((name.clone(), member))
                })
                .collect();

            finished.insert(
                id,
                SceneSnapshot {
                    depth: entry.depth,
                    asset: entry.asset.clone(),
                    members,
                },
            );
        }

        finished.remove(&self.root).unwrap_or_default()
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a child node, replacing any member of the same name.
    ///
    /// A parent that is no longer in the tree gets nothing: the returned id
    /// is fresh but never inserted, so [`contains`](Self::contains) reports
    /// it as gone.
    pub fn add_node(&mut self, parent: NodeId, name: &str, depth: i32) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        if !self.nodes.contains_key(&parent) {
            debug!(parent = %parent, name, "Refusing to add a node under a removed parent");
            return id;
        }

        self.nodes.insert(id, NodeEntry::new(name, Some(parent), depth));
        self.set_member(parent, name, Member::Node(id));
        id
    }

    /// Set a scalar member, replacing any member of the same name.
    pub fn set_scalar(&mut self, parent: NodeId, name: &str, value: ScalarValue) {
        self.set_member(parent, name, Member::Scalar(value));
    }

    fn set_member(&mut self, parent: NodeId, name: &str, member: Member) {
        let previous = match self.nodes.get_mut(&parent) {
            Some(entry) => entry.members.insert(name.to_string(), member),
            None => return,
        };
        if let Some(Member::Node(old)) = previous {
            self.drop_subtree(old);
        }
    }

    /// Whether `id` is still part of the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Name of a node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|e| e.name.as_str())
    }

    /// Stacking order of a node.
    pub fn depth(&self, id: NodeId) -> Option<i32> {
        self.nodes.get(&id).map(|e| e.depth)
    }

    /// Asset last loaded into a node.
    pub fn loaded_asset(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).and_then(|e| e.asset.as_deref())
    }

    /// Resolve an address to a node id, ignoring scalars.
    pub fn node_at(&self, address: &str) -> Option<NodeId> {
        match self.resolve(&NodeAddress::new(address))? {
            MemoryValue::Node(id) => Some(id),
            MemoryValue::Scalar(_) => None,
        }
    }

    /// How many removals were refused because the node sat at a negative depth.
    pub fn refused_removals(&self) -> usize {
        self.refused_removals
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.nodes.remove(&current) {
                stack.extend(entry.members.values().filter_map(|m| match m {
                    Member::Node(child) => Some(*child),
                    Member::Scalar(_) => None,
                }));
            }
        }
    }

    fn child_nodes(&self, parent: NodeId) -> impl Iterator<Item = (NodeId, &NodeEntry)> {
        self.nodes
            .get(&parent)
            .into_iter()
            .flat_map(|e| e.members.values())
            .filter_map(move |m| match m {
                Member::Node(child) => self.nodes.get(child).map(|entry| (*child, entry)),
                Member::Scalar(_) => None,
            })
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHost for MemoryScene {
    type Node = NodeId;
    type Value = MemoryValue;

    fn resolve(&self, address: &NodeAddress) -> Option<MemoryValue> {
        if address.is_empty() {
            return None;
        }

        let mut current = MemoryValue::Node(self.root);
        for segment in address.segments() {
            if segment.is_empty() {
                return None;
            }
            let MemoryValue::Node(id) = current else {
                return None;
            };
            current = match self.nodes.get(&id)?.members.get(segment)? {
                Member::Node(child) => MemoryValue::Node(*child),
                Member::Scalar(value) => MemoryValue::Scalar(value.clone()),
            };
        }

        Some(current)
    }

    fn as_node(&self, value: &MemoryValue) -> Option<NodeId> {
        match value {
            MemoryValue::Node(id) if self.contains(*id) => Some(*id),
            _ => None,
        }
    }

    fn create_child(&mut self, parent: &NodeId, name: &str, order: i32) -> NodeId {
        self.add_node(*parent, name, order)
    }

    fn load_asset_into(&mut self, node: &NodeId, relative_path: &str) {
        let children: Vec<NodeId> = self.child_nodes(*node).map(|(id, _)| id).collect();
        for child in children {
            self.drop_subtree(child);
        }

        if let Some(entry) = self.nodes.get_mut(node) {
            entry.members.clear();
            entry.asset = Some(relative_path.to_string());
            trace!(node = %node, asset = relative_path, "Asset loaded into node");
        }
    }

    fn next_available_order(&self, parent: &NodeId) -> i32 {
        self.child_nodes(*parent)
            .map(|(_, entry)| entry.depth.saturating_add(1))
            .max()
            .unwrap_or(0)
            .max(0)
    }

    fn set_order(&mut self, node: &NodeId, order: i32) {
        let Some(entry) = self.nodes.get(node) else {
            return;
        };
        let old_depth = entry.depth;

        // Swapping takes the other node's depth
        if let Some(parent) = entry.parent {
            let occupant = self
                .child_nodes(parent)
                .find(|(id, e)| id != node && e.depth == order)
                .map(|(id, _)| id);
            if let Some(occupant) = occupant {
                if let Some(other) = self.nodes.get_mut(&occupant) {
                    other.depth = old_depth;
                }
            }
        }

        if let Some(entry) = self.nodes.get_mut(node) {
            entry.depth = order;
        }
    }

    fn remove(&mut self, node: &NodeId) {
        let Some(entry) = self.nodes.get(node) else {
            return;
        };

        let Some(parent) = entry.parent else {
            debug!("Refusing to remove the root node");
            self.refused_removals += 1;
            return;
        };

        if entry.depth < 0 {
            debug!(node = %node, depth = entry.depth, "Refusing to remove node at negative depth");
            self.refused_removals += 1;
            return;
        }

        let name = entry.name.clone();
        if let Some(parent_entry) = self.nodes.get_mut(&parent) {
            if matches!(parent_entry.members.get(&name), Some(Member::Node(id)) if id == node) {
                parent_entry.members.remove(&name);
            }
        }
        self.drop_subtree(*node);
    }

    fn members(&self, node: &NodeId) -> Vec<(String, String)> {
        self.nodes
            .get(node)
            .map(|entry| {
                entry
                    .members
                    .iter()
                    .map(|(name, member)| {
                        let rendered = match member {
                            Member::Node(id) => match self.nodes.get(id) {
                                Some(child) => format!("[node {} depth {}]", id, child.depth),
                                None => format!("[node {}]", id),
                            },
                            Member::Scalar(value) => value.to_string(),
                        };
                        (name.clone(), rendered)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
