//! Document tree data model.
//!
//! A `Document` is an id-keyed arena of `Node` records plus a distinguished
//! root. Parent→child containment is expressed through each node's ordered
//! `children` list, which doubles as the paint order: earlier entries render
//! behind later ones. Positions are relative to the parent's coordinate
//! space; absolute position is the sum of relative positions up the parent
//! chain.
//!
//! The tree invariant: every id reachable from the root via `children` is
//! present in `nodes`, and every node except the root is reachable exactly
//! once — no orphans, no multi-parenting, no cycles. Commands preserve the
//! invariant by construction; `check_invariants` exists for debug assertions
//! and for vetting loaded snapshots.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};

// ─── Geometry primitives ─────────────────────────────────────────────────

/// A point in the parent's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Node dimensions. Non-negative by convention.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// ─── Component props ─────────────────────────────────────────────────────

/// A component-specific property value.
///
/// The core treats props as an opaque bag: a closed set of JSON-compatible
/// value kinds keyed by string. Component schemas live in the catalog, not
/// here — the reducer only ever merges these maps shallowly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// The open string-keyed prop bag attached to every node.
pub type PropMap = BTreeMap<String, PropValue>;

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Type name of the always-present document root.
pub const ROOT_TYPE: &str = "Root";

/// Type name of group wrapper nodes created by the `Group` command.
pub const GROUP_TYPE: &str = "Group";

/// Component types allowed to accept reparented children via drag.
///
/// This is a policy gate consulted by the orchestration layer before it
/// issues a reparent; the reducer does not re-validate membership.
pub const CONTAINER_TYPES: &[&str] = &[GROUP_TYPE, "Card", "Frame"];

/// Whether `kind` names a container component.
#[must_use]
pub fn is_container_type(kind: &str) -> bool {
    CONTAINER_TYPES.contains(&kind)
}

/// One placed component instance, group, or the root container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier, unique within the document.
    pub id: NodeId,

    /// Component type name (`"Root"`, `"Group"`, or a catalog type like
    /// `"Button"`). Determines rendering and prop schema externally.
    #[serde(rename = "type")]
    pub kind: String,

    /// Offset within the parent's coordinate space.
    pub position: Position,

    pub size: Size,

    /// Component-specific data, opaque to the core.
    #[serde(default)]
    pub props: PropMap,

    /// Ordered child ids — the paint/z-order. Absent for leaf types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<SmallVec<[NodeId; 4]>>,

    /// Default true when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,

    /// Default false when absent. Locked nodes reject move/resize at the
    /// session layer; the reducer itself does not consult this flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl Node {
    /// A leaf node with empty props.
    pub fn new(id: NodeId, kind: impl Into<String>, position: Position, size: Size) -> Self {
        Self {
            id,
            kind: kind.into(),
            position,
            size,
            props: PropMap::new(),
            children: None,
            visible: None,
            locked: None,
        }
    }

    /// A container node with an empty children list.
    pub fn new_container(
        id: NodeId,
        kind: impl Into<String>,
        position: Position,
        size: Size,
    ) -> Self {
        Self {
            children: Some(SmallVec::new()),
            ..Self::new(id, kind, position, size)
        }
    }

    /// Child ids in paint order, empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.unwrap_or(false)
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// Current snapshot schema version, carried through serialization.
pub const SCHEMA_VERSION: u32 = 1;

/// The whole editable state: one tree snapshot.
///
/// Documents are immutable values from the caller's perspective — every
/// command produces a brand-new `Document`, and old snapshots stay valid
/// inside the undo history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub schema_version: u32,
    pub root_id: NodeId,
    pub nodes: HashMap<NodeId, Node>,
}

impl Document {
    /// An empty document: a root container with no children.
    #[must_use]
    pub fn new() -> Self {
        let root_id = NodeId::intern("root");
        let root = Node::new_container(root_id, ROOT_TYPE, Position::default(), Size::default());
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            schema_version: SCHEMA_VERSION,
            root_id,
            nodes,
        }
    }

    /// A document built around a caller-supplied root node.
    #[must_use]
    pub fn with_root(root: Node) -> Self {
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            schema_version: SCHEMA_VERSION,
            root_id,
            nodes,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Mint an id unused in this document, with a type prefix
    /// (`button_3`, `group_1`). Numbering starts at the node count and
    /// skips past collisions, so a loaded snapshot keeps counting from
    /// where it left off.
    #[must_use]
    pub fn fresh_id(&self, prefix: &str) -> NodeId {
        let mut n = self.nodes.len();
        loop {
            let candidate = NodeId::intern(&format!("{prefix}_{n}"));
            if !self.contains(candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Find the unique parent of `id` by scanning children lists.
    ///
    /// At most one match can exist in a well-formed document; a multi-parent
    /// state is an invariant violation, not a handled case.
    pub fn find_parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.children().contains(&id))
            .map(|node| node.id)
    }

    /// Whether `id` lies strictly inside the subtree rooted at `ancestor_id`.
    ///
    /// Used to block illegal reparenting: a node must never become a
    /// descendant of its own descendant. Cycle-safe via a visited set so a
    /// corrupted snapshot cannot hang the check.
    pub fn is_descendant_of(&self, ancestor_id: NodeId, id: NodeId) -> bool {
        let mut visited = HashSet::new();
        self.descends(ancestor_id, id, &mut visited)
    }

    fn descends(&self, from: NodeId, target: NodeId, visited: &mut HashSet<NodeId>) -> bool {
        if !visited.insert(from) {
            return false;
        }
        let Some(node) = self.nodes.get(&from) else {
            return false;
        };
        for &child in node.children() {
            if child == target || self.descends(child, target, visited) {
                return true;
            }
        }
        false
    }

    /// Position of `id` in root coordinate space: the sum of relative
    /// positions up the parent chain. Unknown ids resolve to the origin.
    pub fn absolute_position(&self, id: NodeId) -> Position {
        let Some(node) = self.nodes.get(&id) else {
            return Position::default();
        };
        match self.find_parent_id(id) {
            Some(parent_id) => {
                let parent = self.absolute_position(parent_id);
                node.position.translated(parent.x, parent.y)
            }
            None => node.position,
        }
    }

    /// Collect `id` plus all transitive children. Cycle-safe.
    pub fn subtree_ids(&self, id: NodeId) -> HashSet<NodeId> {
        let mut bucket = HashSet::new();
        self.collect_subtree(id, &mut bucket);
        bucket
    }

    fn collect_subtree(&self, id: NodeId, bucket: &mut HashSet<NodeId>) {
        if !bucket.insert(id) {
            return;
        }
        if let Some(node) = self.nodes.get(&id) {
            for &child in node.children() {
                self.collect_subtree(child, bucket);
            }
        }
    }

    /// All node ids in depth-first, children-after-parent order starting at
    /// the root. This is the order the rendering layer paints in.
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = HashSet::new();
        self.walk_paint_order(self.root_id, &mut order, &mut visited);
        order
    }

    fn walk_paint_order(&self, id: NodeId, order: &mut Vec<NodeId>, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        order.push(id);
        for &child in node.children() {
            self.walk_paint_order(child, order, visited);
        }
    }

    /// Verify the tree invariant. Commands preserve it by construction, so
    /// this is a debug assertion hook and a vetting tool for loaded
    /// snapshots — not a load-bearing runtime check.
    pub fn check_invariants(&self) -> Result<(), String> {
        let Some(root) = self.nodes.get(&self.root_id) else {
            return Err(format!("root node `{}` missing from node map", self.root_id));
        };
        if root.kind != ROOT_TYPE {
            return Err(format!(
                "root node `{}` has type `{}`, expected `{ROOT_TYPE}`",
                self.root_id, root.kind
            ));
        }

        let mut seen = HashSet::new();
        seen.insert(self.root_id);
        let mut stack = vec![self.root_id];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[&id];
            for &child in node.children() {
                if !self.nodes.contains_key(&child) {
                    return Err(format!("child `{child}` of `{id}` missing from node map"));
                }
                if !seen.insert(child) {
                    return Err(format!("node `{child}` reachable more than once"));
                }
                stack.push(child);
            }
        }

        if seen.len() != self.nodes.len() {
            let orphans: Vec<_> = self
                .nodes
                .keys()
                .filter(|id| !seen.contains(id))
                .map(|id| id.as_str())
                .collect();
            return Err(format!("orphan nodes not reachable from root: {orphans:?}"));
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
