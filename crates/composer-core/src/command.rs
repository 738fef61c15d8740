//! The command algebra — every mutation the reducer understands.
//!
//! Commands are immutable intent values with no behavior of their own; the
//! reducer in `state` is the only code that interprets them. The serde
//! representation (tagged by `type`, camelCase fields) doubles as the wire
//! contract for RPC-style dispatch or a recorded command log.

use crate::id::NodeId;
use crate::model::{Node, Position, PropMap, Size};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Z-order reorder direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// Swap each target with its next sibling.
    Forward,
    /// Swap each target with its previous sibling.
    Backward,
    /// Move targets to the end of their parent's children, as one block.
    Front,
    /// Move targets to the start of their parent's children, as one block.
    Back,
}

/// A shallow patch applied by `Command::Update`.
///
/// Every field except `props` replaces the node's field wholesale; `props`
/// is merged key-by-key into the existing bag (patch keys overwrite, others
/// are retained). The node id itself is never patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<PropMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<SmallVec<[NodeId; 4]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl NodePatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn props(props: PropMap) -> Self {
        Self {
            props: Some(props),
            ..Self::default()
        }
    }
}

/// One mutation intent, interpreted by `state::apply_command`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Insert a new node under `parent_id` (or the root) at `index`
    /// (clamped; appended when absent). No-op on id collision.
    #[serde(rename_all = "camelCase")]
    Add {
        node: Node,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Reposition and/or reparent a node. Explicit `position` wins over
    /// `delta`; with neither, a reparent re-expresses the node's position
    /// in the new parent's coordinate space.
    #[serde(rename_all = "camelCase")]
    Move {
        id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delta: Option<Position>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Shallow-merge a patch into a node.
    Update { id: NodeId, patch: NodePatch },

    /// Remove a node and its entire subtree. No-op for the root.
    Delete { id: NodeId },

    /// Shallow-clone `id` as `new_id`, inserted right after the source in
    /// its parent's children. Descendants are not cloned — a duplicated
    /// container starts with an empty children list.
    #[serde(rename_all = "camelCase")]
    Duplicate {
        id: NodeId,
        new_id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
    },

    /// Wrap two or more nodes in a new `Group` sized to their union
    /// bounding box.
    #[serde(rename_all = "camelCase")]
    Group {
        node_ids: Vec<NodeId>,
        group_id: NodeId,
    },

    /// Dissolve a `Group`, splicing its children into its former parent at
    /// the group's former index.
    #[serde(rename_all = "camelCase")]
    Ungroup { group_id: NodeId },

    /// Shift the targets within their parents' paint order.
    #[serde(rename_all = "camelCase")]
    Reorder {
        node_ids: Vec<NodeId>,
        direction: ReorderDirection,
    },
}
