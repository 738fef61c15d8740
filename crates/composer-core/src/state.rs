//! The pure reducer: one command applied to one snapshot.
//!
//! `apply_command` is the single entry point for all tree mutation. It never
//! mutates the input document; each branch builds a wholly new snapshot and
//! returns it, or returns `None` when the command is a no-op (unknown id,
//! colliding id, degenerate selection). Callers use `None` to skip the
//! history push — the equivalent of the reference-equality check a
//! shared-structure runtime would use.
//!
//! Tree invariants (no orphans, no multi-parenting, no cycles) are preserved
//! by construction in each branch; a debug-only assertion re-verifies them
//! after every applied command.

use crate::command::{Command, NodePatch, ReorderDirection};
use crate::id::NodeId;
use crate::model::{Document, GROUP_TYPE, Node, Position, PropMap, Size};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

type Children = SmallVec<[NodeId; 4]>;

/// Apply one command to a document snapshot.
///
/// Returns the new snapshot, or `None` when the command changes nothing.
/// The input document is never modified and stays valid either way.
#[must_use]
pub fn apply_command(doc: &Document, command: &Command) -> Option<Document> {
    let next = match command {
        Command::Add {
            node,
            parent_id,
            index,
        } => apply_add(doc, node, *parent_id, *index),
        Command::Move {
            id,
            position,
            delta,
            parent_id,
            index,
        } => apply_move(doc, *id, *position, *delta, *parent_id, *index),
        Command::Update { id, patch } => apply_update(doc, *id, patch),
        Command::Delete { id } => apply_delete(doc, *id),
        Command::Duplicate {
            id,
            new_id,
            position,
        } => apply_duplicate(doc, *id, *new_id, *position),
        Command::Group { node_ids, group_id } => apply_group(doc, node_ids, *group_id),
        Command::Ungroup { group_id } => apply_ungroup(doc, *group_id),
        Command::Reorder {
            node_ids,
            direction,
        } => apply_reorder(doc, node_ids, *direction),
    }?;

    #[cfg(debug_assertions)]
    if let Err(reason) = next.check_invariants() {
        panic!("command {command:?} left the tree in an invalid state: {reason}");
    }

    Some(next)
}

// ─── Children list surgery ───────────────────────────────────────────────

/// Pick `preferred` when it names an existing node, else the root.
fn resolve_parent_id(doc: &Document, preferred: Option<NodeId>) -> NodeId {
    match preferred {
        Some(id) if doc.contains(id) => id,
        _ => doc.root_id,
    }
}

/// Insert `id` into `children` at `index` (clamped) or at the end,
/// removing any existing occurrence first.
fn insert_child(children: &mut Children, id: NodeId, index: Option<usize>) {
    children.retain(|c| *c != id);
    let at = index.map_or(children.len(), |i| i.min(children.len()));
    children.insert(at, id);
}

/// Insert `id` immediately after `after`, or at the end if `after` is absent.
fn insert_child_after(children: &mut Children, id: NodeId, after: NodeId) {
    children.retain(|c| *c != id);
    let at = children
        .iter()
        .position(|c| *c == after)
        .map_or(children.len(), |i| i + 1);
    children.insert(at, id);
}

/// Remove `id` from the children of `parent_id`, if both exist.
fn detach_from_parent(doc: &mut Document, parent_id: NodeId, id: NodeId) {
    if let Some(parent) = doc.nodes.get_mut(&parent_id)
        && let Some(children) = parent.children.as_mut()
    {
        children.retain(|c| *c != id);
    }
}

// ─── Command branches ────────────────────────────────────────────────────

fn apply_add(
    doc: &Document,
    node: &Node,
    parent_id: Option<NodeId>,
    index: Option<usize>,
) -> Option<Document> {
    if doc.contains(node.id) {
        return None;
    }

    let target_parent = resolve_parent_id(doc, parent_id);
    let mut next = doc.clone();
    next.nodes.insert(node.id, node.clone());
    if let Some(parent) = next.nodes.get_mut(&target_parent) {
        let children = parent.children.get_or_insert_with(SmallVec::new);
        insert_child(children, node.id, index);
    }
    Some(next)
}

fn apply_move(
    doc: &Document,
    id: NodeId,
    position: Option<Position>,
    delta: Option<Position>,
    parent_id: Option<NodeId>,
    index: Option<usize>,
) -> Option<Document> {
    let node = doc.get(id)?;

    // A node must never become a descendant of its own subtree. Treated as
    // an invalid target (silent no-op), like an unknown id.
    if let Some(target) = parent_id
        && (target == id || doc.is_descendant_of(id, target))
    {
        return None;
    }

    let next_position = match (position, delta) {
        (Some(p), _) => p,
        (None, Some(d)) => node.position.translated(d.x, d.y),
        (None, None) => node.position,
    };

    // A pure position move that lands exactly where the node already is
    // changes nothing.
    if parent_id.is_none() && index.is_none() && next_position == node.position {
        return None;
    }

    let mut next = doc.clone();
    if let Some(moved) = next.nodes.get_mut(&id) {
        moved.position = next_position;
    }

    if parent_id.is_some() || index.is_some() {
        let current_parent = doc.find_parent_id(id);
        let target_parent = resolve_parent_id(doc, parent_id.or(current_parent));
        let reparenting = parent_id.is_some() && current_parent != Some(target_parent);

        // Reparent without an explicit position: keep the node visually in
        // place by re-expressing its absolute position relative to the new
        // parent's origin.
        if reparenting && position.is_none() && delta.is_none() {
            let abs = doc.absolute_position(id);
            let parent_abs = doc.absolute_position(target_parent);
            if let Some(moved) = next.nodes.get_mut(&id) {
                moved.position = Position::new(abs.x - parent_abs.x, abs.y - parent_abs.y);
            }
        }

        if let Some(current) = current_parent {
            detach_from_parent(&mut next, current, id);
        }
        if let Some(parent) = next.nodes.get_mut(&target_parent) {
            let children = parent.children.get_or_insert_with(SmallVec::new);
            insert_child(children, id, index);
        }
    }

    Some(next)
}

fn apply_update(doc: &Document, id: NodeId, patch: &NodePatch) -> Option<Document> {
    doc.get(id)?;

    let mut next = doc.clone();
    if let Some(node) = next.nodes.get_mut(&id) {
        if let Some(kind) = &patch.kind {
            node.kind = kind.clone();
        }
        if let Some(position) = patch.position {
            node.position = position;
        }
        if let Some(size) = patch.size {
            node.size = size;
        }
        if let Some(props) = &patch.props {
            // Shallow merge: patch keys overwrite, the rest are retained.
            for (key, value) in props {
                node.props.insert(key.clone(), value.clone());
            }
        }
        if let Some(children) = &patch.children {
            node.children = Some(children.clone());
        }
        if let Some(visible) = patch.visible {
            node.visible = Some(visible);
        }
        if let Some(locked) = patch.locked {
            node.locked = Some(locked);
        }
    }
    Some(next)
}

fn apply_delete(doc: &Document, id: NodeId) -> Option<Document> {
    if id == doc.root_id || !doc.contains(id) {
        return None;
    }

    // The whole subtree goes atomically, so no dangling refs can survive.
    let doomed = doc.subtree_ids(id);
    let parent_id = doc.find_parent_id(id);

    let mut next = doc.clone();
    for gone in &doomed {
        next.nodes.remove(gone);
    }
    if let Some(parent) = parent_id {
        detach_from_parent(&mut next, parent, id);
    }
    Some(next)
}

fn apply_duplicate(
    doc: &Document,
    id: NodeId,
    new_id: NodeId,
    position: Option<Position>,
) -> Option<Document> {
    if doc.contains(new_id) {
        return None;
    }
    let source = doc.get(id)?;

    let clone = Node {
        id: new_id,
        position: position.unwrap_or(source.position),
        // Descendants are not cloned: a duplicated container starts empty.
        children: source.children.as_ref().map(|_| SmallVec::new()),
        ..source.clone()
    };

    let parent_id = doc.find_parent_id(id).unwrap_or(doc.root_id);
    let mut next = doc.clone();
    next.nodes.insert(new_id, clone);
    if let Some(parent) = next.nodes.get_mut(&parent_id) {
        let children = parent.children.get_or_insert_with(SmallVec::new);
        insert_child_after(children, new_id, id);
    }
    Some(next)
}

fn apply_group(doc: &Document, node_ids: &[NodeId], group_id: NodeId) -> Option<Document> {
    if doc.contains(group_id) {
        return None;
    }

    // Root is never a member; duplicate ids collapse to one.
    let mut seen = HashSet::new();
    let candidates: Vec<NodeId> = node_ids
        .iter()
        .copied()
        .filter(|&id| id != doc.root_id && doc.contains(id) && seen.insert(id))
        .collect();

    // A member nested inside another member already moves with it, and
    // keeping it would let the insertion target land inside the group's own
    // subtree. Only subtree roots group.
    let valid: Vec<NodeId> = candidates
        .iter()
        .copied()
        .filter(|&id| {
            !candidates
                .iter()
                .any(|&other| other != id && doc.is_descendant_of(other, id))
        })
        .collect();
    if valid.len() < 2 {
        return None;
    }

    // Members share a parent when grouped from a selection; order them by
    // their original sibling order there so relative z-order survives.
    let host_parent = doc.find_parent_id(valid[0]).unwrap_or(doc.root_id);
    let host_children: Vec<NodeId> = doc
        .get(host_parent)
        .map(|n| n.children().to_vec())
        .unwrap_or_default();
    let mut ordered = valid.clone();
    ordered.sort_by_key(|id| {
        host_children
            .iter()
            .position(|c| c == id)
            .unwrap_or(usize::MAX)
    });
    // The group takes the slot of the lowest-indexed member.
    let insert_at = host_children
        .iter()
        .position(|c| ordered.contains(c))
        .unwrap_or(host_children.len());

    // Union bounding box over absolute geometry.
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for &id in &ordered {
        let abs = doc.absolute_position(id);
        let size = doc.get(id)?.size;
        min_x = min_x.min(abs.x);
        min_y = min_y.min(abs.y);
        max_x = max_x.max(abs.x + size.width);
        max_y = max_y.max(abs.y + size.height);
    }

    let mut next = doc.clone();
    for &id in &ordered {
        if let Some(parent) = doc.find_parent_id(id) {
            detach_from_parent(&mut next, parent, id);
        }
    }
    // Members move into the group's local coordinate space.
    for &id in &ordered {
        let abs = doc.absolute_position(id);
        if let Some(member) = next.nodes.get_mut(&id) {
            member.position = Position::new(abs.x - min_x, abs.y - min_y);
        }
    }

    let parent_abs = doc.absolute_position(host_parent);
    let group = Node {
        id: group_id,
        kind: GROUP_TYPE.to_string(),
        position: Position::new(min_x - parent_abs.x, min_y - parent_abs.y),
        size: Size::new(max_x - min_x, max_y - min_y),
        props: PropMap::new(),
        children: Some(ordered.iter().copied().collect()),
        visible: None,
        locked: None,
    };
    next.nodes.insert(group_id, group);
    if let Some(parent) = next.nodes.get_mut(&host_parent) {
        let children = parent.children.get_or_insert_with(SmallVec::new);
        let at = insert_at.min(children.len());
        children.insert(at, group_id);
    }
    Some(next)
}

fn apply_ungroup(doc: &Document, group_id: NodeId) -> Option<Document> {
    let group = doc.get(group_id)?;
    if group.kind != GROUP_TYPE {
        return None;
    }

    let child_ids: Vec<NodeId> = group.children().to_vec();
    let group_position = group.position;
    let parent_id = doc.find_parent_id(group_id).unwrap_or(doc.root_id);

    let mut next = doc.clone();
    next.nodes.remove(&group_id);
    if let Some(parent) = next.nodes.get_mut(&parent_id) {
        let children = parent.children.get_or_insert_with(SmallVec::new);
        let slot = children
            .iter()
            .position(|c| *c == group_id)
            .unwrap_or(children.len());
        children.retain(|c| *c != group_id);
        let slot = slot.min(children.len());
        for (i, id) in child_ids.iter().enumerate() {
            children.insert(slot + i, *id);
        }
    }
    // Members move back from group-local space into the parent's space.
    for id in &child_ids {
        if let Some(member) = next.nodes.get_mut(id) {
            member.position = member
                .position
                .translated(group_position.x, group_position.y);
        }
    }
    Some(next)
}

fn apply_reorder(
    doc: &Document,
    node_ids: &[NodeId],
    direction: ReorderDirection,
) -> Option<Document> {
    // Group targets by their current parent; unknown ids and the root drop out.
    let mut seen = HashSet::new();
    let mut by_parent: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for &id in node_ids {
        if id == doc.root_id || !doc.contains(id) || !seen.insert(id) {
            continue;
        }
        if let Some(parent) = doc.find_parent_id(id) {
            by_parent.entry(parent).or_default().push(id);
        }
    }
    if by_parent.is_empty() {
        return None;
    }

    let mut next = doc.clone();
    let mut changed = false;
    for (parent_id, ids) in &by_parent {
        let Some(parent) = next.nodes.get_mut(parent_id) else {
            continue;
        };
        let Some(children) = parent.children.as_mut() else {
            continue;
        };
        let before = children.clone();

        match direction {
            ReorderDirection::Forward | ReorderDirection::Backward => {
                let affected: Vec<usize> = children
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| ids.contains(c))
                    .map(|(i, _)| i)
                    .collect();
                // Forward walks last-to-first and backward first-to-last so
                // adjacent selected siblings all shift without clobbering.
                match direction {
                    ReorderDirection::Forward => {
                        for &i in affected.iter().rev() {
                            if i + 1 < children.len() {
                                children.swap(i, i + 1);
                            }
                        }
                    }
                    _ => {
                        for &i in &affected {
                            if i > 0 {
                                children.swap(i, i - 1);
                            }
                        }
                    }
                }
            }
            ReorderDirection::Front | ReorderDirection::Back => {
                // Bring-as-block: the selected ids collapse together at the
                // extreme, keeping their relative order.
                let selected: Children =
                    children.iter().copied().filter(|c| ids.contains(c)).collect();
                let others: Children = children
                    .iter()
                    .copied()
                    .filter(|c| !ids.contains(c))
                    .collect();
                *children = match direction {
                    ReorderDirection::Front => others.into_iter().chain(selected).collect(),
                    _ => selected.into_iter().chain(others).collect(),
                };
            }
        }

        if *children != before {
            changed = true;
        }
    }

    if changed { Some(next) } else { None }
}

// ─── Tests ───────────────────────────────────────────────────────────────
