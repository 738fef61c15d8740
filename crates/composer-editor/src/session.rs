//! The editing session: one open document plus everything around it.
//!
//! `EditorSession` owns the undo history, the multi-selection, the zoom
//! level, grid snapping, and the clipboard. UI layers call its high-level
//! operations; each operation resolves context (selection, snapping, fresh
//! ids) and dispatches plain commands to the reducer through the history.
//! The session never mutates the document directly.
//!
//! Locked nodes are enforced here, not in the reducer: move/resize requests
//! against a locked node are rejected before any command is issued.

use crate::catalog;
use crate::history::History;
use crate::snapping::{self, SnapResult};
use composer_core::alignment::{AlignmentKind, DistributionAxis, align_nodes, distribute_nodes};
use composer_core::command::{Command, NodePatch, ReorderDirection};
use composer_core::id::NodeId;
use composer_core::model::{Document, Node, Position, Size, is_container_type};
use composer_core::serialization::{LoadError, deserialize_document, serialize_document};
use smallvec::SmallVec;
use std::collections::HashSet;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 4.0;
pub const ZOOM_STEP: f32 = 0.1;

pub const DEFAULT_GRID_SIZE: f32 = 8.0;

/// Offset applied to duplicated and pasted nodes so they don't land
/// exactly on their source.
pub const DUPLICATE_OFFSET: Position = Position { x: 20.0, y: 20.0 };

/// One user's editing session over one document.
pub struct EditorSession {
    history: History,
    selection: HashSet<NodeId>,
    clipboard: Vec<Node>,
    id_counter: u64,
    zoom: f32,
    grid_size: f32,
    snap_to_grid: bool,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::from_document(Document::new())
    }

    pub fn from_document(doc: Document) -> Self {
        Self {
            history: History::new(doc),
            selection: HashSet::new(),
            clipboard: Vec::new(),
            id_counter: 0,
            zoom: 1.0,
            grid_size: DEFAULT_GRID_SIZE,
            snap_to_grid: false,
        }
    }

    /// The current snapshot.
    pub fn document(&self) -> &Document {
        self.history.present()
    }

    /// Dispatch a raw command. Most callers want the higher-level
    /// operations below, which resolve selection and snapping first.
    pub fn dispatch(&mut self, command: &Command) -> bool {
        self.history.dispatch(command)
    }

    /// Mint a prefixed id unused in the current document. The counter is
    /// monotone for the session's lifetime, so an id freed by a delete is
    /// never handed out again here.
    fn mint_id(&mut self, prefix: &str) -> NodeId {
        loop {
            let candidate = NodeId::intern(&format!("{prefix}_{}", self.id_counter));
            self.id_counter += 1;
            if !self.document().contains(candidate) {
                return candidate;
            }
        }
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let stepped = self.history.undo();
        if stepped {
            self.prune_selection();
        }
        stepped
    }

    pub fn redo(&mut self) -> bool {
        let stepped = self.history.redo();
        if stepped {
            self.prune_selection();
        }
        stepped
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> &HashSet<NodeId> {
        &self.selection
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection with a single node.
    pub fn select(&mut self, id: NodeId) {
        if self.document().contains(id) {
            self.selection.clear();
            self.selection.insert(id);
        }
    }

    /// Toggle one node in or out of the selection (shift-click).
    pub fn toggle_select(&mut self, id: NodeId) {
        if !self.selection.remove(&id) && self.document().contains(id) {
            self.selection.insert(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every direct child of the root.
    pub fn select_all(&mut self) {
        self.selection = self
            .document()
            .root()
            .map(|root| root.children().iter().copied().collect())
            .unwrap_or_default();
    }

    /// Marquee selection: select every visible root-level child whose
    /// bounds intersect the rect. Hidden nodes are not selectable.
    pub fn select_in_rect(&mut self, origin: Position, size: Size) {
        let doc = self.document();
        let hit: HashSet<NodeId> = doc
            .root()
            .map(|root| root.children().to_vec())
            .unwrap_or_default()
            .into_iter()
            .filter(|id| {
                doc.get(*id).is_some_and(|n| {
                    n.is_visible()
                        && n.position.x < origin.x + size.width
                        && n.position.x + n.size.width > origin.x
                        && n.position.y < origin.y + size.height
                        && n.position.y + n.size.height > origin.y
                })
            })
            .collect();
        self.selection = hit;
    }

    /// Drop selected ids that no longer exist (after delete/undo/load).
    fn prune_selection(&mut self) {
        let doc = self.history.present();
        self.selection.retain(|id| doc.contains(*id));
    }

    /// Selection ids in paint order, so batch operations are deterministic.
    fn selection_in_paint_order(&self) -> Vec<NodeId> {
        self.document()
            .paint_order()
            .into_iter()
            .filter(|id| self.selection.contains(id))
            .collect()
    }

    // ─── Node lifecycle ──────────────────────────────────────────────────

    /// Drop a new component from the palette at a canvas position.
    /// Returns the new node's id; the node becomes the sole selection.
    pub fn add_node(&mut self, kind: &str, position: Position) -> NodeId {
        let id = self.mint_id(&kind.to_lowercase());
        let position = self.maybe_snap(position);
        let node = if is_container_type(kind) {
            let mut node = Node::new_container(id, kind, position, catalog::default_size(kind));
            node.props = catalog::default_props(kind);
            node
        } else {
            let mut node = Node::new(id, kind, position, catalog::default_size(kind));
            node.props = catalog::default_props(kind);
            node
        };

        self.dispatch(&Command::Add {
            node,
            parent_id: None,
            index: None,
        });
        self.select(id);
        id
    }

    /// Translate one node by a document-space delta. Rejected for locked
    /// nodes and the root.
    pub fn move_node_by(&mut self, id: NodeId, delta: Position) -> bool {
        let doc = self.document();
        if id == doc.root_id {
            return false;
        }
        let Some(node) = doc.get(id) else {
            return false;
        };
        if node.is_locked() {
            log::debug!("move rejected: node `{id}` is locked");
            return false;
        }

        let target = self.maybe_snap(node.position.translated(delta.x, delta.y));
        self.dispatch(&Command::Move {
            id,
            position: Some(target),
            delta: None,
            parent_id: None,
            index: None,
        })
    }

    /// Translate every selected node. Returns how many actually moved.
    pub fn move_selected_by(&mut self, delta: Position) -> usize {
        let ids = self.selection_in_paint_order();
        ids.into_iter()
            .filter(|&id| self.move_node_by(id, delta))
            .count()
    }

    /// Resize one node. Rejected for locked nodes.
    pub fn resize_node(&mut self, id: NodeId, size: Size) -> bool {
        if self.document().get(id).is_some_and(Node::is_locked) {
            log::debug!("resize rejected: node `{id}` is locked");
            return false;
        }
        self.dispatch(&Command::Update {
            id,
            patch: NodePatch::size(size),
        })
    }

    /// Patch a node (properties panel edits).
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> bool {
        self.dispatch(&Command::Update { id, patch })
    }

    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let deleted = self.dispatch(&Command::Delete { id });
        if deleted {
            self.prune_selection();
        }
        deleted
    }

    /// Delete the whole selection (each subtree cascades).
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection_in_paint_order();
        let deleted = ids
            .into_iter()
            .filter(|&id| self.dispatch(&Command::Delete { id }))
            .count();
        self.prune_selection();
        deleted
    }

    /// Duplicate one node with the standard offset; the copy becomes the
    /// sole selection.
    pub fn duplicate_node(&mut self, id: NodeId) -> Option<NodeId> {
        let (kind, position) = {
            let source = self.document().get(id)?;
            (
                source.kind.to_lowercase(),
                source
                    .position
                    .translated(DUPLICATE_OFFSET.x, DUPLICATE_OFFSET.y),
            )
        };
        let new_id = self.mint_id(&kind);

        if self.dispatch(&Command::Duplicate {
            id,
            new_id,
            position: Some(position),
        }) {
            self.select(new_id);
            Some(new_id)
        } else {
            None
        }
    }

    /// Duplicate the selection; the copies become the new selection.
    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        let ids = self.selection_in_paint_order();
        let mut copies = Vec::new();
        for id in ids {
            let Some((kind, position)) = self.document().get(id).map(|source| {
                (
                    source.kind.to_lowercase(),
                    source
                        .position
                        .translated(DUPLICATE_OFFSET.x, DUPLICATE_OFFSET.y),
                )
            }) else {
                continue;
            };
            let new_id = self.mint_id(&kind);
            if self.dispatch(&Command::Duplicate {
                id,
                new_id,
                position: Some(position),
            }) {
                copies.push(new_id);
            }
        }
        if !copies.is_empty() {
            self.selection = copies.iter().copied().collect();
        }
        copies
    }

    // ─── Reparenting ─────────────────────────────────────────────────────

    /// Whether `dragged` may be dropped onto `target`: the target must be a
    /// live container and must not sit inside the dragged subtree.
    pub fn can_drop_on_node(&self, target: NodeId, dragged: NodeId) -> bool {
        let doc = self.document();
        if target == dragged {
            return false;
        }
        let Some(node) = doc.get(target) else {
            return false;
        };
        if target != doc.root_id && !is_container_type(&node.kind) {
            return false;
        }
        !doc.is_descendant_of(dragged, target)
    }

    /// Move `id` under `new_parent`, keeping its absolute position.
    pub fn reparent_node(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        if !self.can_drop_on_node(new_parent, id) {
            log::debug!("drop rejected: `{new_parent}` cannot receive `{id}`");
            return false;
        }
        self.dispatch(&Command::Move {
            id,
            position: None,
            delta: None,
            parent_id: Some(new_parent),
            index: None,
        })
    }

    // ─── Grouping & z-order ──────────────────────────────────────────────

    /// Wrap the selection in a new group; the group becomes the selection.
    pub fn group_selected(&mut self) -> Option<NodeId> {
        let node_ids = self.selection_in_paint_order();
        if node_ids.len() < 2 {
            return None;
        }
        let group_id = self.mint_id("group");
        if self.dispatch(&Command::Group { node_ids, group_id }) {
            self.select(group_id);
            Some(group_id)
        } else {
            None
        }
    }

    /// Dissolve every selected group; their children become the selection.
    pub fn ungroup_selected(&mut self) -> bool {
        let groups: Vec<NodeId> = self
            .selection_in_paint_order()
            .into_iter()
            .filter(|id| {
                self.document()
                    .get(*id)
                    .is_some_and(|n| n.kind == composer_core::model::GROUP_TYPE)
            })
            .collect();

        let mut released = HashSet::new();
        let mut any = false;
        for group_id in groups {
            let children: Vec<NodeId> = self
                .document()
                .get(group_id)
                .map(|g| g.children().to_vec())
                .unwrap_or_default();
            if self.dispatch(&Command::Ungroup { group_id }) {
                released.extend(children);
                any = true;
            }
        }
        if any {
            self.selection = released;
        }
        any
    }

    /// Shift the selection within its parents' paint order.
    pub fn reorder_selected(&mut self, direction: ReorderDirection) -> bool {
        let node_ids = self.selection_in_paint_order();
        if node_ids.is_empty() {
            return false;
        }
        self.dispatch(&Command::Reorder {
            node_ids,
            direction,
        })
    }

    // ─── Alignment ───────────────────────────────────────────────────────

    /// Align the selection. One `Move` per affected node, so each is its
    /// own undo step — a known tradeoff, not an accident.
    pub fn align_selected(&mut self, kind: AlignmentKind) -> usize {
        let targets = {
            let doc = self.document();
            let nodes: Vec<&Node> = self
                .selection_in_paint_order()
                .iter()
                .filter_map(|id| doc.get(*id))
                .collect();
            align_nodes(&nodes, kind)
        };
        self.apply_position_batch(targets)
    }

    /// Distribute the selection evenly along an axis.
    pub fn distribute_selected(&mut self, axis: DistributionAxis) -> usize {
        let targets = {
            let doc = self.document();
            let nodes: Vec<&Node> = self
                .selection_in_paint_order()
                .iter()
                .filter_map(|id| doc.get(*id))
                .collect();
            distribute_nodes(&nodes, axis)
        };
        self.apply_position_batch(targets)
    }

    fn apply_position_batch(
        &mut self,
        targets: std::collections::HashMap<NodeId, Position>,
    ) -> usize {
        // Deterministic dispatch order for reproducible histories.
        let mut ordered: Vec<(NodeId, Position)> = targets.into_iter().collect();
        ordered.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        ordered
            .into_iter()
            .filter(|(id, position)| {
                self.dispatch(&Command::Move {
                    id: *id,
                    position: Some(*position),
                    delta: None,
                    parent_id: None,
                    index: None,
                })
            })
            .count()
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selection into the session clipboard.
    pub fn copy_selected(&mut self) -> usize {
        let doc = self.document();
        self.clipboard = self
            .selection_in_paint_order()
            .iter()
            .filter_map(|id| doc.get(*id))
            .cloned()
            .collect();
        self.clipboard.len()
    }

    /// Copy, then delete, the selection.
    pub fn cut_selected(&mut self) -> usize {
        let copied = self.copy_selected();
        if copied > 0 {
            self.delete_selected();
        }
        copied
    }

    /// Paste clipboard contents onto the canvas with the standard offset.
    /// Pasted nodes get fresh ids, land under the root, and become the new
    /// selection. Containers paste shallow, like duplicate.
    pub fn paste(&mut self) -> Vec<NodeId> {
        let sources = self.clipboard.clone();
        let mut pasted = Vec::new();
        for source in sources {
            let id = self.mint_id(&source.kind.to_lowercase());
            let node = Node {
                id,
                position: source
                    .position
                    .translated(DUPLICATE_OFFSET.x, DUPLICATE_OFFSET.y),
                children: source.children.as_ref().map(|_| SmallVec::new()),
                ..source
            };
            if self.dispatch(&Command::Add {
                node,
                parent_id: None,
                index: None,
            }) {
                pasted.push(id);
            }
        }
        if !pasted.is_empty() {
            self.selection = pasted.iter().copied().collect();
        }
        pasted
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }

    // ─── View state ──────────────────────────────────────────────────────

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    pub fn set_grid_size(&mut self, grid_size: f32) {
        if grid_size > 0.0 {
            self.grid_size = grid_size;
        }
    }

    pub fn snap_to_grid_enabled(&self) -> bool {
        self.snap_to_grid
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.snap_to_grid = enabled;
    }

    fn maybe_snap(&self, position: Position) -> Position {
        if self.snap_to_grid {
            snapping::snap_to_grid(position, self.grid_size)
        } else {
            position
        }
    }

    /// Preview snapping for a drag in progress: the selection is excluded
    /// from the snap candidates.
    pub fn snap_preview(&self, position: Position, size: Size) -> SnapResult {
        snapping::snap_to_siblings(
            self.document(),
            &self.selection,
            position,
            size,
            snapping::DEFAULT_SNAP_THRESHOLD,
        )
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Serialize the current snapshot to JSON.
    pub fn save(&self) -> String {
        serialize_document(self.document())
    }

    /// Load a snapshot, replacing the document and clearing history and
    /// selection. Loading is not undoable.
    pub fn load(&mut self, text: &str) -> Result<(), LoadError> {
        let doc = deserialize_document(text)?;
        if let Err(reason) = doc.check_invariants() {
            log::warn!("loaded document has structural issues: {reason}");
        }
        self.history.reset(doc);
        self.selection.clear();
        Ok(())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
