//! Drag snapping: grid and sibling edge/center lines.
//!
//! The gesture layer converts pointer deltas into a candidate rect and asks
//! `snap_to_siblings` for the adjusted position plus the guide lines to
//! draw. Snap candidates come from the root's direct children only — the
//! canvas-level layout — never from nested subtrees.

use composer_core::id::NodeId;
use composer_core::model::{Document, Position, Size};
use std::collections::HashSet;

/// Distance within which an edge locks onto a snap line.
pub const DEFAULT_SNAP_THRESHOLD: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    Vertical,
    Horizontal,
}

/// A rendered alignment guide: a line at `position` on the given axis,
/// spanning `start..end` on the other axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    pub axis: GuideAxis,
    pub position: f32,
    pub start: f32,
    pub end: f32,
}

/// Outcome of a snap query.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub position: Position,
    pub guides: Vec<Guide>,
}

/// Snap a position to the nearest grid intersection.
#[must_use]
pub fn snap_to_grid(position: Position, grid: f32) -> Position {
    if grid <= 0.0 {
        return position;
    }
    Position::new(
        (position.x / grid).round() * grid,
        (position.y / grid).round() * grid,
    )
}

struct SnapLine {
    value: f32,
    node_id: NodeId,
}

/// Snap a dragged rect to the edge and center lines of root-level siblings.
///
/// Checks the rect's left/center/right against every sibling's vertical
/// lines (and top/middle/bottom against horizontal ones), locking each axis
/// to its closest hit within `threshold`. Unsnapped axes pass through
/// unchanged. `exclude` holds the ids being dragged.
#[must_use]
pub fn snap_to_siblings(
    doc: &Document,
    exclude: &HashSet<NodeId>,
    position: Position,
    size: Size,
    threshold: f32,
) -> SnapResult {
    let mut vertical = Vec::new();
    let mut horizontal = Vec::new();

    let child_ids = doc.root().map(|r| r.children().to_vec()).unwrap_or_default();
    for id in child_ids {
        if exclude.contains(&id) {
            continue;
        }
        let Some(node) = doc.get(id) else { continue };
        let (x, y) = (node.position.x, node.position.y);
        let (w, h) = (node.size.width, node.size.height);
        for value in [x, x + w / 2.0, x + w] {
            vertical.push(SnapLine { value, node_id: id });
        }
        for value in [y, y + h / 2.0, y + h] {
            horizontal.push(SnapLine { value, node_id: id });
        }
    }

    let mut snapped = position;
    let mut guides = Vec::new();

    // Vertical lines: candidate points are the rect's left, center, right.
    let mut best_dx = f32::INFINITY;
    let mut best_vertical: Option<Guide> = None;
    for line in &vertical {
        for offset in [0.0, size.width / 2.0, size.width] {
            let delta = (position.x + offset - line.value).abs();
            if delta < threshold && delta < best_dx {
                best_dx = delta;
                snapped.x = line.value - offset;
                if let Some(target) = doc.get(line.node_id) {
                    best_vertical = Some(Guide {
                        axis: GuideAxis::Vertical,
                        position: line.value,
                        start: position.y.min(target.position.y),
                        end: (position.y + size.height)
                            .max(target.position.y + target.size.height),
                    });
                }
            }
        }
    }

    let mut best_dy = f32::INFINITY;
    let mut best_horizontal: Option<Guide> = None;
    for line in &horizontal {
        for offset in [0.0, size.height / 2.0, size.height] {
            let delta = (position.y + offset - line.value).abs();
            if delta < threshold && delta < best_dy {
                best_dy = delta;
                snapped.y = line.value - offset;
                if let Some(target) = doc.get(line.node_id) {
                    best_horizontal = Some(Guide {
                        axis: GuideAxis::Horizontal,
                        position: line.value,
                        start: position.x.min(target.position.x),
                        end: (position.x + size.width).max(target.position.x + target.size.width),
                    });
                }
            }
        }
    }

    guides.extend(best_vertical);
    guides.extend(best_horizontal);
    SnapResult {
        position: snapped,
        guides,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
