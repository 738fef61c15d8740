//! Alignment and distribution geometry.
//!
//! Stateless helpers that compute target positions for a selection of live
//! nodes. Both return a map from node id to its new position; the caller
//! turns each entry into a `Move` command with an explicit `position`.
//!
//! Selections below the floor (two for align, three for distribute) yield an
//! empty map — a deliberate no-op, not an error.

use crate::id::NodeId;
use crate::model::{Node, Position};
use std::collections::HashMap;

/// Which edge or center line to align on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentKind {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

/// Axis to distribute along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionAxis {
    Horizontal,
    Vertical,
}

/// Compute aligned positions for a selection.
///
/// Only the aligned axis changes: `Left` snaps to the minimum left edge,
/// `Right` to the maximum right edge, `Center` to the midpoint between the
/// extreme centers; `Top`/`Middle`/`Bottom` are the vertical mirrors.
#[must_use]
pub fn align_nodes(nodes: &[&Node], kind: AlignmentKind) -> HashMap<NodeId, Position> {
    let mut result = HashMap::new();
    if nodes.len() < 2 {
        return result;
    }

    match kind {
        AlignmentKind::Left => {
            let target = fold_min(nodes.iter().map(|n| n.position.x));
            for node in nodes {
                result.insert(node.id, Position::new(target, node.position.y));
            }
        }
        AlignmentKind::Center => {
            let centers: Vec<f32> = nodes
                .iter()
                .map(|n| n.position.x + n.size.width / 2.0)
                .collect();
            let target = (fold_min(centers.iter().copied()) + fold_max(centers.iter().copied()))
                / 2.0;
            for node in nodes {
                result.insert(
                    node.id,
                    Position::new(target - node.size.width / 2.0, node.position.y),
                );
            }
        }
        AlignmentKind::Right => {
            let target = fold_max(nodes.iter().map(|n| n.position.x + n.size.width));
            for node in nodes {
                result.insert(
                    node.id,
                    Position::new(target - node.size.width, node.position.y),
                );
            }
        }
        AlignmentKind::Top => {
            let target = fold_min(nodes.iter().map(|n| n.position.y));
            for node in nodes {
                result.insert(node.id, Position::new(node.position.x, target));
            }
        }
        AlignmentKind::Middle => {
            let middles: Vec<f32> = nodes
                .iter()
                .map(|n| n.position.y + n.size.height / 2.0)
                .collect();
            let target = (fold_min(middles.iter().copied()) + fold_max(middles.iter().copied()))
                / 2.0;
            for node in nodes {
                result.insert(
                    node.id,
                    Position::new(node.position.x, target - node.size.height / 2.0),
                );
            }
        }
        AlignmentKind::Bottom => {
            let target = fold_max(nodes.iter().map(|n| n.position.y + n.size.height));
            for node in nodes {
                result.insert(
                    node.id,
                    Position::new(node.position.x, target - node.size.height),
                );
            }
        }
    }

    result
}

/// Compute evenly distributed positions for a selection.
///
/// Nodes are sorted along the axis, the span between the first and last
/// node's *centers* is divided into `count - 1` equal steps, and each node
/// is repositioned so its center lands on its step. The outermost nodes do
/// not move on that axis.
#[must_use]
pub fn distribute_nodes(nodes: &[&Node], axis: DistributionAxis) -> HashMap<NodeId, Position> {
    let mut result = HashMap::new();
    if nodes.len() < 3 {
        return result;
    }

    let mut sorted: Vec<&Node> = nodes.to_vec();
    match axis {
        DistributionAxis::Horizontal => {
            sorted.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
            let first = sorted[0];
            let last = sorted[sorted.len() - 1];
            let start = first.position.x + first.size.width / 2.0;
            let end = last.position.x + last.size.width / 2.0;
            let step = (end - start) / (sorted.len() - 1) as f32;

            for (i, node) in sorted.iter().enumerate() {
                let center = start + step * i as f32;
                result.insert(
                    node.id,
                    Position::new(center - node.size.width / 2.0, node.position.y),
                );
            }
        }
        DistributionAxis::Vertical => {
            sorted.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
            let first = sorted[0];
            let last = sorted[sorted.len() - 1];
            let start = first.position.y + first.size.height / 2.0;
            let end = last.position.y + last.size.height / 2.0;
            let step = (end - start) / (sorted.len() - 1) as f32;

            for (i, node) in sorted.iter().enumerate() {
                let center = start + step * i as f32;
                result.insert(
                    node.id,
                    Position::new(node.position.x, center - node.size.height / 2.0),
                );
            }
        }
    }

    result
}

fn fold_min(values: impl Iterator<Item = f32>) -> f32 {
    values.fold(f32::INFINITY, f32::min)
}

fn fold_max(values: impl Iterator<Item = f32>) -> f32 {
    values.fold(f32::NEG_INFINITY, f32::max)
}

// ─── Tests ───────────────────────────────────────────────────────────────
