//! Snap detection: decides which block, if any, a dragged sub-chain would
//! connect to when released at a tentative position.

use crate::block::Block;
use crate::chain;
use crate::constants::{SNAP_HORIZONTAL_TOLERANCE, SNAP_MAX_VERTICAL_GAP, SNAP_MIN_VERTICAL_GAP};
use crate::layout::LayoutConfig;
use eframe::egui::{pos2, Pos2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connector of the target block a snap would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Target's top slot: the dragged sub-chain's tail links to the target.
    Top,
    /// Target's bottom tab: the target links to the dragged block.
    Bottom,
    /// Target already has a successor: the dragged sub-chain is spliced
    /// between the target and that successor.
    Insert,
}

/// What kind of block the candidate is, in ascending order of priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateKind {
    MidChain,
    ChainHeadBelow,
    ChainHeadAbove,
    Isolated,
    ChainTail,
}

/// A proposed connection for the dragged block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    pub target: Uuid,
    pub slot: Slot,
    pub kind: CandidateKind,
    /// Where the dragged block's center goes when the snap is committed.
    pub snap_position: Pos2,
    /// Distance between the two connectors involved.
    pub distance: f32,
}

/// Proximity thresholds, measured between connector points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub horizontal_tolerance: f32,
    pub min_vertical_gap: f32,
    pub max_vertical_gap: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            horizontal_tolerance: SNAP_HORIZONTAL_TOLERANCE,
            min_vertical_gap: SNAP_MIN_VERTICAL_GAP,
            max_vertical_gap: SNAP_MAX_VERTICAL_GAP,
        }
    }
}

impl SnapConfig {
    fn in_range(&self, dx: f32, gap: f32) -> bool {
        dx.abs() < self.horizontal_tolerance
            && gap >= self.min_vertical_gap
            && gap <= self.max_vertical_gap
    }
}

/// Returns the best snap for `dragged` released at `candidate_position`.
pub fn detect(
    blocks: &[Block],
    dragged: Uuid,
    candidate_position: Pos2,
    snap: &SnapConfig,
    layout: &LayoutConfig,
) -> Option<SnapTarget> {
    candidates(blocks, dragged, candidate_position, snap, layout)
        .into_iter()
        .next()
}

/// Every acceptable snap, best first.
///
/// The dragged block moves together with everything after it. Blocks of its
/// own chain are never candidates, which rules out self-links and cycles.
pub fn candidates(
    blocks: &[Block],
    dragged: Uuid,
    candidate_position: Pos2,
    snap: &SnapConfig,
    layout: &LayoutConfig,
) -> Vec<SnapTarget> {
    let Some(dragged_block) = chain::get(blocks, dragged) else {
        return Vec::new();
    };
    let offset = candidate_position - dragged_block.position;
    let dragged_width = dragged_block.width();
    let dragged_connector = layout.connector_x(candidate_position.x, dragged_width);

    let unit = chain::walk(blocks, dragged);
    let unit_len = unit.len();
    let tail_id = unit.last().copied().unwrap_or(dragged);
    let Some(tail) = chain::get(blocks, tail_id) else {
        return Vec::new();
    };
    let tail_position = tail.position + offset;
    let tail_connector = layout.connector_x(tail_position.x, tail.width());

    // The unit's tail never has a successor, so only the leading end can be taken.
    let leading_free = chain::is_head(blocks, dragged);
    let own_chain = chain::chain_members(blocks, dragged);

    let mut found = Vec::new();
    for candidate in blocks {
        if own_chain.contains(&candidate.id) {
            continue;
        }
        let connector = layout.connector_x(candidate.position.x, candidate.width());
        let candidate_is_head = chain::is_head(blocks, candidate.id);
        let candidate_has_next = candidate.next.is_some();
        let aligned_x = layout.center_x(connector, dragged_width);

        // Dragged tail approaching the candidate's top slot from above.
        let dx = tail_connector - connector;
        let gap = candidate.position.y - tail_position.y;
        if candidate_is_head && snap.in_range(dx, gap) {
            let kind = if candidate_has_next {
                CandidateKind::ChainHeadAbove
            } else {
                CandidateKind::Isolated
            };
            found.push(SnapTarget {
                target: candidate.id,
                slot: Slot::Top,
                kind,
                snap_position: pos2(
                    aligned_x,
                    candidate.position.y - unit_len as f32 * layout.block_spacing,
                ),
                distance: dx.hypot(gap),
            });
        }

        // Dragged head approaching the candidate's bottom tab from below.
        let dx = dragged_connector - connector;
        let gap = candidate_position.y - candidate.position.y;
        if leading_free && snap.in_range(dx, gap) {
            let (slot, kind) = match (candidate_has_next, candidate_is_head) {
                (false, true) => (Slot::Bottom, CandidateKind::Isolated),
                (false, false) => (Slot::Bottom, CandidateKind::ChainTail),
                (true, true) => (Slot::Insert, CandidateKind::ChainHeadBelow),
                (true, false) => (Slot::Insert, CandidateKind::MidChain),
            };
            found.push(SnapTarget {
                target: candidate.id,
                slot,
                kind,
                snap_position: pos2(aligned_x, candidate.position.y + layout.block_spacing),
                distance: dx.hypot(gap),
            });
        }
    }

    found.sort_by(|a, b| {
        b.kind
            .cmp(&a.kind)
            .then_with(|| a.distance.total_cmp(&b.distance))
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::{block_at, linked};
    use pretty_assertions::assert_eq;

    const BLOCK_SPACING_DEFAULT: f32 = crate::constants::BLOCK_SPACING;

    fn detect_default(blocks: &[Block], dragged: Uuid, at: Pos2) -> Option<SnapTarget> {
        detect(
            blocks,
            dragged,
            at,
            &SnapConfig::default(),
            &LayoutConfig::default(),
        )
    }

    #[test]
    fn test_isolated_target_from_above() {
        let blocks = vec![block_at(100.0, 0.0), block_at(100.0, 100.0)];
        let (a, b) = (blocks[0].id, blocks[1].id);

        let snap = detect_default(&blocks, a, pos2(100.0, 45.0)).unwrap();
        assert_eq!(snap.target, b);
        assert_eq!(snap.slot, Slot::Top);
        assert_eq!(snap.kind, CandidateKind::Isolated);
        assert_eq!(snap.snap_position, pos2(100.0, 100.0 - BLOCK_SPACING_DEFAULT));
    }

    #[test]
    fn test_isolated_target_from_below() {
        let blocks = vec![block_at(100.0, 0.0), block_at(100.0, 300.0)];
        let (a, b) = (blocks[0].id, blocks[1].id);

        let snap = detect_default(&blocks, b, pos2(110.0, 50.0)).unwrap();
        assert_eq!(snap.target, a);
        assert_eq!(snap.slot, Slot::Bottom);
        assert_eq!(snap.snap_position, pos2(100.0, BLOCK_SPACING_DEFAULT));
    }

    #[test]
    fn test_out_of_range_is_none() {
        let blocks = vec![block_at(100.0, 0.0), block_at(100.0, 300.0)];
        let b = blocks[1].id;

        // Too far horizontally.
        assert!(detect_default(&blocks, b, pos2(200.0, 50.0)).is_none());
        // Too far vertically.
        assert!(detect_default(&blocks, b, pos2(100.0, 200.0)).is_none());
        // Sitting right on top of the other block.
        assert!(detect_default(&blocks, b, pos2(100.0, 2.0)).is_none());
    }

    #[test]
    fn test_same_chain_is_excluded() {
        let blocks = linked(3);
        let head = blocks[0].id;
        // Hovering right where the chain already is must not link it to itself.
        let at = blocks[0].position;
        assert!(detect_default(&blocks, head, at + eframe::egui::vec2(0.0, 20.0)).is_none());
    }

    #[test]
    fn test_occupied_top_slot_is_not_offered() {
        let mut blocks = linked(2);
        blocks.push(block_at(100.0, 0.0));
        let lone = blocks[2].id;
        let second = blocks[1].id;

        // Above the second block of a chain: its top slot is taken.
        let found = candidates(
            &blocks,
            lone,
            pos2(100.0, blocks[1].position.y - 50.0),
            &SnapConfig::default(),
            &LayoutConfig::default(),
        );
        assert!(found.iter().all(|s| s.target != second || s.slot != Slot::Top));
    }

    #[test]
    fn test_mid_chain_insertion() {
        let mut blocks = linked(3);
        blocks.push(block_at(500.0, 500.0));
        let middle = blocks[1].id;
        let lone = blocks[3].id;

        let at = pos2(100.0, blocks[1].position.y + 25.0);
        let snap = detect_default(&blocks, lone, at).unwrap();
        assert_eq!(snap.target, middle);
        assert_eq!(snap.slot, Slot::Insert);
        assert_eq!(snap.kind, CandidateKind::MidChain);
    }

    #[test]
    fn test_tail_outranks_isolated() {
        let mut blocks = linked(2);
        // Chain tail at y = 160, an isolated block at y = 260.
        blocks.push(block_at(100.0, 260.0));
        blocks.push(block_at(600.0, 600.0));
        let tail = blocks[1].id;
        let dragged = blocks[3].id;

        let found = candidates(
            &blocks,
            dragged,
            pos2(100.0, 205.0),
            &SnapConfig::default(),
            &LayoutConfig::default(),
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].target, tail);
        assert_eq!(found[0].kind, CandidateKind::ChainTail);
        assert_eq!(found[1].kind, CandidateKind::Isolated);
    }

    #[test]
    fn test_nearest_wins_within_same_kind() {
        let blocks = vec![
            block_at(100.0, 100.0),
            block_at(130.0, 100.0),
            block_at(600.0, 600.0),
        ];
        let far = blocks[0].id;
        let near = blocks[1].id;
        let dragged = blocks[2].id;

        let found = candidates(
            &blocks,
            dragged,
            pos2(125.0, 160.0),
            &SnapConfig::default(),
            &LayoutConfig::default(),
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].target, near);
        assert_eq!(found[1].target, far);
    }

    #[test]
    fn test_chain_head_above_outranks_chain_head_below() {
        assert!(CandidateKind::ChainHeadAbove > CandidateKind::ChainHeadBelow);
        assert!(CandidateKind::ChainHeadBelow > CandidateKind::MidChain);
        assert!(CandidateKind::ChainTail > CandidateKind::Isolated);
    }

    #[test]
    fn test_dragged_chain_measures_from_its_tail() {
        // Two-block chain dragged above a lone block: the tail must be close,
        // not the head.
        let mut blocks = linked(2);
        blocks.push(block_at(100.0, 600.0));
        let head = blocks[0].id;
        let lone = blocks[2].id;

        // Head at 490, tail at 550: 50 above the lone block.
        let snap = detect_default(&blocks, head, pos2(100.0, 490.0)).unwrap();
        assert_eq!(snap.target, lone);
        assert_eq!(snap.slot, Slot::Top);
        assert_eq!(
            snap.snap_position.y,
            600.0 - 2.0 * BLOCK_SPACING_DEFAULT
        );
    }

    #[test]
    fn test_non_head_cannot_take_a_bottom_tab() {
        let mut blocks = linked(2);
        blocks.push(block_at(400.0, 100.0));
        let second = blocks[1].id;

        // The second block still has its predecessor, so it may not become
        // anyone else's successor.
        let found = candidates(
            &blocks,
            second,
            pos2(400.0, 150.0),
            &SnapConfig::default(),
            &LayoutConfig::default(),
        );
        assert!(found.is_empty());
    }
}
