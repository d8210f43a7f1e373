//! Block management: owns every block and runs the drag → snap → connect →
//! reflow pipeline on top of the chain, snap, connect, and layout modules.
//!
//! Blocks live in one flat collection and refer to their successor by id, so
//! deleting or relinking never leaves an owner behind. All calls happen on the
//! UI thread; one drag end runs detection, connection, and reflow in a single
//! call, so no half-updated state is ever painted.

use crate::block::{Block, BlockContent};
use crate::chain::{self, ChainPosition};
use crate::config::EditorConfig;
use crate::connect;
use crate::constants::INSERT_OFFSET_X;
use crate::deferred::{DeferredAction, DeferredQueue};
use crate::layout::{self, LayoutConfig};
use crate::snap::{self, SnapConfig, SnapTarget, Slot};
use eframe::egui::{vec2, Pos2, Vec2};
use std::time::Duration;
use uuid::Uuid;

/// Transient state of the drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub dragged: Uuid,
    /// Dragged block position when the drag began.
    pub start_position: Pos2,
    /// Positions of the dragged sub-chain when the drag began.
    pub unit_start: Vec<(Uuid, Pos2)>,
    /// Predecessor the dragged block was broken away from, if any.
    pub detached_from: Option<Uuid>,
    /// Snap that releasing now would commit.
    pub candidate: Option<SnapTarget>,
}

impl DragSession {
    pub fn candidate_target(&self) -> Option<Uuid> {
        self.candidate.map(|c| c.target)
    }

    pub fn candidate_slot(&self) -> Option<Slot> {
        self.candidate.map(|c| c.slot)
    }
}

/// What a finished drag did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The dragged sub-chain was linked to `target`; `head` is the head of
    /// the combined chain.
    Connected {
        target: Uuid,
        slot: Slot,
        head: Uuid,
    },
    /// Nothing was in range; the sub-chain stays where it was dropped.
    Released,
    /// The block no longer exists.
    Ignored,
}

/// Manages the collection of blocks with operations for lookup, linking, and layout.
pub struct BlockManager {
    blocks: Vec<Block>,
    snap: SnapConfig,
    layout: LayoutConfig,
    fade_out: Duration,
    drag: Option<DragSession>,
    deferred: DeferredQueue,
}

#[allow(dead_code)]
impl BlockManager {
    /// Creates a new empty BlockManager with default settings.
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            blocks: Vec::new(),
            snap: config.snap,
            layout: config.layout,
            fade_out: config.fade_out(),
            drag: None,
            deferred: DeferredQueue::new(),
        }
    }

    /// Applies new settings. Existing chains are restacked with the new spacing.
    pub fn apply_config(&mut self, config: &EditorConfig) {
        self.snap = config.snap;
        self.layout = config.layout;
        self.fade_out = config.fade_out();
        for head in chain::heads(&self.blocks) {
            layout::reflow(&mut self.blocks, head, &self.layout);
        }
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn snap_config(&self) -> &SnapConfig {
        &self.snap
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Block Collection Access
    // ─────────────────────────────────────────────────────────────────────────────

    /// Returns a slice of all blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns an immutable reference to a block by its ID.
    pub fn get(&self, id: Uuid) -> Option<&Block> {
        chain::get(&self.blocks, id)
    }

    /// Returns a mutable reference to a block by its ID.
    ///
    /// Meant for editing content; links must go through the manager.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Block> {
        chain::get_mut(&mut self.blocks, id)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Block CRUD Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Adds a standalone block and returns its id.
    pub fn add_block(&mut self, position: Pos2, content: BlockContent) -> Uuid {
        let block = Block::new(position, content);
        let id = block.id;
        log::debug!("added {} block {id}", block.content.kind.name);
        self.blocks.push(block);
        id
    }

    /// Creates a block right after `id`, between it and its current successor.
    pub fn insert_after(&mut self, id: Uuid, content: BlockContent) -> Option<Uuid> {
        let anchor = self.get(id)?;
        let position = anchor.position + vec2(INSERT_OFFSET_X, self.layout.block_spacing);
        let mut block = Block::new(position, content);
        block.next = anchor.next;
        let new_id = block.id;

        self.blocks.push(block);
        if let Some(anchor) = self.get_mut(id) {
            anchor.next = Some(new_id);
        }
        self.reflow_chain_of(id);
        log::debug!("inserted {new_id} after {id}");
        Some(new_id)
    }

    /// Removes a block, linking its predecessor straight to its successor.
    /// Returns false if there was no such block.
    pub fn delete_block(&mut self, id: Uuid) -> bool {
        let Some(index) = self.blocks.iter().position(|b| b.id == id) else {
            log::debug!("delete of unknown block {id} ignored");
            return false;
        };
        let next = self.blocks[index].next;
        let predecessor = chain::predecessor(&self.blocks, id);
        if let Some(predecessor) = predecessor {
            if let Some(block) = self.get_mut(predecessor) {
                block.next = next;
            }
        }
        self.blocks.remove(index);

        if self.drag.as_ref().is_some_and(|s| s.dragged == id) {
            self.drag = None;
        }
        match (predecessor, next) {
            (Some(predecessor), _) => self.reflow_chain_of(predecessor),
            (None, Some(next)) => self.reflow_chain_of(next),
            (None, None) => {}
        }
        log::debug!("deleted {id}");
        true
    }

    /// Replaces the parameters of `id`. Its width may change, so the chain
    /// it belongs to is restacked.
    pub fn set_content(&mut self, id: Uuid, content: BlockContent) -> bool {
        let Some(block) = self.get_mut(id) else {
            return false;
        };
        block.content = content;
        self.reflow_chain_of(id);
        true
    }

    /// Turns every block into a standalone block. Blocks stay where they are.
    pub fn clear_all_links(&mut self) {
        for block in &mut self.blocks {
            block.next = None;
        }
        self.drag = None;
        log::info!("cleared all links between {} block(s)", self.blocks.len());
    }

    /// Removes every block.
    pub fn clear_all(&mut self) {
        self.blocks.clear();
        self.drag = None;
        self.deferred.clear();
        log::info!("cleared all blocks");
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Chain Queries
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn chain_position(&self, id: Uuid) -> ChainPosition {
        chain::chain_position(&self.blocks, id)
    }

    /// Label such as "[2]" for linked blocks, `None` for standalone ones.
    pub fn display_label(&self, id: Uuid) -> Option<String> {
        self.chain_position(id).label()
    }

    pub fn is_head(&self, id: Uuid) -> bool {
        chain::is_head(&self.blocks, id)
    }

    pub fn has_incoming_link(&self, id: Uuid) -> bool {
        chain::has_incoming_link(&self.blocks, id)
    }

    pub fn chain_head(&self, id: Uuid) -> Uuid {
        chain::chain_head(&self.blocks, id)
    }

    pub fn chain_members(&self, id: Uuid) -> Vec<Uuid> {
        chain::chain_members(&self.blocks, id)
    }

    pub fn chain_count(&self) -> usize {
        chain::heads(&self.blocks).len()
    }

    fn reflow_chain_of(&mut self, id: Uuid) {
        let head = chain::chain_head(&self.blocks, id);
        layout::reflow(&mut self.blocks, head, &self.layout);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Drag Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Opens a drag session for `id`. A block that is not a chain head is
    /// broken away from its predecessor here, and the chain it leaves is
    /// restacked. Cancelling the drag later does not undo that break.
    fn begin_drag(&mut self, id: Uuid) -> Option<DragSession> {
        let start_position = self.get(id)?.position;
        let detached_from = connect::detach(&mut self.blocks, id);
        if let Some(predecessor) = detached_from {
            self.reflow_chain_of(predecessor);
        }
        let unit_start = chain::walk(&self.blocks, id)
            .into_iter()
            .filter_map(|member| self.get(member).map(|b| (member, b.position)))
            .collect();
        Some(DragSession {
            dragged: id,
            start_position,
            unit_start,
            detached_from,
            candidate: None,
        })
    }

    /// Moves the dragged block and everything after it by `delta`, and
    /// refreshes the snap candidate. Nothing is linked yet.
    pub fn on_drag_changed(&mut self, id: Uuid, delta: Vec2) {
        if self.get(id).is_none() {
            return;
        }
        if self.drag.as_ref().map(|s| s.dragged) != Some(id) {
            self.drag = self.begin_drag(id);
        }
        layout::translate_sub_chain(&mut self.blocks, id, delta);

        let candidate = self
            .get(id)
            .map(|b| b.position)
            .and_then(|at| snap::detect(&self.blocks, id, at, &self.snap, &self.layout));
        if let Some(session) = self.drag.as_mut() {
            session.candidate = candidate;
        }
    }

    /// Finishes a drag. The dragged block ends up `total_translation` away
    /// from where the drag began; then it is snapped and linked if something
    /// is in range, and its chain is restacked either way.
    pub fn on_drag_ended(&mut self, id: Uuid, total_translation: Vec2) -> DragOutcome {
        let session = match self.drag.take() {
            Some(session) if session.dragged == id => Some(session),
            _ => self.begin_drag(id),
        };
        let Some(session) = session else {
            return DragOutcome::Ignored;
        };

        let release = session.start_position + total_translation;
        self.move_unit_to(id, release);

        match snap::detect(&self.blocks, id, release, &self.snap, &self.layout) {
            Some(target) => {
                self.move_unit_to(id, target.snap_position);
                let head =
                    connect::connect(&mut self.blocks, id, target.target, target.slot, &self.layout);
                log::info!(
                    "connected {id} to {} via {:?} ({:?})",
                    target.target,
                    target.slot,
                    target.kind
                );
                DragOutcome::Connected {
                    target: target.target,
                    slot: target.slot,
                    head,
                }
            }
            None => {
                layout::reflow(&mut self.blocks, id, &self.layout);
                DragOutcome::Released
            }
        }
    }

    /// Abandons the drag in progress, putting the dragged sub-chain back where
    /// it started. A break from the predecessor that already happened stays.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(session) = self.drag.take() else {
            return false;
        };
        for (id, position) in session.unit_start {
            if let Some(block) = self.get_mut(id) {
                block.position = position;
            }
        }
        log::debug!("drag of {} cancelled", session.dragged);
        true
    }

    fn move_unit_to(&mut self, id: Uuid, position: Pos2) {
        if let Some(current) = self.get(id).map(|b| b.position) {
            layout::translate_sub_chain(&mut self.blocks, id, position - current);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Deferred Deletion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Deletes `id` once its fade-out is over.
    pub fn schedule_delete(&mut self, id: Uuid) {
        let action = DeferredAction::Delete(id);
        if self.get(id).is_some() && !self.deferred.is_scheduled(action) {
            self.deferred.schedule(self.fade_out, action);
        }
    }

    pub fn is_pending_delete(&self, id: Uuid) -> bool {
        self.deferred.is_scheduled(DeferredAction::Delete(id))
    }

    /// Opacity for painting: 1.0 normally, falling to 0.0 while fading out.
    pub fn opacity(&self, id: Uuid) -> f32 {
        match self.deferred.remaining(DeferredAction::Delete(id)) {
            Some(remaining) if !self.fade_out.is_zero() => {
                (remaining.as_secs_f32() / self.fade_out.as_secs_f32()).clamp(0.0, 1.0)
            }
            Some(_) => 0.0,
            None => 1.0,
        }
    }

    /// Runs deferred tasks that came due during the last `dt` seconds.
    /// Returns how many ran.
    pub fn advance(&mut self, dt: f32) -> usize {
        let due = self.deferred.advance(dt);
        for action in &due {
            match *action {
                DeferredAction::Delete(id) => {
                    self.delete_block(id);
                }
            }
        }
        due.len()
    }

    pub fn time_until_next_task(&self) -> Option<Duration> {
        self.deferred.time_until_next()
    }
}

impl Default for BlockManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{config_by_name, BLOCK_CATALOG};
    use crate::constants::BLOCK_SPACING;
    use eframe::egui::pos2;
    use pretty_assertions::assert_eq;

    fn content() -> BlockContent {
        BlockContent::new(&BLOCK_CATALOG[0])
    }

    fn assert_invariants(manager: &BlockManager) {
        if let Err(err) = chain::validate(manager.blocks()) {
            panic!("invariant violated: {err}");
        }
    }

    fn y(manager: &BlockManager, id: Uuid) -> f32 {
        manager.get(id).unwrap().position.y
    }

    /// Builds a chain by inserting blocks one after another.
    fn chain_of(manager: &mut BlockManager, at: Pos2, count: usize) -> Vec<Uuid> {
        let mut ids = vec![manager.add_block(at, content())];
        for _ in 1..count {
            let last = *ids.last().unwrap();
            ids.push(manager.insert_after(last, content()).unwrap());
        }
        ids
    }

    #[test]
    fn test_attach_from_above() {
        let mut manager = BlockManager::new();
        let a = manager.add_block(pos2(100.0, 0.0), content());
        let b = manager.add_block(pos2(100.0, 100.0), content());

        manager.on_drag_changed(a, vec2(0.0, 45.0));
        let outcome = manager.on_drag_ended(a, vec2(0.0, 45.0));

        assert_eq!(
            outcome,
            DragOutcome::Connected {
                target: b,
                slot: Slot::Top,
                head: a
            }
        );
        assert_eq!(manager.get(a).unwrap().next, Some(b));
        assert_eq!(y(&manager, b), y(&manager, a) + BLOCK_SPACING);
        assert_eq!(y(&manager, b), 100.0);
        assert_invariants(&manager);
    }

    #[test]
    fn test_drag_end_without_intermediate_updates() {
        let mut manager = BlockManager::new();
        let a = manager.add_block(pos2(100.0, 300.0), content());
        let b = manager.add_block(pos2(100.0, 0.0), content());

        let outcome = manager.on_drag_ended(a, vec2(5.0, -250.0));
        assert!(matches!(outcome, DragOutcome::Connected { slot: Slot::Bottom, .. }));
        assert_eq!(manager.chain_members(a), vec![b, a]);
    }

    #[test]
    fn test_insertion_between_head_and_tail() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 2);
        let (a, c) = (chain[0], chain[1]);
        let b = manager.add_block(pos2(400.0, 400.0), content());

        // Drop B just under A, overlapping C.
        let outcome = manager.on_drag_ended(b, pos2(100.0, 130.0) - pos2(400.0, 400.0));
        assert!(matches!(outcome, DragOutcome::Connected { slot: Slot::Insert, .. }));
        assert_eq!(manager.chain_members(a), vec![a, b, c]);
        assert_eq!(manager.block_count(), 3);
        assert!(y(&manager, a) < y(&manager, b) && y(&manager, b) < y(&manager, c));
        assert_invariants(&manager);
    }

    #[test]
    fn test_chain_merge_above() {
        let mut manager = BlockManager::new();
        let ab = chain_of(&mut manager, pos2(100.0, 300.0), 2);
        let cd = chain_of(&mut manager, pos2(500.0, 0.0), 2);
        let start = manager.get(cd[0]).unwrap().position;

        // C's tail lands 60 above A.
        let outcome = manager.on_drag_ended(cd[0], pos2(100.0, 180.0) - start);
        assert!(matches!(outcome, DragOutcome::Connected { slot: Slot::Top, .. }));
        assert_eq!(manager.chain_members(ab[1]), vec![cd[0], cd[1], ab[0], ab[1]]);
        assert_eq!(manager.block_count(), 4);
        assert_eq!(manager.chain_count(), 1);
        // The target chain did not move.
        assert_eq!(y(&manager, ab[0]), 300.0);
        assert_invariants(&manager);
    }

    #[test]
    fn test_chain_merge_below() {
        let mut manager = BlockManager::new();
        let ab = chain_of(&mut manager, pos2(100.0, 300.0), 2);
        let cd = chain_of(&mut manager, pos2(500.0, 0.0), 2);
        let start = manager.get(cd[0]).unwrap().position;

        let outcome = manager.on_drag_ended(cd[0], pos2(100.0, 340.0) - start);
        assert!(matches!(outcome, DragOutcome::Connected { slot: Slot::Insert, .. }));
        assert_eq!(manager.chain_members(ab[0]), vec![ab[0], cd[0], cd[1], ab[1]]);
        assert_invariants(&manager);
    }

    #[test]
    fn test_dragging_mid_chain_block_breaks_it_off() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 3);

        manager.on_drag_changed(chain[1], vec2(300.0, 0.0));
        let session = manager.drag_session().unwrap();
        assert_eq!(session.detached_from, Some(chain[0]));
        assert!(manager.get(chain[0]).unwrap().next.is_none());

        let outcome = manager.on_drag_ended(chain[1], vec2(300.0, 0.0));
        assert_eq!(outcome, DragOutcome::Released);
        assert_eq!(manager.chain_members(chain[1]), vec![chain[1], chain[2]]);
        assert_eq!(manager.chain_count(), 2);
        // The sub-chain moved rigidly and was restacked under its new head.
        assert_eq!(y(&manager, chain[2]), y(&manager, chain[1]) + BLOCK_SPACING);
        assert!(manager.drag_session().is_none());
        assert_invariants(&manager);
    }

    #[test]
    fn test_moving_a_head_moves_the_whole_chain() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 3);
        let before: Vec<Pos2> = chain.iter().map(|&id| manager.get(id).unwrap().position).collect();

        manager.on_drag_changed(chain[0], vec2(250.0, 40.0));
        manager.on_drag_ended(chain[0], vec2(250.0, 40.0));

        for (id, old) in chain.iter().zip(before) {
            assert_eq!(manager.get(*id).unwrap().position, old + vec2(250.0, 40.0));
        }
        assert_eq!(manager.chain_members(chain[2]), chain);
    }

    #[test]
    fn test_drag_session_tracks_candidate() {
        let mut manager = BlockManager::new();
        let a = manager.add_block(pos2(100.0, 0.0), content());
        let b = manager.add_block(pos2(100.0, 100.0), content());

        manager.on_drag_changed(a, vec2(0.0, 10.0));
        assert_eq!(manager.drag_session().unwrap().candidate_target(), None);

        manager.on_drag_changed(a, vec2(0.0, 35.0));
        let session = manager.drag_session().unwrap();
        assert_eq!(session.candidate_target(), Some(b));
        assert_eq!(session.candidate_slot(), Some(Slot::Top));
        // Highlighting alone commits nothing.
        assert!(manager.get(a).unwrap().next.is_none());
    }

    #[test]
    fn test_cancel_restores_positions_but_keeps_break() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 3);
        let before: Vec<Pos2> = chain.iter().map(|&id| manager.get(id).unwrap().position).collect();

        manager.on_drag_changed(chain[1], vec2(80.0, 80.0));
        assert!(manager.cancel_drag());

        assert_eq!(manager.get(chain[1]).unwrap().position, before[1]);
        assert_eq!(manager.get(chain[2]).unwrap().position, before[2]);
        assert!(manager.get(chain[0]).unwrap().next.is_none());
        assert!(!manager.cancel_drag());
    }

    #[test]
    fn test_cancel_of_head_drag_leaves_structure_untouched() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 2);

        manager.on_drag_changed(chain[0], vec2(0.0, -300.0));
        manager.cancel_drag();
        assert_eq!(manager.chain_members(chain[0]), chain);
        assert_eq!(y(&manager, chain[0]), 100.0);
    }

    #[test]
    fn test_delete_skip_links() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 3);

        assert!(manager.delete_block(chain[1]));
        assert_eq!(manager.block_count(), 2);
        assert!(manager.get(chain[1]).is_none());
        assert_eq!(manager.chain_members(chain[0]), vec![chain[0], chain[2]]);
        assert!(manager.blocks().iter().all(|b| b.next != Some(chain[1])));
        assert_eq!(y(&manager, chain[2]), y(&manager, chain[0]) + BLOCK_SPACING);
        assert_invariants(&manager);
    }

    #[test]
    fn test_delete_head_and_tail() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 3);

        assert!(manager.delete_block(chain[0]));
        assert!(manager.is_head(chain[1]));
        assert!(manager.delete_block(chain[2]));
        assert_eq!(manager.chain_position(chain[1]), ChainPosition::Standalone);
        assert_invariants(&manager);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut manager = BlockManager::new();
        manager.add_block(pos2(0.0, 0.0), content());
        assert!(!manager.delete_block(Uuid::new_v4()));
        assert_eq!(manager.block_count(), 1);
    }

    #[test]
    fn test_insert_after_keeps_successor() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 2);
        let wait = BlockContent::new(config_by_name("wait").unwrap());

        let new_id = manager.insert_after(chain[0], wait).unwrap();
        assert_eq!(manager.chain_members(chain[0]), vec![chain[0], new_id, chain[1]]);
        assert_eq!(manager.display_label(new_id).as_deref(), Some("[1]"));
        assert_eq!(manager.display_label(chain[1]).as_deref(), Some("[2]"));
        assert!(manager.insert_after(Uuid::new_v4(), content()).is_none());
    }

    #[test]
    fn test_set_content_keeps_connectors_aligned() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 2);
        let display = config_by_name("display").unwrap();
        let wide = BlockContent::with_data(
            display,
            crate::block::BlockData {
                selected: None,
                text: "a much longer message".to_string(),
            },
        );

        assert!(manager.set_content(chain[1], wide));
        let head = manager.get(chain[0]).unwrap();
        let second = manager.get(chain[1]).unwrap();
        assert!(second.width() > head.width());
        assert!((second.connector_x() - head.connector_x()).abs() < 1e-3);
        assert!(!manager.set_content(Uuid::new_v4(), content()));
    }

    #[test]
    fn test_clear_all_links() {
        let mut manager = BlockManager::new();
        chain_of(&mut manager, pos2(100.0, 100.0), 3);
        chain_of(&mut manager, pos2(400.0, 100.0), 2);

        manager.clear_all_links();
        assert_eq!(manager.block_count(), 5);
        assert!(manager.blocks().iter().all(|b| b.next.is_none()));
        assert_eq!(manager.chain_count(), 5);
    }

    #[test]
    fn test_clear_all() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 2);
        manager.schedule_delete(chain[0]);
        manager.clear_all();
        assert!(manager.is_empty());
        assert_eq!(manager.time_until_next_task(), None);
    }

    #[test]
    fn test_no_connection_into_own_chain() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 3);
        let start = manager.get(chain[0]).unwrap().position;

        // Drop the head just below its own tail.
        let tail_y = y(&manager, chain[2]);
        let outcome = manager.on_drag_ended(chain[0], pos2(100.0, tail_y + 50.0) - start);
        assert_eq!(outcome, DragOutcome::Released);
        assert_eq!(manager.chain_members(chain[0]), chain);
        assert_invariants(&manager);
    }

    #[test]
    fn test_deferred_delete() {
        let config = EditorConfig {
            fade_out_ms: 200,
            ..EditorConfig::default()
        };
        let mut manager = BlockManager::with_config(&config);
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 2);

        manager.schedule_delete(chain[0]);
        manager.schedule_delete(chain[0]);
        assert!(manager.is_pending_delete(chain[0]));
        assert_eq!(manager.advance(0.1), 0);
        let opacity = manager.opacity(chain[0]);
        assert!(opacity > 0.0 && opacity < 1.0);
        assert_eq!(manager.opacity(chain[1]), 1.0);

        assert_eq!(manager.advance(0.2), 1);
        assert!(manager.get(chain[0]).is_none());
        assert_eq!(manager.block_count(), 1);
        assert_invariants(&manager);
    }

    #[test]
    fn test_apply_config_restacks_chains() {
        let mut manager = BlockManager::new();
        let chain = chain_of(&mut manager, pos2(100.0, 100.0), 3);

        let mut config = EditorConfig::default();
        config.layout.block_spacing = 80.0;
        manager.apply_config(&config);
        assert_eq!(y(&manager, chain[2]), 260.0);
    }

    #[test]
    fn test_random_operations_keep_invariants() {
        // Deterministic pseudo-random walk over drags, inserts, and deletes.
        let mut manager = BlockManager::new();
        let mut seed: u32 = 12345;
        let mut next_rand = move |bound: u32| {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (seed >> 16) % bound
        };
        for i in 0..8 {
            manager.add_block(pos2(100.0 + (i % 2) as f32 * 20.0, i as f32 * 40.0), content());
        }
        for _ in 0..300 {
            let ids: Vec<Uuid> = manager.blocks().iter().map(|b| b.id).collect();
            if ids.is_empty() {
                manager.add_block(pos2(100.0, 100.0), content());
                continue;
            }
            let id = ids[next_rand(ids.len() as u32) as usize];
            match next_rand(10) {
                0 => {
                    manager.delete_block(id);
                }
                1 => {
                    manager.insert_after(id, content());
                }
                2 => manager.clear_all_links(),
                _ => {
                    let delta = vec2(
                        next_rand(120) as f32 - 60.0,
                        next_rand(240) as f32 - 120.0,
                    );
                    manager.on_drag_changed(id, delta);
                    manager.on_drag_ended(id, delta);
                }
            }
            assert_invariants(&manager);
        }
    }
}
