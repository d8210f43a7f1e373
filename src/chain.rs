//! Derived queries over the flat block collection.
//!
//! Nothing here is cached: every query scans the slice it is given, so the
//! answers can never go stale after a `next` mutation. Queries on ids that are
//! not in the slice see a block without links.

use crate::block::Block;
use uuid::Uuid;

/// Where a block sits relative to the chain it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    /// No incoming and no outgoing link.
    Standalone,
    /// Zero-based index counted from the chain head.
    Linked(usize),
}

impl ChainPosition {
    /// Label shown on the block, e.g. "[2]". Standalone blocks get none.
    pub fn label(&self) -> Option<String> {
        match self {
            ChainPosition::Standalone => None,
            ChainPosition::Linked(index) => Some(format!("[{index}]")),
        }
    }
}

pub fn get(blocks: &[Block], id: Uuid) -> Option<&Block> {
    blocks.iter().find(|b| b.id == id)
}

pub fn get_mut(blocks: &mut [Block], id: Uuid) -> Option<&mut Block> {
    blocks.iter_mut().find(|b| b.id == id)
}

pub fn next_of(blocks: &[Block], id: Uuid) -> Option<Uuid> {
    get(blocks, id).and_then(|b| b.next)
}

/// Returns the block whose `next` is `id`, if any.
pub fn predecessor(blocks: &[Block], id: Uuid) -> Option<Uuid> {
    blocks.iter().find(|b| b.next == Some(id)).map(|b| b.id)
}

pub fn has_incoming_link(blocks: &[Block], id: Uuid) -> bool {
    predecessor(blocks, id).is_some()
}

pub fn is_head(blocks: &[Block], id: Uuid) -> bool {
    !has_incoming_link(blocks, id)
}

pub fn is_tail(blocks: &[Block], id: Uuid) -> bool {
    next_of(blocks, id).is_none()
}

/// Walks predecessors until a block without an incoming link is found.
///
/// A cycle is an invariant violation: it trips a debug assertion, and in
/// release builds the walk stops after visiting every block once.
pub fn chain_head(blocks: &[Block], id: Uuid) -> Uuid {
    let mut head = id;
    for _ in 0..=blocks.len() {
        match predecessor(blocks, head) {
            Some(previous) => head = previous,
            None => return head,
        }
    }
    log::error!("cycle detected while looking for the head of {id}");
    debug_assert!(false, "cycle detected while looking for the head of {id}");
    head
}

/// Walks `next` from the chain head of `id` down to the block without a successor.
pub fn chain_tail(blocks: &[Block], id: Uuid) -> Uuid {
    let head = chain_head(blocks, id);
    walk(blocks, head).last().copied().unwrap_or(head)
}

/// Tail of the sub-chain starting at `id` (the block itself when it has no successor).
pub fn sub_chain_tail(blocks: &[Block], id: Uuid) -> Uuid {
    walk(blocks, id).last().copied().unwrap_or(id)
}

/// `id` followed by every block reachable from it through `next`.
pub fn walk(blocks: &[Block], id: Uuid) -> Vec<Uuid> {
    let mut ids = Vec::new();
    let mut current = get(blocks, id).map(|b| b.id);
    while let Some(node) = current {
        if ids.len() > blocks.len() {
            log::error!("cycle detected while walking from {id}");
            debug_assert!(false, "cycle detected while walking from {id}");
            break;
        }
        ids.push(node);
        current = next_of(blocks, node);
    }
    ids
}

/// All members of the chain containing `id`, head first.
pub fn chain_members(blocks: &[Block], id: Uuid) -> Vec<Uuid> {
    walk(blocks, chain_head(blocks, id))
}

/// True iff `b` is reachable from the head of `a`'s chain.
pub fn same_chain(blocks: &[Block], a: Uuid, b: Uuid) -> bool {
    chain_members(blocks, a).contains(&b)
}

pub fn chain_position(blocks: &[Block], id: Uuid) -> ChainPosition {
    let members = chain_members(blocks, id);
    if members.len() <= 1 {
        return ChainPosition::Standalone;
    }
    members
        .iter()
        .position(|&member| member == id)
        .map(ChainPosition::Linked)
        .unwrap_or(ChainPosition::Standalone)
}

/// Heads of every chain, singletons included, in collection order.
pub fn heads(blocks: &[Block]) -> Vec<Uuid> {
    blocks
        .iter()
        .filter(|b| is_head(blocks, b.id))
        .map(|b| b.id)
        .collect()
}

/// Checks the structural invariants: no block has two predecessors, every
/// link points at a live block, and every chain terminates.
pub fn validate(blocks: &[Block]) -> Result<(), String> {
    for block in blocks {
        let incoming = blocks.iter().filter(|b| b.next == Some(block.id)).count();
        if incoming > 1 {
            return Err(format!("{} has {incoming} predecessors", block.id));
        }
        if let Some(next) = block.next {
            if next == block.id {
                return Err(format!("{} links to itself", block.id));
            }
            if get(blocks, next).is_none() {
                return Err(format!("{} links to missing block {next}", block.id));
            }
        }
    }
    for block in blocks {
        let mut current = Some(block.id);
        let mut steps = 0;
        while let Some(node) = current {
            if steps > blocks.len() {
                return Err(format!("cycle reachable from {}", block.id));
            }
            steps += 1;
            current = next_of(blocks, node);
        }
    }
    Ok(())
}
