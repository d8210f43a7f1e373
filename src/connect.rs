//! Connection executor: rewires `next` links for a confirmed snap and
//! restacks the chain that results.

use crate::block::Block;
use crate::chain;
use crate::layout::{self, LayoutConfig};
use crate::snap::Slot;
use uuid::Uuid;

/// Links `dragged` (with everything after it) to `target` through `slot`,
/// then reflows the combined chain. Returns the head that was reflowed.
///
/// Positions are only touched by the reflow. The caller is responsible for
/// having checked that `slot` is free; that check is what keeps every block
/// at one predecessor at most.
pub fn connect(
    blocks: &mut [Block],
    dragged: Uuid,
    target: Uuid,
    slot: Slot,
    layout: &LayoutConfig,
) -> Uuid {
    debug_assert!(
        !chain::same_chain(blocks, dragged, target),
        "{dragged} and {target} are already in the same chain"
    );
    let dragged_tail = chain::sub_chain_tail(blocks, dragged);

    match slot {
        Slot::Top => {
            check_no_predecessor(blocks, target);
            set_next(blocks, dragged_tail, Some(target));
            log::debug!("attached {dragged} above {target}");
        }
        Slot::Bottom => {
            check_no_predecessor(blocks, dragged);
            debug_assert!(chain::is_tail(blocks, target), "{target} already has a successor");
            set_next(blocks, target, Some(dragged));
            log::debug!("attached {dragged} below {target}");
        }
        Slot::Insert => {
            check_no_predecessor(blocks, dragged);
            let original_next = chain::next_of(blocks, target);
            set_next(blocks, target, Some(dragged));
            set_next(blocks, dragged_tail, original_next);
            log::debug!("inserted {dragged} after {target}");
        }
    }

    let head = chain::chain_head(blocks, target);
    layout::reflow(blocks, head, layout);
    head
}

/// Detaches `id` from its predecessor, if it has one. Returns the former
/// predecessor.
pub fn detach(blocks: &mut [Block], id: Uuid) -> Option<Uuid> {
    let predecessor = chain::predecessor(blocks, id)?;
    set_next(blocks, predecessor, None);
    log::debug!("detached {id} from {predecessor}");
    Some(predecessor)
}

fn set_next(blocks: &mut [Block], id: Uuid, next: Option<Uuid>) {
    if let Some(block) = chain::get_mut(blocks, id) {
        block.next = next;
    }
}

fn check_no_predecessor(blocks: &[Block], id: Uuid) {
    if let Some(existing) = chain::predecessor(blocks, id) {
        log::error!("{id} would get a second predecessor besides {existing}");
        debug_assert!(false, "{id} would get a second predecessor besides {existing}");
    }
}
