//! Chain reflow: restacks every block of a chain under its head so that the
//! top slots and bottom tabs line up.

use crate::block::Block;
use crate::chain;
use crate::constants::{BLOCK_SPACING, CONNECTOR_INSET};
use eframe::egui::pos2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geometry the reflow uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical distance between two linked blocks.
    pub block_spacing: f32,
    /// Distance from a block's left edge to its connector.
    pub connector_inset: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            block_spacing: BLOCK_SPACING,
            connector_inset: CONNECTOR_INSET,
        }
    }
}

impl LayoutConfig {
    /// Connector x of a block with the given center x and width.
    pub fn connector_x(&self, center_x: f32, width: f32) -> f32 {
        center_x - width / 2.0 + self.connector_inset
    }

    /// Center x placing a block's connector at `connector_x`.
    pub fn center_x(&self, connector_x: f32, width: f32) -> f32 {
        connector_x - self.connector_inset + width / 2.0
    }
}

/// Recomputes the position of every block reachable from `head`.
///
/// The head keeps its position. Block `i` of the chain lands `i` spacings
/// below the head, shifted horizontally so its connector sits on the head's.
/// Returns the number of blocks placed.
pub fn reflow(blocks: &mut [Block], head: Uuid, layout: &LayoutConfig) -> usize {
    let Some(head_block) = chain::get(blocks, head) else {
        return 0;
    };
    let origin = head_block.position;
    let connector_x = layout.connector_x(origin.x, head_block.width());

    let members = chain::walk(blocks, head);
    for (index, id) in members.iter().enumerate() {
        if let Some(block) = chain::get_mut(blocks, *id) {
            let x = layout.center_x(connector_x, block.width());
            let y = origin.y + index as f32 * layout.block_spacing;
            block.position = pos2(x, y);
        }
    }
    log::debug!("reflowed {} block(s) from {head}", members.len());
    members.len()
}

/// Moves `id` and every block after it by the same delta, keeping their
/// relative layout.
pub fn translate_sub_chain(blocks: &mut [Block], id: Uuid, delta: eframe::egui::Vec2) {
    for member in chain::walk(blocks, id) {
        if let Some(block) = chain::get_mut(blocks, member) {
            block.position += delta;
        }
    }
}
