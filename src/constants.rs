//! Centralized constants for block geometry, snapping, and colors.
//!
//! Snap thresholds and spacing are only defaults; the values actually used at
//! runtime come from [`crate::config::EditorConfig`].

use eframe::egui::Color32;

// =============================================================================
// BLOCK GEOMETRY CONSTANTS
// =============================================================================

/// Height of a block body, excluding the bottom tab.
pub const BLOCK_BODY_HEIGHT: f32 = 54.0;

/// Narrowest a block may be, regardless of its label.
pub const MIN_BLOCK_WIDTH: f32 = 120.0;

/// Horizontal padding on each side of the block label.
pub const BLOCK_TEXT_PADDING: f32 = 12.0;

/// Approximate advance of one label character, used for width estimation.
pub const CHAR_WIDTH: f32 = 7.5;

/// Width reserved for a dropdown parameter widget.
pub const DROPDOWN_WIDTH: f32 = 56.0;

/// Minimum width of a free-text parameter widget.
pub const TEXT_FIELD_MIN_WIDTH: f32 = 36.0;

/// Gap between the label and the parameter widgets.
pub const WIDGET_GAP: f32 = 6.0;

/// Distance from a block's left edge to the center of its top slot / bottom tab.
pub const CONNECTOR_INSET: f32 = 30.0;

/// Width of the top slot notch and the bottom tab bump.
pub const CONNECTOR_WIDTH: f32 = 20.0;

/// Depth of the top slot notch and height of the bottom tab bump.
pub const CONNECTOR_DEPTH: f32 = 6.0;

/// Corner radius for block bodies.
pub const BLOCK_CORNER_RADIUS: f32 = 8.0;

// =============================================================================
// CHAIN LAYOUT CONSTANTS
// =============================================================================

/// Vertical distance between the centers of two linked blocks.
pub const BLOCK_SPACING: f32 = BLOCK_BODY_HEIGHT + CONNECTOR_DEPTH;

/// Offset applied to a block created through "insert after" before reflow.
pub const INSERT_OFFSET_X: f32 = 20.0;

// =============================================================================
// SNAP CONSTANTS
// =============================================================================

/// Maximum horizontal connector misalignment that still counts as a snap.
pub const SNAP_HORIZONTAL_TOLERANCE: f32 = 40.0;

/// Below this vertical distance the blocks overlap and no direction can be inferred.
pub const SNAP_MIN_VERTICAL_GAP: f32 = 10.0;

/// Beyond this vertical distance the blocks are too far apart to connect.
pub const SNAP_MAX_VERTICAL_GAP: f32 = BLOCK_SPACING + 10.0;

// =============================================================================
// TIMING CONSTANTS
// =============================================================================

/// Delay between requesting a deletion and actually removing the block.
pub const FADE_OUT_MS: u64 = 250;

// =============================================================================
// WINDOW CONSTANTS
// =============================================================================

/// Initial window width when the application starts.
pub const INITIAL_WINDOW_WIDTH: f32 = 1000.0;

/// Initial window height when the application starts.
pub const INITIAL_WINDOW_HEIGHT: f32 = 700.0;

/// Base size for toolbar buttons.
pub const TOOLBAR_BUTTON_SIZE: f32 = 32.0;

/// Spacing at the start of the toolbar.
pub const TOOLBAR_START_SPACING: f32 = 8.0;

// =============================================================================
// COLORS
// =============================================================================

/// Background color for the toolbar.
pub const COLOR_TOOLBAR_BG: Color32 = Color32::from_rgb(30, 30, 30);

/// Outline of a block that is part of a chain.
pub const COLOR_LINKED_STROKE: Color32 = Color32::BLACK;

/// Outline of a standalone block.
pub const COLOR_STANDALONE_STROKE: Color32 = Color32::GRAY;

/// Fill of an occupied top slot or bottom tab.
pub const COLOR_CONNECTOR_HIGHLIGHT: Color32 = Color32::from_rgba_premultiplied(153, 153, 0, 153);

/// Outline drawn around the block a drag would snap to.
pub const COLOR_SNAP_TARGET: Color32 = Color32::from_rgb(255, 220, 0);

/// Delete affordance button color.
pub const COLOR_DELETE_BUTTON: Color32 = Color32::RED;
