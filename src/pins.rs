//! GPIO pin assignments for the LevelGuard board.
//!
//! Single source of truth: the binary references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

use crate::error::PinId;

// ---------------------------------------------------------------------------
// Level ladder (contacts pulled up, wet contact reads HIGH)
// ---------------------------------------------------------------------------

/// Ladder contacts, lowest first. Contact `i` reads as level `i + 1`.
pub const LEVEL_LADDER_PINS: [PinId; 8] = [4, 5, 6, 7, 15, 16, 17, 18];

/// Highest level the default ladder can report.
pub const LEVEL_LADDER_TOP: u32 = LEVEL_LADDER_PINS.len() as u32;
