//! Table limits and default configuration values.

use super::entities::Chips;

/// Hard cap on seats at a single table.
pub const MAX_SEATS: u8 = 6;

/// Default number of seats a table is configured with.
pub const DEFAULT_MAX_SEATS: u8 = 6;

/// Default minimum number of playable seats required to start a hand.
pub const DEFAULT_MIN_PLAYERS_TO_START: u8 = 2;

/// Default chip stack each seat starts a table run with.
pub const DEFAULT_STARTING_STACK: Chips = 10_000;

/// Default small blind.
pub const DEFAULT_SMALL_BLIND: Chips = 50;

/// Default big blind.
pub const DEFAULT_BIG_BLIND: Chips = 100;

/// Default deadline handed to the decision source, in milliseconds.
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 2_000;

/// Default safety bound on actions applied within a single hand.
pub const DEFAULT_MAX_ACTIONS_PER_HAND: u32 = 512;

/// Hole cards dealt to each playable seat.
pub const HOLE_CARDS_PER_SEAT: usize = 2;

/// Community cards on a complete board.
pub const BOARD_SIZE: usize = 5;
