//! Errors produced by the game module.
//!
//! A single enum covers the whole module, but the variants fall into the
//! classes the table runner cares about: construction/validation failures
//! that never reach the state machine, rule violations the runner absorbs
//! with its fallback policy, and structural failures that indicate a defect
//! rather than bad input. [`GameError::is_rule_violation`] separates the
//! middle class from the rest.

use serde::Serialize;
use thiserror::Error;

use super::entities::{ActionKind, Chips, SeatNo};

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum GameError {
    // --- configuration / construction ---
    #[error("card rank must be in range 2..=14, got {0}")]
    InvalidRank(u8),
    #[error("seat number must be in range 1..={max}, got {actual}")]
    InvalidSeatNo { max: u8, actual: u8 },
    #[error("table max_seats must be in range 2..={max}, got {actual}")]
    InvalidMaxSeats { max: u8, actual: u8 },
    #[error("min_players_to_start must be at least 2 and <= max_seats")]
    InvalidMinPlayersToStart,
    #[error("blinds must satisfy big_blind >= small_blind > 0")]
    InvalidBlindStructure,
    #[error("max_actions_per_hand must be greater than zero")]
    InvalidMaxActions,
    #[error("an amount is required for {0}")]
    MissingActionAmount(ActionKind),
    #[error("an amount is not allowed for {0}")]
    UnexpectedActionAmount(ActionKind),
    #[error("the amount for {0} must be positive")]
    ZeroActionAmount(ActionKind),

    // --- hand setup ---
    #[error("hand must start with at least {minimum} playable seats, got {actual}")]
    InsufficientSeats { minimum: u8, actual: usize },
    #[error("hand cannot exceed max_seats ({max}), got {actual}")]
    TooManySeats { max: u8, actual: usize },
    #[error("duplicate seat numbers are not allowed")]
    DuplicateSeat,
    #[error("button seat {0} is not part of the hand")]
    UnknownButtonSeat(SeatNo),
    #[error("failed to post blinds: no chips entered the pot")]
    BlindPostingFailed,

    // --- rule violations (recovered by the runner's fallback) ---
    #[error("seat {0} is not the acting seat or cannot act")]
    NotPlayersTurn(SeatNo),
    #[error("{0} is not legal in the current betting state")]
    IllegalAction(ActionKind),
    #[error("{kind} of {amount} is below the minimum of {minimum}")]
    BelowMinimum {
        kind: ActionKind,
        amount: Chips,
        minimum: Chips,
    },
    #[error("{kind} requires {required} chips but only {stack} are available")]
    InsufficientChips {
        kind: ActionKind,
        required: Chips,
        stack: Chips,
    },

    // --- structural (a defect, not bad input) ---
    #[error("hand is already complete")]
    HandAlreadyComplete,
    #[error("operation requires phase {required}, hand is in {actual}")]
    WrongPhase {
        required: &'static str,
        actual: &'static str,
    },
    #[error("deck exhausted while dealing")]
    DeckExhausted,
    #[error("seat {0} is missing hole cards")]
    MissingHoleCards(SeatNo),
    #[error("showdown requires a complete board, got {0} cards")]
    IncompleteBoard(usize),
}

impl GameError {
    /// True for errors the table runner recovers from via its fallback
    /// policy; everything else is fatal to the hand.
    #[must_use]
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::NotPlayersTurn(_)
                | Self::IllegalAction(_)
                | Self::BelowMinimum { .. }
                | Self::InsufficientChips { .. }
        )
    }
}
