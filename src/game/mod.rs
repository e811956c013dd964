//! Pure hand logic: entities, the hand state machine, hand evaluation, and
//! pot resolution. Nothing in this module performs I/O or suspends; the
//! async table runner in [`crate::table`] drives it.

pub mod constants;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod showdown;
pub mod state_machine;

pub use entities::{
    Action, ActionKind, AwardReason, Card, Chips, Deck, HandPhase, HandState, PotAward, SeatCards,
    SeatNo, SeatState, SeatStatus, Suit, TableConfig,
};
pub use errors::GameError;
pub use functional::{HandCategory, HandRank, evaluate_best_hand, evaluate_five};
pub use showdown::{award_uncontested, resolve_pots};
pub use state_machine::{StartNewHandInput, apply_action, start_new_hand};
