//! The decision-source seam.
//!
//! The runner never talks to agents directly; it builds a
//! [`DecisionRequest`] snapshot for the acting seat and hands it to an
//! [`ActionProvider`]. Providers own their transport and their timeout; to
//! the runner they are just an async call that yields an [`Action`] or
//! fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::game::entities::{Action, ActionKind, Chips, HandState, SeatNo, SeatState};
use crate::game::errors::GameError;

/// Version tag carried in every decision request.
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("decision timed out after {0} ms")]
    Timeout(u64),
    #[error("decision source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed or illegal response: {0}")]
    InvalidResponse(String),
    #[error("scripted actions exhausted")]
    ScriptExhausted,
}

/// Everything an agent is allowed to see when asked for an action. Cards
/// travel as two-character ASCII strings (`"As"`, `"Td"`); stacks and
/// round bets are keyed by seat number.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DecisionRequest {
    pub protocol_version: u32,
    pub hand_id: Uuid,
    pub table_id: String,
    pub seat: SeatNo,
    pub hole_cards: Vec<String>,
    pub board: Vec<String>,
    pub pot: Chips,
    pub to_call: Chips,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_raise_to: Option<Chips>,
    pub stacks: BTreeMap<String, Chips>,
    pub bets: BTreeMap<String, Chips>,
    pub legal_actions: Vec<ActionKind>,
    pub action_deadline_ms: u64,
}

impl DecisionRequest {
    /// Builds the request for the hand's acting seat.
    pub fn for_acting_seat(state: &HandState, deadline_ms: u64) -> Result<Self, GameError> {
        let acting = state
            .seat(state.acting_seat)
            .ok_or(GameError::NotPlayersTurn(state.acting_seat))?;
        let hole = state
            .hole_cards_for(state.acting_seat)
            .ok_or(GameError::MissingHoleCards(state.acting_seat))?;
        if hole.len() != crate::game::constants::HOLE_CARDS_PER_SEAT {
            return Err(GameError::MissingHoleCards(state.acting_seat));
        }

        let to_call = state.to_call(acting);
        let legal_actions = derive_legal_actions(state, acting);
        let min_raise_to = legal_actions
            .contains(&ActionKind::Raise)
            .then_some(state.min_raise_to);

        let mut stacks = BTreeMap::new();
        let mut bets = BTreeMap::new();
        for seat in &state.seats {
            let key = seat.seat_no.to_string();
            stacks.insert(key.clone(), seat.stack);
            bets.insert(key, seat.committed_in_round);
        }

        Ok(Self {
            protocol_version: PROTOCOL_VERSION,
            hand_id: state.hand_id,
            table_id: state.table_id.clone(),
            seat: state.acting_seat,
            hole_cards: hole.iter().map(ToString::to_string).collect(),
            board: state.board.iter().map(ToString::to_string).collect(),
            pot: state.pot,
            to_call,
            min_raise_to,
            stacks,
            bets,
            legal_actions,
            action_deadline_ms: deadline_ms,
        })
    }

    #[must_use]
    pub fn is_legal(&self, kind: ActionKind) -> bool {
        self.legal_actions.contains(&kind)
    }
}

/// Action kinds the given seat may take in the current betting state. Fold
/// is always offered; Check and Bet when there is nothing to call; Call and
/// Raise when there is, with Raise requiring chips beyond the call.
#[must_use]
pub fn derive_legal_actions(state: &HandState, acting: &SeatState) -> Vec<ActionKind> {
    let to_call = state.to_call(acting);
    let mut actions = vec![ActionKind::Fold];
    if to_call == 0 {
        actions.push(ActionKind::Check);
        if acting.stack > 0 && state.current_bet == 0 {
            actions.push(ActionKind::Bet);
        }
        return actions;
    }
    actions.push(ActionKind::Call);
    if state.current_bet > 0 && acting.stack > to_call {
        actions.push(ActionKind::Raise);
    }
    actions
}

/// Source of betting decisions for whichever seat is on turn.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    async fn next_action(&self, request: &DecisionRequest) -> Result<Action, ProviderError>;
}
