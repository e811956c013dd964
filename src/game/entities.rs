use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::constants;
use super::errors::GameError;

/// Type alias for whole chips. All bets and stacks are whole chips; if the
/// total chips at a table ever surpass ~4.2 billion we have a bigger problem.
pub type Chips = u32;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "c",
            Self::Diamonds => "d",
            Self::Hearts => "h",
            Self::Spades => "s",
        };
        write!(f, "{repr}")
    }
}

/// A playing card: rank 2..=14 (ace high) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    pub fn new(rank: u8, suit: Suit) -> Result<Self, GameError> {
        if (2..=14).contains(&rank) {
            Ok(Self { rank, suit })
        } else {
            Err(GameError::InvalidRank(rank))
        }
    }

    #[must_use]
    pub fn rank(self) -> u8 {
        self.rank
    }

    #[must_use]
    pub fn suit(self) -> Suit {
        self.suit
    }
}

/// Two-character ASCII form used on the agent wire: `"As"`, `"Td"`, `"9c"`.
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rank = match self.rank {
            14 => "A".to_string(),
            13 => "K".to_string(),
            12 => "Q".to_string(),
            11 => "J".to_string(),
            10 => "T".to_string(),
            r => r.to_string(),
        };
        write!(f, "{rank}{}", self.suit)
    }
}

/// A standard 52-card deck with an index into the undealt remainder.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    #[must_use]
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in 2..=14 {
                cards.push(Card { rank, suit });
            }
        }
        Self { cards, next: 0 }
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
        self.next = 0;
    }

    pub fn deal(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied()?;
        self.next += 1;
        Some(card)
    }

    /// Discards the top card. Returns false when the deck is exhausted.
    pub fn burn(&mut self) -> bool {
        self.deal().is_some()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.next)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}

/// One-based seat number, stable identity of a seat within a table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SeatNo(u8);

impl SeatNo {
    pub fn new(value: u8, max_seats: u8) -> Result<Self, GameError> {
        if value == 0 || value > max_seats {
            Err(GameError::InvalidSeatNo {
                max: max_seats,
                actual: value,
            })
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SeatNo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Active,
    SittingOut,
    Busted,
}

/// Per-seat state within a hand. The committed fields track chips moved
/// into the pot for the whole hand and for the current betting round.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatState {
    pub seat_no: SeatNo,
    pub stack: Chips,
    pub total_committed: Chips,
    pub committed_in_round: Chips,
    pub has_acted_this_round: bool,
    pub folded: bool,
    pub status: SeatStatus,
}

impl SeatState {
    #[must_use]
    pub fn new(seat_no: SeatNo, stack: Chips) -> Self {
        Self {
            seat_no,
            stack,
            total_committed: 0,
            committed_in_round: 0,
            has_acted_this_round: false,
            folded: false,
            status: SeatStatus::Active,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SeatStatus::Active
    }

    /// Eligible to be dealt into a hand: active with chips behind.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        self.is_active() && self.stack > 0
    }

    /// Still contesting the pot: active and not folded.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.is_active() && !self.folded
    }

    /// Live with chips behind, so a betting decision is still possible.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.is_live() && self.stack > 0
    }

    /// Clears per-hand fields and retires emptied stacks before the next
    /// hand starts.
    pub fn reset_for_next_hand(&mut self) {
        self.total_committed = 0;
        self.committed_in_round = 0;
        self.has_acted_this_round = false;
        self.folded = false;
        if self.stack == 0 {
            self.status = SeatStatus::Busted;
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Call => "call",
            Self::Bet => "bet",
            Self::Raise => "raise",
        };
        write!(f, "{repr}")
    }
}

/// A validated player action. The amount is present and positive exactly
/// when the kind is Bet or Raise; for Raise it is the raise-to target for
/// the round, for Bet the chips put in. A mismatched kind/amount pair never
/// constructs, so the state machine only ever sees well-formed actions.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Action {
    kind: ActionKind,
    amount: Option<Chips>,
}

impl Action {
    pub fn new(kind: ActionKind, amount: Option<Chips>) -> Result<Self, GameError> {
        let needs_amount = matches!(kind, ActionKind::Bet | ActionKind::Raise);
        match amount {
            None if needs_amount => Err(GameError::MissingActionAmount(kind)),
            Some(_) if !needs_amount => Err(GameError::UnexpectedActionAmount(kind)),
            Some(0) => Err(GameError::ZeroActionAmount(kind)),
            _ => Ok(Self { kind, amount }),
        }
    }

    #[must_use]
    pub fn fold() -> Self {
        Self {
            kind: ActionKind::Fold,
            amount: None,
        }
    }

    #[must_use]
    pub fn check() -> Self {
        Self {
            kind: ActionKind::Check,
            amount: None,
        }
    }

    #[must_use]
    pub fn call() -> Self {
        Self {
            kind: ActionKind::Call,
            amount: None,
        }
    }

    pub fn bet(amount: Chips) -> Result<Self, GameError> {
        Self::new(ActionKind::Bet, Some(amount))
    }

    pub fn raise_to(amount: Chips) -> Result<Self, GameError> {
        Self::new(ActionKind::Raise, Some(amount))
    }

    #[must_use]
    pub fn kind(self) -> ActionKind {
        self.kind
    }

    #[must_use]
    pub fn amount(self) -> Option<Chips> {
        self.amount
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.amount {
            Some(amount) => write!(f, "{} {amount}", self.kind),
            None => self.kind.fmt(f),
        }
    }
}

/// Static table configuration, validated before any hand starts.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableConfig {
    pub max_seats: u8,
    pub min_players_to_start: u8,
    pub starting_stack: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub action_timeout_ms: u64,
    pub max_actions_per_hand: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_seats: constants::DEFAULT_MAX_SEATS,
            min_players_to_start: constants::DEFAULT_MIN_PLAYERS_TO_START,
            starting_stack: constants::DEFAULT_STARTING_STACK,
            small_blind: constants::DEFAULT_SMALL_BLIND,
            big_blind: constants::DEFAULT_BIG_BLIND,
            action_timeout_ms: constants::DEFAULT_ACTION_TIMEOUT_MS,
            max_actions_per_hand: constants::DEFAULT_MAX_ACTIONS_PER_HAND,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if !(2..=constants::MAX_SEATS).contains(&self.max_seats) {
            return Err(GameError::InvalidMaxSeats {
                max: constants::MAX_SEATS,
                actual: self.max_seats,
            });
        }
        if self.min_players_to_start < 2 || self.min_players_to_start > self.max_seats {
            return Err(GameError::InvalidMinPlayersToStart);
        }
        // Both blinds strictly positive: a zero blind is a configuration
        // mistake and must not surface later at posting time.
        if self.small_blind == 0 || self.big_blind < self.small_blind {
            return Err(GameError::InvalidBlindStructure);
        }
        if self.max_actions_per_hand == 0 {
            return Err(GameError::InvalidMaxActions);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPhase {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

impl HandPhase {
    /// Streets on which actions are accepted.
    #[must_use]
    pub fn is_betting(self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Showdown | Self::Complete)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for HandPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardReason {
    BestHand,
    Uncontested,
}

impl fmt::Display for AwardReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::BestHand => "best_hand",
            Self::Uncontested => "uncontested",
        };
        write!(f, "{repr}")
    }
}

/// One resolved pot layer: the chips, the seats that received them, and
/// why. Appended to the hand state by pot resolution, never mutated after.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PotAward {
    pub amount: Chips,
    pub seats: Vec<SeatNo>,
    pub reason: AwardReason,
}

/// Hole cards dealt to one seat.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatCards {
    pub seat_no: SeatNo,
    pub cards: Vec<Card>,
}

/// Complete snapshot of a hand in progress. Transitions never mutate in
/// place: `apply_action` clones, edits the clone, and returns it, so callers
/// can retain earlier snapshots without aliasing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandState {
    pub hand_id: Uuid,
    pub table_id: String,
    pub hand_no: u64,
    pub button_seat: SeatNo,
    pub acting_seat: SeatNo,
    pub phase: HandPhase,
    /// Highest committed_in_round among live seats this betting round.
    pub current_bet: Chips,
    /// Minimum legal raise-to target for the round.
    pub min_raise_to: Chips,
    /// Size of the last full bet or raise this round.
    pub last_full_raise: Chips,
    /// Cached from the table config for per-street raise resets.
    pub big_blind: Chips,
    pub last_aggressor_seat: Option<SeatNo>,
    pub pot: Chips,
    pub board: Vec<Card>,
    pub deck: Deck,
    pub hole_cards: Vec<SeatCards>,
    pub seats: Vec<SeatState>,
    pub awards: Vec<PotAward>,
}

impl HandState {
    #[must_use]
    pub fn seat(&self, seat_no: SeatNo) -> Option<&SeatState> {
        self.seats.iter().find(|seat| seat.seat_no == seat_no)
    }

    pub(crate) fn seat_index(&self, seat_no: SeatNo) -> Option<usize> {
        self.seats.iter().position(|seat| seat.seat_no == seat_no)
    }

    #[must_use]
    pub fn hole_cards_for(&self, seat_no: SeatNo) -> Option<&[Card]> {
        self.hole_cards
            .iter()
            .find(|sc| sc.seat_no == seat_no)
            .map(|sc| sc.cards.as_slice())
    }

    /// Chip gap between a seat's round commitment and the current bet.
    #[must_use]
    pub fn to_call(&self, seat: &SeatState) -> Chips {
        self.current_bet.saturating_sub(seat.committed_in_round)
    }

    #[must_use]
    pub fn live_seat_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_live()).count()
    }

    /// Total chips visible in this snapshot: stacks plus the pot. Constant
    /// across every transition of a hand.
    #[must_use]
    pub fn chips_in_play(&self) -> Chips {
        self.seats.iter().map(|seat| seat.stack).sum::<Chips>() + self.pot
    }
}

/// First seat clockwise after `from` satisfying the predicate. Seats are
/// visited in ascending seat-number order with wrap-around; `from` itself is
/// visited last.
pub(crate) fn next_seat_where<F>(seats: &[SeatState], from: SeatNo, pred: F) -> Option<SeatNo>
where
    F: Fn(&SeatState) -> bool,
{
    let mut order: Vec<SeatNo> = seats.iter().map(|seat| seat.seat_no).collect();
    order.sort_unstable();
    let start = order.iter().position(|&seat_no| seat_no == from)?;
    (1..=order.len())
        .map(|offset| order[(start + offset) % order.len()])
        .find(|&candidate| {
            seats
                .iter()
                .any(|seat| seat.seat_no == candidate && pred(seat))
        })
}
