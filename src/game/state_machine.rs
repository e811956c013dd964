//! The pure hand state machine.
//!
//! [`start_new_hand`] deals a fresh hand and posts blinds;
//! [`apply_action`] validates one action against the betting rules and
//! returns the successor state. Neither function mutates its input: every
//! transition clones, so callers can keep earlier snapshots for history.

use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use super::entities::{
    Action, ActionKind, Chips, Deck, HandPhase, HandState, SeatCards, SeatNo, SeatState,
    TableConfig, next_seat_where,
};
use super::errors::GameError;
use super::showdown::award_uncontested;

const FLOP_SIZE: usize = 3;

/// Everything needed to open a hand. Seat stacks are carried in from the
/// previous hand by the caller; per-hand fields are reset here.
#[derive(Clone, Debug)]
pub struct StartNewHandInput {
    pub table_id: String,
    pub hand_no: u64,
    pub seats: Vec<SeatState>,
    pub button_seat: SeatNo,
    pub config: TableConfig,
    /// Seeds the shuffle for reproducible deals; `None` draws OS entropy.
    pub shuffle_seed: Option<u64>,
}

pub fn start_new_hand(input: StartNewHandInput) -> Result<HandState, GameError> {
    input.config.validate()?;

    let mut seats = input.seats;
    seats.sort_unstable_by_key(|seat| seat.seat_no);
    if seats.len() > usize::from(input.config.max_seats) {
        return Err(GameError::TooManySeats {
            max: input.config.max_seats,
            actual: seats.len(),
        });
    }
    if seats.windows(2).any(|pair| pair[0].seat_no == pair[1].seat_no) {
        return Err(GameError::DuplicateSeat);
    }
    for seat in &mut seats {
        seat.reset_for_next_hand();
    }

    let playable = seats.iter().filter(|seat| seat.is_playable()).count();
    if playable < usize::from(input.config.min_players_to_start) {
        return Err(GameError::InsufficientSeats {
            minimum: input.config.min_players_to_start,
            actual: playable,
        });
    }
    let button = seats
        .iter()
        .find(|seat| seat.seat_no == input.button_seat)
        .ok_or(GameError::UnknownButtonSeat(input.button_seat))?;

    // Heads-up the button posts the small blind and acts first preflop;
    // three-handed and up the small blind sits left of the button.
    let sb_seat = if playable == 2 && button.is_playable() {
        button.seat_no
    } else {
        next_seat_where(&seats, input.button_seat, SeatState::is_playable)
            .ok_or(GameError::InsufficientSeats {
                minimum: input.config.min_players_to_start,
                actual: playable,
            })?
    };
    let bb_seat = next_seat_where(&seats, sb_seat, SeatState::is_playable).ok_or(
        GameError::InsufficientSeats {
            minimum: input.config.min_players_to_start,
            actual: playable,
        },
    )?;

    let mut deck = Deck::standard();
    let mut rng = match input.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    deck.shuffle(&mut rng);

    let hole_cards = deal_hole_cards(&mut deck, &seats, input.button_seat)?;

    let mut state = HandState {
        hand_id: Uuid::new_v4(),
        table_id: input.table_id,
        hand_no: input.hand_no,
        button_seat: input.button_seat,
        acting_seat: sb_seat,
        phase: HandPhase::Preflop,
        current_bet: 0,
        min_raise_to: 0,
        last_full_raise: 0,
        big_blind: input.config.big_blind,
        last_aggressor_seat: None,
        pot: 0,
        board: Vec::with_capacity(super::constants::BOARD_SIZE),
        deck,
        hole_cards,
        seats,
        awards: Vec::new(),
    };

    let posted_sb = post_blind(&mut state, sb_seat, input.config.small_blind);
    let posted_bb = post_blind(&mut state, bb_seat, input.config.big_blind);
    if posted_sb == 0 && posted_bb == 0 {
        return Err(GameError::BlindPostingFailed);
    }
    state.current_bet = posted_sb.max(posted_bb);
    state.last_full_raise = input.config.big_blind;
    state.min_raise_to = state.current_bet + input.config.big_blind;
    state.last_aggressor_seat = Some(bb_seat);

    if state.live_seat_count() <= 1 {
        return Ok(award_uncontested(&state));
    }

    match next_seat_where(&state.seats, bb_seat, SeatState::can_act) {
        Some(actor) => {
            state.acting_seat = actor;
            Ok(state)
        }
        None => {
            // Blinds put everyone all-in: no betting on any street.
            run_out_board(&mut state)?;
            Ok(state)
        }
    }
}

pub fn apply_action(state: &HandState, action: Action) -> Result<HandState, GameError> {
    if !state.phase.is_betting() {
        return Err(GameError::HandAlreadyComplete);
    }

    let mut next = state.clone();
    let acting = next.acting_seat;
    let idx = next
        .seat_index(acting)
        .ok_or(GameError::NotPlayersTurn(acting))?;
    if !next.seats[idx].can_act() {
        return Err(GameError::NotPlayersTurn(acting));
    }
    let to_call = next.to_call(&next.seats[idx]);

    match action.kind() {
        ActionKind::Fold => {
            next.seats[idx].folded = true;
            next.seats[idx].has_acted_this_round = true;
        }
        ActionKind::Check => {
            if to_call != 0 {
                return Err(GameError::IllegalAction(ActionKind::Check));
            }
            next.seats[idx].has_acted_this_round = true;
        }
        ActionKind::Call => {
            if to_call == 0 {
                return Err(GameError::IllegalAction(ActionKind::Call));
            }
            let pay = to_call.min(next.seats[idx].stack);
            commit(&mut next, idx, pay);
            next.seats[idx].has_acted_this_round = true;
        }
        ActionKind::Bet => {
            if next.current_bet != 0 {
                return Err(GameError::IllegalAction(ActionKind::Bet));
            }
            let amount = action
                .amount()
                .ok_or(GameError::MissingActionAmount(ActionKind::Bet))?;
            if amount < next.min_raise_to {
                return Err(GameError::BelowMinimum {
                    kind: ActionKind::Bet,
                    amount,
                    minimum: next.min_raise_to,
                });
            }
            if amount > next.seats[idx].stack {
                return Err(GameError::InsufficientChips {
                    kind: ActionKind::Bet,
                    required: amount,
                    stack: next.seats[idx].stack,
                });
            }
            commit(&mut next, idx, amount);
            next.current_bet = next.seats[idx].committed_in_round;
            next.last_full_raise = amount;
            next.min_raise_to = next.current_bet + next.last_full_raise;
            mark_response_pending(&mut next.seats, idx);
            next.last_aggressor_seat = Some(acting);
        }
        ActionKind::Raise => {
            if next.current_bet == 0 {
                return Err(GameError::IllegalAction(ActionKind::Raise));
            }
            let raise_to = action
                .amount()
                .ok_or(GameError::MissingActionAmount(ActionKind::Raise))?;
            if raise_to <= next.current_bet || raise_to < next.min_raise_to {
                return Err(GameError::BelowMinimum {
                    kind: ActionKind::Raise,
                    amount: raise_to,
                    minimum: next.min_raise_to,
                });
            }
            let delta = raise_to - next.seats[idx].committed_in_round;
            if delta > next.seats[idx].stack {
                return Err(GameError::InsufficientChips {
                    kind: ActionKind::Raise,
                    required: delta,
                    stack: next.seats[idx].stack,
                });
            }
            let previous_bet = next.current_bet;
            commit(&mut next, idx, delta);
            next.current_bet = raise_to;
            next.last_full_raise = raise_to - previous_bet;
            next.min_raise_to = next.current_bet + next.last_full_raise;
            mark_response_pending(&mut next.seats, idx);
            next.last_aggressor_seat = Some(acting);
        }
    }

    if next.live_seat_count() <= 1 {
        return Ok(award_uncontested(&next));
    }

    if betting_round_closed(&next) {
        advance_street(&mut next)?;
        return Ok(next);
    }

    match next_seat_where(&next.seats, acting, SeatState::can_act) {
        Some(actor) => {
            next.acting_seat = actor;
            Ok(next)
        }
        None => {
            advance_street(&mut next)?;
            Ok(next)
        }
    }
}

/// Moves chips from a seat's stack into the pot.
fn commit(state: &mut HandState, idx: usize, amount: Chips) {
    state.seats[idx].stack -= amount;
    state.seats[idx].total_committed += amount;
    state.seats[idx].committed_in_round += amount;
    state.pot += amount;
}

fn post_blind(state: &mut HandState, seat_no: SeatNo, amount: Chips) -> Chips {
    let Some(idx) = state.seat_index(seat_no) else {
        return 0;
    };
    if !state.seats[idx].is_playable() {
        return 0;
    }
    let post = state.seats[idx].stack.min(amount);
    commit(state, idx, post);
    post
}

/// Aggression reopens the round: everyone but the aggressor must respond.
fn mark_response_pending(seats: &mut [SeatState], aggressor_idx: usize) {
    for seat in seats.iter_mut() {
        seat.has_acted_this_round = false;
    }
    seats[aggressor_idx].has_acted_this_round = true;
}

/// A round is closed when every live seat has folded, is all-in, or has
/// acted with its round commitment matching the current bet.
fn betting_round_closed(state: &HandState) -> bool {
    state.seats.iter().all(|seat| {
        if !seat.is_live() || seat.stack == 0 {
            return true;
        }
        seat.has_acted_this_round
            && (state.current_bet == 0 || seat.committed_in_round == state.current_bet)
    })
}

/// Closes the current round: resets per-round state, deals the next street,
/// and seats the first actor. When no seat can act (everyone all-in), the
/// remaining streets are dealt out with no betting until Showdown.
fn advance_street(state: &mut HandState) -> Result<(), GameError> {
    loop {
        for seat in &mut state.seats {
            seat.committed_in_round = 0;
            seat.has_acted_this_round = false;
        }
        state.current_bet = 0;
        state.last_aggressor_seat = None;
        state.last_full_raise = state.big_blind;
        state.min_raise_to = state.big_blind;

        state.phase = match state.phase {
            HandPhase::Preflop => {
                deal_board_cards(state, FLOP_SIZE)?;
                HandPhase::Flop
            }
            HandPhase::Flop => {
                deal_board_cards(state, 1)?;
                HandPhase::Turn
            }
            HandPhase::Turn => {
                deal_board_cards(state, 1)?;
                HandPhase::River
            }
            HandPhase::River | HandPhase::Showdown | HandPhase::Complete => {
                state.phase = HandPhase::Showdown;
                return Ok(());
            }
        };

        if let Some(actor) = next_seat_where(&state.seats, state.button_seat, SeatState::can_act) {
            state.acting_seat = actor;
            return Ok(());
        }
    }
}

/// Deals every remaining street with no betting, ending at Showdown.
fn run_out_board(state: &mut HandState) -> Result<(), GameError> {
    while state.phase.is_betting() {
        advance_street(state)?;
    }
    Ok(())
}

fn deal_board_cards(state: &mut HandState, count: usize) -> Result<(), GameError> {
    if !state.deck.burn() {
        return Err(GameError::DeckExhausted);
    }
    for _ in 0..count {
        let card = state.deck.deal().ok_or(GameError::DeckExhausted)?;
        state.board.push(card);
    }
    Ok(())
}

/// Two cards per playable seat, one at a time, starting left of the button.
fn deal_hole_cards(
    deck: &mut Deck,
    seats: &[SeatState],
    button: SeatNo,
) -> Result<Vec<SeatCards>, GameError> {
    let mut order = Vec::new();
    let mut cursor = button;
    loop {
        let Some(seat_no) = next_seat_where(seats, cursor, SeatState::is_playable) else {
            break;
        };
        if order.contains(&seat_no) {
            break;
        }
        order.push(seat_no);
        cursor = seat_no;
    }

    let mut hole_cards: Vec<SeatCards> = order
        .iter()
        .map(|&seat_no| SeatCards {
            seat_no,
            cards: Vec::with_capacity(super::constants::HOLE_CARDS_PER_SEAT),
        })
        .collect();
    for _ in 0..super::constants::HOLE_CARDS_PER_SEAT {
        for seat_cards in &mut hole_cards {
            let card = deck.deal().ok_or(GameError::DeckExhausted)?;
            seat_cards.cards.push(card);
        }
    }
    hole_cards.sort_unstable_by_key(|sc| sc.seat_no);
    Ok(hole_cards)
}
