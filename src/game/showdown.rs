//! Pot resolution.
//!
//! Layers the pot by contribution level so short all-in stacks only contest
//! the chips they covered, ranks the live hands in each layer, and pays the
//! winners. Layer bounds come from the totals of every seat, folded ones
//! included, so folded chips flow into the layers they funded and the sum
//! of awards always equals the sum of commitments.

use log::debug;

use super::entities::{
    AwardReason, Card, Chips, HandPhase, HandState, PotAward, SeatNo, SeatState,
};
use super::errors::GameError;
use super::functional::{HandRank, evaluate_best_hand};

/// Resolves a showdown into per-layer awards and applies them onto seat
/// stacks. Pure over its input; the returned state is at phase Complete
/// with the pot zeroed.
pub fn resolve_pots(state: &HandState) -> Result<(HandState, Vec<PotAward>), GameError> {
    if state.phase != HandPhase::Showdown {
        return Err(GameError::WrongPhase {
            required: HandPhase::Showdown.as_str(),
            actual: state.phase.as_str(),
        });
    }
    if state.board.len() != super::constants::BOARD_SIZE {
        return Err(GameError::IncompleteBoard(state.board.len()));
    }

    let mut next = state.clone();
    let levels = contribution_levels(&next.seats);
    let mut awards: Vec<PotAward> = Vec::with_capacity(levels.len());
    let mut prev: Chips = 0;

    for level in levels {
        let contributors: Vec<usize> = next
            .seats
            .iter()
            .enumerate()
            .filter(|(_, seat)| seat.total_committed >= level)
            .map(|(idx, _)| idx)
            .collect();
        let pot_amount = (level - prev) * contributors.len() as Chips;
        prev = level;

        let winner_idxs = best_hands_among(&next, &contributors)?;
        if winner_idxs.is_empty() {
            continue;
        }

        let share = pot_amount / winner_idxs.len() as Chips;
        let odd = pot_amount % winner_idxs.len() as Chips;
        for &winner in &winner_idxs {
            next.seats[winner].stack += share;
        }
        // Odd chips go one per winner, clockwise from the button.
        let ordered = order_for_odd_chips(next.button_seat, &winner_idxs, &next.seats);
        for &winner in ordered.iter().take(odd as usize) {
            next.seats[winner].stack += 1;
        }

        let mut winner_seats: Vec<SeatNo> = winner_idxs
            .iter()
            .map(|&idx| next.seats[idx].seat_no)
            .collect();
        winner_seats.sort_unstable();
        debug!(
            "hand {} layer {level}: {pot_amount} chips to seats {winner_seats:?}",
            next.hand_no
        );
        awards.push(PotAward {
            amount: pot_amount,
            seats: winner_seats,
            reason: AwardReason::BestHand,
        });
    }

    next.pot = 0;
    next.awards = awards.clone();
    next.phase = HandPhase::Complete;
    Ok((next, awards))
}

/// Pays the whole pot to the single remaining live seat and completes the
/// hand. Pot resolution never runs for uncontested hands.
#[must_use]
pub fn award_uncontested(state: &HandState) -> HandState {
    let mut next = state.clone();
    next.phase = HandPhase::Complete;
    if next.pot == 0 {
        return next;
    }
    let Some(idx) = next
        .seats
        .iter()
        .position(SeatState::is_live)
        .or_else(|| next.seats.iter().position(SeatState::is_active))
    else {
        return next;
    };

    let amount = next.pot;
    next.seats[idx].stack += amount;
    next.pot = 0;
    next.awards = vec![PotAward {
        amount,
        seats: vec![next.seats[idx].seat_no],
        reason: AwardReason::Uncontested,
    }];
    next
}

/// Indexes of the live contributors holding the best seven-card hand.
fn best_hands_among(state: &HandState, contributors: &[usize]) -> Result<Vec<usize>, GameError> {
    let mut winners: Vec<usize> = Vec::new();
    let mut best: Option<HandRank> = None;
    for &idx in contributors {
        let seat = &state.seats[idx];
        if !seat.is_live() {
            continue;
        }
        let hole = state
            .hole_cards_for(seat.seat_no)
            .ok_or(GameError::MissingHoleCards(seat.seat_no))?;
        let [a, b] = hole else {
            return Err(GameError::MissingHoleCards(seat.seat_no));
        };
        let mut seven: [Card; 7] = [*a; 7];
        seven[1] = *b;
        seven[2..].copy_from_slice(&state.board);
        let rank = evaluate_best_hand(&seven);
        match &best {
            Some(current) if rank < *current => {}
            Some(current) if rank == *current => winners.push(idx),
            _ => {
                best = Some(rank);
                winners = vec![idx];
            }
        }
    }
    Ok(winners)
}

/// Distinct positive totals of all seats, ascending. Each value bounds one
/// pot layer.
fn contribution_levels(seats: &[SeatState]) -> Vec<Chips> {
    let mut levels: Vec<Chips> = seats
        .iter()
        .map(|seat| seat.total_committed)
        .filter(|&total| total > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();
    levels
}

/// Winner indexes reordered clockwise starting at the first seat past the
/// button, for odd-chip distribution.
fn order_for_odd_chips(button: SeatNo, winner_idxs: &[usize], seats: &[SeatState]) -> Vec<usize> {
    if winner_idxs.len() <= 1 {
        return winner_idxs.to_vec();
    }
    let mut by_seat: Vec<(SeatNo, usize)> = winner_idxs
        .iter()
        .map(|&idx| (seats[idx].seat_no, idx))
        .collect();
    by_seat.sort_unstable_by_key(|&(seat_no, _)| seat_no);
    let start = by_seat
        .iter()
        .position(|&(seat_no, _)| seat_no > button)
        .unwrap_or(0);
    (0..by_seat.len())
        .map(|offset| by_seat[(start + offset) % by_seat.len()].1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants;
    use crate::game::entities::{Deck, SeatCards, Suit};
    use uuid::Uuid;

    fn seat_no(value: u8) -> SeatNo {
        SeatNo::new(value, constants::MAX_SEATS).unwrap()
    }

    fn card(spec: &str) -> Card {
        let bytes = spec.as_bytes();
        let rank = match bytes[0] {
            b'A' => 14,
            b'K' => 13,
            b'Q' => 12,
            b'J' => 11,
            b'T' => 10,
            digit => digit - b'0',
        };
        let suit = match bytes[1] {
            b'c' => Suit::Clubs,
            b'd' => Suit::Diamonds,
            b'h' => Suit::Hearts,
            _ => Suit::Spades,
        };
        Card::new(rank, suit).unwrap()
    }

    struct ShowdownSeat {
        seat_no: u8,
        stack: Chips,
        total_committed: Chips,
        folded: bool,
        hole: [&'static str; 2],
    }

    fn showdown(button: u8, board: [&str; 5], seats: Vec<ShowdownSeat>) -> HandState {
        let pot = seats.iter().map(|seat| seat.total_committed).sum();
        HandState {
            hand_id: Uuid::new_v4(),
            table_id: "t-1".into(),
            hand_no: 1,
            button_seat: seat_no(button),
            acting_seat: seat_no(button),
            phase: HandPhase::Showdown,
            current_bet: 0,
            min_raise_to: 100,
            last_full_raise: 100,
            big_blind: 100,
            last_aggressor_seat: None,
            pot,
            board: board.map(card).to_vec(),
            deck: Deck::standard(),
            hole_cards: seats
                .iter()
                .map(|seat| SeatCards {
                    seat_no: seat_no(seat.seat_no),
                    cards: seat.hole.map(card).to_vec(),
                })
                .collect(),
            seats: seats
                .iter()
                .map(|seat| {
                    let mut s = SeatState::new(seat_no(seat.seat_no), seat.stack);
                    s.total_committed = seat.total_committed;
                    s.folded = seat.folded;
                    s
                })
                .collect(),
            awards: Vec::new(),
        }
    }

    fn total_awarded(awards: &[PotAward]) -> Chips {
        awards.iter().map(|award| award.amount).sum()
    }

    #[test]
    fn requires_showdown_phase() {
        let mut state = showdown(
            1,
            ["2c", "7d", "9h", "Js", "Kd"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 0,
                    total_committed: 100,
                    folded: false,
                    hole: ["As", "Ad"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 0,
                    total_committed: 100,
                    folded: false,
                    hole: ["Ks", "Qs"],
                },
            ],
        );
        state.phase = HandPhase::Flop;
        assert!(matches!(
            resolve_pots(&state),
            Err(GameError::WrongPhase { .. })
        ));
    }

    #[test]
    fn requires_complete_board() {
        let mut state = showdown(
            1,
            ["2c", "7d", "9h", "Js", "Kd"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 0,
                    total_committed: 100,
                    folded: false,
                    hole: ["As", "Ad"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 0,
                    total_committed: 100,
                    folded: false,
                    hole: ["Ks", "Qs"],
                },
            ],
        );
        state.board.truncate(4);
        assert_eq!(resolve_pots(&state), Err(GameError::IncompleteBoard(4)));
    }

    #[test]
    fn best_hand_takes_a_single_pot() {
        let state = showdown(
            1,
            ["Ah", "7d", "9h", "Js", "Kd"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 900,
                    total_committed: 100,
                    folded: false,
                    hole: ["As", "Ad"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 900,
                    total_committed: 100,
                    folded: false,
                    hole: ["Ks", "Qs"],
                },
            ],
        );
        let (resolved, awards) = resolve_pots(&state).unwrap();
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].amount, 200);
        assert_eq!(awards[0].seats, vec![seat_no(1)]);
        assert_eq!(awards[0].reason, AwardReason::BestHand);
        assert_eq!(resolved.seat(seat_no(1)).unwrap().stack, 1_100);
        assert_eq!(resolved.phase, HandPhase::Complete);
        assert_eq!(resolved.pot, 0);
    }

    #[test]
    fn short_stack_only_contests_the_main_pot() {
        // Seat 1 all-in for 100; seats 2 and 3 committed 300 each. Main pot
        // 300 (100 x 3), side pot 400 (200 x 2). Seat 1 has the best hand
        // overall, seat 2 the best among the side-pot contributors.
        let state = showdown(
            3,
            ["Ah", "7d", "9h", "Js", "2d"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 0,
                    total_committed: 100,
                    folded: false,
                    hole: ["As", "Ad"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 500,
                    total_committed: 300,
                    folded: false,
                    hole: ["Jc", "Jd"],
                },
                ShowdownSeat {
                    seat_no: 3,
                    stack: 500,
                    total_committed: 300,
                    folded: false,
                    hole: ["7s", "7c"],
                },
            ],
        );
        let (resolved, awards) = resolve_pots(&state).unwrap();
        assert_eq!(awards.len(), 2);
        assert_eq!(awards[0].amount, 300);
        assert_eq!(awards[0].seats, vec![seat_no(1)]);
        assert_eq!(awards[1].amount, 400);
        assert_eq!(awards[1].seats, vec![seat_no(2)]);
        assert_eq!(total_awarded(&awards), 700);
        assert_eq!(resolved.seat(seat_no(1)).unwrap().stack, 300);
        assert_eq!(resolved.seat(seat_no(2)).unwrap().stack, 900);
        assert_eq!(resolved.seat(seat_no(3)).unwrap().stack, 500);
    }

    #[test]
    fn folded_chips_fund_the_layers_they_reached() {
        // Seat 3 folded after committing 200; its chips still pay out.
        let state = showdown(
            1,
            ["2c", "7d", "9h", "Js", "Kd"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 0,
                    total_committed: 300,
                    folded: false,
                    hole: ["As", "Ad"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 0,
                    total_committed: 300,
                    folded: false,
                    hole: ["Ks", "Qs"],
                },
                ShowdownSeat {
                    seat_no: 3,
                    stack: 100,
                    total_committed: 200,
                    folded: true,
                    hole: ["3c", "4c"],
                },
            ],
        );
        let (resolved, awards) = resolve_pots(&state).unwrap();
        // Layer at 200: 3 contributors x 200 = 600; layer at 300: 2 x 100.
        assert_eq!(total_awarded(&awards), 800);
        assert_eq!(resolved.seat(seat_no(1)).unwrap().stack, 800);
        assert_eq!(resolved.seat(seat_no(3)).unwrap().stack, 100);
    }

    #[test]
    fn tie_splits_evenly() {
        let state = showdown(
            1,
            ["Ah", "Kh", "Qd", "Jc", "Ts"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 0,
                    total_committed: 200,
                    folded: false,
                    hole: ["2c", "3c"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 0,
                    total_committed: 200,
                    folded: false,
                    hole: ["4d", "5d"],
                },
            ],
        );
        let (resolved, awards) = resolve_pots(&state).unwrap();
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].seats, vec![seat_no(1), seat_no(2)]);
        assert_eq!(resolved.seat(seat_no(1)).unwrap().stack, 200);
        assert_eq!(resolved.seat(seat_no(2)).unwrap().stack, 200);
    }

    #[test]
    fn odd_chip_goes_to_first_winner_past_the_button() {
        // 303-chip pot split between seats 1 and 3 (board plays): 151 each
        // plus one odd chip to the first winner clockwise from the button.
        let state = showdown(
            2,
            ["Ah", "Kh", "Qd", "Jc", "Ts"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 0,
                    total_committed: 101,
                    folded: false,
                    hole: ["2c", "3c"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 0,
                    total_committed: 101,
                    folded: true,
                    hole: ["6h", "7h"],
                },
                ShowdownSeat {
                    seat_no: 3,
                    stack: 0,
                    total_committed: 101,
                    folded: false,
                    hole: ["4d", "5d"],
                },
            ],
        );
        let (resolved, awards) = resolve_pots(&state).unwrap();
        assert_eq!(total_awarded(&awards), 303);
        assert_eq!(resolved.seat(seat_no(3)).unwrap().stack, 152);
        assert_eq!(resolved.seat(seat_no(1)).unwrap().stack, 151);
    }

    #[test]
    fn odd_chip_order_wraps_past_the_highest_seat() {
        let state = showdown(
            3,
            ["Ah", "Kh", "Qd", "Jc", "Ts"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 0,
                    total_committed: 101,
                    folded: false,
                    hole: ["2c", "3c"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 0,
                    total_committed: 101,
                    folded: true,
                    hole: ["6h", "7h"],
                },
                ShowdownSeat {
                    seat_no: 3,
                    stack: 0,
                    total_committed: 101,
                    folded: false,
                    hole: ["4d", "5d"],
                },
            ],
        );
        // Button is the highest winning seat, so the order wraps to seat 1.
        let (resolved, _) = resolve_pots(&state).unwrap();
        assert_eq!(resolved.seat(seat_no(1)).unwrap().stack, 152);
        assert_eq!(resolved.seat(seat_no(3)).unwrap().stack, 151);
    }

    #[test]
    fn uncontested_award_pays_the_lone_live_seat() {
        let mut state = showdown(
            1,
            ["2c", "7d", "9h", "Js", "Kd"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 400,
                    total_committed: 100,
                    folded: true,
                    hole: ["As", "Ad"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 900,
                    total_committed: 100,
                    folded: false,
                    hole: ["Ks", "Qs"],
                },
            ],
        );
        state.phase = HandPhase::Flop;
        let resolved = award_uncontested(&state);
        assert_eq!(resolved.phase, HandPhase::Complete);
        assert_eq!(resolved.pot, 0);
        assert_eq!(resolved.seat(seat_no(2)).unwrap().stack, 1_100);
        assert_eq!(resolved.awards.len(), 1);
        assert_eq!(resolved.awards[0].reason, AwardReason::Uncontested);
    }

    #[test]
    fn awards_always_sum_to_commitments() {
        let state = showdown(
            2,
            ["2c", "7d", "9h", "Js", "Kd"],
            vec![
                ShowdownSeat {
                    seat_no: 1,
                    stack: 0,
                    total_committed: 250,
                    folded: false,
                    hole: ["As", "Ad"],
                },
                ShowdownSeat {
                    seat_no: 2,
                    stack: 10,
                    total_committed: 700,
                    folded: false,
                    hole: ["Ks", "Qs"],
                },
                ShowdownSeat {
                    seat_no: 3,
                    stack: 0,
                    total_committed: 700,
                    folded: false,
                    hole: ["9s", "9c"],
                },
                ShowdownSeat {
                    seat_no: 4,
                    stack: 40,
                    total_committed: 120,
                    folded: true,
                    hole: ["2h", "3h"],
                },
            ],
        );
        let before = state.chips_in_play();
        let (resolved, awards) = resolve_pots(&state).unwrap();
        assert_eq!(total_awarded(&awards), 250 + 700 + 700 + 120);
        assert_eq!(resolved.chips_in_play(), before);
    }
}
