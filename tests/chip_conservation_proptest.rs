//! Property-based checks over randomly played hands: chips are conserved
//! by every transition, hands terminate, and showdown awards always sum to
//! the pot.

use poker_arena::game::{
    Action, ActionKind, HandPhase, HandState, SeatNo, SeatState, TableConfig,
    showdown::resolve_pots,
    state_machine::{StartNewHandInput, apply_action, start_new_hand},
};
use poker_arena::table::derive_legal_actions;
use proptest::prelude::*;

fn seat_no(value: u8) -> SeatNo {
    SeatNo::new(value, 6).unwrap()
}

/// Picks a legal action for the acting seat from a raw random value,
/// falling back to passive play when the preferred aggressive sizing is
/// not actually coverable.
fn choose_action(state: &HandState, choice: u32, sizing: u32) -> Action {
    let acting = state.seat(state.acting_seat).unwrap();
    let legal = derive_legal_actions(state, acting);
    let kind = legal[choice as usize % legal.len()];
    match kind {
        ActionKind::Fold => Action::fold(),
        ActionKind::Check => Action::check(),
        ActionKind::Call => Action::call(),
        ActionKind::Bet => {
            if acting.stack < state.min_raise_to {
                Action::check()
            } else {
                let span = acting.stack - state.min_raise_to;
                let amount = state.min_raise_to + if span == 0 { 0 } else { sizing % (span + 1) };
                Action::bet(amount).unwrap()
            }
        }
        ActionKind::Raise => {
            let max_to = acting.committed_in_round + acting.stack;
            if max_to < state.min_raise_to {
                Action::call()
            } else {
                let span = max_to - state.min_raise_to;
                let amount = state.min_raise_to + if span == 0 { 0 } else { sizing % (span + 1) };
                Action::raise_to(amount).unwrap()
            }
        }
    }
}

fn play_random_hand(
    stacks: Vec<u32>,
    seed: u64,
    choices: &[(u32, u32)],
) -> (HandState, u32) {
    let seats: Vec<SeatState> = stacks
        .iter()
        .enumerate()
        .map(|(i, &stack)| SeatState::new(seat_no(i as u8 + 1), stack))
        .collect();
    let mut state = start_new_hand(StartNewHandInput {
        table_id: "prop".into(),
        hand_no: 1,
        seats,
        button_seat: seat_no(1),
        config: TableConfig::default(),
        shuffle_seed: Some(seed),
    })
    .unwrap();

    let total = state.chips_in_play();
    let mut applied = 0u32;
    let mut cursor = 0usize;
    while state.phase.is_betting() {
        assert!(applied < 2_048, "hand failed to terminate");
        let (choice, sizing) = choices[cursor % choices.len()];
        cursor += 1;
        state = apply_action(&state, choose_action(&state, choice, sizing)).unwrap();
        applied += 1;
        assert_eq!(state.chips_in_play(), total, "transition leaked chips");
    }
    (state, total)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_hands_conserve_chips_and_terminate(
        stacks in prop::collection::vec(150u32..5_000, 2..=6),
        seed in any::<u64>(),
        choices in prop::collection::vec((any::<u32>(), any::<u32>()), 64),
    ) {
        let (state, total) = play_random_hand(stacks, seed, &choices);
        prop_assert!(state.phase.is_terminal());

        if state.phase == HandPhase::Showdown {
            let (resolved, awards) = resolve_pots(&state).unwrap();
            let awarded: u32 = awards.iter().map(|a| a.amount).sum();
            let committed: u32 = state.seats.iter().map(|s| s.total_committed).sum();
            prop_assert_eq!(awarded, committed);
            prop_assert_eq!(resolved.chips_in_play(), total);
            prop_assert_eq!(resolved.pot, 0);
        } else {
            // Uncontested completion already moved the pot into a stack.
            prop_assert_eq!(state.phase, HandPhase::Complete);
            prop_assert_eq!(state.pot, 0);
            prop_assert_eq!(state.chips_in_play(), total);
        }
    }

    #[test]
    fn folded_seats_never_win_an_award(
        stacks in prop::collection::vec(150u32..5_000, 2..=6),
        seed in any::<u64>(),
        choices in prop::collection::vec((any::<u32>(), any::<u32>()), 64),
    ) {
        let (state, _) = play_random_hand(stacks, seed, &choices);
        let final_state = if state.phase == HandPhase::Showdown {
            resolve_pots(&state).unwrap().0
        } else {
            state
        };
        for award in &final_state.awards {
            for winner in &award.seats {
                let seat = final_state.seat(*winner).unwrap();
                prop_assert!(!seat.folded, "folded seat {winner} won chips");
            }
        }
    }

    #[test]
    fn seeded_deals_are_deterministic(
        stacks in prop::collection::vec(150u32..5_000, 2..=4),
        seed in any::<u64>(),
    ) {
        let build = |stacks: &[u32]| {
            start_new_hand(StartNewHandInput {
                table_id: "prop".into(),
                hand_no: 9,
                seats: stacks
                    .iter()
                    .enumerate()
                    .map(|(i, &stack)| SeatState::new(seat_no(i as u8 + 1), stack))
                    .collect(),
                button_seat: seat_no(1),
                config: TableConfig::default(),
                shuffle_seed: Some(seed),
            })
            .unwrap()
        };
        let a = build(&stacks);
        let b = build(&stacks);
        prop_assert_eq!(a.hole_cards, b.hole_cards);
        prop_assert_eq!(a.board, b.board);
        prop_assert_eq!(a.seats, b.seats);
    }
}
