//! The async table runner.
//!
//! Drives hands to completion against an [`ActionProvider`]: one hand via
//! [`Runner::run_hand`], a whole table session via [`Runner::run_table`].
//! Provider failures and illegal actions never kill a hand; the runner
//! substitutes a check, then a fold, and keeps going. Hands within a run
//! are strictly sequential; the only suspension point is the provider call,
//! and cancellation is observed on both sides of it.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::game::entities::{
    Action, HandPhase, HandState, SeatNo, SeatState, TableConfig, next_seat_where,
};
use crate::game::errors::GameError;
use crate::game::showdown::resolve_pots;
use crate::game::state_machine::{StartNewHandInput, apply_action, start_new_hand};

use super::provider::{ActionProvider, DecisionRequest};

/// Cooperative cancellation flag shared between a runner and whoever wants
/// to stop it. Cancelling is sticky and thread-safe.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("hand {hand_no} on table {table_id}: applied {actions} actions (max {max})")]
    ActionLimitExceeded {
        table_id: String,
        hand_no: u64,
        actions: u32,
        max: u32,
    },
    #[error("hand {hand_no} on table {table_id} cancelled after {actions} actions")]
    Cancelled {
        table_id: String,
        hand_no: u64,
        actions: u32,
        last_state: Box<HandState>,
    },
    #[error("fallback check failed ({check}) and fallback fold failed ({fold})")]
    FallbackFailed { check: GameError, fold: GameError },
    #[error("need {required} playable seats to start a hand, have {actual}")]
    InsufficientActiveSeats { required: u8, actual: usize },
    #[error("hands to run must be greater than zero")]
    InvalidHandsToRun,
}

/// A table run that stopped early. Carries everything completed before the
/// failing hand so callers can persist the partial session.
#[derive(Debug, Error)]
#[error("table run stopped after {} hands", partial.hands_completed)]
pub struct TableRunError {
    pub partial: RunTableResult,
    #[source]
    pub source: RunnerError,
}

#[derive(Default)]
pub struct RunnerConfig {
    /// Base shuffle seed; each hand uses base wrapping_add(hand_no) so a
    /// fixed base reproduces the whole run.
    pub shuffle_seed: Option<u64>,
    /// Invoked synchronously after every completed hand. Outcome ignored.
    pub on_hand_complete: Option<Box<dyn Fn(&HandSummary) + Send + Sync>>,
}

#[derive(Clone, Debug)]
pub struct RunHandInput {
    pub table_id: String,
    pub hand_no: u64,
    pub button_seat: SeatNo,
    pub seats: Vec<SeatState>,
    pub config: TableConfig,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunHandResult {
    pub final_state: HandState,
    pub action_count: u32,
    pub fallback_count: u32,
}

#[derive(Clone, Debug)]
pub struct RunTableInput {
    pub table_id: String,
    pub starting_hand: u64,
    pub hands_to_run: u32,
    pub button_seat: SeatNo,
    pub seats: Vec<SeatState>,
    pub config: TableConfig,
}

/// Record of one completed hand, handed to the observer callback and kept
/// in the run result.
#[derive(Clone, Debug, Serialize)]
pub struct HandSummary {
    pub hand_no: u64,
    pub final_phase: HandPhase,
    pub action_count: u32,
    pub fallback_count: u32,
    pub completed_at: DateTime<Utc>,
    pub final_state: HandState,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RunTableResult {
    pub hands_completed: u32,
    pub final_button: Option<SeatNo>,
    pub final_seats: Vec<SeatState>,
    pub total_actions: u32,
    pub total_fallbacks: u32,
    pub hand_summaries: Vec<HandSummary>,
}

pub struct Runner<P: ActionProvider> {
    provider: P,
    config: RunnerConfig,
}

impl<P: ActionProvider> Runner<P> {
    pub fn new(provider: P, config: RunnerConfig) -> Self {
        Self { provider, config }
    }

    /// Runs a single hand to phase Complete. Pot resolution is applied the
    /// moment the state machine reaches Showdown.
    pub async fn run_hand(
        &self,
        cancel: &CancelToken,
        input: RunHandInput,
    ) -> Result<RunHandResult, RunnerError> {
        let max_actions = input.config.max_actions_per_hand;
        let deadline_ms = input.config.action_timeout_ms;
        let table_id = input.table_id.clone();
        let hand_no = input.hand_no;

        let mut state = start_new_hand(StartNewHandInput {
            table_id: input.table_id,
            hand_no,
            seats: input.seats,
            button_seat: input.button_seat,
            config: input.config,
            shuffle_seed: self
                .config
                .shuffle_seed
                .map(|base| base.wrapping_add(hand_no)),
        })?;

        let mut action_count: u32 = 0;
        let mut fallback_count: u32 = 0;

        loop {
            if state.phase.is_terminal() {
                if state.phase == HandPhase::Showdown {
                    let (resolved, _) = resolve_pots(&state)?;
                    state = resolved;
                }
                debug!(
                    "hand {hand_no} on {table_id} complete: {action_count} actions, \
                     {fallback_count} fallbacks"
                );
                return Ok(RunHandResult {
                    final_state: state,
                    action_count,
                    fallback_count,
                });
            }

            if cancel.is_cancelled() {
                return Err(RunnerError::Cancelled {
                    table_id,
                    hand_no,
                    actions: action_count,
                    last_state: Box::new(state),
                });
            }

            let request = DecisionRequest::for_acting_seat(&state, deadline_ms)?;
            let decision = self.provider.next_action(&request).await;

            if cancel.is_cancelled() {
                return Err(RunnerError::Cancelled {
                    table_id,
                    hand_no,
                    actions: action_count,
                    last_state: Box::new(state),
                });
            }

            let applied = match decision {
                Ok(action) => match apply_action(&state, action) {
                    Ok(next) => Some(next),
                    Err(err) if err.is_rule_violation() => {
                        warn!(
                            "hand {hand_no} seat {}: rejected {action} ({err}), falling back",
                            state.acting_seat
                        );
                        None
                    }
                    Err(err) => return Err(err.into()),
                },
                Err(err) => {
                    warn!(
                        "hand {hand_no} seat {}: provider failed ({err}), falling back",
                        state.acting_seat
                    );
                    None
                }
            };

            state = match applied {
                Some(next) => next,
                None => {
                    fallback_count += 1;
                    apply_fallback(&state)?
                }
            };
            action_count += 1;

            if action_count > max_actions {
                return Err(RunnerError::ActionLimitExceeded {
                    table_id,
                    hand_no,
                    actions: action_count,
                    max: max_actions,
                });
            }
        }
    }

    /// Runs a fixed number of hands, rotating the button and retiring
    /// busted seats between hands. Stops at the first failing hand and
    /// returns everything completed before it.
    pub async fn run_table(
        &self,
        cancel: &CancelToken,
        input: RunTableInput,
    ) -> Result<RunTableResult, TableRunError> {
        let mut result = RunTableResult::default();
        if input.hands_to_run == 0 {
            return Err(TableRunError {
                partial: result,
                source: RunnerError::InvalidHandsToRun,
            });
        }

        let mut seats = prepare_seats(input.seats);
        let mut button = input.button_seat;

        for i in 0..input.hands_to_run {
            let playable = seats.iter().filter(|seat| seat.is_playable()).count();
            if playable < usize::from(input.config.min_players_to_start) {
                return Err(stop(
                    result,
                    button,
                    seats,
                    RunnerError::InsufficientActiveSeats {
                        required: input.config.min_players_to_start,
                        actual: playable,
                    },
                ));
            }

            let current_button = match normalize_button(button, &seats) {
                Some(seat_no) => seat_no,
                None => {
                    return Err(stop(
                        result,
                        button,
                        seats,
                        RunnerError::InsufficientActiveSeats {
                            required: input.config.min_players_to_start,
                            actual: 0,
                        },
                    ));
                }
            };

            let hand_no = input.starting_hand + u64::from(i);
            let hand = match self
                .run_hand(
                    cancel,
                    RunHandInput {
                        table_id: input.table_id.clone(),
                        hand_no,
                        button_seat: current_button,
                        seats: seats.clone(),
                        config: input.config.clone(),
                    },
                )
                .await
            {
                Ok(hand) => hand,
                Err(source) => return Err(stop(result, current_button, seats, source)),
            };

            result.hands_completed += 1;
            result.total_actions += hand.action_count;
            result.total_fallbacks += hand.fallback_count;
            let summary = HandSummary {
                hand_no,
                final_phase: hand.final_state.phase,
                action_count: hand.action_count,
                fallback_count: hand.fallback_count,
                completed_at: Utc::now(),
                final_state: hand.final_state.clone(),
            };
            if let Some(observer) = &self.config.on_hand_complete {
                observer(&summary);
            }
            result.hand_summaries.push(summary);

            seats = prepare_seats(hand.final_state.seats);
            button = match next_button_seat(current_button, &seats) {
                Some(seat_no) => seat_no,
                None => {
                    return Err(stop(
                        result,
                        current_button,
                        seats,
                        RunnerError::InsufficientActiveSeats {
                            required: input.config.min_players_to_start,
                            actual: 0,
                        },
                    ));
                }
            };
        }

        info!(
            "table {} run complete: {} hands, {} actions, {} fallbacks",
            input.table_id, result.hands_completed, result.total_actions, result.total_fallbacks
        );
        result.final_button = Some(button);
        result.final_seats = seats;
        Ok(result)
    }
}

/// Substitute action when the provider fails or answers illegally: check if
/// checking is legal, otherwise fold. Fold failing too is a defect in the
/// state machine, not in the agent.
fn apply_fallback(state: &HandState) -> Result<HandState, RunnerError> {
    match apply_action(state, Action::check()) {
        Ok(next) => Ok(next),
        Err(check) => match apply_action(state, Action::fold()) {
            Ok(next) => Ok(next),
            Err(fold) => Err(RunnerError::FallbackFailed { check, fold }),
        },
    }
}

fn stop(
    mut partial: RunTableResult,
    button: SeatNo,
    seats: Vec<SeatState>,
    source: RunnerError,
) -> TableRunError {
    partial.final_button = Some(button);
    partial.final_seats = seats;
    TableRunError { partial, source }
}

/// Deep-copies seat state between hands, clearing per-hand fields and
/// marking empty stacks busted.
fn prepare_seats(seats: Vec<SeatState>) -> Vec<SeatState> {
    let mut prepared = seats;
    for seat in &mut prepared {
        seat.reset_for_next_hand();
    }
    prepared
}

fn button_eligible(seat: &SeatState) -> bool {
    seat.status != crate::game::entities::SeatStatus::Busted && seat.stack > 0
}

fn normalize_button(current: SeatNo, seats: &[SeatState]) -> Option<SeatNo> {
    if seats
        .iter()
        .any(|seat| seat.seat_no == current && button_eligible(seat))
    {
        return Some(current);
    }
    next_button_seat(current, seats)
}

fn next_button_seat(current: SeatNo, seats: &[SeatState]) -> Option<SeatNo> {
    next_seat_where(seats, current, button_eligible)
}
