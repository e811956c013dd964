//! # Poker Arena
//!
//! A No-Limit Texas Hold'em table engine built for evaluating AI agents:
//! hands are dealt and adjudicated by a pure state machine, an async
//! runner queries an abstract decision source for each action, and any
//! agent failure degrades into a check-then-fold fallback instead of
//! stalling the table.
//!
//! ## Architecture
//!
//! Three layers, each depending only on the one below:
//!
//! - [`game`]: pure hand logic — entities, the betting state machine,
//!   seven-card hand evaluation, and side-pot resolution. Deterministic
//!   given a shuffle seed; no I/O.
//! - [`table`]: the async [`Runner`](table::Runner) plus the
//!   [`ActionProvider`](table::ActionProvider) seam it queries. Drives one
//!   table's hands strictly sequentially, rotates the button, retires
//!   busted seats, and observes cancellation around every provider call.
//! - [`bot`]: built-in deterministic providers for tests and local play.
//!
//! ## Example
//!
//! ```no_run
//! use poker_arena::bot::CheckCallBot;
//! use poker_arena::game::{SeatNo, SeatState, TableConfig};
//! use poker_arena::table::{CancelToken, RunTableInput, Runner, RunnerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = Runner::new(CheckCallBot, RunnerConfig::default());
//! let result = runner
//!     .run_table(
//!         &CancelToken::new(),
//!         RunTableInput {
//!             table_id: "table-1".into(),
//!             starting_hand: 1,
//!             hands_to_run: 100,
//!             button_seat: SeatNo::new(1, 6)?,
//!             seats: vec![
//!                 SeatState::new(SeatNo::new(1, 6)?, 10_000),
//!                 SeatState::new(SeatNo::new(2, 6)?, 10_000),
//!             ],
//!             config: TableConfig::default(),
//!         },
//!     )
//!     .await?;
//! println!("completed {} hands", result.hands_completed);
//! # Ok(())
//! # }
//! ```

/// Pure hand logic, entities, and pot resolution.
pub mod game;
pub use game::{
    Action, ActionKind, Card, Chips, GameError, HandPhase, HandState, PotAward, SeatNo, SeatState,
    TableConfig, constants,
};

/// Async table orchestration and the decision-source seam.
pub mod table;
pub use table::{ActionProvider, CancelToken, Runner, RunnerConfig, RunnerError};

/// Built-in deterministic decision sources.
pub mod bot;
