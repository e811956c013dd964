//! Built-in decision sources.
//!
//! Deterministic [`ActionProvider`](crate::table::ActionProvider)
//! implementations for exercising the runner without a live agent:
//! passive call/check play, instant check/fold, and a scripted sequence
//! for reproducing exact betting lines in tests.

pub mod decision;

pub use decision::{CheckCallBot, CheckFoldBot, ScriptedBot};
