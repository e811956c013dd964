//! Async table orchestration: the decision-source seam and the runner that
//! drives hands through it.

pub mod provider;
pub mod runner;

pub use provider::{ActionProvider, DecisionRequest, PROTOCOL_VERSION, ProviderError,
    derive_legal_actions};
pub use runner::{
    CancelToken, HandSummary, RunHandInput, RunHandResult, RunTableInput, RunTableResult, Runner,
    RunnerConfig, RunnerError, TableRunError,
};
