use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::game::entities::{Action, ActionKind};
use crate::table::provider::{ActionProvider, DecisionRequest, ProviderError};

/// Calls any bet, checks otherwise. Never folds, never raises; the most
/// passive line that still sees every showdown.
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckCallBot;

#[async_trait]
impl ActionProvider for CheckCallBot {
    async fn next_action(&self, request: &DecisionRequest) -> Result<Action, ProviderError> {
        if request.to_call > 0 {
            Ok(Action::call())
        } else {
            Ok(Action::check())
        }
    }
}

/// Checks when free, folds to any bet. Useful as the weakest opponent a
/// strategy must beat.
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckFoldBot;

#[async_trait]
impl ActionProvider for CheckFoldBot {
    async fn next_action(&self, request: &DecisionRequest) -> Result<Action, ProviderError> {
        if request.is_legal(ActionKind::Check) {
            Ok(Action::check())
        } else {
            Ok(Action::fold())
        }
    }
}

/// Pops one queued action per request, in order, regardless of which seat
/// is asking. Fails with [`ProviderError::ScriptExhausted`] once the queue
/// is empty, which exercises the runner's fallback path.
#[derive(Debug, Default)]
pub struct ScriptedBot {
    actions: Mutex<VecDeque<Action>>,
}

impl ScriptedBot {
    #[must_use]
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: Mutex::new(actions.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.actions.lock().map(|queue| queue.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ActionProvider for ScriptedBot {
    async fn next_action(&self, _request: &DecisionRequest) -> Result<Action, ProviderError> {
        let mut queue = self
            .actions
            .lock()
            .map_err(|_| ProviderError::Unavailable("script lock poisoned".into()))?;
        queue.pop_front().ok_or(ProviderError::ScriptExhausted)
    }
}
