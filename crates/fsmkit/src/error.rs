//! Error types.

use crate::state::State;
use thiserror::Error;

/// Why a [`Walker`](crate::Walker) stopped before consuming its whole input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError<S> {
    #[error("no transition from {state} on {symbol:?} at position {position}")]
    NoTransition {
        state: State,
        symbol: S,
        position: usize,
    },
}
