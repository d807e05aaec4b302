use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WheelError {
    #[error("the eligible pool is empty")]
    EmptyPool,

    #[error("target index {index} is outside a pool of {pool_size}")]
    TargetOutOfRange { index: usize, pool_size: usize },

    /// The engine refused the request in its current state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("spin animation was cancelled")]
    Cancelled,
}
