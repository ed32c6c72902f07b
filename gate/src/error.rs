use thiserror::Error;

use crate::state::GateState;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("gate endpoint unreachable: {0}")]
    Transport(String),

    #[error("malformed gate response: {0}")]
    MalformedResponse(String),

    #[error("cannot {action} while gate is {from:?}")]
    InvalidTransition {
        from: GateState,
        action: &'static str,
    },
}
