//! Error types for the router module

use alloy_sol_types::SolError;
use exchange_core::OutOfBudget;
use exchange_types::abi;
use exchange_types::{Address, Bytes, I256};
use thiserror::Error;

use crate::types::Role;

/// Router error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Caller is not the controlling principal
    #[error("Caller {caller} is not the controlling principal")]
    Unauthorized { caller: Address },

    /// Undeclared request that is too short or lacks the format marker
    #[error("Malformed request: {0}")]
    MalformedRequest(&'static str),

    /// The resolved role has no reachable handler
    #[error("No handler reachable for role {role} (bound to {handler})")]
    UnroutableRequest { role: Role, handler: Address },

    /// The handler failed; the payload is carried verbatim
    #[error("Forwarded call failed ({} byte payload)", .0.len())]
    ForwardedFailure(Bytes),

    /// A wrapper's realized result missed the caller's bound
    #[error("Postcondition violated: realized {realized}, bound {bound}")]
    PostconditionViolation { realized: I256, bound: I256 },

    /// Checked arithmetic failed while evaluating a wrapper result
    #[error("Arithmetic failure: {0}")]
    Arithmetic(&'static str),

    /// The handler's output is not the expected result shape
    #[error("Undecodable handler result: {0}")]
    UndecodableResult(String),

    /// Role id outside the closed role set
    #[error("Unknown role id: {0}")]
    UnknownRole(u8),

    /// Declared operation with arguments that do not decode
    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments {
        operation: &'static str,
        reason: String,
    },

    /// The request's execution budget ran out
    #[error(transparent)]
    BudgetExhausted(#[from] OutOfBudget),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RouterError {
    /// Failure payload as the external caller observes it.
    ///
    /// Handler failures pass through byte-for-byte. Router failures are
    /// encoded as the custom errors declared in [`abi`].
    pub fn revert_data(&self) -> Bytes {
        let encoded = match self {
            RouterError::ForwardedFailure(payload) => return payload.clone(),
            RouterError::Unauthorized { caller } => {
                abi::Unauthorized { caller: *caller }.abi_encode()
            }
            RouterError::MalformedRequest(_) => abi::MalformedRequest {}.abi_encode(),
            RouterError::UnroutableRequest { role, handler } => abi::UnroutableRequest {
                role: role.id(),
                handler: *handler,
            }
            .abi_encode(),
            RouterError::PostconditionViolation { realized, bound } => {
                abi::PostconditionViolated {
                    realized: *realized,
                    bound: *bound,
                }
                .abi_encode()
            }
            RouterError::Arithmetic(_) => abi::ArithmeticFailure {}.abi_encode(),
            RouterError::UndecodableResult(_) => abi::UndecodableResult {}.abi_encode(),
            RouterError::UnknownRole(id) => abi::UnknownRole { role: *id }.abi_encode(),
            RouterError::InvalidArguments { .. }
            | RouterError::BudgetExhausted(_)
            | RouterError::InvalidConfig(_) => Vec::new(),
        };
        Bytes::from(encoded)
    }

    /// Whether the failure came from a handler rather than the router
    pub fn is_forwarded(&self) -> bool {
        matches!(self, RouterError::ForwardedFailure(_))
    }
}
