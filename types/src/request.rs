//! Inbound request envelope

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a request
pub type RequestId = Uuid;

/// Budget granted to a request when the caller does not pick one
pub const DEFAULT_REQUEST_BUDGET: u64 = 30_000_000;

/// One external call into the router.
///
/// The payload is kept raw: the router only looks at enough of it to pick a
/// handler, and forwards the rest untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Request identifier, used for correlation in logs and replies
    pub id: RequestId,

    /// Identity of the external caller
    pub caller: Address,

    /// Raw call payload (selector + arguments, or a discriminated payload)
    pub calldata: Bytes,

    /// Execution budget for the whole request, nested forwards included
    pub budget: u64,
}

impl Request {
    /// Create a request with the default budget
    pub fn new(caller: Address, calldata: impl Into<Bytes>) -> Self {
        Self {
            id: Uuid::new_v4(),
            caller,
            calldata: calldata.into(),
            budget: DEFAULT_REQUEST_BUDGET,
        }
    }

    /// Set the execution budget
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Leading four bytes of the payload, if present
    pub fn selector(&self) -> Option<crate::Selector> {
        self.calldata
            .get(..4)
            .and_then(|head| head.try_into().ok())
    }
}
