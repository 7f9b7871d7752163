//! Execution budget metering
//!
//! A request carries one budget. The router, the forwarder and every handler
//! it reaches draw from the same counter; running dry aborts the whole
//! request.

use thiserror::Error;

/// Cost of reading one storage slot
pub const SLOAD_COST: u64 = 2_100;

/// Cost of writing one storage slot
pub const SSTORE_COST: u64 = 20_000;

/// Fixed cost of forwarding a request to a handler
pub const FORWARD_BASE_COST: u64 = 2_600;

/// Cost per 32-byte word of payload copied into a forward
pub const CALLDATA_WORD_COST: u64 = 3;

/// The budget could not cover a charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Execution budget exhausted: required {required}, remaining {remaining}")]
pub struct OutOfBudget {
    pub required: u64,
    pub remaining: u64,
}

/// Remaining execution budget of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    limit: u64,
    remaining: u64,
}

impl Budget {
    pub fn new(limit: u64) -> Self {
        Self { limit, remaining: limit }
    }

    /// Consume `cost` units.
    ///
    /// A failed charge drains the budget: nothing may run after it.
    pub fn charge(&mut self, cost: u64) -> Result<(), OutOfBudget> {
        match self.remaining.checked_sub(cost) {
            Some(left) => {
                self.remaining = left;
                Ok(())
            }
            None => {
                let remaining = self.remaining;
                self.remaining = 0;
                Err(OutOfBudget { required: cost, remaining })
            }
        }
    }

    /// Cost of forwarding `len` bytes of payload
    pub fn forward_cost(len: usize) -> u64 {
        let words = (len as u64).div_ceil(32);
        FORWARD_BASE_COST.saturating_add(words.saturating_mul(CALLDATA_WORD_COST))
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn used(&self) -> u64 {
        self.limit - self.remaining
    }
}
