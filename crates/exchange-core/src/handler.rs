//! Handler contract
//!
//! A handler is an external module implementing the real logic of one role
//! (swaps, quotes, positions, ...). The router never looks inside: it hands
//! the handler the raw payload and a [`CallContext`] through which the
//! handler sees the *original caller* and the *router's* storage. Whatever
//! the handler writes lands in the router's durable state, exactly as if the
//! router had executed the code itself.

use exchange_types::{Address, Bytes, Slot, Word};

use crate::budget::{Budget, OutOfBudget, SLOAD_COST, SSTORE_COST};
use crate::storage::{Checkpoint, SlotStorage};

/// How a handler call can fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerFailure {
    /// The handler rejected the call; the payload is its raw failure data
    Revert(Bytes),
    /// The shared execution budget ran dry inside the handler
    OutOfBudget(OutOfBudget),
}

impl From<OutOfBudget> for HandlerFailure {
    fn from(err: OutOfBudget) -> Self {
        Self::OutOfBudget(err)
    }
}

/// Result of a handler call: raw output bytes or a failure
pub type HandlerResult = Result<Bytes, HandlerFailure>;

/// Trait implemented by every handler module
pub trait Handler: Send + Sync {
    /// Execute `input` in the caller's context
    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> HandlerResult;

    /// Module name for logging
    fn name(&self) -> &str;
}

/// Execution context handed to a handler.
///
/// Borrowed, not copied: storage writes and budget consumption are visible
/// to the router as soon as the handler returns. Storage is reachable only
/// through metered [`sload`](Self::sload) and [`sstore`](Self::sstore); a
/// context is only ever built from an [`ExecutionFrame`].
///
/// ```compile_fail
/// use exchange_core::{CallContext, SlotStorage};
///
/// fn wipe(ctx: &mut CallContext<'_>) {
///     *ctx.storage_mut() = SlotStorage::new();
/// }
/// ```
pub struct CallContext<'a> {
    caller: Address,
    address: Address,
    storage: &'a mut SlotStorage,
    budget: &'a mut Budget,
}

impl CallContext<'_> {
    /// Identity of the external caller that issued the request
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Address whose state the call executes against (the router itself)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Metered storage read
    pub fn sload(&mut self, slot: &Slot) -> Result<Word, OutOfBudget> {
        self.budget.charge(SLOAD_COST)?;
        Ok(self.storage.load(slot))
    }

    /// Metered storage write
    pub fn sstore(&mut self, slot: Slot, value: Word) -> Result<(), OutOfBudget> {
        self.budget.charge(SSTORE_COST)?;
        self.storage.store(slot, value);
        Ok(())
    }

    /// Draw from the shared budget for work that is not storage access
    pub fn charge(&mut self, cost: u64) -> Result<(), OutOfBudget> {
        self.budget.charge(cost)
    }

    pub fn remaining_budget(&self) -> u64 {
        self.budget.remaining()
    }
}

/// Router-side view of one request in flight.
///
/// Owns the borrows of the router's storage and the request budget for the
/// duration of the request. The router does its own bookkeeping (registry
/// reads, checkpoints) through the frame and lends handlers a
/// [`CallContext`] via [`context`](Self::context).
pub struct ExecutionFrame<'a> {
    caller: Address,
    address: Address,
    storage: &'a mut SlotStorage,
    budget: &'a mut Budget,
}

impl<'a> ExecutionFrame<'a> {
    pub fn new(
        caller: Address,
        address: Address,
        storage: &'a mut SlotStorage,
        budget: &'a mut Budget,
    ) -> Self {
        Self { caller, address, storage, budget }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn charge(&mut self, cost: u64) -> Result<(), OutOfBudget> {
        self.budget.charge(cost)
    }

    pub fn remaining_budget(&self) -> u64 {
        self.budget.remaining()
    }

    pub fn storage(&self) -> &SlotStorage {
        &*self.storage
    }

    pub fn storage_mut(&mut self) -> &mut SlotStorage {
        &mut *self.storage
    }

    /// Open a storage checkpoint
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.storage.checkpoint()
    }

    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.storage.commit(checkpoint);
    }

    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        self.storage.revert_to(checkpoint);
    }

    /// Context lent to a handler for one call
    pub fn context(&mut self) -> CallContext<'_> {
        CallContext {
            caller: self.caller,
            address: self.address,
            storage: &mut *self.storage,
            budget: &mut *self.budget,
        }
    }
}
