//! Call forwarder - re-issue a request against a handler in place
//!
//! The handler runs with the original caller's identity and against the
//! router's storage. Its outcome is mirrored exactly: output bytes on
//! success, the raw failure payload on failure. The forwarder never looks
//! at the payload it carries.

use exchange_core::{Budget, ExecutionFrame, HandlerFailure, ModuleTable};
use exchange_types::{Address, Bytes};
use tracing::{debug, trace};

use crate::error::RouterError;
use crate::types::Role;

/// Forwards raw requests to installed handler modules
#[derive(Debug, Clone)]
pub struct Forwarder {
    modules: ModuleTable,
}

impl Forwarder {
    pub fn new(modules: ModuleTable) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &ModuleTable {
        &self.modules
    }

    /// Execute `input` on the handler at `target` within `frame`.
    ///
    /// `role` is only used to describe an unroutable target. On handler
    /// failure every write the handler made is undone before the failure is
    /// raised.
    pub fn forward(
        &self,
        frame: &mut ExecutionFrame<'_>,
        role: Role,
        target: Address,
        input: &[u8],
    ) -> Result<Bytes, RouterError> {
        let handler = self
            .modules
            .get(&target)
            .ok_or(RouterError::UnroutableRequest { role, handler: target })?;

        frame.charge(Budget::forward_cost(input.len()))?;

        trace!(
            role = %role,
            handler = %target,
            module = handler.name(),
            len = input.len(),
            "Forwarding request"
        );

        let checkpoint = frame.checkpoint();
        let outcome = handler.call(&mut frame.context(), input);
        match outcome {
            Ok(output) => {
                frame.commit(checkpoint);
                debug!(role = %role, handler = %target, output_len = output.len(), "Forward succeeded");
                Ok(output)
            }
            Err(HandlerFailure::Revert(payload)) => {
                frame.revert_to(checkpoint);
                debug!(role = %role, handler = %target, payload_len = payload.len(), "Forward reverted");
                Err(RouterError::ForwardedFailure(payload))
            }
            Err(HandlerFailure::OutOfBudget(err)) => {
                frame.revert_to(checkpoint);
                debug!(role = %role, handler = %target, "Forward ran out of budget");
                Err(RouterError::BudgetExhausted(err))
            }
        }
    }
}
