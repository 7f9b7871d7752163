//! Registry administration
//!
//! `setController` and `setBindings` are the only operations that write the
//! registry on purpose. Both are gated to the current controlling principal
//! and accept addresses verbatim. Setting the null controller locks
//! administration for good.

use alloy_sol_types::SolCall;
use exchange_core::budget::{SLOAD_COST, SSTORE_COST};
use exchange_core::ExecutionFrame;
use exchange_types::abi;
use exchange_types::{Address, Bytes};
use tracing::{info, warn};

use crate::error::RouterError;
use crate::registry::RoleRegistry;
use crate::types::Role;

/// Administration operations handled by the router itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOp {
    SetController,
    SetBindings,
}

/// Reject anyone but the controlling principal.
///
/// A null controller locks administration: nobody is authorized, the null
/// caller included. Returns the current controller.
pub fn authorize(registry: &RoleRegistry, frame: &mut ExecutionFrame<'_>) -> Result<Address, RouterError> {
    frame.charge(SLOAD_COST)?;
    let controller = registry.controller(frame.storage());
    let caller = frame.caller();
    if controller.is_zero() || caller != controller {
        warn!(caller = %caller, locked = controller.is_zero(), "Rejected administration call from non-controller");
        return Err(RouterError::Unauthorized { caller });
    }
    Ok(controller)
}

/// Replace the controlling principal
pub fn set_controller(
    registry: &RoleRegistry,
    frame: &mut ExecutionFrame<'_>,
    new_controller: Address,
) -> Result<(), RouterError> {
    let previous = authorize(registry, frame)?;
    frame.charge(SSTORE_COST)?;

    registry.set_controller(frame.storage_mut(), new_controller);
    if new_controller.is_zero() {
        warn!(previous = %previous, "Controller cleared; administration is now locked");
    } else {
        info!(previous = %previous, controller = %new_controller, "Controller replaced");
    }
    Ok(())
}

/// Replace zero or more role bindings.
///
/// Every role id is checked before anything is written. Each supplied
/// address is then written unconditionally; a later entry for the same role
/// overrides an earlier one.
pub fn set_bindings(
    registry: &RoleRegistry,
    frame: &mut ExecutionFrame<'_>,
    bindings: &[abi::RoleBinding],
) -> Result<(), RouterError> {
    authorize(registry, frame)?;

    let resolved = bindings
        .iter()
        .map(|binding| Role::try_from(binding.role).map(|role| (role, binding.handler)))
        .collect::<Result<Vec<_>, RouterError>>()?;

    for (role, handler) in resolved {
        frame.charge(SSTORE_COST)?;
        registry.set(frame.storage_mut(), role, handler);
        if handler.is_zero() {
            warn!(role = %role, "Role binding cleared to null handler");
        } else {
            info!(role = %role, handler = %handler, "Role binding replaced");
        }
    }
    Ok(())
}

/// Decode and run an administration request
pub fn execute(
    registry: &RoleRegistry,
    frame: &mut ExecutionFrame<'_>,
    op: AdminOp,
    calldata: &[u8],
) -> Result<Bytes, RouterError> {
    match op {
        AdminOp::SetController => {
            let call = abi::setControllerCall::abi_decode(calldata, true).map_err(|e| {
                RouterError::InvalidArguments {
                    operation: abi::setControllerCall::SIGNATURE,
                    reason: e.to_string(),
                }
            })?;
            set_controller(registry, frame, call.newController)?;
        }
        AdminOp::SetBindings => {
            let call = abi::setBindingsCall::abi_decode(calldata, true).map_err(|e| {
                RouterError::InvalidArguments {
                    operation: abi::setBindingsCall::SIGNATURE,
                    reason: e.to_string(),
                }
            })?;
            set_bindings(registry, frame, &call.bindings)?;
        }
    }
    Ok(Bytes::new())
}
