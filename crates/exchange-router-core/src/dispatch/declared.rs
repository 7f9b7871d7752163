//! Declared operation table
//!
//! Fixed, closed map from selector to handling. Selectors come straight from
//! the `sol!` call definitions, so the table cannot drift from the ABI.

use std::collections::HashMap;

use alloy_sol_types::SolCall;
use exchange_types::abi;
use exchange_types::Selector;

use crate::admin::AdminOp;
use crate::types::Role;
use crate::wrappers::WrapperKind;

/// What the router does with a declared operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Forward(Role),
    Wrapper(WrapperKind),
    Admin(AdminOp),
}

/// One row of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredOperation {
    pub selector: Selector,
    pub signature: &'static str,
    pub entry: Entry,
}

impl DeclaredOperation {
    fn of<C: SolCall>(entry: Entry) -> Self {
        Self {
            selector: C::SELECTOR,
            signature: C::SIGNATURE,
            entry,
        }
    }
}

/// Selector -> operation lookup
#[derive(Debug, Clone)]
pub struct DeclaredTable {
    operations: HashMap<Selector, DeclaredOperation>,
}

impl DeclaredTable {
    pub fn new() -> Self {
        use Entry::{Admin, Forward, Wrapper};

        let rows = [
            DeclaredOperation::of::<abi::swapCall>(Forward(Role::Swap)),
            DeclaredOperation::of::<abi::swapWithPermitCall>(Forward(Role::SwapWithPermit)),
            DeclaredOperation::of::<abi::quoteCall>(Forward(Role::Quote)),
            DeclaredOperation::of::<abi::createPoolCall>(Forward(Role::Admin)),
            DeclaredOperation::of::<abi::enablePoolCall>(Forward(Role::Admin)),
            DeclaredOperation::of::<abi::setPriceCall>(Forward(Role::Admin)),
            DeclaredOperation::of::<abi::modifyLiquidityCall>(Forward(Role::PositionUpdate)),
            DeclaredOperation::of::<abi::collectFeesCall>(Forward(Role::PositionUpdate)),
            DeclaredOperation::of::<abi::mintPositionCall>(Forward(Role::Position)),
            DeclaredOperation::of::<abi::burnPositionCall>(Forward(Role::Position)),
            DeclaredOperation::of::<abi::transferPositionCall>(Forward(Role::Position)),
            DeclaredOperation::of::<abi::approvePositionCall>(Forward(Role::Position)),
            DeclaredOperation::of::<abi::swapInCall>(Wrapper(WrapperKind::SwapIn)),
            DeclaredOperation::of::<abi::swapOutCall>(Wrapper(WrapperKind::SwapOut)),
            DeclaredOperation::of::<abi::swapInWithPermitCall>(Wrapper(WrapperKind::SwapInWithPermit)),
            DeclaredOperation::of::<abi::swapOutWithPermitCall>(Wrapper(WrapperKind::SwapOutWithPermit)),
            DeclaredOperation::of::<abi::setControllerCall>(Admin(AdminOp::SetController)),
            DeclaredOperation::of::<abi::setBindingsCall>(Admin(AdminOp::SetBindings)),
        ];

        let operations: HashMap<_, _> = rows.into_iter().map(|op| (op.selector, op)).collect();
        debug_assert_eq!(operations.len(), rows.len(), "declared selectors collide");

        Self { operations }
    }

    /// Operation named by the first four bytes of `calldata`
    pub fn lookup(&self, calldata: &[u8]) -> Option<&DeclaredOperation> {
        let selector: Selector = calldata.get(..4)?.try_into().ok()?;
        self.operations.get(&selector)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeclaredOperation> {
        self.operations.values()
    }
}

impl Default for DeclaredTable {
    fn default() -> Self {
        Self::new()
    }
}
