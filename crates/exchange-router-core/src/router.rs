//! Exchange router - the single entry point for external requests
//!
//! Every request runs inside one storage checkpoint. Whatever happens below
//! it (a forwarded handler, a wrapper's postcondition, an administration
//! write) either commits as a whole or leaves no trace.

use std::collections::BTreeMap;
use std::str::FromStr;

use exchange_core::budget::SLOAD_COST;
use exchange_core::{Budget, ExecutionFrame, ModuleTable, RouterConfig, SlotStorage};
use exchange_types::{Address, Bytes, Request};
use tracing::{debug, info, warn};

use crate::admin;
use crate::dispatch::{Dispatcher, Route};
use crate::error::RouterError;
use crate::forwarder::Forwarder;
use crate::registry::RoleRegistry;
use crate::types::Role;
use crate::wrappers;

/// Router state and the components that act on it
#[derive(Debug)]
pub struct ExchangeRouter {
    address: Address,
    registry: RoleRegistry,
    dispatcher: Dispatcher,
    forwarder: Forwarder,
    storage: SlotStorage,
}

impl ExchangeRouter {
    /// Create a router with no bindings, controlled by `controller`
    pub fn new(address: Address, controller: Address, modules: ModuleTable) -> Self {
        let registry = RoleRegistry::new();
        let mut storage = SlotStorage::new();

        let checkpoint = storage.checkpoint();
        registry.set_controller(&mut storage, controller);
        storage.commit(checkpoint);

        info!(router = %address, controller = %controller, "Exchange router created");

        Self {
            address,
            registry,
            dispatcher: Dispatcher::new(),
            forwarder: Forwarder::new(modules),
            storage,
        }
    }

    /// Create a router with initial bindings
    pub fn with_bindings(
        address: Address,
        controller: Address,
        modules: ModuleTable,
        bindings: impl IntoIterator<Item = (Role, Address)>,
    ) -> Self {
        let mut router = Self::new(address, controller, modules);

        let checkpoint = router.storage.checkpoint();
        for (role, handler) in bindings {
            router.registry.set(&mut router.storage, role, handler);
            debug!(role = %role, handler = %handler, "Initial binding");
        }
        router.storage.commit(checkpoint);

        router
    }

    /// Build a router from configuration.
    ///
    /// Binding keys must be role names; an unknown name is rejected.
    pub fn from_config(config: &RouterConfig, modules: ModuleTable) -> Result<Self, RouterError> {
        let bindings = config
            .bindings
            .iter()
            .map(|(name, handler)| Role::from_str(name).map(|role| (role, *handler)))
            .collect::<Result<Vec<_>, RouterError>>()?;

        Ok(Self::with_bindings(config.address, config.controller, modules, bindings))
    }

    /// Execute one external request.
    ///
    /// On success the output is returned and every write is kept. On failure
    /// every write made on the request's behalf is undone; the caller sees
    /// the failure through [`RouterError::revert_data`].
    pub fn execute(&mut self, request: &Request) -> Result<Bytes, RouterError> {
        let mut budget = Budget::new(request.budget);
        let checkpoint = self.storage.checkpoint();

        let result = {
            let mut frame = ExecutionFrame::new(request.caller, self.address, &mut self.storage, &mut budget);
            route_request(
                &self.registry,
                &self.dispatcher,
                &self.forwarder,
                &mut frame,
                &request.calldata,
            )
        };

        match &result {
            Ok(output) => {
                self.storage.commit(checkpoint);
                debug!(
                    request_id = %request.id,
                    caller = %request.caller,
                    used = budget.used(),
                    output_len = output.len(),
                    "Request succeeded"
                );
            }
            Err(err) => {
                self.storage.revert_to(checkpoint);
                if err.is_forwarded() {
                    debug!(request_id = %request.id, error = %err, "Request reverted by handler");
                } else {
                    warn!(request_id = %request.id, caller = %request.caller, error = %err, "Request failed");
                }
            }
        }

        result
    }

    /// Handler currently bound to `role`
    pub fn binding(&self, role: Role) -> Address {
        self.registry.get(&self.storage, role)
    }

    /// Current binding of every role
    pub fn bindings(&self) -> BTreeMap<Role, Address> {
        self.registry.bindings(&self.storage)
    }

    pub fn controller(&self) -> Address {
        self.registry.controller(&self.storage)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Router storage, shared with every handler it forwards to
    pub fn storage(&self) -> &SlotStorage {
        &self.storage
    }

    pub fn modules(&self) -> &ModuleTable {
        self.forwarder.modules()
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }
}

fn route_request(
    registry: &RoleRegistry,
    dispatcher: &Dispatcher,
    forwarder: &Forwarder,
    frame: &mut ExecutionFrame<'_>,
    calldata: &[u8],
) -> Result<Bytes, RouterError> {
    match dispatcher.resolve(calldata)? {
        Route::Forward { role, method } => {
            let handler = resolve_handler(registry, frame, role)?;
            debug!(role = %role, method = %method, handler = %handler, "Routing request");
            forwarder.forward(frame, role, handler, calldata)
        }
        Route::Wrapper(kind) => {
            let handler = resolve_handler(registry, frame, kind.role())?;
            wrappers::execute(forwarder, frame, handler, kind, calldata)
        }
        Route::Admin(op) => admin::execute(registry, frame, op, calldata),
    }
}

fn resolve_handler(
    registry: &RoleRegistry,
    frame: &mut ExecutionFrame<'_>,
    role: Role,
) -> Result<Address, RouterError> {
    frame.charge(SLOAD_COST)?;
    let handler = registry.get(frame.storage(), role);
    if handler.is_zero() {
        return Err(RouterError::UnroutableRequest { role, handler });
    }
    Ok(handler)
}
