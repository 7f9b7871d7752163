//! Module table - directory of installed handler modules

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use exchange_types::Address;

use crate::handler::Handler;

/// Maps handler addresses to the handler objects living there.
///
/// Cloning shares the same table. Installing a module at an address is
/// deployment plumbing; whether any role points at it is the registry's
/// business.
#[derive(Clone, Default)]
pub struct ModuleTable {
    modules: Arc<RwLock<HashMap<Address, Arc<dyn Handler>>>>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the module at `address`
    pub fn install(&self, address: Address, handler: Arc<dyn Handler>) {
        info!(address = %address, module = handler.name(), "Installing handler module");
        self.modules.write().insert(address, handler);
    }

    /// Remove the module at `address`, returning it if present
    pub fn remove(&self, address: &Address) -> Option<Arc<dyn Handler>> {
        let removed = self.modules.write().remove(address);
        if removed.is_some() {
            info!(address = %address, "Removed handler module");
        }
        removed
    }

    /// Look up the module at `address`. The null address never has one.
    pub fn get(&self, address: &Address) -> Option<Arc<dyn Handler>> {
        if address.is_zero() {
            return None;
        }
        self.modules.read().get(address).cloned()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.get(address).is_some()
    }

    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

impl std::fmt::Debug for ModuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modules = self.modules.read();
        let mut list = f.debug_map();
        for (address, handler) in modules.iter() {
            list.entry(address, &handler.name());
        }
        list.finish()
    }
}
