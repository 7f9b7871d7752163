//! Role registry - role -> handler bindings in namespaced storage slots
//!
//! Each binding lives at a slot derived from the role's stable label:
//!
//! ```text
//! slot(label) = keccak256(label) - 1
//! ```
//!
//! Subtracting one removes the known preimage, so no ordinary
//! `keccak256(key)` slot computation used by a handler can land on a
//! binding. The slots are computed once when the registry is built and
//! never change afterwards.

use std::collections::BTreeMap;

use exchange_core::SlotStorage;
use exchange_types::{keccak256, Address, Slot, B256, U256};

use crate::types::{Role, CONTROLLER_LABEL, ROLE_COUNT};

/// Derive a namespaced slot from a stable label
pub fn derive_slot(label: &str) -> Slot {
    let hash = U256::from_be_bytes(keccak256(label.as_bytes()).0);
    B256::from(hash.wrapping_sub(U256::from(1u8)).to_be_bytes::<32>())
}

/// Slot layout of the role registry
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    role_slots: [Slot; ROLE_COUNT],
    controller_slot: Slot,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self {
            role_slots: Role::ALL.map(|role| derive_slot(&role.label())),
            controller_slot: derive_slot(CONTROLLER_LABEL),
        }
    }

    /// Slot holding `role`'s binding
    pub fn slot(&self, role: Role) -> Slot {
        self.role_slots[role.id() as usize]
    }

    /// Slot holding the controlling principal
    pub fn controller_slot(&self) -> Slot {
        self.controller_slot
    }

    /// Handler bound to `role`; the null address if never set
    pub fn get(&self, storage: &SlotStorage, role: Role) -> Address {
        Address::from_word(storage.load(&self.slot(role)))
    }

    /// Bind `role` to `handler`. Any address is accepted, null included.
    pub fn set(&self, storage: &mut SlotStorage, role: Role, handler: Address) {
        storage.store(self.slot(role), handler.into_word());
    }

    pub fn controller(&self, storage: &SlotStorage) -> Address {
        Address::from_word(storage.load(&self.controller_slot))
    }

    pub fn set_controller(&self, storage: &mut SlotStorage, controller: Address) {
        storage.store(self.controller_slot, controller.into_word());
    }

    /// Current binding of every role
    pub fn bindings(&self, storage: &SlotStorage) -> BTreeMap<Role, Address> {
        Role::ALL
            .into_iter()
            .map(|role| (role, self.get(storage, role)))
            .collect()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
