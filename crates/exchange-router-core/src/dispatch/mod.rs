//! Request dispatch
//!
//! Two routing modes over one closed set of roles:
//!
//! ```text
//! Request arrives
//!        │
//!        ▼
//! Selector in declared table? ──Yes──► forward / wrapper / admin
//!        │
//!        No
//!        ▼
//! len >= 4 and calldata[0] == 0x00? ──No──► MalformedRequest
//!        │
//!        Yes
//!        ▼
//! calldata[2] in 0..=5? ──Yes──► role for that discriminator
//!        │
//!        No
//!        ▼
//!     Fallback role
//! ```
//!
//! The declared table always wins, so a declared selector that happens to
//! start with the format marker is never reinterpreted.

mod declared;
mod discriminator;

pub use declared::{DeclaredOperation, DeclaredTable, Entry};
pub use discriminator::DiscriminatorDecoder;

use tracing::trace;

use crate::admin::AdminOp;
use crate::error::RouterError;
use crate::types::{Role, RoutingMethod};
use crate::wrappers::WrapperKind;

/// Where a request goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Raw pass-through to the role's handler
    Forward { role: Role, method: RoutingMethod },
    /// Postcondition-checked swap wrapper
    Wrapper(WrapperKind),
    /// Registry administration handled by the router itself
    Admin(AdminOp),
}

/// Declared table first, discriminator decoder second
#[derive(Debug, Clone)]
pub struct Dispatcher {
    declared: DeclaredTable,
    decoder: DiscriminatorDecoder,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            declared: DeclaredTable::new(),
            decoder: DiscriminatorDecoder,
        }
    }

    pub fn declared(&self) -> &DeclaredTable {
        &self.declared
    }

    /// Decide where `calldata` goes
    pub fn resolve(&self, calldata: &[u8]) -> Result<Route, RouterError> {
        if let Some(operation) = self.declared.lookup(calldata) {
            trace!(operation = operation.signature, "Declared operation");
            return Ok(match operation.entry {
                Entry::Forward(role) => Route::Forward {
                    role,
                    method: RoutingMethod::Declared,
                },
                Entry::Wrapper(kind) => Route::Wrapper(kind),
                Entry::Admin(op) => Route::Admin(op),
            });
        }

        let (role, method) = self.decoder.decode(calldata)?;
        trace!(role = %role, method = %method, "Discriminated request");
        Ok(Route::Forward { role, method })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
