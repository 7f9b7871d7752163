//! Exchange Router - Request Routing Module
//!
//! Routes external requests to the handler bound to their role.
//!
//! # Architecture
//!
//! ```text
//! Request
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │      Dispatcher         │  Declared table, then discriminator
//! │   (Which role?)         │
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │     RoleRegistry        │  Role -> handler, in namespaced slots
//! │   (Which handler?)      │
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │       Forwarder         │  Runs the handler as the caller,
//! │   (Run it in place)     │  on the router's storage
//! └─────────────────────────┘
//! ```
//!
//! # Request Kinds
//!
//! - **Declared operations**: forwarded verbatim to the role's handler
//! - **Swap wrappers**: `swapIn`, `swapOut` and their permit variants, with
//!   the caller's minimum output enforced after the handler returns
//! - **Administration**: `setController` and `setBindings`, gated to the
//!   controlling principal
//! - **Discriminated requests**: `0x00 ?? role ??...`, unknown roles go to
//!   the fallback handler
//!
//! # Example
//!
//! ```rust,ignore
//! use exchange_router_core::{ExchangeRouter, Role};
//!
//! let mut router = ExchangeRouter::with_bindings(
//!     router_address,
//!     controller,
//!     modules,
//!     [(Role::Swap, swap_handler)],
//! );
//!
//! let output = router.execute(&Request::new(trader, calldata))?;
//! ```

// Core modules
mod error;
mod types;
mod registry;

// Request handling
pub mod admin;
pub mod dispatch;
mod forwarder;
pub mod wrappers;

// Router
mod router;

#[cfg(test)]
mod tests;

// Re-exports: Error types
pub use error::RouterError;

// Re-exports: Core types
pub use types::{
    Role, RoutingMethod, CONTROLLER_LABEL, DISCRIMINATOR_OFFSET, FORMAT_MARKER,
    MIN_DISCRIMINATED_LEN, REGISTRY_VERSION, ROLE_COUNT,
};

// Re-exports: Registry and forwarding
pub use registry::{derive_slot, RoleRegistry};
pub use forwarder::Forwarder;

// Re-exports: Dispatch
pub use admin::AdminOp;
pub use dispatch::{Dispatcher, Route};
pub use wrappers::{SwapDelta, WrapperCall, WrapperKind, NO_PRICE_LIMIT};

// Re-exports: Router
pub use router::ExchangeRouter;
