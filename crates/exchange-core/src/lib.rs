//! Exchange Core - execution substrate for the router and its handlers
//!
//! This crate provides the pieces every request executes against:
//!
//! - [`SlotStorage`]: the router's durable key/value state, journaled so a
//!   whole request can be undone as a unit
//! - [`Budget`]: execution metering shared by a request and all its forwards
//! - [`Handler`] / [`CallContext`]: the contract handler modules implement,
//!   and the metered view of the caller's identity and state they execute with
//! - [`ExecutionFrame`]: the router's side of a request in flight
//! - [`ModuleTable`]: the address -> handler object directory
//! - [`GatewayConfig`]: node and router configuration

pub mod budget;
pub mod config;
pub mod handler;
pub mod modules;
pub mod storage;

pub use budget::{Budget, OutOfBudget};
pub use config::{GatewayConfig, RouterConfig};
pub use handler::{CallContext, ExecutionFrame, Handler, HandlerFailure, HandlerResult};
pub use modules::ModuleTable;
pub use storage::{Checkpoint, SlotStorage};
