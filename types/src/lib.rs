//! Exchange Types - primitives shared by every exchange crate
//!
//! The router, its handler modules and the gateway all speak the same small
//! vocabulary: 20-byte addresses, 32-byte storage words, 256-bit integers and
//! raw byte payloads. They are re-exported from `alloy-primitives` so that the
//! whole workspace agrees on one set of types.
//!
//! The [`abi`] module holds the externally visible call surface, declared once
//! with `sol!` and used both to build the dispatch table and by callers that
//! encode requests.

pub mod abi;
pub mod request;

pub use alloy_primitives::{keccak256, Address, Bytes, B256, I256, U256};

pub use request::{Request, RequestId, DEFAULT_REQUEST_BUDGET};

/// Storage key inside the router's durable state
pub type Slot = B256;

/// Storage value inside the router's durable state
pub type Word = B256;

/// Four-byte operation identifier at the head of a request
pub type Selector = [u8; 4];
