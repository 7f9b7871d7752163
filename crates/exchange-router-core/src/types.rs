//! Common types for the router module
//!
//! Centralizes role definitions and routing constants.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RouterError;

/// Version tag baked into every registry label
pub const REGISTRY_VERSION: &str = "v1";

/// Label of the controlling principal's slot
pub const CONTROLLER_LABEL: &str = "exchange.router.controller.v1";

/// Minimum length of a discriminated (undeclared) request
pub const MIN_DISCRIMINATED_LEN: usize = 4;

/// Leading byte every discriminated request must carry
pub const FORMAT_MARKER: u8 = 0x00;

/// Offset of the role discriminator inside a discriminated request
pub const DISCRIMINATOR_OFFSET: usize = 2;

/// Number of roles
pub const ROLE_COUNT: usize = 7;

/// Fixed category of operation with exactly one bound handler.
///
/// The numeric value is both the discriminator (0-5) and the role id used
/// by `setBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Role {
    Swap = 0,
    PositionUpdate = 1,
    Position = 2,
    Admin = 3,
    SwapWithPermit = 4,
    Quote = 5,
    /// Catch-all for discriminated requests naming no other role
    Fallback = 6,
}

impl Role {
    /// Every role, in id order
    pub const ALL: [Role; ROLE_COUNT] = [
        Role::Swap,
        Role::PositionUpdate,
        Role::Position,
        Role::Admin,
        Role::SwapWithPermit,
        Role::Quote,
        Role::Fallback,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Role selected by a request discriminator; `None` means fallback
    pub fn from_discriminator(discriminator: u8) -> Option<Role> {
        match discriminator {
            0 => Some(Role::Swap),
            1 => Some(Role::PositionUpdate),
            2 => Some(Role::Position),
            3 => Some(Role::Admin),
            4 => Some(Role::SwapWithPermit),
            5 => Some(Role::Quote),
            _ => None,
        }
    }

    /// Kebab-case name used in configuration and logs
    pub fn name(self) -> &'static str {
        match self {
            Role::Swap => "swap",
            Role::PositionUpdate => "position-update",
            Role::Position => "position",
            Role::Admin => "admin",
            Role::SwapWithPermit => "swap-with-permit",
            Role::Quote => "quote",
            Role::Fallback => "fallback",
        }
    }

    /// Stable, versioned label the role's storage slot is derived from.
    ///
    /// Changing a label relocates the binding; never do it for a live role.
    pub fn label(self) -> String {
        format!("exchange.router.handler.{}.{}", self.name(), REGISTRY_VERSION)
    }
}

impl TryFrom<u8> for Role {
    type Error = RouterError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Role::ALL
            .get(id as usize)
            .copied()
            .ok_or(RouterError::UnknownRole(id))
    }
}

impl FromStr for Role {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.name() == s)
            .ok_or_else(|| RouterError::InvalidConfig(format!("unknown role name: {s}")))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a request reached its handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingMethod {
    /// Selector matched the declared operation table
    Declared,
    /// Discriminator byte named a role
    Discriminator(u8),
    /// Discriminator named no role; sent to the catch-all handler
    Fallback,
}

impl std::fmt::Display for RoutingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingMethod::Declared => write!(f, "declared"),
            RoutingMethod::Discriminator(d) => write!(f, "discriminator({d})"),
            RoutingMethod::Fallback => write!(f, "fallback"),
        }
    }
}
