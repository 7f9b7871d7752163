//! Discriminator decoder for undeclared requests
//!
//! Layout of a discriminated request:
//!
//! ```text
//! byte 0      format marker, must be 0x00
//! byte 1      unused by the router
//! byte 2      role discriminator
//! byte 3..    opaque, forwarded untouched
//! ```

use tracing::warn;

use crate::error::RouterError;
use crate::types::{Role, RoutingMethod, DISCRIMINATOR_OFFSET, FORMAT_MARKER, MIN_DISCRIMINATED_LEN};

/// Picks a role from the discriminator byte
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscriminatorDecoder;

impl DiscriminatorDecoder {
    /// Role for an undeclared request; unknown discriminators go to fallback
    pub fn decode(&self, calldata: &[u8]) -> Result<(Role, RoutingMethod), RouterError> {
        if calldata.len() < MIN_DISCRIMINATED_LEN {
            warn!(len = calldata.len(), "Rejecting short undeclared request");
            return Err(RouterError::MalformedRequest("request shorter than 4 bytes"));
        }
        if calldata[0] != FORMAT_MARKER {
            warn!(marker = calldata[0], "Rejecting undeclared request without format marker");
            return Err(RouterError::MalformedRequest("missing format marker"));
        }

        let discriminator = calldata[DISCRIMINATOR_OFFSET];
        Ok(match Role::from_discriminator(discriminator) {
            Some(role) => (role, RoutingMethod::Discriminator(discriminator)),
            None => (Role::Fallback, RoutingMethod::Fallback),
        })
    }
}
