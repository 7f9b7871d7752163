//! Postcondition-checked swap wrappers
//!
//! A wrapper takes a simplified swap (one token, an amount, a minimum
//! output), expands it into a full `swap` or `swapWithPermit` sub-request,
//! forwards that to the swap handler and then checks the decoded result
//! against the caller's bound. The sub-request carries no price limit: the
//! economic bound is enforced here, not by the handler.
//!
//! A violated bound fails the whole request even though the handler already
//! succeeded; the router's request-level revert undoes the handler's writes.

use alloy_sol_types::SolCall;
use exchange_core::ExecutionFrame;
use exchange_types::abi::{self, PermitParams, SwapParams};
use exchange_types::{Address, Bytes, I256, U256};
use tracing::debug;

use crate::error::RouterError;
use crate::forwarder::Forwarder;
use crate::types::Role;

/// Price limit meaning "unconstrained"
pub const NO_PRICE_LIMIT: U256 = U256::MAX;

/// The four wrapper operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperKind {
    SwapIn,
    SwapOut,
    SwapInWithPermit,
    SwapOutWithPermit,
}

impl WrapperKind {
    /// Role whose handler executes the sub-request
    pub fn role(self) -> Role {
        match self {
            WrapperKind::SwapIn | WrapperKind::SwapOut => Role::Swap,
            WrapperKind::SwapInWithPermit | WrapperKind::SwapOutWithPermit => Role::SwapWithPermit,
        }
    }

    /// Whether the inner swap fixes the input leg
    pub fn exact_input(self) -> bool {
        matches!(self, WrapperKind::SwapIn | WrapperKind::SwapInWithPermit)
    }

    pub fn signature(self) -> &'static str {
        match self {
            WrapperKind::SwapIn => abi::swapInCall::SIGNATURE,
            WrapperKind::SwapOut => abi::swapOutCall::SIGNATURE,
            WrapperKind::SwapInWithPermit => abi::swapInWithPermitCall::SIGNATURE,
            WrapperKind::SwapOutWithPermit => abi::swapOutWithPermitCall::SIGNATURE,
        }
    }
}

/// Realized amounts reported by the swap handler.
///
/// `amount_out` is negative when tokens leave the pool toward the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapDelta {
    pub amount_in: I256,
    pub amount_out: I256,
}

impl SwapDelta {
    /// ABI encoding `(int256, int256)` returned to the wrapper's caller
    pub fn encode(&self) -> Bytes {
        Bytes::from(abi::swapCall::abi_encode_returns(&(self.amount_in, self.amount_out)))
    }
}

/// A decoded wrapper request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperCall {
    pub kind: WrapperKind,
    pub token: Address,
    pub amount: I256,
    pub min_amount_out: I256,
    pub permit: Option<PermitParams>,
}

impl WrapperCall {
    /// Decode the wrapper's arguments from the raw request
    pub fn decode(kind: WrapperKind, calldata: &[u8]) -> Result<Self, RouterError> {
        let invalid = |err: alloy_sol_types::Error| RouterError::InvalidArguments {
            operation: kind.signature(),
            reason: err.to_string(),
        };

        let call = match kind {
            WrapperKind::SwapIn => {
                let c = abi::swapInCall::abi_decode(calldata, true).map_err(invalid)?;
                Self::plain(kind, c.token, c.amountIn, c.minAmountOut)
            }
            WrapperKind::SwapOut => {
                let c = abi::swapOutCall::abi_decode(calldata, true).map_err(invalid)?;
                Self::plain(kind, c.token, c.amountOut, c.minAmountOut)
            }
            WrapperKind::SwapInWithPermit => {
                let c = abi::swapInWithPermitCall::abi_decode(calldata, true).map_err(invalid)?;
                Self {
                    kind,
                    token: c.token,
                    amount: c.amountIn,
                    min_amount_out: c.minAmountOut,
                    permit: Some(PermitParams {
                        nonce: c.nonce,
                        deadline: c.deadline,
                        amount: c.permitAmount,
                        signature: c.signature,
                    }),
                }
            }
            WrapperKind::SwapOutWithPermit => {
                let c = abi::swapOutWithPermitCall::abi_decode(calldata, true).map_err(invalid)?;
                Self {
                    kind,
                    token: c.token,
                    amount: c.amountOut,
                    min_amount_out: c.minAmountOut,
                    permit: Some(PermitParams {
                        nonce: c.nonce,
                        deadline: c.deadline,
                        amount: c.permitAmount,
                        signature: c.signature,
                    }),
                }
            }
        };
        Ok(call)
    }

    fn plain(kind: WrapperKind, token: Address, amount: I256, min_amount_out: I256) -> Self {
        Self { kind, token, amount, min_amount_out, permit: None }
    }

    /// Normalized swap parameters for the sub-request
    pub fn swap_params(&self) -> SwapParams {
        SwapParams {
            token: self.token,
            exactInput: self.kind.exact_input(),
            amountSpecified: self.amount,
            priceLimit: NO_PRICE_LIMIT,
        }
    }

    /// Encoded sub-request for the swap or swap-with-permit handler
    pub fn sub_request(&self) -> Vec<u8> {
        let params = self.swap_params();
        match &self.permit {
            None => abi::swapCall { params, hookData: Bytes::new() }.abi_encode(),
            Some(permit) => abi::swapWithPermitCall { params, permit: permit.clone() }.abi_encode(),
        }
    }

    /// Decode the handler's output as `(amountIn, amountOut)`
    pub fn decode_result(&self, output: &[u8]) -> Result<SwapDelta, RouterError> {
        let undecodable = |err: alloy_sol_types::Error| RouterError::UndecodableResult(err.to_string());

        let delta = match self.permit {
            None => {
                let r = abi::swapCall::abi_decode_returns(output, true).map_err(undecodable)?;
                SwapDelta { amount_in: r.amountIn, amount_out: r.amountOut }
            }
            Some(_) => {
                let r = abi::swapWithPermitCall::abi_decode_returns(output, true).map_err(undecodable)?;
                SwapDelta { amount_in: r.amountIn, amount_out: r.amountOut }
            }
        };
        Ok(delta)
    }

    /// Check the realized output against the caller's minimum.
    ///
    /// Swap-in reports output as a negative amount, so its magnitude is the
    /// negation; swap-out reports it as is. Both compare the output leg.
    pub fn enforce(&self, delta: &SwapDelta) -> Result<I256, RouterError> {
        let realized = if self.kind.exact_input() {
            delta
                .amount_out
                .checked_neg()
                .ok_or(RouterError::Arithmetic("output amount cannot be negated"))?
        } else {
            delta.amount_out
        };

        if realized < self.min_amount_out {
            debug!(
                wrapper = self.kind.signature(),
                realized = %realized,
                bound = %self.min_amount_out,
                "Wrapper postcondition violated"
            );
            return Err(RouterError::PostconditionViolation {
                realized,
                bound: self.min_amount_out,
            });
        }
        Ok(realized)
    }
}

/// Run a wrapper end to end against the handler at `handler`
pub fn execute(
    forwarder: &Forwarder,
    frame: &mut ExecutionFrame<'_>,
    handler: Address,
    kind: WrapperKind,
    calldata: &[u8],
) -> Result<Bytes, RouterError> {
    let call = WrapperCall::decode(kind, calldata)?;
    let output = forwarder.forward(frame, kind.role(), handler, &call.sub_request())?;
    let delta = call.decode_result(&output)?;
    call.enforce(&delta)?;
    Ok(delta.encode())
}
