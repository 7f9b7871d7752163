//! Router-level tests: dispatch, forwarding, wrappers and administration
//! exercised through `ExchangeRouter::execute`.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_sol_types::{SolCall, SolError};
use exchange_core::{CallContext, Handler, HandlerFailure, HandlerResult, ModuleTable, RouterConfig};
use exchange_types::abi::{self, RoleBinding};
use exchange_types::{Address, Bytes, Request, B256, I256, U256};

use crate::{ExchangeRouter, Role, RouterError, SwapDelta};

const TRADER: Address = Address::repeat_byte(0xaa);
const CONTROLLER: Address = Address::repeat_byte(0xc0);
const ROUTER: Address = Address::repeat_byte(0x70);

/// Records the caller under its tag, then echoes `[tag, input..]` or reverts
struct Tagged {
    tag: u8,
    revert: Option<Bytes>,
}

impl Handler for Tagged {
    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> HandlerResult {
        ctx.sstore(B256::repeat_byte(self.tag), ctx.caller().into_word())?;
        if let Some(payload) = &self.revert {
            return Err(HandlerFailure::Revert(payload.clone()));
        }
        let mut output = vec![self.tag];
        output.extend_from_slice(input);
        Ok(Bytes::from(output))
    }

    fn name(&self) -> &str {
        "tagged"
    }
}

/// Swap handler reporting a fixed delta and remembering what it was asked
struct FixedSwap {
    delta: SwapDelta,
}

const LAST_AMOUNT_SLOT: B256 = B256::repeat_byte(0x5a);
const LAST_DIRECTION_SLOT: B256 = B256::repeat_byte(0x5b);

impl Handler for FixedSwap {
    fn call(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> HandlerResult {
        let params = match abi::swapCall::abi_decode(input, true) {
            Ok(call) => call.params,
            Err(_) => match abi::swapWithPermitCall::abi_decode(input, true) {
                Ok(call) => call.params,
                Err(_) => return Err(HandlerFailure::Revert(Bytes::from_static(b"bad swap"))),
            },
        };
        ctx.sstore(LAST_AMOUNT_SLOT, B256::from(params.amountSpecified.into_raw().to_be_bytes::<32>()))?;
        ctx.sstore(LAST_DIRECTION_SLOT, B256::with_last_byte(params.exactInput as u8 + 1))?;
        Ok(self.delta.encode())
    }

    fn name(&self) -> &str {
        "fixed-swap"
    }
}

/// Returns bytes that are not a swap result
struct Truncated;

impl Handler for Truncated {
    fn call(&self, _ctx: &mut CallContext<'_>, _input: &[u8]) -> HandlerResult {
        Ok(Bytes::from_static(&[0x01, 0x02, 0x03]))
    }

    fn name(&self) -> &str {
        "truncated"
    }
}

/// Overwrites the registry's controller slot with its own address, then
/// reports a fixed delta
struct Usurper {
    controller_slot: B256,
    delta: SwapDelta,
}

impl Handler for Usurper {
    fn call(&self, ctx: &mut CallContext<'_>, _input: &[u8]) -> HandlerResult {
        let own = ctx.address();
        ctx.sstore(self.controller_slot, own.into_word())?;
        Ok(self.delta.encode())
    }

    fn name(&self) -> &str {
        "usurper"
    }
}

/// Writes slots until the budget runs out
struct Spender;

impl Handler for Spender {
    fn call(&self, ctx: &mut CallContext<'_>, _input: &[u8]) -> HandlerResult {
        for i in 0..=u8::MAX {
            ctx.sstore(B256::with_last_byte(i), B256::repeat_byte(0x01))?;
        }
        Ok(Bytes::new())
    }

    fn name(&self) -> &str {
        "spender"
    }
}

fn int(v: i64) -> I256 {
    I256::try_from(v).unwrap()
}

fn handler_address(tag: u8) -> Address {
    Address::repeat_byte(tag)
}

/// One tagged handler per role, tag = role id + 1
fn create_test_router() -> ExchangeRouter {
    let modules = ModuleTable::new();
    let bindings: Vec<_> = Role::ALL
        .into_iter()
        .map(|role| {
            let tag = role.id() + 1;
            modules.install(handler_address(tag), Arc::new(Tagged { tag, revert: None }));
            (role, handler_address(tag))
        })
        .collect();
    ExchangeRouter::with_bindings(ROUTER, CONTROLLER, modules, bindings)
}

fn create_swap_router(delta: SwapDelta) -> ExchangeRouter {
    let modules = ModuleTable::new();
    let swap = handler_address(0x51);
    modules.install(swap, Arc::new(FixedSwap { delta }));
    ExchangeRouter::with_bindings(
        ROUTER,
        CONTROLLER,
        modules,
        [(Role::Swap, swap), (Role::SwapWithPermit, swap)],
    )
}

fn request(calldata: Vec<u8>) -> Request {
    Request::new(TRADER, calldata)
}

fn set_bindings_request(caller: Address, bindings: Vec<RoleBinding>) -> Request {
    Request::new(caller, abi::setBindingsCall { bindings }.abi_encode())
}

// ============================================
// Declared forwarding
// ============================================

#[test]
fn test_declared_operation_output_is_mirrored() {
    let mut router = create_test_router();
    let calldata = abi::burnPositionCall { positionId: U256::from(42u8) }.abi_encode();

    let output = router.execute(&request(calldata.clone())).unwrap();

    let tag = Role::Position.id() + 1;
    assert_eq!(output[0], tag);
    assert_eq!(&output[1..], &calldata[..]);
}

#[test]
fn test_handler_runs_as_caller_on_router_state() {
    let mut router = create_test_router();
    let calldata = abi::enablePoolCall { token: Address::repeat_byte(0x33) }.abi_encode();

    router.execute(&request(calldata)).unwrap();

    let tag = Role::Admin.id() + 1;
    assert_eq!(router.storage().load(&B256::repeat_byte(tag)), TRADER.into_word());
}

#[test]
fn test_declared_failure_payload_is_mirrored() {
    let modules = ModuleTable::new();
    let payload = Bytes::from(vec![0x08, 0xc3, 0x79, 0xa0, 0x00, 0x01]);
    modules.install(
        handler_address(0x01),
        Arc::new(Tagged { tag: 0x01, revert: Some(payload.clone()) }),
    );
    let mut router =
        ExchangeRouter::with_bindings(ROUTER, CONTROLLER, modules, [(Role::Quote, handler_address(0x01))]);
    let before = router.storage().clone();

    let calldata = abi::quoteCall {
        params: abi::SwapParams {
            token: Address::ZERO,
            exactInput: true,
            amountSpecified: int(1),
            priceLimit: U256::ZERO,
        },
    }
    .abi_encode();
    let err = router.execute(&request(calldata)).unwrap_err();

    assert_eq!(err, RouterError::ForwardedFailure(payload.clone()));
    assert_eq!(err.revert_data(), payload);
    assert_eq!(router.storage().load(&B256::repeat_byte(0x01)), B256::ZERO);
    assert_eq!(router.storage().len(), before.len());
}

#[test]
fn test_declared_selector_with_unbound_role_is_unroutable() {
    let mut router = ExchangeRouter::new(ROUTER, CONTROLLER, ModuleTable::new());
    let calldata = abi::mintPositionCall {
        token: Address::ZERO,
        lowerPrice: U256::from(1u8),
        upperPrice: U256::from(2u8),
        liquidity: U256::from(3u8),
        recipient: TRADER,
    }
    .abi_encode();

    assert_eq!(
        router.execute(&request(calldata)).unwrap_err(),
        RouterError::UnroutableRequest { role: Role::Position, handler: Address::ZERO }
    );
}

// ============================================
// Discriminated requests
// ============================================

#[test]
fn test_each_discriminator_reaches_its_role() {
    let mut router = create_test_router();
    for discriminator in 0u8..=5 {
        let calldata = vec![0x00, 0xee, discriminator, 0x00, 0x99];
        let output = router.execute(&request(calldata.clone())).unwrap();
        assert_eq!(output[0], discriminator + 1, "discriminator {discriminator}");
        assert_eq!(&output[1..], &calldata[..]);
    }
}

#[test]
fn test_unknown_discriminator_goes_to_fallback() {
    let mut router = create_test_router();
    let fallback_tag = Role::Fallback.id() + 1;

    for discriminator in [6u8, 0x42, 0xff] {
        let output = router.execute(&request(vec![0x00, 0x00, discriminator, 0x00])).unwrap();
        assert_eq!(output[0], fallback_tag);
    }
}

#[test]
fn test_malformed_requests_fail_without_writes() {
    let mut router = create_test_router();
    let before = router.storage().len();

    for calldata in [vec![], vec![0x00, 0x00, 0x00], vec![0x01, 0x00, 0x00, 0x00]] {
        let err = router.execute(&request(calldata)).unwrap_err();
        assert!(matches!(err, RouterError::MalformedRequest(_)));
        assert_eq!(err.revert_data()[..4], abi::MalformedRequest::SELECTOR);
    }
    assert_eq!(router.storage().len(), before);
}

#[test]
fn test_null_fallback_is_unroutable() {
    let mut router = create_test_router();
    router
        .execute(&set_bindings_request(
            CONTROLLER,
            vec![RoleBinding { role: Role::Fallback.id(), handler: Address::ZERO }],
        ))
        .unwrap();

    let err = router.execute(&request(vec![0x00, 0x00, 0x09, 0x00])).unwrap_err();
    assert_eq!(
        err,
        RouterError::UnroutableRequest { role: Role::Fallback, handler: Address::ZERO }
    );
}

#[test]
fn test_bound_handler_without_module_is_unroutable() {
    let stray = Address::repeat_byte(0x3f);
    let mut router =
        ExchangeRouter::with_bindings(ROUTER, CONTROLLER, ModuleTable::new(), [(Role::Swap, stray)]);

    let err = router.execute(&request(vec![0x00, 0x00, 0x00, 0x00])).unwrap_err();
    assert_eq!(err, RouterError::UnroutableRequest { role: Role::Swap, handler: stray });
}

// ============================================
// Swap wrappers
// ============================================

fn swap_in(min_out: i64) -> Vec<u8> {
    abi::swapInCall {
        token: Address::repeat_byte(0x11),
        amountIn: int(100),
        minAmountOut: int(min_out),
    }
    .abi_encode()
}

fn swap_out(min_out: i64) -> Vec<u8> {
    abi::swapOutCall {
        token: Address::repeat_byte(0x11),
        amountOut: int(100),
        minAmountOut: int(min_out),
    }
    .abi_encode()
}

#[test]
fn test_swap_in_within_bound_returns_handler_amounts() {
    let mut router = create_swap_router(SwapDelta { amount_in: int(100), amount_out: int(-95) });

    let output = router.execute(&request(swap_in(90))).unwrap();
    let decoded = abi::swapInCall::abi_decode_returns(&output, true).unwrap();

    assert_eq!(decoded._0, int(100));
    assert_eq!(decoded._1, int(-95));
    // exact-input, price limit dropped by the wrapper
    assert_eq!(router.storage().load(&LAST_DIRECTION_SLOT), B256::with_last_byte(2));
}

#[test]
fn test_swap_in_violation_undoes_handler_writes() {
    let mut router = create_swap_router(SwapDelta { amount_in: int(100), amount_out: int(-95) });

    let err = router.execute(&request(swap_in(96))).unwrap_err();
    assert_eq!(err, RouterError::PostconditionViolation { realized: int(95), bound: int(96) });

    let decoded = abi::PostconditionViolated::abi_decode(&err.revert_data(), true).unwrap();
    assert_eq!(decoded.realized, int(95));
    assert_eq!(decoded.bound, int(96));

    assert_eq!(router.storage().load(&LAST_AMOUNT_SLOT), B256::ZERO);
    assert_eq!(router.storage().load(&LAST_DIRECTION_SLOT), B256::ZERO);
}

#[test]
fn test_swap_out_bound_is_inclusive() {
    let mut router = create_swap_router(SwapDelta { amount_in: int(110), amount_out: int(100) });

    assert!(router.execute(&request(swap_out(100))).is_ok());
    assert_eq!(router.storage().load(&LAST_DIRECTION_SLOT), B256::with_last_byte(1));

    let err = router.execute(&request(swap_out(101))).unwrap_err();
    assert!(matches!(err, RouterError::PostconditionViolation { .. }));
}

#[test]
fn test_swap_with_permit_wrapper_uses_permit_role() {
    let modules = ModuleTable::new();
    let permit_handler = handler_address(0x52);
    modules.install(
        permit_handler,
        Arc::new(FixedSwap { delta: SwapDelta { amount_in: int(7), amount_out: int(-7) } }),
    );
    let mut router = ExchangeRouter::with_bindings(
        ROUTER,
        CONTROLLER,
        modules,
        [(Role::SwapWithPermit, permit_handler)],
    );

    let calldata = abi::swapInWithPermitCall {
        token: Address::repeat_byte(0x22),
        amountIn: int(7),
        minAmountOut: int(7),
        nonce: U256::from(1u8),
        deadline: U256::from(1_700_000_000u64),
        permitAmount: U256::from(7u8),
        signature: Bytes::from(vec![0x1c; 65]),
    }
    .abi_encode();
    assert!(router.execute(&request(calldata)).is_ok());

    // The plain variant needs the swap role, which is unbound here
    let err = router.execute(&request(swap_in(0))).unwrap_err();
    assert_eq!(err, RouterError::UnroutableRequest { role: Role::Swap, handler: Address::ZERO });
}

#[test]
fn test_swap_out_with_permit_routes_exact_out_to_permit_role() {
    let mut router = create_swap_router(SwapDelta { amount_in: int(260), amount_out: int(250) });
    let calldata = |min_out: i64| {
        abi::swapOutWithPermitCall {
            token: Address::repeat_byte(0x22),
            amountOut: int(250),
            minAmountOut: int(min_out),
            nonce: U256::from(2u8),
            deadline: U256::from(1_700_000_000u64),
            permitAmount: U256::from(260u64),
            signature: Bytes::from(vec![0x1b; 65]),
        }
        .abi_encode()
    };

    let output = router.execute(&request(calldata(250))).unwrap();
    let decoded = abi::swapOutWithPermitCall::abi_decode_returns(&output, true).unwrap();
    assert_eq!(decoded._0, int(260));
    assert_eq!(decoded._1, int(250));
    assert_eq!(router.storage().load(&LAST_AMOUNT_SLOT), B256::from(int(250).into_raw().to_be_bytes::<32>()));
    // exact-output
    assert_eq!(router.storage().load(&LAST_DIRECTION_SLOT), B256::with_last_byte(1));

    let err = router.execute(&request(calldata(251))).unwrap_err();
    assert_eq!(err, RouterError::PostconditionViolation { realized: int(250), bound: int(251) });
}

#[test]
fn test_unrepresentable_output_magnitude_rolls_back() {
    let mut router = create_swap_router(SwapDelta { amount_in: int(1), amount_out: I256::MIN });
    let before = router.storage().len();

    let err = router.execute(&request(swap_in(0))).unwrap_err();

    assert!(matches!(err, RouterError::Arithmetic(_)));
    assert_eq!(err.revert_data()[..4], abi::ArithmeticFailure::SELECTOR);
    assert_eq!(err.revert_data().len(), 4);
    assert_eq!(router.storage().load(&LAST_AMOUNT_SLOT), B256::ZERO);
    assert_eq!(router.storage().load(&LAST_DIRECTION_SLOT), B256::ZERO);
    assert_eq!(router.storage().len(), before);
}

#[test]
fn test_handler_registry_writes_are_undone_with_the_request() {
    let modules = ModuleTable::new();
    let usurper = handler_address(0x55);
    let controller_slot = crate::RoleRegistry::new().controller_slot();
    modules.install(
        usurper,
        Arc::new(Usurper { controller_slot, delta: SwapDelta { amount_in: int(100), amount_out: int(-1) } }),
    );
    let mut router = ExchangeRouter::with_bindings(ROUTER, CONTROLLER, modules, [(Role::Swap, usurper)]);
    let before = router.bindings();

    let err = router.execute(&request(swap_in(50))).unwrap_err();
    assert!(matches!(err, RouterError::PostconditionViolation { .. }));
    assert_eq!(router.controller(), CONTROLLER);
    assert_eq!(router.bindings(), before);

    // Enough for routing and forwarding but not for the handler's write
    let err = router.execute(&request(swap_in(0)).with_budget(10_000)).unwrap_err();
    assert!(matches!(err, RouterError::BudgetExhausted(_)));
    assert_eq!(router.controller(), CONTROLLER);
    assert_eq!(router.storage().pending_writes(), 0);
}

#[test]
fn test_wrapper_rejects_undecodable_handler_output() {
    let modules = ModuleTable::new();
    modules.install(handler_address(0x53), Arc::new(Truncated));
    let mut router =
        ExchangeRouter::with_bindings(ROUTER, CONTROLLER, modules, [(Role::Swap, handler_address(0x53))]);

    let err = router.execute(&request(swap_in(0))).unwrap_err();
    assert!(matches!(err, RouterError::UndecodableResult(_)));
    assert_eq!(err.revert_data()[..4], abi::UndecodableResult::SELECTOR);
}

#[test]
fn test_wrapper_invalid_arguments_have_empty_payload() {
    let mut router = create_swap_router(SwapDelta { amount_in: int(1), amount_out: int(-1) });
    let mut calldata = abi::swapOutCall::SELECTOR.to_vec();
    calldata.extend_from_slice(&[0xff; 7]);

    let err = router.execute(&request(calldata)).unwrap_err();
    assert!(matches!(err, RouterError::InvalidArguments { .. }));
    assert!(err.revert_data().is_empty());
}

// ============================================
// Administration
// ============================================

#[test]
fn test_controller_rebinds_roles() {
    let mut router = create_test_router();
    let next = Address::repeat_byte(0x9a);

    let output = router
        .execute(&set_bindings_request(
            CONTROLLER,
            vec![
                RoleBinding { role: Role::Quote.id(), handler: next },
                RoleBinding { role: Role::Swap.id(), handler: next },
            ],
        ))
        .unwrap();

    assert!(output.is_empty());
    assert_eq!(router.binding(Role::Quote), next);
    assert_eq!(router.binding(Role::Swap), next);
    assert_eq!(router.binding(Role::Position), handler_address(Role::Position.id() + 1));
}

#[test]
fn test_non_controller_cannot_administer() {
    let mut router = create_test_router();
    let before: BTreeMap<Role, Address> = router.bindings();

    let err = router
        .execute(&set_bindings_request(
            TRADER,
            vec![RoleBinding { role: Role::Swap.id(), handler: TRADER }],
        ))
        .unwrap_err();
    assert_eq!(err, RouterError::Unauthorized { caller: TRADER });

    let err = router
        .execute(&Request::new(TRADER, abi::setControllerCall { newController: TRADER }.abi_encode()))
        .unwrap_err();
    let decoded = abi::Unauthorized::abi_decode(&err.revert_data(), true).unwrap();
    assert_eq!(decoded.caller, TRADER);

    assert_eq!(router.bindings(), before);
    assert_eq!(router.controller(), CONTROLLER);
}

#[test]
fn test_controller_handover() {
    let mut router = create_test_router();
    let successor = Address::repeat_byte(0xc1);

    router
        .execute(&Request::new(
            CONTROLLER,
            abi::setControllerCall { newController: successor }.abi_encode(),
        ))
        .unwrap();
    assert_eq!(router.controller(), successor);

    let err = router.execute(&set_bindings_request(CONTROLLER, vec![])).unwrap_err();
    assert_eq!(err, RouterError::Unauthorized { caller: CONTROLLER });
    assert!(router.execute(&set_bindings_request(successor, vec![])).is_ok());
}

#[test]
fn test_null_controller_locks_administration() {
    let mut router = create_test_router();
    let before = router.bindings();

    router
        .execute(&Request::new(
            CONTROLLER,
            abi::setControllerCall { newController: Address::ZERO }.abi_encode(),
        ))
        .unwrap();
    assert_eq!(router.controller(), Address::ZERO);

    let err = router
        .execute(&set_bindings_request(
            Address::ZERO,
            vec![RoleBinding { role: Role::Swap.id(), handler: TRADER }],
        ))
        .unwrap_err();
    assert_eq!(err, RouterError::Unauthorized { caller: Address::ZERO });

    let err = router
        .execute(&Request::new(
            Address::ZERO,
            abi::setControllerCall { newController: TRADER }.abi_encode(),
        ))
        .unwrap_err();
    assert_eq!(err, RouterError::Unauthorized { caller: Address::ZERO });
    assert!(router.execute(&set_bindings_request(CONTROLLER, vec![])).is_err());

    assert_eq!(router.bindings(), before);
    assert_eq!(router.controller(), Address::ZERO);
}

#[test]
fn test_router_without_controller_is_locked() {
    let mut router = ExchangeRouter::new(ROUTER, Address::ZERO, ModuleTable::new());
    let err = router.execute(&set_bindings_request(Address::ZERO, vec![])).unwrap_err();
    assert_eq!(err, RouterError::Unauthorized { caller: Address::ZERO });
}

#[test]
fn test_set_bindings_overwrites_with_null() {
    // An explicit null address clears the binding; it is not skipped.
    let mut router = create_test_router();
    assert_ne!(router.binding(Role::Quote), Address::ZERO);

    router
        .execute(&set_bindings_request(
            CONTROLLER,
            vec![RoleBinding { role: Role::Quote.id(), handler: Address::ZERO }],
        ))
        .unwrap();

    assert_eq!(router.binding(Role::Quote), Address::ZERO);
    let err = router.execute(&request(vec![0x00, 0x00, 0x05, 0x00])).unwrap_err();
    assert_eq!(err, RouterError::UnroutableRequest { role: Role::Quote, handler: Address::ZERO });
}

#[test]
fn test_unknown_role_id_rejects_whole_batch() {
    let mut router = create_test_router();
    let before = router.bindings();

    let err = router
        .execute(&set_bindings_request(
            CONTROLLER,
            vec![
                RoleBinding { role: Role::Swap.id(), handler: Address::repeat_byte(0x01) },
                RoleBinding { role: 200, handler: Address::repeat_byte(0x02) },
            ],
        ))
        .unwrap_err();

    assert_eq!(err, RouterError::UnknownRole(200));
    assert_eq!(router.bindings(), before);
}

// ============================================
// Budget and configuration
// ============================================

#[test]
fn test_budget_exhaustion_rolls_back_request() {
    let modules = ModuleTable::new();
    modules.install(handler_address(0x54), Arc::new(Spender));
    let mut router =
        ExchangeRouter::with_bindings(ROUTER, CONTROLLER, modules, [(Role::Fallback, handler_address(0x54))]);
    let before = router.storage().len();

    let err = router
        .execute(&request(vec![0x00, 0x00, 0x77, 0x00]).with_budget(200_000))
        .unwrap_err();

    assert!(matches!(err, RouterError::BudgetExhausted(_)));
    assert!(err.revert_data().is_empty());
    assert_eq!(router.storage().len(), before);
    assert_eq!(router.storage().pending_writes(), 0);
}

#[test]
fn test_from_config_binds_named_roles() {
    let mut config = RouterConfig {
        address: ROUTER,
        controller: CONTROLLER,
        ..Default::default()
    };
    config.bindings.insert("swap-with-permit".to_string(), Address::repeat_byte(0x04));

    let router = ExchangeRouter::from_config(&config, ModuleTable::new()).unwrap();
    assert_eq!(router.binding(Role::SwapWithPermit), Address::repeat_byte(0x04));
    assert_eq!(router.controller(), CONTROLLER);
    assert_eq!(router.address(), ROUTER);
}

#[test]
fn test_from_config_rejects_unknown_role_name() {
    let mut config = RouterConfig::default();
    config.bindings.insert("oracle".to_string(), Address::repeat_byte(0x04));

    assert!(matches!(
        ExchangeRouter::from_config(&config, ModuleTable::new()),
        Err(RouterError::InvalidConfig(_))
    ));
}
