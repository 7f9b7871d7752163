//! Call surface of the exchange router
//!
//! Three groups of operations are visible to callers:
//!
//! - **Forwarded operations** are implemented by handler modules. The router
//!   recognises their selectors and passes the payload through untouched.
//! - **Wrapper operations** are simplified swaps that the router turns into a
//!   full `swap` / `swapWithPermit` sub-call and then bound-checks.
//! - **Administration operations** mutate the role registry directly.
//!
//! The router's own failure payloads are declared here as custom errors.

use alloy_sol_types::sol;

sol! {
    #![sol(all_derives)]

    /// Full swap request understood by the swap and quote handlers
    struct SwapParams {
        address token;
        bool exactInput;
        int256 amountSpecified;
        uint256 priceLimit;
    }

    /// Off-band authorization attached to a permit swap
    struct PermitParams {
        uint256 nonce;
        uint256 deadline;
        uint256 amount;
        bytes signature;
    }

    /// One role -> handler assignment inside `setBindings`
    struct RoleBinding {
        uint8 role;
        address handler;
    }

    // ---- swap / quote handlers ----
    function swap(SwapParams params, bytes hookData) external returns (int256 amountIn, int256 amountOut);
    function swapWithPermit(SwapParams params, PermitParams permit) external returns (int256 amountIn, int256 amountOut);
    function quote(SwapParams params) external returns (int256 amountIn, int256 amountOut);

    // ---- admin handler ----
    function createPool(address token, uint256 initialPrice, uint256 fee) external;
    function enablePool(address token) external;
    function setPrice(address token, uint256 price) external;

    // ---- position-update handler ----
    function modifyLiquidity(uint256 positionId, int256 liquidityDelta) external returns (int256 amount0, int256 amount1);
    function collectFees(uint256 positionId, address recipient) external returns (uint256 amount0, uint256 amount1);

    // ---- position handler ----
    function mintPosition(address token, uint256 lowerPrice, uint256 upperPrice, uint256 liquidity, address recipient) external returns (uint256 positionId);
    function burnPosition(uint256 positionId) external;
    function transferPosition(address to, uint256 positionId) external;
    function approvePosition(address spender, uint256 positionId) external;

    // ---- wrappers ----
    function swapIn(address token, int256 amountIn, int256 minAmountOut) external returns (int256, int256);
    function swapOut(address token, int256 amountOut, int256 minAmountOut) external returns (int256, int256);
    function swapInWithPermit(address token, int256 amountIn, int256 minAmountOut, uint256 nonce, uint256 deadline, uint256 permitAmount, bytes signature) external returns (int256, int256);
    function swapOutWithPermit(address token, int256 amountOut, int256 minAmountOut, uint256 nonce, uint256 deadline, uint256 permitAmount, bytes signature) external returns (int256, int256);

    // ---- registry administration ----
    function setController(address newController) external;
    function setBindings(RoleBinding[] bindings) external;

    // ---- router failures ----
    error Unauthorized(address caller);
    error MalformedRequest();
    error UnroutableRequest(uint8 role, address handler);
    error PostconditionViolated(int256 realized, int256 bound);
    error ArithmeticFailure();
    error UndecodableResult();
    error UnknownRole(uint8 role);
}
