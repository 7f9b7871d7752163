//! Configuration module for exchange gateway nodes

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use exchange_types::{Address, DEFAULT_REQUEST_BUDGET};

/// Gateway node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Node ID
    pub node_id: String,

    /// Maximum number of requests waiting for execution
    pub queue_depth: usize,

    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,

    /// Router configuration
    pub router: RouterConfig,
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Address the router executes as; handlers act on this address's state
    pub address: Address,

    /// Initial controlling principal
    pub controller: Address,

    /// Upper bound on the budget a single request may carry
    pub max_request_budget: u64,

    /// Initial role bindings, keyed by role name (`swap`, `quote`, ...)
    pub bindings: BTreeMap<String, Address>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            node_id: uuid::Uuid::new_v4().to_string(),
            queue_depth: 1024,
            log_level: "info".to_string(),
            router: RouterConfig::default(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            address: Address::ZERO,
            controller: Address::ZERO,
            max_request_budget: DEFAULT_REQUEST_BUDGET,
            bindings: BTreeMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid gateway configuration")
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Load configuration from environment variables.
    ///
    /// `ROUTER_CONFIG` names an optional JSON file used as the base; the
    /// remaining variables override individual fields.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = match std::env::var("ROUTER_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => GatewayConfig::default(),
        };

        // Node ID
        if let Ok(node_id) = std::env::var("NODE_ID") {
            config.node_id = node_id;
        }

        if let Ok(depth) = std::env::var("GATEWAY_QUEUE_DEPTH") {
            match depth.parse() {
                Ok(depth) => config.queue_depth = depth,
                Err(_) => warn!(value = %depth, "Ignoring invalid GATEWAY_QUEUE_DEPTH"),
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(address) = env_address("ROUTER_ADDRESS") {
            config.router.address = address;
        }

        if let Some(controller) = env_address("ROUTER_CONTROLLER") {
            config.router.controller = controller;
        }

        if let Ok(budget) = std::env::var("ROUTER_MAX_BUDGET") {
            match budget.parse() {
                Ok(budget) => config.router.max_request_budget = budget,
                Err(_) => warn!(value = %budget, "Ignoring invalid ROUTER_MAX_BUDGET"),
            }
        }

        // Bindings: "swap=0x...,quote=0x..."
        if let Ok(bindings) = std::env::var("ROUTER_BINDINGS") {
            config.router.bindings.extend(parse_bindings(&bindings));
        }

        Ok(config)
    }
}

fn env_address(name: &str) -> Option<Address> {
    let raw = std::env::var(name).ok()?;
    match Address::from_str(raw.trim()) {
        Ok(address) => Some(address),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring invalid address");
            None
        }
    }
}

/// Parse `role=address` pairs separated by commas
pub fn parse_bindings(raw: &str) -> Vec<(String, Address)> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let Some((role, address)) = pair.split_once('=') else {
                warn!(entry = %pair, "Ignoring binding without '='");
                return None;
            };
            match Address::from_str(address.trim()) {
                Ok(address) => Some((role.trim().to_string(), address)),
                Err(_) => {
                    warn!(entry = %pair, "Ignoring binding with invalid address");
                    None
                }
            }
        })
        .collect()
}
