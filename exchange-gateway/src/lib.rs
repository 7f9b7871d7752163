//! Exchange Gateway - Request execution service
//!
//! The gateway is responsible for:
//! - Owning the single exchange router instance
//! - Accepting requests over a bounded queue
//! - Executing them strictly one at a time, in arrival order
//! - Replying to each submitter with its own outcome

use std::sync::Arc;

use exchange_core::{GatewayConfig, ModuleTable};
use exchange_router_core::{ExchangeRouter, RouterError};
use exchange_types::{Bytes, Request, RequestId};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway is not accepting requests")]
    Closed,

    #[error("Request {0} was dropped before a reply was sent")]
    Dropped(RequestId),
}

/// Outcome of one request
#[derive(Debug, Clone)]
pub struct Response {
    pub id: RequestId,
    pub outcome: Result<Bytes, RouterError>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Bytes the caller observes: output on success, failure payload otherwise
    pub fn data(&self) -> Bytes {
        match &self.outcome {
            Ok(output) => output.clone(),
            Err(err) => err.revert_data(),
        }
    }
}

struct Submission {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Client side of the gateway queue
#[derive(Clone)]
pub struct GatewayHandle {
    sender: mpsc::Sender<Submission>,
}

impl GatewayHandle {
    /// Queue a request and wait for its outcome
    pub async fn submit(&self, request: Request) -> Result<Response, GatewayError> {
        let id = request.id;
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Submission { request, reply })
            .await
            .map_err(|_| GatewayError::Closed)?;
        response.await.map_err(|_| GatewayError::Dropped(id))
    }

    /// Whether the gateway has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Gateway node
pub struct Gateway {
    config: GatewayConfig,
    router: Arc<Mutex<ExchangeRouter>>,
    receiver: mpsc::Receiver<Submission>,
}

impl Gateway {
    /// Create a gateway and the handle used to submit requests to it
    pub fn new(
        config: GatewayConfig,
        modules: ModuleTable,
    ) -> Result<(Self, GatewayHandle), RouterError> {
        info!(
            node_id = %config.node_id,
            router = %config.router.address,
            modules = modules.len(),
            "Creating gateway node"
        );

        let router = ExchangeRouter::from_config(&config.router, modules)?;
        let (sender, receiver) = mpsc::channel(config.queue_depth.max(1));

        let gateway = Self {
            config,
            router: Arc::new(Mutex::new(router)),
            receiver,
        };
        Ok((gateway, GatewayHandle { sender }))
    }

    /// Run until every handle has been dropped
    pub async fn run(mut self) {
        info!(
            node_id = %self.config.node_id,
            queue_depth = self.config.queue_depth,
            "Gateway started"
        );

        while let Some(Submission { request, reply }) = self.receiver.recv().await {
            let id = request.id;
            let response = self.process(request);
            if reply.send(response).is_err() {
                debug!(request_id = %id, "Submitter went away before the reply");
            }
        }

        info!(node_id = %self.config.node_id, "Gateway stopped");
    }

    fn process(&self, mut request: Request) -> Response {
        let cap = self.config.router.max_request_budget;
        if request.budget > cap {
            warn!(
                request_id = %request.id,
                requested = request.budget,
                cap,
                "Request budget capped"
            );
            request.budget = cap;
        }

        debug!(request_id = %request.id, caller = %request.caller, len = request.calldata.len(), "Executing request");
        let outcome = self.router.lock().execute(&request);
        Response { id: request.id, outcome }
    }

    /// Shared access to the router, for inspection
    pub fn router(&self) -> Arc<Mutex<ExchangeRouter>> {
        Arc::clone(&self.router)
    }

    /// Get node ID
    pub fn node_id(&self) -> &str {
        &self.config.node_id
    }
}
