pub mod chain;
pub mod deployments;
pub mod health;
pub mod ledgers;
pub mod receipts;
pub mod transactions;

use crate::domain::Address;
use crate::node::Node;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub node: Node,
    /// Ledger deployed at startup.
    pub ledger: Address,
}

impl AppState {
    pub fn new(node: Node, ledger: Address) -> Self {
        Self { node, ledger }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/chain", get(chain::get_chain))
        .route("/v1/chain/mine", post(chain::post_mine))
        .route("/v1/deployments", post(deployments::post_deployment))
        .route("/v1/transactions", post(transactions::post_transaction))
        .route("/v1/ledgers/:address", get(ledgers::get_ledger))
        .route("/v1/ledgers/:address/balances", get(ledgers::get_balances))
        .route(
            "/v1/ledgers/:address/orders/status",
            post(ledgers::post_order_status),
        )
        .route("/v1/receipts", get(receipts::get_receipts))
        .route("/v1/receipts/:hash", get(receipts::get_receipt))
        .layer(cors)
        .with_state(state)
}
