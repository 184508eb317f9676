//! REST API server for Forgechain
//!
//! Exposes the ledger over HTTP: mining, transaction submission, chain
//! export, peer registration and conflict resolution.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::consensus::ChainSnapshot;
use crate::error::ChainError;
use crate::ledger::Transaction;
use crate::node::Node;

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    ChainError(ChainError),
    InvalidInput(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ChainError(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::MiningCancelled => {
                ApiError::ServiceUnavailable("mining is shut down".to_string())
            }
            other => ApiError::ChainError(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct NewTransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
struct MineResponse {
    message: String,
    index: u64,
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: String,
}

#[derive(Serialize)]
struct TransactionAccepted {
    message: String,
    index: u64,
}

#[derive(Serialize)]
struct RegisterNodesResponse {
    message: String,
    total_nodes: Vec<String>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware. Logs method, path, status and duration.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the router with all endpoints (also used by tests).
pub fn build_router(node: Arc<Node>) -> Router {
    Router::new()
        .route("/mine", get(mine))
        .route("/transactions/new", post(submit_transaction))
        .route("/chain", get(get_chain))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve_chain))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(node)
}

/// Bind and serve the API until the process terminates.
pub async fn serve(node: Arc<Node>, bind_address: &str, port: u16) -> crate::error::Result<()> {
    let app = build_router(node);
    let addr = format!("{}:{}", bind_address, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn mine(State(node): State<Arc<Node>>) -> Result<Json<MineResponse>, ApiError> {
    let block = node.mine_block().await?;

    Ok(Json(MineResponse {
        message: "New Block Forged".to_string(),
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

async fn submit_transaction(
    State(node): State<Arc<Node>>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<TransactionAccepted>), ApiError> {
    // Parsed by hand so a missing field answers 400, not a framework 422.
    let request: NewTransactionRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::InvalidInput(format!("invalid transaction: {}", e)))?;

    let index = {
        let mut ledger = node.ledger.write().await;
        ledger.submit_transaction(request.sender, request.recipient, request.amount)
    };

    Ok((
        StatusCode::CREATED,
        Json(TransactionAccepted {
            message: format!("Transaction will be added to Block {}", index),
            index,
        }),
    ))
}

async fn get_chain(State(node): State<Arc<Node>>) -> Json<ChainSnapshot> {
    let ledger = node.ledger.read().await;
    Json(ChainSnapshot::of(&ledger))
}

async fn register_nodes(
    State(node): State<Arc<Node>>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<RegisterNodesResponse>), ApiError> {
    let request: RegisterNodesRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::InvalidInput(format!("please supply a list of nodes: {}", e)))?;

    for address in &request.nodes {
        node.peers.register(address)?;
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterNodesResponse {
            message: "New nodes have been added".to_string(),
            total_nodes: node.peers.list(),
        }),
    ))
}

async fn resolve_chain(State(node): State<Arc<Node>>) -> Json<serde_json::Value> {
    let replaced = node.resolve().await;
    let ledger = node.ledger.read().await;

    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    Json(json!({
        "message": message,
        "new_chain": ledger.chain(),
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
