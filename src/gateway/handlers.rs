//! Gateway HTTP Handlers
//!
//! The public API surface: health probe, landing page, and the address
//! search endpoint. Handlers receive the shard client set through an
//! Axum extension; the gateway holds no other state.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

use super::client::ShardClient;
use super::ranking;
use super::scatter;
use super::types::{ErrorResponse, FindAddressResponse, GatewayHealthResponse};

/// Landing page served for `GET /`; when the file is missing the handler
/// falls back to a JSON service descriptor.
pub const WEB_INDEX_PATH: &str = "web/index.html";

/// Splits the request text into query terms. An input containing a comma
/// is treated as one structured term and passed through whole so the
/// shard can parse it into address components; anything else splits on
/// whitespace.
pub fn prepare_query_terms(address: &str) -> Vec<String> {
    if address.contains(',') {
        vec![address.to_string()]
    } else {
        address.split_whitespace().map(str::to_string).collect()
    }
}

/// Maps shard outcome counts to the response status: 503 when no shard
/// succeeded, 207 on a partial failure, 200 otherwise. All shards
/// succeeding with zero records is still 200.
pub fn response_status(successful_nodes: usize, failed_nodes: usize) -> StatusCode {
    if successful_nodes == 0 {
        StatusCode::SERVICE_UNAVAILABLE
    } else if failed_nodes > 0 {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    }
}

pub async fn handle_health(
    Extension(clients): Extension<Arc<Vec<ShardClient>>>,
) -> Json<GatewayHealthResponse> {
    Json(GatewayHealthResponse {
        status: "healthy",
        data_nodes: clients.len(),
    })
}

pub async fn handle_index() -> Response {
    match tokio::fs::read_to_string(WEB_INDEX_PATH).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => Json(serde_json::json!({
            "service": "Geocoding Gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": ["/health", "/api/findAddress"],
        }))
        .into_response(),
    }
}

pub async fn handle_find_address(
    Extension(clients): Extension<Arc<Vec<ShardClient>>>,
    body: String,
) -> Response {
    match find_address(&clients, &body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("internal error in findAddress: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    details: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

async fn find_address(clients: &[ShardClient], body: &str) -> anyhow::Result<Response> {
    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Ok(bad_request("Invalid JSON in request body")),
    };
    let Some(address) = parsed.get("address").and_then(|value| value.as_str()) else {
        return Ok(bad_request("Missing 'address' field in request body"));
    };
    if address.is_empty() {
        return Ok(bad_request("Address keyword cannot be empty"));
    }

    let request_id = Uuid::new_v4();
    tracing::info!("findAddress request {}: {:?}", request_id, address);

    let query_terms = prepare_query_terms(address);
    if query_terms.is_empty() {
        return Ok(bad_request("Address keyword must contain at least one term"));
    }
    tracing::info!("request {}: query terms {:?}", request_id, query_terms);

    let results = scatter::query_all_shards(clients, &query_terms).await;

    let successful_nodes = results.iter().filter(|result| result.success).count();
    let failed_nodes = results.len() - successful_nodes;
    for result in &results {
        if let Some(error) = &result.error {
            tracing::warn!(
                "request {}: shard {} failed: {}",
                request_id,
                result.shard_id,
                error
            );
        }
    }

    let ranked = ranking::aggregate_and_rank(&results, &query_terms, ranking::MAX_RESULTS);
    let status = response_status(successful_nodes, failed_nodes);

    tracing::info!(
        "request {}: returning {} ranked result(s) from {} successful node(s)",
        request_id,
        ranked.len(),
        successful_nodes
    );

    let response = FindAddressResponse {
        query: address.to_string(),
        query_terms,
        result_count: ranked.len(),
        results: ranked,
        successful_nodes,
        failed_nodes,
        error: (successful_nodes == 0).then(|| "All data nodes failed to respond".to_string()),
    };
    let body = serde_json::to_value(&response)?;

    Ok((status, Json(body)).into_response())
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}
