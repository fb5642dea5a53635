use std::sync::Arc;

use alloy::primitives::U256;
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::page::render_index;
use crate::abis::parse_uint;
use crate::client::RewardsSource;
use crate::error::{Result, RewardsError};
use crate::models::{PoolEntry, PoolSet, QueryResult};
use crate::utils::parse_pool_id;
use crate::worker::query_pools;

#[derive(Clone)]
pub struct ApiState {
    pub source: Arc<dyn RewardsSource>,
    pub pools: Arc<PoolSet>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/pools", get(list_pools))
        .route("/api/rewards", post(pool_rewards))
        .route("/api/all-pools", post(all_pool_rewards))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsRequest {
    pub pool_id: Option<String>,
    /// A JSON number or a (decimal or `0x` hex) string. Kept untyped so that
    /// malformed values are reported as bad requests by this crate.
    pub epoch: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RewardsResponse {
    pub success: bool,
    pub results: Vec<QueryResult>,
}

fn required_epoch(epoch: Option<&Value>) -> Result<U256> {
    match epoch {
        None | Some(Value::Null) => Err(RewardsError::MissingField("epoch")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(RewardsError::MissingField("epoch")),
        Some(Value::String(s)) => parse_uint(s),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| RewardsError::invalid("epoch", n.to_string())),
        Some(other) => Err(RewardsError::invalid("epoch", other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<ApiState>) -> Html<String> {
    Html(render_index(&state.pools))
}

async fn list_pools(State(state): State<ApiState>) -> Json<Vec<PoolEntry>> {
    Json(state.pools.entries().to_vec())
}

async fn pool_rewards(
    State(state): State<ApiState>,
    Json(request): Json<RewardsRequest>,
) -> Result<Json<RewardsResponse>> {
    let pool_id = request
        .pool_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(RewardsError::MissingField("poolId"))?;
    let epoch = required_epoch(request.epoch.as_ref())?;

    let id = parse_pool_id(pool_id)?;
    let pool = PoolEntry {
        id,
        name: state.pools.name_for(&id).to_string(),
    };

    info!("Computing rewards for {} ({}) at epoch {}", pool.name, pool.id_hex(), epoch);
    let raw = state.source.compute_rewards(id, epoch).await.map_err(|e| {
        error!("Error computing rewards for {}: {}", pool.name, e);
        e
    })?;

    Ok(Json(RewardsResponse {
        success: true,
        results: vec![QueryResult::success(&pool, raw)],
    }))
}

async fn all_pool_rewards(
    State(state): State<ApiState>,
    Json(request): Json<RewardsRequest>,
) -> Result<Json<RewardsResponse>> {
    let epoch = required_epoch(request.epoch.as_ref())?;
    let results = query_pools(state.source.as_ref(), &state.pools, epoch, None).await?;

    Ok(Json(RewardsResponse {
        success: true,
        results,
    }))
}
