// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the admin gateway.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use farebot_core::{FarebotError, UserId, Vehicle};
use farebot_engine::{DeliveryReport, DeliveryStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// Map an engine failure to a response status: transport failures are the
/// upstream's fault, everything else is ours.
fn engine_error(e: FarebotError) -> ApiError {
    let status = match e {
        FarebotError::Channel { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            error: e.to_string(),
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// GET /health. Unauthenticated, for process supervisors.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// Target chat. Required unless `broadcast` is set.
    pub chat_id: Option<i64>,
    pub text: Option<String>,
    /// Send to every subscriber instead of a single chat.
    #[serde(default)]
    pub broadcast: bool,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub delivered: usize,
    pub attempted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<DeliveryReport>>,
}

/// POST /send: deliver a message to one chat or to all subscribers.
pub async fn post_send(
    State(state): State<GatewayState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let text = req
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| bad_request("text is required"))?;

    if req.broadcast {
        let results = state.engine.broadcast(text).await.map_err(engine_error)?;
        let delivered = results
            .iter()
            .filter(|r| r.status == DeliveryStatus::Ok)
            .count();
        info!(attempted = results.len(), delivered, "admin broadcast sent");
        return Ok(Json(SendResponse {
            delivered,
            attempted: results.len(),
            results: Some(results),
        }));
    }

    let chat_id = req
        .chat_id
        .ok_or_else(|| bad_request("chat_id is required unless broadcast is set"))?;
    state
        .engine
        .send_direct(UserId(chat_id), text)
        .await
        .map_err(engine_error)?;

    Ok(Json(SendResponse {
        delivered: 1,
        attempted: 1,
        results: None,
    }))
}

/// GET /admin/vehicles: the current roster.
pub async fn get_vehicles(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    let vehicles = state.engine.list_vehicles().await.map_err(engine_error)?;
    Ok(Json(vehicles))
}

/// POST /admin/vehicles: insert or replace one roster entry.
pub async fn post_vehicle(
    State(state): State<GatewayState>,
    Json(vehicle): Json<Vehicle>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    state
        .engine
        .upsert_vehicle(vehicle.clone())
        .await
        .map_err(|e| match e {
            FarebotError::Validation(_) => bad_request(&e.to_string()),
            other => engine_error(other),
        })?;
    info!(vehicle = %vehicle.id, "roster entry upserted");
    Ok((StatusCode::CREATED, Json(vehicle)))
}
