use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ventura_order::{validate_guest, AnswerReport, CommitResult, GuestData, ResolvedQuestions};
use ventura_shared::Booking;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAvailabilityRequest {
    pub availability_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub wait_for_confirmation: Option<bool>,
    pub max_wait_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    #[serde(flatten)]
    pub report: AnswerReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{booking_id}", get(get_booking))
        .route("/api/bookings/{booking_id}/availabilities", post(add_availability))
        .route(
            "/api/bookings/{booking_id}/questions",
            get(get_questions).post(answer_questions),
        )
        .route("/api/bookings/{booking_id}/commit", post(commit_booking))
}

async fn create_booking(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.bookings.create_booking().await?;
    info!(booking_id = %booking.id, "Booking created");
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get_booking(&booking_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;
    if booking.state.is_confirmed() {
        record_confirmed(&state, &booking).await;
    }
    Ok(Json(booking))
}

async fn add_availability(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Json(req): Json<AddAvailabilityRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .add_availability(&booking_id, &req.availability_id)
        .await?;
    Ok(Json(booking))
}

async fn get_questions(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<ResolvedQuestions>, AppError> {
    Ok(Json(state.resolver().resolve(&booking_id).await?))
}

/// Re-validates the form against the questions currently displayed, then answers.
async fn answer_questions(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Json(guest): Json<GuestData>,
) -> Result<Json<AnswerResponse>, AppError> {
    let resolver = state.resolver();
    let displayed = resolver.resolve(&booking_id).await?;
    validate_guest(&guest, &displayed.additional)?;

    let report = resolver.answer(&booking_id, &guest).await?;
    Ok(Json(AnswerResponse {
        message: report.message().map(str::to_string),
        report,
    }))
}

async fn commit_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    body: Bytes,
) -> Result<Json<CommitResult>, AppError> {
    // the body is optional, an empty one means "use the configured defaults"
    let req: CommitRequest = if body.is_empty() {
        CommitRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };
    let wait = req
        .wait_for_confirmation
        .unwrap_or(state.checkout.wait_for_confirmation);
    let max_wait_seconds = req
        .max_wait_seconds
        .unwrap_or(state.checkout.max_wait_seconds);

    let result = state
        .poller()
        .commit(&booking_id, wait, max_wait_seconds)
        .await?;
    if result.is_confirmed {
        record_confirmed(&state, &result.booking).await;
    }
    Ok(Json(result))
}

/// Feed the urgency counter. Failures are logged and otherwise ignored.
pub(crate) async fn record_confirmed(state: &AppState, booking: &Booking) {
    let now = Utc::now();
    for availability in booking.availabilities.iter() {
        if let Err(e) = state
            .stats
            .record_confirmed(&availability.product_id, &booking.id, now)
            .await
        {
            warn!(booking_id = %booking.id, error = %e, "Failed to record booking stats");
        }
    }
}
