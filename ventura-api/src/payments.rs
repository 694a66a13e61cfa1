use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use ventura_core::payment::PaymentSession;
use ventura_order::PaymentOutcome;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub client_secret: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings/{booking_id}/payment-intent", post(create_payment_intent))
        .route("/api/payments/confirm", post(confirm_payment))
}

async fn create_payment_intent(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<PaymentSession>, AppError> {
    let booking = state
        .bookings
        .get_booking(&booking_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    let session = state.orchestrator().initialize_payment(&booking).await?;
    Ok(Json(session))
}

/// Sandbox stand-in for the provider's client-side confirmation step.
async fn confirm_payment(
    State(state): State<AppState>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<PaymentOutcome>, AppError> {
    Ok(Json(state.orchestrator().confirm(&req.client_secret).await?))
}
