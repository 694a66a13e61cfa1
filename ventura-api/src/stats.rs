use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatsResponse {
    pub product_id: String,
    pub booked_last_24_hours: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/products/{product_id}/booking-stats", get(booking_stats))
}

async fn booking_stats(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<BookingStatsResponse>, AppError> {
    let since = Utc::now() - Duration::hours(24);
    let booked_last_24_hours = state.stats.count_since(&product_id, since).await?;
    Ok(Json(BookingStatsResponse {
        product_id,
        booked_last_24_hours,
    }))
}
