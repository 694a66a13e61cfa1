use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use ventura_shared::{AvailabilityDetail, AvailabilityDiscovery, CategoryUnits, OptionAnswer};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverQuery {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureRequest {
    #[serde(default)]
    pub options: Vec<OptionAnswer>,
    #[serde(default)]
    pub pricing_categories: Vec<CategoryUnits>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products/{product_id}/availability", get(discover_availability))
        .route("/api/availability/{availability_id}/configure", post(configure_availability))
}

async fn discover_availability(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<DiscoverQuery>,
) -> Result<Json<AvailabilityDiscovery>, AppError> {
    let discovery = state
        .availability
        .discover_availability(&product_id, query.date_from, query.date_to)
        .await?;
    info!(%product_id, slots = discovery.slots.len(), "Availability discovered");
    Ok(Json(discovery))
}

/// Returns the detail even when options are still incomplete; the client asks
/// again with the newly revealed options answered.
async fn configure_availability(
    State(state): State<AppState>,
    Path(availability_id): Path<String>,
    Json(req): Json<ConfigureRequest>,
) -> Result<Json<AvailabilityDetail>, AppError> {
    let detail = state
        .configurator()
        .configure(&availability_id, &req.options, &req.pricing_categories)
        .await?;
    Ok(Json(detail))
}
