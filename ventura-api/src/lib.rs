use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod availability;
pub mod bookings;
pub mod error;
pub mod payments;
pub mod state;
pub mod stats;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .merge(availability::routes())
        .merge(bookings::routes())
        .merge(payments::routes())
        .merge(stats::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
