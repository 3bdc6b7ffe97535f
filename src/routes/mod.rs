//! Rutas HTTP de la API
//!
//! Cada recurso expone su propio router; `create_app` los monta bajo
//! `/api` y aplica las capas comunes.

pub mod auth_routes;
pub mod kyc_routes;
pub mod loyalty_routes;
pub mod payment_routes;
pub mod rental_routes;
pub mod station_routes;
pub mod vehicle_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router(state.clone()))
        .nest("/api/station", station_routes::create_station_router(state.clone()))
        .nest("/api/vehicle", vehicle_routes::create_vehicle_router(state.clone()))
        .nest("/api/rentals", rental_routes::create_rental_router(state.clone()))
        .nest("/api/payments", payment_routes::create_payment_router(state.clone()))
        .nest("/api/loyalty", loyalty_routes::create_loyalty_router(state.clone()))
        .nest("/api/kyc", kyc_routes::create_kyc_router(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ev-rental-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
