use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::payment_controller::PaymentController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::dto::payment_dto::PreAuthorizeRequest;
use crate::middleware::auth_middleware;
use crate::models::{Actor, Payment, PaymentAuthorization};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationQuery;

pub fn create_payment_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments))
        .route("/:id", get(get_payment))
        .route("/rentals/:id/authorize", post(pre_authorize))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn controller(state: &AppState) -> PaymentController {
    PaymentController::new(state.pool.clone(), state.config.preauth_validity_days)
}

async fn list_payments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<Payment>>>, AppError> {
    let response = controller(&state).list_mine(&actor, query.into()).await?;
    Ok(Json(response))
}

async fn get_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let response = controller(&state).get_by_id(&actor, id).await?;
    Ok(Json(response))
}

async fn pre_authorize(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(rental_id): Path<Uuid>,
    body: Option<Json<PreAuthorizeRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentAuthorization>>), AppError> {
    let request = body.map(|Json(inner)| inner).unwrap_or_default();
    let response = controller(&state).pre_authorize(&actor, rental_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
