use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::kyc_controller::KycController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::kyc_dto::{KycStatusResponse, ReviewKycRequest, SubmitKycRequest};
use crate::middleware::auth_middleware;
use crate::models::Actor;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_kyc_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_kyc))
        .route("/status", get(kyc_status))
        .route("/:user_id/review", put(review_kyc))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn submit_kyc(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<SubmitKycRequest>,
) -> Result<Json<ApiResponse<KycStatusResponse>>, AppError> {
    let controller = KycController::new(state.pool.clone());
    let response = controller.submit(&actor, request).await?;
    Ok(Json(response))
}

async fn kyc_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<KycStatusResponse>>, AppError> {
    let controller = KycController::new(state.pool.clone());
    let response = controller.status(&actor).await?;
    Ok(Json(response))
}

async fn review_kyc(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<ReviewKycRequest>,
) -> Result<Json<ApiResponse<KycStatusResponse>>, AppError> {
    let controller = KycController::new(state.pool.clone());
    let response = controller.review(&actor, user_id, request).await?;
    Ok(Json(response))
}
