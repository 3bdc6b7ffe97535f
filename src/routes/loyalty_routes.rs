use axum::{
    extract::{Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::loyalty_controller::LoyaltyController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::dto::loyalty_dto::{AdjustPointsRequest, AdjustPointsResponse, LoyaltySummaryResponse};
use crate::middleware::auth_middleware;
use crate::models::{Actor, LoyaltyTransaction};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationQuery;

pub fn create_loyalty_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(my_account))
        .route("/transactions", get(list_transactions))
        .route("/adjust", post(adjust_points))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn my_account(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<LoyaltySummaryResponse>>, AppError> {
    let controller = LoyaltyController::new(state.pool.clone());
    let response = controller.me(&actor).await?;
    Ok(Json(response))
}

async fn list_transactions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<LoyaltyTransaction>>>, AppError> {
    let controller = LoyaltyController::new(state.pool.clone());
    let response = controller.transactions(&actor, query.into()).await?;
    Ok(Json(response))
}

async fn adjust_points(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<AdjustPointsRequest>,
) -> Result<Json<ApiResponse<AdjustPointsResponse>>, AppError> {
    let controller = LoyaltyController::new(state.pool.clone());
    let response = controller.adjust(&actor, request).await?;
    Ok(Json(response))
}
