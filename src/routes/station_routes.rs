use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::station_controller::StationController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::station_dto::{
    CreateStationRequest, StationListQuery, StationListResponse, UpdateAvailabilityRequest, UpdateStationRequest,
};
use crate::middleware::auth_middleware;
use crate::models::{Actor, Station};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_station_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/list", get(list_stations))
        .route("/:id", get(get_station));

    let protected = Router::new()
        .route("/create", post(create_station))
        .route("/:id", put(update_station).delete(delete_station))
        .route("/:id/update-availability", patch(update_availability))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<StationListQuery>,
) -> Result<Json<ApiResponse<StationListResponse>>, AppError> {
    let controller = StationController::new(state.pool.clone());
    let response = controller.list(query).await?;
    Ok(Json(response))
}

async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Station>>, AppError> {
    let controller = StationController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_station(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateStationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Station>>), AppError> {
    let controller = StationController::new(state.pool.clone());
    let response = controller.create(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_station(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStationRequest>,
) -> Result<Json<ApiResponse<Station>>, AppError> {
    let controller = StationController::new(state.pool.clone());
    let response = controller.update(&actor, id, request).await?;
    Ok(Json(response))
}

async fn delete_station(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = StationController::new(state.pool.clone());
    let response = controller.delete(&actor, id).await?;
    Ok(Json(response))
}

async fn update_availability(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<ApiResponse<Station>>, AppError> {
    let controller = StationController::new(state.pool.clone());
    let response = controller.update_availability(&actor, id, request).await?;
    Ok(Json(response))
}
