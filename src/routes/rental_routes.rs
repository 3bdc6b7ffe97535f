use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::rental_controller::RentalController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::dto::rental_dto::{
    CancelRentalRequest, CancelRentalResponse, CompleteRentalRequest, CreateRentalRequest, DeclineRentalRequest,
    PastRentalsQuery, QuoteResponse, RentalCompletionResponse, RentalDetailResponse, StartRentalRequest,
};
use crate::middleware::auth_middleware;
use crate::models::{Actor, Rental};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationQuery;

type RentalPage = Json<ApiResponse<PaginatedResponse<Rental>>>;

/// Todas las rutas de reservas requieren autenticación
pub fn create_rental_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_rental))
        .route("/quote", post(quote_rental))
        .route("/active", get(list_active))
        .route("/upcoming", get(list_upcoming))
        .route("/past", get(list_past))
        .route("/admin/pending", get(list_pending))
        .route("/:id", get(get_rental))
        .route("/:id/cancel", put(cancel_rental))
        .route("/:id/approve", put(approve_rental))
        .route("/:id/decline", put(decline_rental))
        .route("/:id/start", put(start_rental))
        .route("/:id/complete", put(complete_rental))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn controller(state: &AppState) -> RentalController {
    RentalController::new(state.pool.clone(), &state.config)
}

/// Cuerpo opcional: sin JSON se usan los valores por defecto
fn body_or_default<T: Default>(body: Option<Json<T>>) -> T {
    body.map(|Json(inner)| inner).unwrap_or_default()
}

async fn create_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateRentalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Rental>>), AppError> {
    let response = controller(&state).create(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn quote_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateRentalRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, AppError> {
    let response = controller(&state).quote(&actor, request).await?;
    Ok(Json(response))
}

async fn list_active(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PaginationQuery>,
) -> Result<RentalPage, AppError> {
    let response = controller(&state).list_active(&actor, query.into()).await?;
    Ok(Json(response))
}

async fn list_upcoming(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PaginationQuery>,
) -> Result<RentalPage, AppError> {
    let response = controller(&state).list_upcoming(&actor, query.into()).await?;
    Ok(Json(response))
}

async fn list_past(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PastRentalsQuery>,
) -> Result<RentalPage, AppError> {
    let response = controller(&state).list_past(&actor, query).await?;
    Ok(Json(response))
}

async fn list_pending(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PaginationQuery>,
) -> Result<RentalPage, AppError> {
    let response = controller(&state).list_pending(&actor, query.into()).await?;
    Ok(Json(response))
}

async fn get_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalDetailResponse>>, AppError> {
    let response = controller(&state).get_by_id(&actor, id).await?;
    Ok(Json(response))
}

async fn cancel_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelRentalRequest>>,
) -> Result<Json<ApiResponse<CancelRentalResponse>>, AppError> {
    let response = controller(&state).cancel(&actor, id, body_or_default(body)).await?;
    Ok(Json(response))
}

async fn approve_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Rental>>, AppError> {
    let response = controller(&state).approve(&actor, id).await?;
    Ok(Json(response))
}

async fn decline_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    body: Option<Json<DeclineRentalRequest>>,
) -> Result<Json<ApiResponse<Rental>>, AppError> {
    let response = controller(&state).decline(&actor, id, body_or_default(body)).await?;
    Ok(Json(response))
}

async fn start_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    body: Option<Json<StartRentalRequest>>,
) -> Result<Json<ApiResponse<Rental>>, AppError> {
    let response = controller(&state).start(&actor, id, body_or_default(body)).await?;
    Ok(Json(response))
}

async fn complete_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    body: Option<Json<CompleteRentalRequest>>,
) -> Result<Json<ApiResponse<RentalCompletionResponse>>, AppError> {
    let response = controller(&state).complete(&actor, id, body_or_default(body)).await?;
    Ok(Json(response))
}
