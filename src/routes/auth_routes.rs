use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{
    AccessTokenResponse, AuthResponse, CreateAdminRequest, LoginRequest, MeResponse, RefreshTokenRequest,
    RegisterRequest,
};
use crate::dto::common_dto::ApiResponse;
use crate::middleware::{auth_middleware, rate_limit_middleware};
use crate::models::{Actor, Admin, User};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin/login", post(admin_login))
        .route("/refresh", post(refresh))
        .route_layer(middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_middleware,
        ));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/admin/register", post(create_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

fn controller(state: &AppState) -> AuthController {
    AuthController::new(state.pool.clone(), state.jwt.clone())
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse<User>>>), AppError> {
    let response = controller(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse<User>>>, AppError> {
    let response = controller(&state).login(request).await?;
    Ok(Json(response))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse<Admin>>>, AppError> {
    let response = controller(&state).admin_login(request).await?;
    Ok(Json(response))
}

async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<AccessTokenResponse>>, AppError> {
    let response = controller(&state).refresh(request).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<MeResponse>>, AppError> {
    let response = controller(&state).me(&actor).await?;
    Ok(Json(response))
}

async fn create_admin(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Admin>>), AppError> {
    let response = controller(&state).create_admin(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
