//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de que el principal sigue existiendo y activo.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    controllers::auth_controller::AuthController,
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token_of_type, TokenType},
    },
};

/// Middleware de autenticación JWT
///
/// Inyecta el `Actor` en las extensions de la request. Los tokens de
/// refresco se rechazan.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token is required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token_of_type(token, TokenType::Access, &state.jwt)?;
    let actor = AuthController::new(state.pool.clone(), state.jwt.clone())
        .resolve_actor(claims.actor()?)
        .await?;

    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}
