use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse, MeResponse, SuccessResponse},
    error::{AppError, ErrorBody},
    routes::extract::JsonBody,
    services::auth_service,
    state::SharedState,
};

/// Name of the session cookie set at login.
pub const SESSION_COOKIE: &str = "admin-token";

/// Session token carried by the request, from the cookie or a bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
        })
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: &str, max_age: u64) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    ))
    .map_err(|err| AppError::Internal(format!("invalid session cookie: {err}")))
}

/// Routes reachable without a session.
pub fn public_router() -> Router<SharedState> {
    Router::new().route("/admin/login", post(login).delete(logout))
}

/// Routes that need a session.
pub fn router() -> Router<SharedState> {
    Router::new().route("/admin/me", get(me))
}

/// Open an admin session.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Session opened; the token is also set as the `admin-token` cookie",
            body = LoginResponse
        ),
        (status = 400, description = "Missing credentials", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response, AppError> {
    let response = auth_service::login(&state, payload).await?;
    let cookie = session_cookie(&response.token, auth_service::session_max_age(&state))?;
    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// Close the current admin session.
#[utoipa::path(
    delete,
    path = "/api/admin/login",
    tag = "auth",
    responses(
        (status = 200, description = "Session revoked and cookie cleared", body = SuccessResponse)
    )
)]
pub async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        auth_service::logout(&state, &token);
    }
    let cookie = session_cookie("", 0)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SuccessResponse { success: true }),
    )
        .into_response())
}

/// Admin user of the current session.
#[utoipa::path(
    get,
    path = "/api/admin/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current admin", body = MeResponse),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn me(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AppError> {
    let token = session_token(&headers).unwrap_or_default();
    Ok(Json(auth_service::me(&state, &token)?))
}

/// Reject requests without a live admin session.
pub async fn require_admin_session(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Token de acesso necessário".into()))?;

    if auth_service::is_authenticated(&state, &token) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("Token inválido ou expirado".into()))
    }
}
