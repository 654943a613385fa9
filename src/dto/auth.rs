use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials posted to the login route.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The single administrator account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
}

impl AdminUser {
    /// Admin user for the session owner.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: "admin".to_string(),
            email: email.into(),
        }
    }
}

/// Successful login; the token is also set as the `admin-token` cookie.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub user: AdminUser,
    pub token: String,
}

/// Result of `GET /api/admin/me`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: AdminUser,
    /// Session expiry, RFC 3339.
    pub expires_at: String,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}
