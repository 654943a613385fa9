//! Single-admin login backed by in-memory session tokens.

use tracing::{info, warn};

use crate::{
    dto::{
        auth::{AdminUser, LoginRequest, LoginResponse, MeResponse},
        format_system_time,
    },
    error::ServiceError,
    state::SharedState,
};

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check the credentials and open a session.
pub async fn login(
    state: &SharedState,
    request: LoginRequest,
) -> Result<LoginResponse, ServiceError> {
    let (Some(email), Some(password)) = (
        request.email.filter(|email| !email.trim().is_empty()),
        request.password.filter(|password| !password.is_empty()),
    ) else {
        return Err(ServiceError::InvalidInput(
            "Email and password are required".into(),
        ));
    };

    let expected = &state.config().admin;
    let email_ok = constant_time_eq(email.trim().as_bytes(), expected.email.as_bytes());
    let password_ok = constant_time_eq(password.as_bytes(), expected.password.as_bytes());
    if !(email_ok && password_ok) {
        warn!(email = %email.trim(), "rejected admin login");
        return Err(ServiceError::Unauthorized("Invalid credentials".into()));
    }

    let (token, session) = state.sessions().create(&expected.email);
    info!(email = %session.email, "admin logged in");

    Ok(LoginResponse {
        success: true,
        user: AdminUser::new(session.email),
        token,
    })
}

/// Revoke a session token.
pub fn logout(state: &SharedState, token: &str) {
    state.sessions().revoke(token);
    info!("admin logged out");
}

/// Admin user owning `token`, if the session is still valid.
pub fn me(state: &SharedState, token: &str) -> Result<MeResponse, ServiceError> {
    let session = state
        .sessions()
        .validate(token)
        .ok_or_else(|| ServiceError::Unauthorized("Sessão inválida ou expirada".into()))?;
    Ok(MeResponse {
        user: AdminUser::new(session.email),
        expires_at: format_system_time(session.expires_at),
    })
}

/// Whether `token` belongs to a live session.
pub fn is_authenticated(state: &SharedState, token: &str) -> bool {
    state.sessions().validate(token).is_some()
}

/// Session lifetime in seconds, used as the cookie max-age.
pub fn session_max_age(state: &SharedState) -> u64 {
    state.sessions().ttl().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[test]
    fn constant_time_comparison() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret!"));
    }

    #[tokio::test]
    async fn login_issues_a_session_that_logout_revokes() {
        let state = AppState::new(AppConfig::default());
        let response = login(
            &state,
            LoginRequest {
                email: Some("admin@bingo.local".into()),
                password: Some("admin".into()),
            },
        )
        .await
        .unwrap();
        assert!(response.success);
        assert!(is_authenticated(&state, &response.token));
        assert_eq!(me(&state, &response.token).unwrap().user.email, "admin@bingo.local");

        logout(&state, &response.token);
        assert!(!is_authenticated(&state, &response.token));
        assert!(matches!(
            me(&state, &response.token),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let state = AppState::new(AppConfig::default());
        let err = login(
            &state,
            LoginRequest {
                email: Some("admin@bingo.local".into()),
                password: Some("nope".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let err = login(&state, LoginRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
