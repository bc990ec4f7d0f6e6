use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use connector_database::basic_db::SafeDatabase;
use connector_service::parser::user::PublicUser;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub const TOKEN_HEADER: &str = "x-auth-token";

/// Proof that the request carried a valid session token. Private handlers take
/// this as an argument, so they cannot run without the check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// `x-auth-token: <token>` wins over `Authorization: Bearer <token>`.
fn request_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(token);
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

impl<T: SafeDatabase> FromRequestParts<AppState<T>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<T>) -> Result<Self, Self::Rejection> {
        let user = state.guard().verify(request_token(&parts.headers))?;
        Ok(AuthUser(user))
    }
}

pub async fn current_user<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    AuthUser(user): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.guard().current_user(user)?;
    Ok(Json(user.public()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn custom_header_is_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("from-custom"));

        assert_eq!(request_token(&headers), Some("from-custom"));
    }

    #[test]
    fn bearer_scheme_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(request_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(request_token(&headers), Some("abc"));
    }
}
