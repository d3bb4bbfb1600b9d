use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Identity decoded from a verified access token.
///
/// Taking `AuthUser` as a handler argument gates the route: requests without a
/// valid `Authorization: Bearer <token>` header are rejected with 401 before
/// the handler body runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthenticated("missing Authorization header"))?;

    let (scheme, token) = auth
        .split_once(' ')
        .ok_or_else(|| ApiError::unauthenticated("invalid auth scheme"))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::unauthenticated("invalid auth scheme"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::unauthenticated("missing bearer token"));
    }
    Ok(token)
}

/// Same headers and keys always give the same decision, until the token expires.
pub fn authenticate(keys: &JwtKeys, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = bearer_token(headers)?;
    let claims = keys.verify_access(token).map_err(|e| {
        warn!(error = %e, "rejected bearer token");
        ApiError::unauthenticated("invalid or expired token")
    })?;
    Ok(AuthUser {
        id: claims.sub,
        email: claims.email,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let keys = JwtKeys::from_ref(state);
        let user = authenticate(&keys, &parts.headers)?;
        tracing::Span::current().record("user_id", tracing::field::display(user.id));
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::make_keys;
    use axum::http::{HeaderValue, StatusCode};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn wrong_scheme_is_unauthenticated() {
        assert!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")).is_err());
        assert!(bearer_token(&headers_with("Bearer")).is_err());
        assert!(bearer_token(&headers_with("Bearer   ")).is_err());
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&headers_with("bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&headers_with("BEARER abc")).unwrap(), "abc");
    }

    #[test]
    fn valid_access_token_yields_identity() {
        let keys = make_keys("s", "iss", "aud");
        let id = Uuid::new_v4();
        let token = keys.sign_access(id, "a@x.com").unwrap();
        let user = authenticate(&keys, &headers_with(&format!("Bearer {token}"))).unwrap();
        assert_eq!(
            user,
            AuthUser {
                id,
                email: "a@x.com".into()
            }
        );
    }

    #[test]
    fn refresh_token_is_not_accepted_as_access() {
        let keys = make_keys("s", "iss", "aud");
        let token = keys.sign_refresh(Uuid::new_v4(), "a@x.com").unwrap();
        let err = authenticate(&keys, &headers_with(&format!("Bearer {token}"))).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = make_keys("s", "iss", "aud");
        let mut token = keys.sign_access(Uuid::new_v4(), "a@x.com").unwrap();
        token.push('x');
        assert!(authenticate(&keys, &headers_with(&format!("Bearer {token}"))).is_err());
    }
}
