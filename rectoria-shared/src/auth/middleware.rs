/// Authentication middleware for Axum
///
/// Reads the token from the `Authorization` header, verifies it against the
/// shared secret and adds the decoded [`Claims`] to the request extensions.
/// The token is the second space-separated segment of the header, so
/// `Bearer <token>` and any other `<scheme> <token>` form are accepted.
///
/// | Situation                         | Status | Body                                   |
/// |-----------------------------------|--------|----------------------------------------|
/// | no `Authorization` header         | 401    | `{"mensaje":"Token no proporcionado"}` |
/// | no token segment, bad or expired  | 403    | `{"mensaje":"Token inválido"}`         |
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use rectoria_shared::auth::jwt::Claims;
/// use rectoria_shared::auth::middleware::create_jwt_middleware;
///
/// async fn handler(Extension(claims): Extension<Claims>) -> String {
///     format!("Hola, {}", claims.username)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(handler))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use super::jwt::{validate_token, Claims, JwtError};

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Token no proporcionado")]
    Unauthenticated,

    /// Missing, unverifiable or expired token
    #[error("Token inválido")]
    InvalidToken(Option<JwtError>),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
        };

        (status, Json(json!({ "mensaje": self.to_string() }))).into_response()
    }
}

/// Second space-separated segment of the `Authorization` header
///
/// `Ok(None)` means the header is present without a token.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Unauthenticated)?;

    Ok(value
        .to_str()
        .ok()
        .and_then(|value| value.split(' ').nth(1))
        .filter(|token| !token.is_empty()))
}

/// Verifies the token carried by `headers`
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Claims, AuthError> {
    let token = bearer_token(headers)?.ok_or(AuthError::InvalidToken(None))?;

    validate_token(token, secret).map_err(|e| {
        warn!(error = %e, "Rejected token");
        AuthError::InvalidToken(Some(e))
    })
}

/// JWT authentication middleware
///
/// On success the request continues with `Claims` in its extensions.
pub async fn jwt_auth_middleware(
    secret: Arc<str>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authenticate(req.headers(), &secret)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>;

/// Creates a JWT authentication middleware closure for `axum::middleware::from_fn`
pub fn create_jwt_middleware(
    secret: impl Into<Arc<str>>,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = Arc::clone(&secret);
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}
