/// Role-based authorization
///
/// A blanket gate on the role carried by the authenticated [`Claims`]. It
/// knows nothing about the resource or action being protected; it runs after
/// [`jwt_auth_middleware`](super::middleware::jwt_auth_middleware) and
/// rejects every request whose claims are absent or name another role.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::post, Router};
/// use rectoria_shared::auth::authorization::admin_only_middleware;
/// use rectoria_shared::auth::middleware::create_jwt_middleware;
///
/// // Layers run outermost first: authentication, then the admin gate.
/// let app: Router = Router::new()
///     .route("/api/v1/rol", post(|| async { "ok" }))
///     .layer(middleware::from_fn(admin_only_middleware))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use super::jwt::{Claims, ADMIN_ROLE};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Acceso denegado. Solo el administrador puede realizar esta operación.")]
    Forbidden,
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "mensaje": self.to_string() })),
        )
            .into_response()
    }
}

/// Checks that the claims carry exactly `role`
pub fn require_role(claims: Option<&Claims>, role: &str) -> Result<(), AuthzError> {
    match claims {
        Some(claims) if claims.rol == role => Ok(()),
        Some(claims) => {
            warn!(user_id = ?claims.id, rol = %claims.rol, required = role, "Access denied");
            Err(AuthzError::Forbidden)
        }
        None => {
            warn!(required = role, "Access denied without claims");
            Err(AuthzError::Forbidden)
        }
    }
}

pub fn require_admin(claims: Option<&Claims>) -> Result<(), AuthzError> {
    require_role(claims, ADMIN_ROLE)
}

/// Admin-only middleware
pub async fn admin_only_middleware(req: Request, next: Next) -> Result<Response, AuthzError> {
    require_admin(req.extensions().get::<Claims>())?;
    Ok(next.run(req).await)
}
