/// Authentication and authorization
///
/// # Modules
///
/// - [`jwt`]: HS256 token creation and validation
/// - [`middleware`]: bearer token authentication for Axum
/// - [`authorization`]: admin-only gate on the authenticated role
///
/// # Example
///
/// ```
/// use rectoria_shared::auth::authorization::require_admin;
/// use rectoria_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let token = create_token(&Claims::new(1, "ana", "admin"), "secret-key")?;
/// let claims = validate_token(&token, "secret-key")?;
/// require_admin(Some(&claims))?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
