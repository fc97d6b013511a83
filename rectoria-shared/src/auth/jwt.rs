/// JWT token generation and validation
///
/// Tokens are signed with HS256 using the process-wide shared secret and
/// carry the identity of a user plus the name of its role.
///
/// # Validation
///
/// - **Algorithm**: HS256 only
/// - **Expiration**: checked when the token has an `exp` claim, with no leeway
/// - **Required claims**: none; tokens minted without `exp` stay valid
///
/// # Example
///
/// ```
/// use rectoria_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(1, "ana", "admin");
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
///
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.username, "ana");
/// assert!(validated.is_admin());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role name granted full access
pub const ADMIN_ROLE: &str = "admin";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    Encoding(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    /// Not a decodable HS256 token
    #[error("Malformed token: {0}")]
    Malformed(String),
}

/// JWT claims
///
/// `id`, `username` and `rol` identify the user. Identity claims are read
/// leniently: any signed payload authenticates, and the admin gate decides
/// on `rol`. A missing or non-string `rol` is never admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID; numeric strings are accepted, other shapes decode as `None`
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub username: String,

    /// Role name
    #[serde(default, deserialize_with = "lenient_role")]
    pub rol: String,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// Only a JSON string can name a role.
fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

impl Claims {
    /// Claims valid for one hour
    pub fn new(id: i64, username: impl Into<String>, rol: impl Into<String>) -> Self {
        Self::with_expiration(id, username, rol, Duration::hours(1))
    }

    /// Claims with a custom lifetime; a negative lifetime yields an expired token
    pub fn with_expiration(
        id: i64,
        username: impl Into<String>,
        rol: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Some(id),
            username: username.into(),
            rol: rol.into(),
            iat: Some(now.timestamp()),
            exp: Some((now + expires_in).timestamp()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.rol == ADMIN_ROLE
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| JwtError::Encoding(e.to_string()))
}

/// Verifies signature and expiry, then decodes the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::Malformed(e.to_string()),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(7, "ana", "admin");
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated, claims);
    }

    #[test]
    fn test_wrong_secret() {
        let token = create_token(&Claims::new(1, "ana", "admin"), SECRET).unwrap();
        let result = validate_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_expired_token() {
        let claims = Claims::with_expiration(1, "ana", "admin", Duration::seconds(-10));
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_without_expiry_is_accepted() {
        let claims = Claims {
            id: Some(3),
            username: "luis".to_string(),
            rol: "editor".to_string(),
            iat: None,
            exp: None,
        };
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.rol, "editor");
        assert!(!validated.is_admin());
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            validate_token("not.a.token", SECRET),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(validate_token("", SECRET), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_admin_role_is_case_sensitive() {
        assert!(Claims::new(1, "a", "admin").is_admin());
        assert!(!Claims::new(1, "a", "Admin").is_admin());
    }

    fn sign(payload: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_loose_identity_claims_are_accepted() {
        let token = sign(serde_json::json!({"id": "12", "username": 99, "rol": "admin"}));

        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.id, Some(12));
        assert_eq!(claims.username, "99");
        assert!(claims.is_admin());
    }

    #[test]
    fn test_non_string_role_is_not_admin() {
        for rol in [serde_json::Value::Null, serde_json::json!(["admin"]), serde_json::json!(1)] {
            let token = sign(serde_json::json!({"id": null, "rol": rol}));

            let claims = validate_token(&token, SECRET).unwrap();
            assert_eq!(claims.id, None);
            assert_eq!(claims.rol, "");
            assert!(!claims.is_admin());
        }
    }

    #[test]
    fn test_empty_payload_authenticates_without_role() {
        let claims = validate_token(&sign(serde_json::json!({})), SECRET).unwrap();
        assert_eq!(claims.username, "");
        assert!(!claims.is_admin());
    }
}
