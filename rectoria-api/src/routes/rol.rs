/// Role endpoints
///
/// All endpoints sit behind JWT authentication and the admin-only gate.
///
/// # Endpoints
///
/// - `POST /api/v1/rol` - Create role
/// - `GET /api/v1/rol` - List roles
/// - `GET /api/v1/rol/:id` - Get role (optional `?include=Usuarios`)
/// - `PUT /api/v1/rol/:id` - Update role
///
/// Data access failures, including unknown ids, answer 500 with the full
/// error text in `message`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use rectoria_shared::models::{EntityKind, Filter, Record};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

const NAME_REQUIRED: &str = "NombreRol is required.";

/// Create / update role request
///
/// Values are kept as sent and typed by the data access layer. A field
/// sent as `null` is `Some(Value::Null)`, an absent one is `None`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RoleRequest {
    /// Role name; any falsy JSON value counts as missing
    #[serde(rename = "NombreRol", default, deserialize_with = "present")]
    #[validate(required(message = "NombreRol is required."), custom(function = "truthy"))]
    pub nombre_rol: Option<Value>,

    /// Free-text description
    #[serde(rename = "Descripcion", default, deserialize_with = "present")]
    pub descripcion: Option<Value>,
}

impl RoleRequest {
    /// Field values handed to the data access layer; absent fields are left out
    fn into_record(self) -> Record {
        let mut record = Record::new();
        if let Some(name) = self.nombre_rol {
            record.insert("NombreRol".to_string(), name);
        }
        if let Some(description) = self.descripcion {
            record.insert("Descripcion".to_string(), description);
        }
        record
    }
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn truthy(value: &Value) -> Result<(), ValidationError> {
    let falsy = match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    };

    if falsy {
        Err(ValidationError::new("required"))
    } else {
        Ok(())
    }
}

/// Get role query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReadRoleQuery {
    /// Comma-separated association aliases to eager-load
    pub include: Option<String>,
}

/// Single role response
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub message: &'static str,
    pub role: Record,
}

/// Role list response
#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub message: &'static str,
    pub roles: Vec<Record>,
}

/// Create role handler
///
/// # Errors
///
/// - 400 when `NombreRol` is missing, `null`, `""`, `false` or `0`
/// - 500 when the data access layer rejects the role
pub async fn create_role(
    State(state): State<AppState>,
    body: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let req = validated(body)?;

    let role = state
        .data
        .create(EntityKind::Rol, &req.into_record())
        .await
        .map_err(|e| ApiError::internal("Error creating role", e))?;

    tracing::info!(role_id = ?role.get("RolID"), "Role created");

    Ok((
        StatusCode::CREATED,
        Json(RoleResponse {
            message: "Role created successfully",
            role,
        }),
    ))
}

/// Update role handler
///
/// Only the supplied fields are changed.
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<Json<RoleResponse>> {
    let req = validated(body)?;
    let id = parse_id(&id)?;

    let role = state
        .data
        .update(EntityKind::Rol, id, &req.into_record())
        .await
        .map_err(|e| ApiError::internal("Error updating role", e))?;

    Ok(Json(RoleResponse {
        message: "Role updated successfully",
        role,
    }))
}

/// Get role handler
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReadRoleQuery>,
) -> ApiResult<Json<RoleResponse>> {
    let id = parse_id(&id)?;

    let includes: Vec<&str> = query
        .include
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|alias| !alias.is_empty())
        .collect();

    let result = if includes.is_empty() {
        state.data.read(EntityKind::Rol, id).await
    } else {
        state.data.read_with(EntityKind::Rol, id, &includes).await
    };
    let role = result.map_err(|e| ApiError::internal("Error retrieving role", e))?;

    Ok(Json(RoleResponse {
        message: "Role retrieved successfully",
        role,
    }))
}

/// List roles handler
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<Json<RolesResponse>> {
    let roles = state
        .data
        .list(EntityKind::Rol, &Filter::new())
        .await
        .map_err(|e| ApiError::internal("Error retrieving roles", e))?;

    Ok(Json(RolesResponse {
        message: "Roles retrieved successfully",
        roles,
    }))
}

/// Unreadable bodies count as a missing role name
fn validated(body: Result<Json<RoleRequest>, JsonRejection>) -> ApiResult<RoleRequest> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected role body");
            RoleRequest::default()
        }
    };

    req.validate()
        .map_err(|_| ApiError::BadRequest(NAME_REQUIRED.to_string()))?;

    Ok(req)
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid role ID.".to_string()))
}
