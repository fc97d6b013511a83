/// Error taxonomy of the data layer
///
/// [`EntityError`] is the inner cause produced while resolving a kind,
/// validating values or talking to storage. The data access layer wraps it
/// in a [`DataAccessError`](crate::data_access::DataAccessError) that names
/// the operation, so rendered messages always read
/// `<operation context>: <cause>`.
///
/// The Spanish texts are part of the wire contract: clients match on them.

use crate::models::EntityKind;

/// Inner cause of a failed entity operation
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// The kind name does not belong to the registry
    #[error("Tipo de entidad '{0}' no válido.")]
    UnknownEntityKind(String),

    /// No record of a known kind has this primary key
    #[error("No se encontró la entidad '{kind}' con ID {id}.")]
    NotFound { kind: EntityKind, id: i64 },

    /// Required values are missing or values have the wrong shape
    #[error("{}", join_violations(.0))]
    ValidationFailed(Vec<FieldViolation>),

    /// Uniqueness or referential integrity rejected the write
    #[error(transparent)]
    ConstraintViolation(#[from] ConstraintViolation),

    /// Eager loading asked for an association the kind does not declare
    #[error("La entidad '{kind}' no tiene una asociación llamada '{alias}'.")]
    UnknownRelation { kind: EntityKind, alias: String },

    /// Backend failure unrelated to the data itself
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
}

impl EntityError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EntityError::NotFound { .. })
    }
}

/// One rejected column value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldViolation {
    #[error("notNull Violation: {entity}.{field} cannot be null")]
    Missing { entity: EntityKind, field: String },

    #[error("Validation error: {entity}.{field} must be {expected}")]
    WrongType {
        entity: EntityKind,
        field: String,
        expected: &'static str,
    },

    #[error("Validation error: {entity}.{field} exceeds {max} characters")]
    TooLong {
        entity: EntityKind,
        field: String,
        max: usize,
    },

    #[error("Validation error: {entity}.{field} must be one of [{allowed}]")]
    NotAllowed {
        entity: EntityKind,
        field: String,
        allowed: String,
    },

    #[error("Validation error: {entity}.{field} is not a column of {entity}")]
    UnknownColumn { entity: EntityKind, field: String },

    /// Rejection reported by the database without column detail
    #[error("Validation error: {0}")]
    Rejected(String),
}

/// Integrity rule enforced by the storage layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintViolation {
    #[error("Validation error: {entity}.{field} must be unique")]
    Unique { entity: EntityKind, field: String },

    #[error("Foreign key constraint error: {entity}.{field} references a missing {target} (ID {id})")]
    MissingReference {
        entity: EntityKind,
        field: String,
        target: EntityKind,
        id: i64,
    },

    #[error("Foreign key constraint error: {entity} with ID {id} is still referenced by {referrer}.{field}")]
    StillReferenced {
        entity: EntityKind,
        id: i64,
        referrer: EntityKind,
        field: String,
    },

    /// Constraint reported by the database in its own words
    #[error("Constraint error: {0}")]
    Database(String),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",\n")
}
