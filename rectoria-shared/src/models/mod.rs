/// Entity definitions for the scheduling backend
///
/// Every persistent record type is one variant of [`EntityKind`]. Each kind
/// owns a static [`EntityDef`] describing its table, primary key, columns and
/// declared has-many associations. Belongs-to associations are derived from
/// foreign-key columns when the [`Registry`](crate::registry::Registry) is built.
///
/// # Kinds
///
/// - `rol`: roles assigned to users
/// - `usuario`: application user accounts
/// - `puesto`: positions held by members
/// - `telefono_departamento`: department phone lines
/// - `miembro_rectoria`: institutional members whose availability is tracked
/// - `cuatrimestre`: academic quarters (year + period)
/// - `dia`: weekdays
/// - `sede`: venues
/// - `actividad`: activities
/// - `disponibilidad`: recurring weekly availability slots
/// - `cambio_disponibilidad`: one-off availability overrides
///
/// # Example
///
/// ```
/// use rectoria_shared::models::EntityKind;
///
/// let kind: EntityKind = "Rol".parse().unwrap();
/// assert_eq!(kind.def().primary_key, "RolID");
/// assert!("Desconocido".parse::<EntityKind>().is_err());
/// ```

pub mod field;

mod actividad;
mod cambio_disponibilidad;
mod cuatrimestre;
mod dia;
mod disponibilidad;
mod miembro_rectoria;
mod puesto;
mod rol;
mod sede;
mod telefono_departamento;
mod usuario;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{EntityError, FieldViolation};
pub use field::{FieldDef, FieldDefault, FieldType};

/// Plain snapshot of a record's column values
pub type Record = Map<String, Value>;

/// Column set automatically on insert
pub const CREATED_AT: &str = "FechaCreacion";

/// Column set automatically on insert and update
pub const UPDATED_AT: &str = "FechaActualizacion";

static PRIMARY_KEY_TYPE: FieldType = FieldType::Integer;
static TIMESTAMP_TYPE: FieldType = FieldType::DateTime;

/// Closed set of entity kinds
///
/// [`EntityKind::ALL`] lists the kinds in dependency order: every kind comes
/// after the kinds its foreign keys reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Rol,
    Usuario,
    Puesto,
    TelefonoDepartamento,
    MiembroRectoria,
    Cuatrimestre,
    Dia,
    Sede,
    Actividad,
    Disponibilidad,
    CambioDisponibilidad,
}

impl EntityKind {
    /// All kinds, referenced tables first
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Rol,
        EntityKind::Usuario,
        EntityKind::Puesto,
        EntityKind::TelefonoDepartamento,
        EntityKind::MiembroRectoria,
        EntityKind::Cuatrimestre,
        EntityKind::Dia,
        EntityKind::Sede,
        EntityKind::Actividad,
        EntityKind::Disponibilidad,
        EntityKind::CambioDisponibilidad,
    ];

    /// Canonical kind name, also used as the table name
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Rol => "Rol",
            EntityKind::Usuario => "Usuario",
            EntityKind::Puesto => "Puesto",
            EntityKind::TelefonoDepartamento => "TelefonoDepartamento",
            EntityKind::MiembroRectoria => "MiembroRectoria",
            EntityKind::Cuatrimestre => "Cuatrimestre",
            EntityKind::Dia => "Dia",
            EntityKind::Sede => "Sede",
            EntityKind::Actividad => "Actividad",
            EntityKind::Disponibilidad => "Disponibilidad",
            EntityKind::CambioDisponibilidad => "CambioDisponibilidad",
        }
    }

    /// Static schema definition for this kind
    pub fn def(&self) -> &'static EntityDef {
        match self {
            EntityKind::Rol => &rol::DEF,
            EntityKind::Usuario => &usuario::DEF,
            EntityKind::Puesto => &puesto::DEF,
            EntityKind::TelefonoDepartamento => &telefono_departamento::DEF,
            EntityKind::MiembroRectoria => &miembro_rectoria::DEF,
            EntityKind::Cuatrimestre => &cuatrimestre::DEF,
            EntityKind::Dia => &dia::DEF,
            EntityKind::Sede => &sede::DEF,
            EntityKind::Actividad => &actividad::DEF,
            EntityKind::Disponibilidad => &disponibilidad::DEF,
            EntityKind::CambioDisponibilidad => &cambio_disponibilidad::DEF,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EntityError::UnknownEntityKind(s.to_string()))
    }
}

/// Has-many association declared on the owning side
#[derive(Debug, Clone, Copy)]
pub struct HasMany {
    /// Name used to eager-load the association
    pub alias: &'static str,

    /// Kind holding the foreign key
    pub target: EntityKind,

    /// Foreign-key column on the target
    pub foreign_key: &'static str,
}

/// Storage definition of one entity kind
#[derive(Debug)]
pub struct EntityDef {
    pub kind: EntityKind,

    /// Auto-generated integer primary key column
    pub primary_key: &'static str,

    /// Caller-writable columns, in declaration order
    pub fields: &'static [FieldDef],

    pub has_many: &'static [HasMany],
}

impl EntityDef {
    pub fn table(&self) -> &'static str {
        self.kind.name()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Type of any column, including the primary key and timestamps
    pub fn column_type(&self, name: &str) -> Option<&'static FieldType> {
        if name == self.primary_key {
            Some(&PRIMARY_KEY_TYPE)
        } else if name == CREATED_AT || name == UPDATED_AT {
            Some(&TIMESTAMP_TYPE)
        } else {
            self.field(name).map(|field| &field.ty)
        }
    }

    /// Foreign-key columns of this kind as `(field, referenced kind)`
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&'static FieldDef, EntityKind)> {
        self.fields
            .iter()
            .filter_map(|field| field.references.map(|target| (field, target)))
    }

    /// Normalizes caller data for an insert
    ///
    /// Unknown keys, the primary key and timestamps are dropped. Absent
    /// fields take their default; non-nullable fields left without a value
    /// are reported together with any type violations.
    pub fn prepare_insert(&self, data: &Record) -> Result<Record, EntityError> {
        let mut values = Record::new();
        let mut violations = Vec::new();

        for field in self.fields {
            let supplied = data.get(field.name).filter(|value| !value.is_null());
            let value = match (supplied, field.default) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.to_value(),
                (None, None) => Value::Null,
            };

            match self.check_value(field, &value) {
                Ok(normalized) => {
                    values.insert(field.name.to_string(), normalized);
                }
                Err(violation) => violations.push(violation),
            }
        }

        if violations.is_empty() {
            Ok(values)
        } else {
            Err(EntityError::ValidationFailed(violations))
        }
    }

    /// Normalizes the supplied subset of fields for an update
    pub fn prepare_update(&self, data: &Record) -> Result<Record, EntityError> {
        let mut changes = Record::new();
        let mut violations = Vec::new();

        for field in self.fields {
            let Some(value) = data.get(field.name) else {
                continue;
            };

            match self.check_value(field, value) {
                Ok(normalized) => {
                    changes.insert(field.name.to_string(), normalized);
                }
                Err(violation) => violations.push(violation),
            }
        }

        if violations.is_empty() {
            Ok(changes)
        } else {
            Err(EntityError::ValidationFailed(violations))
        }
    }

    /// Normalizes an equality filter against this kind's columns
    pub fn prepare_filter(&self, filter: &Filter) -> Result<Filter, EntityError> {
        let mut prepared = Filter::new();
        let mut violations = Vec::new();

        for (column, value) in filter.iter() {
            let Some(ty) = self.column_type(column) else {
                violations.push(FieldViolation::UnknownColumn {
                    entity: self.kind,
                    field: column.clone(),
                });
                continue;
            };

            if value.is_null() {
                prepared = prepared.eq(column.clone(), Value::Null);
                continue;
            }

            match ty.normalize(self.kind, column, value) {
                Ok(normalized) => prepared = prepared.eq(column.clone(), normalized),
                Err(violation) => violations.push(violation),
            }
        }

        if violations.is_empty() {
            Ok(prepared)
        } else {
            Err(EntityError::ValidationFailed(violations))
        }
    }

    fn check_value(&self, field: &FieldDef, value: &Value) -> Result<Value, FieldViolation> {
        if value.is_null() {
            return if field.nullable {
                Ok(Value::Null)
            } else {
                Err(FieldViolation::Missing {
                    entity: self.kind,
                    field: field.name.to_string(),
                })
            };
        }

        field.ty.normalize(self.kind, field.name, value)
    }
}

/// Equality filter for listing records
///
/// An empty filter matches every record. A `null` value matches records
/// whose column is null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Checks a snapshot against every condition
    pub fn matches(&self, record: &Record) -> bool {
        self.0
            .iter()
            .all(|(column, expected)| record.get(column).unwrap_or(&Value::Null) == expected)
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
