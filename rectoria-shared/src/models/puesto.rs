use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind, HasMany};

pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::Puesto,
    primary_key: "PuestoID",
    fields: &[FieldDef::required("Nombre", FieldType::String { max: 255 })],
    has_many: &[HasMany {
        alias: "MiembrosRectoria",
        target: EntityKind::MiembroRectoria,
        foreign_key: "PuestoID",
    }],
};
