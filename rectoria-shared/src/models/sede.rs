use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind, HasMany};

pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::Sede,
    primary_key: "SedeID",
    fields: &[FieldDef::required("Nombre", FieldType::String { max: 255 })],
    has_many: &[HasMany {
        alias: "Disponibilidades",
        target: EntityKind::Disponibilidad,
        foreign_key: "SedeID",
    }],
};
