use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind, HasMany};

pub const WEEKDAYS: &[&str] = &[
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::Dia,
    primary_key: "DiaID",
    fields: &[FieldDef::required("Nombre", FieldType::Enum(WEEKDAYS))],
    // Lowercase alias kept for existing clients.
    has_many: &[HasMany {
        alias: "disponibilidades",
        target: EntityKind::Disponibilidad,
        foreign_key: "DiaID",
    }],
};
