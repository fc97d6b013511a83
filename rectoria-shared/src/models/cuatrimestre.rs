use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind, HasMany};

/// Academic periods within a year
pub const PERIODS: &[&str] = &["1", "2", "3"];

pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::Cuatrimestre,
    primary_key: "CuatrimestreID",
    fields: &[
        FieldDef::required("Anho", FieldType::Integer),
        FieldDef::required("Periodo", FieldType::Enum(PERIODS)),
    ],
    has_many: &[
        HasMany {
            alias: "Disponibilidades",
            target: EntityKind::Disponibilidad,
            foreign_key: "CuatrimestreID",
        },
        HasMany {
            alias: "CambiosDisponibilidad",
            target: EntityKind::CambioDisponibilidad,
            foreign_key: "CuatrimestreID",
        },
    ],
};
