use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind, HasMany};

pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::Actividad,
    primary_key: "ActividadID",
    fields: &[
        FieldDef::required("Nombre", FieldType::String { max: 255 }),
        FieldDef::optional("Descripcion", FieldType::String { max: 255 }),
        FieldDef::required("Disponible", FieldType::Boolean),
    ],
    has_many: &[
        HasMany {
            alias: "Disponibilidades",
            target: EntityKind::Disponibilidad,
            foreign_key: "ActividadID",
        },
        HasMany {
            alias: "CambiosDisponibilidad",
            target: EntityKind::CambioDisponibilidad,
            foreign_key: "ActividadID",
        },
    ],
};
