use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind, HasMany};

pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::Rol,
    primary_key: "RolID",
    fields: &[
        FieldDef::required("NombreRol", FieldType::String { max: 255 }).unique(),
        FieldDef::optional("Descripcion", FieldType::Text),
    ],
    has_many: &[HasMany {
        alias: "Usuarios",
        target: EntityKind::Usuario,
        foreign_key: "RolID",
    }],
};
