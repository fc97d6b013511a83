use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind, HasMany};

pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::TelefonoDepartamento,
    primary_key: "TelefonoDepartamentoID",
    fields: &[FieldDef::required("Telefono", FieldType::String { max: 255 })],
    has_many: &[HasMany {
        alias: "MiembrosRectoria",
        target: EntityKind::MiembroRectoria,
        foreign_key: "TelefonoDepartamentoID",
    }],
};
