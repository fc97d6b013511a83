use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind};

/// Recurring weekly slot
pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::Disponibilidad,
    primary_key: "DisponibilidadID",
    fields: &[
        FieldDef::required("MiembroRectoriaID", FieldType::Integer)
            .references(EntityKind::MiembroRectoria),
        FieldDef::required("CuatrimestreID", FieldType::Integer).references(EntityKind::Cuatrimestre),
        FieldDef::required("DiaID", FieldType::Integer).references(EntityKind::Dia),
        FieldDef::optional("SedeID", FieldType::Integer).references(EntityKind::Sede),
        FieldDef::required("ActividadID", FieldType::Integer).references(EntityKind::Actividad),
        FieldDef::optional("Ubicacion", FieldType::String { max: 255 }),
        FieldDef::required("HoraInicio", FieldType::Time),
        FieldDef::required("HoraFinal", FieldType::Time),
    ],
    has_many: &[],
};
