use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind};

/// One-off override of a member's availability
pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::CambioDisponibilidad,
    primary_key: "CambioDisponibilidadID",
    fields: &[
        FieldDef::required("MiembroRectoriaID", FieldType::Integer)
            .references(EntityKind::MiembroRectoria),
        FieldDef::required("CuatrimestreID", FieldType::Integer).references(EntityKind::Cuatrimestre),
        FieldDef::required("ActividadID", FieldType::Integer).references(EntityKind::Actividad),
        FieldDef::optional("Ubicacion", FieldType::String { max: 255 }),
        FieldDef::required("FechaHoraInicio", FieldType::DateTime),
        FieldDef::required("FechaHoraFinal", FieldType::DateTime),
    ],
    has_many: &[],
};
