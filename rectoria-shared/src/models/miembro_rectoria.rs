use super::field::{FieldDef, FieldType};
use super::{EntityDef, EntityKind, HasMany};

const NAME: FieldType = FieldType::String { max: 255 };

pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::MiembroRectoria,
    primary_key: "MiembroRectoriaID",
    fields: &[
        FieldDef::optional("PuestoID", FieldType::Integer).references(EntityKind::Puesto),
        FieldDef::optional("TelefonoDepartamentoID", FieldType::Integer)
            .references(EntityKind::TelefonoDepartamento),
        FieldDef::required("Nombre", NAME),
        FieldDef::required("PrimerApellido", NAME),
        FieldDef::optional("SegundoApellido", NAME),
        FieldDef::required("Correo", NAME),
        FieldDef::optional("Celular", NAME),
        FieldDef::optional("Extension", NAME),
    ],
    has_many: &[
        HasMany {
            alias: "Disponibilidad",
            target: EntityKind::Disponibilidad,
            foreign_key: "MiembroRectoriaID",
        },
        HasMany {
            alias: "CambioDisponibilidad",
            target: EntityKind::CambioDisponibilidad,
            foreign_key: "MiembroRectoriaID",
        },
    ],
};
