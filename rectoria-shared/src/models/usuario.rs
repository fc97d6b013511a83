use super::field::{FieldDef, FieldDefault, FieldType};
use super::{EntityDef, EntityKind};

// Password hashing happens before values reach this layer.
pub(super) static DEF: EntityDef = EntityDef {
    kind: EntityKind::Usuario,
    primary_key: "UsuarioID",
    fields: &[
        FieldDef::required("NombreUsuario", FieldType::String { max: 255 }).unique(),
        FieldDef::required("HashContraseña", FieldType::String { max: 255 }),
        FieldDef::required("Correo", FieldType::String { max: 255 }).unique(),
        FieldDef::optional("RolID", FieldType::Integer).references(EntityKind::Rol),
        FieldDef::optional("UltimoInicioSesion", FieldType::DateTime),
        FieldDef::required("Activo", FieldType::Boolean).default_value(FieldDefault::Bool(true)),
    ],
    has_many: &[],
};
