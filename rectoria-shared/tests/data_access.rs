/// Integration tests for the generic data access layer
///
/// Run against `MemoryStore`, so no database is needed:
/// cargo test -p rectoria-shared --test data_access

use std::sync::Arc;

use rectoria_shared::data_access::DataAccess;
use rectoria_shared::error::{ConstraintViolation, EntityError};
use rectoria_shared::models::{EntityKind, Filter, Record};
use rectoria_shared::registry::Registry;
use rectoria_shared::store::MemoryStore;
use serde_json::{json, Value};

fn data_access() -> DataAccess {
    DataAccess::new(
        Arc::new(Registry::new().expect("registry should build")),
        Arc::new(MemoryStore::new()),
    )
}

fn record(value: Value) -> Record {
    value.as_object().cloned().expect("test data must be an object")
}

async fn create_member(data: &DataAccess) -> i64 {
    let member = data
        .create(
            "MiembroRectoria",
            &record(json!({"Nombre": "Ana", "PrimerApellido": "Mora", "Correo": "ana@una.cr"})),
        )
        .await
        .unwrap();
    member["MiembroRectoriaID"].as_i64().unwrap()
}

#[tokio::test]
async fn test_read_returns_requested_id() {
    let data = data_access();
    for name in ["Liberia", "Nicoya", "Santa Cruz"] {
        data.create("Sede", &record(json!({"Nombre": name}))).await.unwrap();
    }

    for id in 1..=3 {
        let sede = data.read("Sede", id).await.unwrap();
        assert_eq!(sede["SedeID"], json!(id));
    }
}

#[tokio::test]
async fn test_read_missing_id() {
    let data = data_access();

    for id in [0, 4, 999999] {
        let err = data.read("Rol", id).await.unwrap_err();
        assert!(err.is_not_found());

        let message = err.to_string();
        assert!(message.contains(&format!("No se encontró la entidad 'Rol' con ID {id}.")));
        assert_eq!(
            message,
            format!("Error al leer la entidad 'Rol' con ID {id}: No se encontró la entidad 'Rol' con ID {id}.")
        );
    }
}

#[tokio::test]
async fn test_create_role_and_duplicate_name() {
    let data = data_access();

    let role = data
        .create(
            "Rol",
            &record(json!({"NombreRol": "Admin", "Descripcion": "Administrator role"})),
        )
        .await
        .unwrap();
    assert_eq!(role["NombreRol"], json!("Admin"));
    assert_eq!(role["Descripcion"], json!("Administrator role"));
    assert!(role["RolID"].is_i64());
    assert!(role["FechaCreacion"].is_string());
    assert!(role["FechaActualizacion"].is_string());

    let err = data
        .create("Rol", &record(json!({"NombreRol": "Admin"})))
        .await
        .unwrap_err();
    assert!(matches!(
        err.cause(),
        EntityError::ConstraintViolation(ConstraintViolation::Unique { .. })
    ));
    assert_eq!(
        err.to_string(),
        "Error general al crear la entidad 'Rol': Validation error: Rol.NombreRol must be unique"
    );
}

#[tokio::test]
async fn test_create_reports_every_missing_field() {
    let data = data_access();
    let err = data
        .create("Usuario", &record(json!({"NombreUsuario": "ana"})))
        .await
        .unwrap_err();

    let EntityError::ValidationFailed(violations) = err.cause() else {
        panic!("expected a validation failure, got {err}");
    };
    assert_eq!(violations.len(), 2);
    assert!(err.to_string().contains("notNull Violation: Usuario.HashContraseña cannot be null"));
    assert!(err.to_string().contains("notNull Violation: Usuario.Correo cannot be null"));
}

#[tokio::test]
async fn test_create_applies_defaults_and_ignores_managed_columns() {
    let data = data_access();
    let user = data
        .create(
            "Usuario",
            &record(json!({
                "UsuarioID": 50,
                "NombreUsuario": "ana",
                "HashContraseña": "hash",
                "Correo": "ana@una.cr",
                "FechaCreacion": "1999-01-01",
                "Apodo": "Anita"
            })),
        )
        .await
        .unwrap();

    assert_eq!(user["UsuarioID"], json!(1));
    assert_eq!(user["Activo"], json!(true));
    assert_eq!(user["RolID"], Value::Null);
    assert_ne!(user["FechaCreacion"], json!("1999-01-01"));
    assert!(user.get("Apodo").is_none());
}

#[tokio::test]
async fn test_create_with_missing_reference() {
    let data = data_access();
    let err = data
        .create(
            "Usuario",
            &record(json!({"NombreUsuario": "ana", "HashContraseña": "x", "Correo": "a@b.cr", "RolID": 42})),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        EntityError::ConstraintViolation(ConstraintViolation::MissingReference { .. })
    ));
}

#[tokio::test]
async fn test_list_activities_by_availability() {
    let data = data_access();
    let activities = [
        ("Reunión", true),
        ("Vacaciones", false),
        ("Gira", true),
        ("Capacitación", false),
        ("Consejo", true),
    ];
    for (name, available) in activities {
        data.create("Actividad", &record(json!({"Nombre": name, "Disponible": available})))
            .await
            .unwrap();
    }

    let available = data
        .list("Actividad", &Filter::new().eq("Disponible", true))
        .await
        .unwrap();
    let names: Vec<&Value> = available.iter().map(|activity| &activity["Nombre"]).collect();
    assert_eq!(names, vec![&json!("Reunión"), &json!("Gira"), &json!("Consejo")]);
    assert!(available.iter().all(|activity| activity["Disponible"] == json!(true)));

    let all = data.list("Actividad", &Filter::new()).await.unwrap();
    assert_eq!(all.len(), activities.len());
    let ids: Vec<i64> = all.iter().map(|a| a["ActividadID"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_list_empty_kind() {
    let data = data_access();
    let roles = data.list(EntityKind::Rol, &Filter::new()).await.unwrap();
    assert!(roles.is_empty());
}

#[tokio::test]
async fn test_list_filter_values_are_normalized() {
    let data = data_access();
    data.create("Cuatrimestre", &record(json!({"Anho": 2024, "Periodo": "1"})))
        .await
        .unwrap();
    data.create("Cuatrimestre", &record(json!({"Anho": "2025", "Periodo": 2})))
        .await
        .unwrap();

    let found = data
        .list("Cuatrimestre", &Filter::new().eq("Anho", "2025"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["Periodo"], json!("2"));
}

#[tokio::test]
async fn test_update_round_trip() {
    let data = data_access();
    let role = data
        .create("Rol", &record(json!({"NombreRol": "Admin", "Descripcion": "Administrator role"})))
        .await
        .unwrap();
    let id = role["RolID"].as_i64().unwrap();

    let updated = data
        .update("Rol", id, &record(json!({"NombreRol": "X"})))
        .await
        .unwrap();
    assert_eq!(updated["NombreRol"], json!("X"));
    assert_eq!(updated["Descripcion"], json!("Administrator role"));

    let read = data.read("Rol", id).await.unwrap();
    assert_eq!(read["NombreRol"], json!("X"));
    assert_eq!(read["FechaCreacion"], role["FechaCreacion"]);
}

#[tokio::test]
async fn test_update_missing_record() {
    let data = data_access();
    let err = data
        .update("Rol", 999999, &record(json!({"NombreRol": "X"})))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Error al modificar la entidad 'Rol': No se encontró la entidad 'Rol' con ID 999999."
    );
}

#[tokio::test]
async fn test_delete_then_read() {
    let data = data_access();
    let user = data
        .create(
            "Usuario",
            &record(json!({"NombreUsuario": "ana", "HashContraseña": "x", "Correo": "ana@una.cr"})),
        )
        .await
        .unwrap();
    let id = user["UsuarioID"].as_i64().unwrap();

    data.delete("Usuario", id).await.unwrap();

    let err = data.read("Usuario", id).await.unwrap_err();
    assert!(err.is_not_found());

    let err = data.delete("Usuario", id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Error al eliminar la entidad 'Usuario': No se encontró la entidad 'Usuario' con ID {id}.")
    );
}

#[tokio::test]
async fn test_unknown_kind_messages() {
    let data = data_access();

    let err = data.read("InvalidType", 1).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error al leer la entidad 'InvalidType' con ID 1: Tipo de entidad 'InvalidType' no válido."
    );

    let err = data.list("InvalidType", &Filter::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error al listar las entidades 'InvalidType': Tipo de entidad 'InvalidType' no válido."
    );

    let err = data.create("InvalidType", &Record::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error general al crear la entidad 'InvalidType': Tipo de entidad 'InvalidType' no válido."
    );

    let err = data.update("InvalidType", 1, &Record::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error al modificar la entidad 'InvalidType': Tipo de entidad 'InvalidType' no válido."
    );

    let err = data.delete("InvalidType", 1).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error al eliminar la entidad 'InvalidType': Tipo de entidad 'InvalidType' no válido."
    );
}

#[tokio::test]
async fn test_enum_values_keep_diacritics() {
    let data = data_access();

    let day = data.create("Dia", &record(json!({"Nombre": "Miércoles"}))).await.unwrap();
    assert_eq!(day["Nombre"], json!("Miércoles"));

    let err = data
        .create("Dia", &record(json!({"Nombre": "Miercoles"})))
        .await
        .unwrap_err();
    assert!(matches!(err.cause(), EntityError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_eager_loading_both_directions() {
    let data = data_access();
    let member = create_member(&data).await;
    data.create("Cuatrimestre", &record(json!({"Anho": 2024, "Periodo": "1"})))
        .await
        .unwrap();
    data.create("Dia", &record(json!({"Nombre": "Lunes"}))).await.unwrap();
    data.create("Actividad", &record(json!({"Nombre": "Reunión", "Disponible": true})))
        .await
        .unwrap();

    for (start, end) in [("08:00", "10:00"), ("13:00", "15:30")] {
        data.create(
            "Disponibilidad",
            &record(json!({
                "MiembroRectoriaID": member,
                "CuatrimestreID": 1,
                "DiaID": 1,
                "ActividadID": 1,
                "HoraInicio": start,
                "HoraFinal": end
            })),
        )
        .await
        .unwrap();
    }

    let loaded = data
        .read_with("MiembroRectoria", member, &["Disponibilidad", "Puesto"])
        .await
        .unwrap();
    let slots = loaded["Disponibilidad"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["HoraInicio"], json!("08:00:00"));
    assert_eq!(slots[1]["HoraFinal"], json!("15:30:00"));
    assert_eq!(loaded["Puesto"], Value::Null);

    let slot = data
        .read_with("Disponibilidad", 1, &["MiembroRectoria", "Dia", "Sede"])
        .await
        .unwrap();
    assert_eq!(slot["MiembroRectoria"]["Nombre"], json!("Ana"));
    assert_eq!(slot["Dia"]["Nombre"], json!("Lunes"));
    assert_eq!(slot["Sede"], Value::Null);
}

#[tokio::test]
async fn test_role_users_association() {
    let data = data_access();
    data.create("Rol", &record(json!({"NombreRol": "admin"}))).await.unwrap();
    data.create(
        "Usuario",
        &record(json!({"NombreUsuario": "ana", "HashContraseña": "x", "Correo": "ana@una.cr", "RolID": 1})),
    )
    .await
    .unwrap();

    let role = data.read_with("Rol", 1, &["Usuarios"]).await.unwrap();
    assert_eq!(role["Usuarios"][0]["NombreUsuario"], json!("ana"));

    let user = data.read_with("Usuario", 1, &["Rol"]).await.unwrap();
    assert_eq!(user["Rol"]["NombreRol"], json!("admin"));
}

#[tokio::test]
async fn test_availability_change_datetimes() {
    let data = data_access();
    let member = create_member(&data).await;
    data.create("Cuatrimestre", &record(json!({"Anho": 2024, "Periodo": "3"})))
        .await
        .unwrap();
    data.create("Actividad", &record(json!({"Nombre": "Gira", "Disponible": false})))
        .await
        .unwrap();

    let change = data
        .create(
            "CambioDisponibilidad",
            &record(json!({
                "MiembroRectoriaID": member,
                "CuatrimestreID": 1,
                "ActividadID": 1,
                "Ubicacion": "Upala",
                "FechaHoraInicio": "2024-10-01 08:00:00",
                "FechaHoraFinal": "2024-10-01T17:00:00Z"
            })),
        )
        .await
        .unwrap();

    assert_eq!(change["FechaHoraInicio"], json!("2024-10-01T08:00:00.000Z"));
    assert_eq!(change["FechaHoraFinal"], json!("2024-10-01T17:00:00.000Z"));

    let member_changes = data
        .read_with("MiembroRectoria", member, &["CambioDisponibilidad"])
        .await
        .unwrap();
    assert_eq!(member_changes["CambioDisponibilidad"].as_array().unwrap().len(), 1);
}
