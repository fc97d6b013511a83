/// Entity registry
///
/// Maps every [`EntityKind`] to its storage definition plus the associations
/// wired by the associate step:
///
/// 1. every foreign-key column yields a belongs-to relation on its owner,
///    aliased with the referenced kind's name
/// 2. every declared has-many alias is checked against the foreign key it
///    names on the target
/// 3. every foreign key must be covered by a has-many on the referenced side
///
/// After step 3 each association can be followed in both directions. The
/// registry is built once at startup and shared immutably afterwards.
///
/// # Example
///
/// ```
/// use rectoria_shared::models::EntityKind;
/// use rectoria_shared::registry::{Registry, RelationKind};
///
/// let registry = Registry::new().unwrap();
/// let usuarios = registry.relation(EntityKind::Rol, "Usuarios").unwrap();
/// assert_eq!(usuarios.kind, RelationKind::HasMany);
/// assert_eq!(usuarios.target, EntityKind::Usuario);
/// ```

use crate::models::{EntityDef, EntityKind};

/// Error raised when the static definitions are inconsistent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{kind}.{alias} points at {target}.{foreign_key}, which does not reference {kind}")]
    DanglingAssociation {
        kind: EntityKind,
        alias: &'static str,
        target: EntityKind,
        foreign_key: &'static str,
    },

    #[error("{kind} declares the association alias {alias} twice")]
    DuplicateAlias { kind: EntityKind, alias: &'static str },

    #[error("{owner}.{foreign_key} references {target} but {target} declares no has-many for it")]
    MissingInverse {
        owner: EntityKind,
        foreign_key: &'static str,
        target: EntityKind,
    },
}

/// Direction of an association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Foreign key lives on the source; loads one record or null
    BelongsTo,

    /// Foreign key lives on the target; loads a list
    HasMany,
}

/// Association that can be eager-loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub alias: &'static str,
    pub kind: RelationKind,
    pub target: EntityKind,
    pub foreign_key: &'static str,
}

/// Registered entity: definition plus wired relations
#[derive(Debug)]
pub struct RegisteredEntity {
    pub def: &'static EntityDef,
    pub relations: Vec<Relation>,
}

/// Lookup table from kind to storage definition
#[derive(Debug)]
pub struct Registry {
    entities: Vec<RegisteredEntity>,
}

impl Registry {
    /// Registers every kind and runs the associate step
    pub fn new() -> Result<Self, RegistryError> {
        let mut entities: Vec<RegisteredEntity> = EntityKind::ALL
            .iter()
            .map(|kind| RegisteredEntity {
                def: kind.def(),
                relations: Vec::new(),
            })
            .collect();

        for entity in &mut entities {
            associate(entity)?;
        }

        let registry = Self { entities };
        registry.check_inverses()?;

        tracing::debug!(kinds = registry.entities.len(), "Entity registry built");
        Ok(registry)
    }

    pub fn entity(&self, kind: EntityKind) -> &RegisteredEntity {
        // Built from EntityKind::ALL, so every kind is present.
        self.entities
            .iter()
            .find(|entity| entity.def.kind == kind)
            .unwrap_or_else(|| unreachable!("{kind} missing from registry"))
    }

    pub fn def(&self, kind: EntityKind) -> &'static EntityDef {
        self.entity(kind).def
    }

    pub fn relations(&self, kind: EntityKind) -> &[Relation] {
        &self.entity(kind).relations
    }

    pub fn relation(&self, kind: EntityKind, alias: &str) -> Option<&Relation> {
        self.relations(kind).iter().find(|relation| relation.alias == alias)
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.entities.iter().map(|entity| entity.def.kind)
    }

    fn check_inverses(&self) -> Result<(), RegistryError> {
        for entity in &self.entities {
            for (field, target) in entity.def.foreign_keys() {
                let covered = self.relations(target).iter().any(|relation| {
                    relation.kind == RelationKind::HasMany
                        && relation.target == entity.def.kind
                        && relation.foreign_key == field.name
                });

                if !covered {
                    return Err(RegistryError::MissingInverse {
                        owner: entity.def.kind,
                        foreign_key: field.name,
                        target,
                    });
                }
            }
        }

        Ok(())
    }
}

fn associate(entity: &mut RegisteredEntity) -> Result<(), RegistryError> {
    let def = entity.def;

    for (field, target) in def.foreign_keys() {
        push_relation(
            entity,
            Relation {
                alias: target.name(),
                kind: RelationKind::BelongsTo,
                target,
                foreign_key: field.name,
            },
        )?;
    }

    for has_many in def.has_many {
        let points_back = has_many
            .target
            .def()
            .field(has_many.foreign_key)
            .and_then(|field| field.references)
            == Some(def.kind);

        if !points_back {
            return Err(RegistryError::DanglingAssociation {
                kind: def.kind,
                alias: has_many.alias,
                target: has_many.target,
                foreign_key: has_many.foreign_key,
            });
        }

        push_relation(
            entity,
            Relation {
                alias: has_many.alias,
                kind: RelationKind::HasMany,
                target: has_many.target,
                foreign_key: has_many.foreign_key,
            },
        )?;
    }

    Ok(())
}

fn push_relation(entity: &mut RegisteredEntity, relation: Relation) -> Result<(), RegistryError> {
    if entity.relations.iter().any(|existing| existing.alias == relation.alias) {
        return Err(RegistryError::DuplicateAlias {
            kind: entity.def.kind,
            alias: relation.alias,
        });
    }

    entity.relations.push(relation);
    Ok(())
}
