use serde::{Deserialize, Serialize};

/// Season-type id the provider assigns to the "Aired Order" variant.
/// Reconciliation prefers this variant when collapsing duplicate seasons.
pub const AIRED_ORDER_SEASON_TYPE_ID: i32 = 1;

/// Credit role, matching the `role_type` database enum.
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::RoleType"]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    Actor,
    Director,
    Writer,
    Producer,
    ExecutiveProducer,
    Crew,
}

impl RoleType {
    /// Map the provider's role label ("Actor", "Executive Producer", ...)
    /// onto the local enum. Anything unrecognized is generic crew.
    pub fn from_people_type(label: Option<&str>) -> Self {
        match label {
            Some("Actor") => RoleType::Actor,
            Some("Director") => RoleType::Director,
            Some("Writer") => RoleType::Writer,
            Some("Producer") => RoleType::Producer,
            Some("Executive Producer") => RoleType::ExecutiveProducer,
            _ => RoleType::Crew,
        }
    }

    /// The provider-facing label, the inverse of `from_people_type`.
    pub fn to_people_type(self) -> &'static str {
        match self {
            RoleType::Actor => "Actor",
            RoleType::Director => "Director",
            RoleType::Writer => "Writer",
            RoleType::Producer => "Producer",
            RoleType::ExecutiveProducer => "Executive Producer",
            RoleType::Crew => "Crew",
        }
    }
}

/// Storage discriminator for the polymorphic alias table.
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::AliasEntityType"]
#[serde(rename_all = "lowercase")]
pub enum AliasEntityKind {
    Content,
    Person,
}

/// Who an alias belongs to. The table keeps a flat (entity_type, entity_id)
/// pair; the domain keeps the pairing type-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasOwner {
    Title(i32),
    Person(i32),
}

impl AliasOwner {
    pub fn entity_kind(&self) -> AliasEntityKind {
        match self {
            AliasOwner::Title(_) => AliasEntityKind::Content,
            AliasOwner::Person(_) => AliasEntityKind::Person,
        }
    }

    pub fn entity_id(&self) -> i32 {
        match self {
            AliasOwner::Title(id) | AliasOwner::Person(id) => *id,
        }
    }

    pub fn from_parts(kind: AliasEntityKind, entity_id: i32) -> Self {
        match kind {
            AliasEntityKind::Content => AliasOwner::Title(entity_id),
            AliasEntityKind::Person => AliasOwner::Person(entity_id),
        }
    }
}
