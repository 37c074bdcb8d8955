//! Domain model for the RBAC engine
//!
//! Subjects (users, roles) and targets (servers, games, nodes) share one
//! identification scheme: an [`Entity`] pairs a closed [`EntityType`] with a
//! numeric ID. An ability's optional scoping is expressed as a [`Scope`], so an
//! entity ID can never exist without its entity type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a subject or target entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Role,
    Server,
    Game,
    Node,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Server => "server",
            Self::Game => "game",
            Self::Node => "node",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed entity reference: `(kind, id)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityType,
    pub id: u64,
}

impl Entity {
    pub fn new(kind: EntityType, id: u64) -> Self {
        Self { kind, id }
    }

    pub fn user(id: u64) -> Self {
        Self::new(EntityType::User, id)
    }

    pub fn role(id: u64) -> Self {
        Self::new(EntityType::Role, id)
    }

    pub fn server(id: u64) -> Self {
        Self::new(EntityType::Server, id)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// How far an ability (or a role restriction) reaches
///
/// `Global` on an ability means "not tied to any resource". On a role
/// assignment it means the role is unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Global,
    /// Every entity of one kind, e.g. all servers
    Kind { kind: EntityType },
    /// Exactly one entity
    Instance { entity: Entity },
}

impl Scope {
    pub fn kind(kind: EntityType) -> Self {
        Self::Kind { kind }
    }

    pub fn instance(entity: Entity) -> Self {
        Self::Instance { entity }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            Self::Global => None,
            Self::Kind { kind } => Some(*kind),
            Self::Instance { entity } => Some(entity.kind),
        }
    }

    pub fn entity_id(&self) -> Option<u64> {
        match self {
            Self::Instance { entity } => Some(entity.id),
            _ => None,
        }
    }

    /// Whether an ability with this scope applies to `target`.
    pub fn covers(&self, target: Entity) -> bool {
        match self {
            Self::Global => true,
            Self::Kind { kind } => *kind == target.kind,
            Self::Instance { entity } => *entity == target,
        }
    }
}

/// Returned when parsing an unknown ability token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ability name: {0}")]
pub struct UnknownAbilityError(pub String);

macro_rules! ability_names {
    ($($variant:ident => $token:literal),+ $(,)?) => {
        /// Enumerated capability tokens understood by the fleet backend
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum AbilityName {
            $($variant),+
        }

        impl AbilityName {
            pub const ALL: &'static [AbilityName] = &[$(AbilityName::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl FromStr for AbilityName {
            type Err = UnknownAbilityError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok(Self::$variant),)+
                    other => Err(UnknownAbilityError(other.to_string())),
                }
            }
        }
    };
}

ability_names! {
    AdminRolesPermissions => "admin.roles-permissions",
    View => "view",
    Edit => "edit",
    Delete => "delete",
    GameServerCommon => "game-server-common",
    GameServerStart => "game-server-start",
    GameServerStop => "game-server-stop",
    GameServerRestart => "game-server-restart",
    GameServerPause => "game-server-pause",
    GameServerUpdate => "game-server-update",
    GameServerFiles => "game-server-files",
    GameServerTasks => "game-server-tasks",
    GameServerSettings => "game-server-settings",
    GameServerConsoleView => "game-server-console-view",
    GameServerConsoleSend => "game-server-console-send",
    GameServerRconConsole => "game-server-rcon-console",
    GameServerRconPlayers => "game-server-rcon-players",
}

impl fmt::Display for AbilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AbilityName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AbilityName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

/// A named capability, optionally scoped to a resource
///
/// Abilities handed to `Repository::allow`/`forbid`/`revoke` are matched by
/// `(name, scope)`; their `id` is ignored and may be 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ability {
    pub id: u64,
    pub name: AbilityName,
    pub scope: Scope,
}

impl Ability {
    pub fn new(name: AbilityName, scope: Scope) -> Self {
        Self { id: 0, name, scope }
    }

    pub fn global(name: AbilityName) -> Self {
        Self::new(name, Scope::Global)
    }

    pub fn for_entity(name: AbilityName, entity: Entity) -> Self {
        Self::new(name, Scope::instance(entity))
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }
}

/// A grant (or explicit denial) of one ability to one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: u64,
    pub ability_id: u64,
    /// The user or role holding this permission
    pub subject: Entity,
    pub forbidden: bool,
    /// Joined ability record; permissions without one are unusable
    pub ability: Option<Ability>,
}

impl Permission {
    pub fn allow(subject: Entity, ability: Ability) -> Self {
        Self { id: 0, ability_id: ability.id, subject, forbidden: false, ability: Some(ability) }
    }

    pub fn forbid(subject: Entity, ability: Ability) -> Self {
        Self { forbidden: true, ..Self::allow(subject, ability) }
    }
}

/// A named bundle of permissions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
}

impl Role {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Binding of a role to a subject, optionally narrowed to a scope
///
/// `restricted_to == Scope::Global` means the role applies unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestrictedRole {
    pub subject: Entity,
    pub role_id: u64,
    pub restricted_to: Scope,
}

impl RestrictedRole {
    pub fn new(subject: Entity, role_id: u64) -> Self {
        Self { subject, role_id, restricted_to: Scope::Global }
    }

    pub fn restricted_to(mut self, scope: Scope) -> Self {
        self.restricted_to = scope;
        self
    }
}
