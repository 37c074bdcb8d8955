//! Gamefleet RBAC
//!
//! The authorization engine of the Gamefleet game-server fleet backend.
//! HTTP handlers ask it whether a user may use an ability, globally or on a
//! specific server, game or node; administrative endpoints use it to change
//! role and permission assignments.
//!
//! # Architecture
//!
//! - [`rbac`] - Domain model, storage contracts and the decision engine
//! - [`cache`] - TTL cache of resolved permission sets
//! - [`config`] - TOML + environment configuration
//! - [`logging`] - `log` backend setup
//!
//! Storage is supplied by the caller through [`rbac::Repository`] and
//! [`rbac::TransactionManager`].

pub mod cache;
pub mod config;
pub mod logging;
pub mod rbac;

pub use cache::{PermissionCache, ResolvedPermissions};
pub use config::GamefleetConfig;
pub use rbac::{
    Ability, AbilityName, Entity, EntityType, Permission, Rbac, RbacError, RbacResult, Repository,
    RestrictedRole, Role, Scope, TransactionManager,
};
