//! Storage contracts consumed by the RBAC engine

use crate::rbac::types::{Ability, Entity, Permission, RestrictedRole, Role};
use anyhow::Result;
use futures::future::BoxFuture;

/// Read/write access to roles, permissions and role assignments
///
/// Implement this trait to back the engine with a real store (SQL, KV, ...).
/// All methods may block on I/O; cancellation is the caller dropping the future.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// The full role catalog
    async fn get_roles(&self) -> Result<Vec<Role>>;

    /// Permissions held directly by `subject`, with their abilities joined
    async fn get_permissions(&self, subject: Entity) -> Result<Vec<Permission>>;

    /// Role assignments of `subject`
    async fn get_roles_for_entity(&self, subject: Entity) -> Result<Vec<RestrictedRole>>;

    async fn assign_roles_for_entity(&self, subject: Entity, roles: &[RestrictedRole]) -> Result<()>;

    async fn clear_roles_for_entity(&self, subject: Entity) -> Result<()>;

    /// Grant `abilities`, creating ability records as needed
    async fn allow(&self, subject: Entity, abilities: &[Ability]) -> Result<()>;

    /// Store explicit denials of `abilities`
    async fn forbid(&self, subject: Entity, abilities: &[Ability]) -> Result<()>;

    /// Delete the subject's permissions for `abilities`, granted or forbidden
    async fn revoke(&self, subject: Entity, abilities: &[Ability]) -> Result<()>;
}

/// Unit-of-work boundary for multi-step mutations
#[async_trait::async_trait]
pub trait TransactionManager: Send + Sync {
    /// Run `work` inside a transaction.
    ///
    /// When `work` fails the transaction must be rolled back and the error
    /// returned unchanged.
    async fn run<'a>(&self, work: BoxFuture<'a, Result<()>>) -> Result<()>;
}
