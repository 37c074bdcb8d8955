//! The RBAC engine
//!
//! Answers "may subject S use ability A (on entity E)?" by resolving S's
//! direct permissions together with those inherited through its roles, and
//! mutates role and permission assignments while keeping the cache coherent.

use crate::cache::{PermissionCache, ResolvedPermissions, DEFAULT_CLEANUP_INTERVAL};
use crate::config::RbacConfig;
use crate::rbac::decision;
use crate::rbac::errors::{RbacError, RbacResult};
use crate::rbac::resolve::{filter_by_restriction, group_by_ability};
use crate::rbac::traits::{Repository, TransactionManager};
use crate::rbac::types::{Ability, AbilityName, Entity, EntityType, RestrictedRole};
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Role-based access control engine
///
/// Cheap to share behind an `Arc`; all methods take `&self` and may run
/// concurrently. The engine owns exactly one [`PermissionCache`], stopped by
/// [`Rbac::close`] or on drop.
pub struct Rbac {
    tx: Arc<dyn TransactionManager>,
    repo: Arc<dyn Repository>,
    cache: PermissionCache,
}

impl Rbac {
    /// Create an engine caching resolved permissions for `cache_ttl`.
    ///
    /// A zero TTL disables caching. Must be called inside a Tokio runtime.
    pub fn new(
        tx: Arc<dyn TransactionManager>,
        repo: Arc<dyn Repository>,
        cache_ttl: Duration,
    ) -> Self {
        Self::with_cache(tx, repo, PermissionCache::with_cleanup_interval(cache_ttl, DEFAULT_CLEANUP_INTERVAL))
    }

    /// Create an engine from configuration
    pub fn from_config(
        tx: Arc<dyn TransactionManager>,
        repo: Arc<dyn Repository>,
        config: &RbacConfig,
    ) -> Self {
        let cache = PermissionCache::with_cleanup_interval(config.cache_ttl(), config.cleanup_interval());
        Self::with_cache(tx, repo, cache)
    }

    fn with_cache(tx: Arc<dyn TransactionManager>, repo: Arc<dyn Repository>, cache: PermissionCache) -> Self {
        log::debug!(
            "RBAC engine created (cache {})",
            if cache.is_enabled() { "enabled" } else { "disabled" }
        );
        Self { tx, repo, cache }
    }

    /// Read access to the permission cache
    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    /// Stop the cache sweep
    pub fn close(&self) {
        self.cache.close();
    }

    /// Drop the cached permissions of one user
    pub fn invalidate(&self, user_id: u64) {
        self.cache.delete(&Entity::user(user_id));
    }

    /// All permissions of a user, direct and role-inherited, grouped by ability.
    pub async fn get_permissions(&self, user_id: u64) -> RbacResult<ResolvedPermissions> {
        let subject = Entity::user(user_id);

        if let Some(cached) = self.cache.get(&subject) {
            log::debug!("Permission cache hit for {}", subject);
            return Ok(cached);
        }
        log::debug!("Permission cache miss for {}", subject);

        let mut permissions = self
            .repo
            .get_permissions(subject)
            .await
            .context("failed to get permissions for user")?;
        let direct_count = permissions.len();

        let roles = self
            .repo
            .get_roles_for_entity(subject)
            .await
            .context("failed to get roles for user")?;

        for assigned in &roles {
            let role_permissions = self
                .repo
                .get_permissions(Entity::role(assigned.role_id))
                .await
                .with_context(|| format!("failed to get permissions for role {}", assigned.role_id))?;
            permissions.extend(filter_by_restriction(role_permissions, assigned.restricted_to));
        }

        log::debug!(
            "Resolved {} permissions for {} ({} direct, {} roles)",
            permissions.len(),
            subject,
            direct_count,
            roles.len()
        );

        let resolved: ResolvedPermissions = Arc::new(group_by_ability(permissions));
        self.cache.set(subject, Arc::clone(&resolved));

        Ok(resolved)
    }

    /// Whether the user holds every one of `abilities` globally.
    pub async fn can(&self, user_id: u64, abilities: &[AbilityName]) -> RbacResult<bool> {
        let permissions = self.get_permissions(user_id).await?;
        Ok(decision::can(&permissions, abilities))
    }

    /// Whether the user holds at least one of `abilities` globally.
    pub async fn can_one_of(&self, user_id: u64, abilities: &[AbilityName]) -> RbacResult<bool> {
        let permissions = self.get_permissions(user_id).await?;
        Ok(decision::can_one_of(&permissions, abilities))
    }

    /// Whether the user holds every one of `abilities` for the given entity.
    pub async fn can_for_entity(
        &self,
        user_id: u64,
        entity_type: EntityType,
        entity_id: u64,
        abilities: &[AbilityName],
    ) -> RbacResult<bool> {
        let permissions = self.get_permissions(user_id).await?;
        Ok(decision::can_for_entity(&permissions, Entity::new(entity_type, entity_id), abilities))
    }

    /// Whether the user holds at least one of `abilities` for the given entity.
    pub async fn can_any_for_entity(
        &self,
        user_id: u64,
        entity_type: EntityType,
        entity_id: u64,
        abilities: &[AbilityName],
    ) -> RbacResult<bool> {
        let permissions = self.get_permissions(user_id).await?;
        Ok(decision::can_any_for_entity(&permissions, Entity::new(entity_type, entity_id), abilities))
    }

    /// Names of the roles currently assigned to the user. Never cached.
    pub async fn get_roles(&self, user_id: u64) -> RbacResult<Vec<String>> {
        let assigned = self
            .repo
            .get_roles_for_entity(Entity::user(user_id))
            .await
            .context("failed to get roles for user")?;

        let catalog: HashMap<u64, String> = self
            .repo
            .get_roles()
            .await
            .context("failed to get roles")?
            .into_iter()
            .map(|role| (role.id, role.name))
            .collect();

        let mut names = Vec::with_capacity(assigned.len());
        for role in assigned {
            match catalog.get(&role.role_id) {
                Some(name) => names.push(name.clone()),
                None => log::warn!("User {} is assigned unknown role {}", user_id, role.role_id),
            }
        }

        Ok(names)
    }

    /// Replace the user's role set with `role_names`.
    ///
    /// Every name is validated against the role catalog before anything is
    /// written; the first unknown name fails with [`RbacError::InvalidRoleName`].
    pub async fn set_roles_to_user(&self, user_id: u64, role_names: &[String]) -> RbacResult<()> {
        let subject = Entity::user(user_id);

        self.tx
            .run(Box::pin(async move {
                let catalog: HashMap<String, u64> = self
                    .repo
                    .get_roles()
                    .await
                    .context("failed to get roles")?
                    .into_iter()
                    .map(|role| (role.name, role.id))
                    .collect();

                let mut assigned = Vec::with_capacity(role_names.len());
                for name in role_names {
                    let Some(&role_id) = catalog.get(name) else {
                        return Err(RbacError::InvalidRoleName(name.clone()).into());
                    };
                    assigned.push(RestrictedRole::new(subject, role_id));
                }

                self.repo
                    .clear_roles_for_entity(subject)
                    .await
                    .context("failed to clear roles for user")?;

                if !assigned.is_empty() {
                    self.repo
                        .assign_roles_for_entity(subject, &assigned)
                        .await
                        .context("failed to assign roles to user")?;
                }

                Ok::<(), anyhow::Error>(())
            }))
            .await
            .map_err(RbacError::from_transaction)?;

        self.cache.delete(&subject);
        log::info!("Set roles {:?} to user {}", role_names, user_id);

        Ok(())
    }

    /// Grant the user `abilities` on one entity.
    ///
    /// Existing permissions for the same abilities (including forbids) are
    /// revoked first so the result is a clean grant.
    pub async fn allow_user_abilities_for_entity(
        &self,
        user_id: u64,
        entity_id: u64,
        entity_type: EntityType,
        abilities: &[AbilityName],
    ) -> RbacResult<()> {
        let subject = Entity::user(user_id);
        let scoped = scoped_abilities(Entity::new(entity_type, entity_id), abilities);

        let result = self
            .tx
            .run(Box::pin(async {
                self.repo
                    .revoke(subject, &scoped)
                    .await
                    .context("failed to revoke permissions")?;
                self.repo
                    .allow(subject, &scoped)
                    .await
                    .context("failed to allow permissions")?;
                Ok::<(), anyhow::Error>(())
            }))
            .await
            .map_err(RbacError::from_transaction);

        self.cache.delete(&subject);
        result?;

        log::info!("Allowed {:?} on {}:{} to user {}", abilities, entity_type, entity_id, user_id);
        Ok(())
    }

    /// Remove the user's `abilities` on one entity, forbidding any that the
    /// user would still hold through a role.
    pub async fn revoke_or_forbid_user_abilities_for_entity(
        &self,
        user_id: u64,
        entity_id: u64,
        entity_type: EntityType,
        abilities: &[AbilityName],
    ) -> RbacResult<()> {
        let subject = Entity::user(user_id);
        let target = Entity::new(entity_type, entity_id);
        let scoped = scoped_abilities(target, abilities);

        let result = self
            .tx
            .run(Box::pin(async {
                self.repo
                    .revoke(subject, &scoped)
                    .await
                    .context("failed to revoke permissions")?;

                self.cache.delete(&subject);

                let mut still_held = Vec::new();
                for ability in &scoped {
                    if self.can_for_entity(user_id, entity_type, entity_id, &[ability.name]).await? {
                        still_held.push(ability.clone());
                    }
                }

                if !still_held.is_empty() {
                    self.repo
                        .forbid(subject, &still_held)
                        .await
                        .context("failed to forbid permissions")?;
                    self.cache.delete(&subject);

                    log::info!(
                        "Forbade {} role-inherited abilities on {} for user {}",
                        still_held.len(),
                        target,
                        user_id
                    );
                }

                Ok::<(), anyhow::Error>(())
            }))
            .await
            .map_err(RbacError::from_transaction);

        // A rolled-back transaction may have left a resolution of uncommitted state cached
        self.cache.delete(&subject);
        result?;

        log::info!("Revoked {:?} on {} from user {}", abilities, target, user_id);
        Ok(())
    }
}

fn scoped_abilities(target: Entity, abilities: &[AbilityName]) -> Vec<Ability> {
    abilities.iter().map(|name| Ability::for_entity(*name, target)).collect()
}
