//! In-memory storage for engine tests
//!
//! `MemoryRepository` implements both storage contracts. Transactions snapshot
//! the whole state and restore it when the work fails.

#![allow(dead_code)]

use anyhow::{bail, Result};
use futures::future::BoxFuture;
use gamefleet_rbac::{
    Ability, Entity, Permission, Rbac, Repository, RestrictedRole, Role, Scope, TransactionManager,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct State {
    roles: Vec<Role>,
    abilities: Vec<Ability>,
    permissions: Vec<Permission>,
    assignments: Vec<RestrictedRole>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_ability(&self, ability: &Ability) -> Option<u64> {
        self.abilities
            .iter()
            .find(|a| a.name == ability.name && a.scope == ability.scope)
            .map(|a| a.id)
    }

    fn find_or_create_ability(&mut self, ability: &Ability) -> u64 {
        if let Some(id) = self.find_ability(ability) {
            return id;
        }
        let id = self.next_id();
        self.abilities.push(ability.clone().with_id(id));
        id
    }

    fn insert_permission(&mut self, subject: Entity, ability: &Ability, forbidden: bool) {
        let ability_id = self.find_or_create_ability(ability);
        let id = self.next_id();
        self.permissions.push(Permission { id, ability_id, subject, forbidden, ability: None });
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
    fail_on: Mutex<Option<&'static str>>,
    permission_reads: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every later call of `operation` fail
    pub fn fail_on(&self, operation: &'static str) {
        *self.fail_on.lock().unwrap() = Some(operation);
    }

    pub fn heal(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    /// Number of `get_permissions` calls served so far
    pub fn permission_reads(&self) -> usize {
        self.permission_reads.load(Ordering::SeqCst)
    }

    pub fn add_role(&self, name: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.roles.push(Role::new(id, name));
        id
    }

    /// Store a permission directly, bypassing the engine
    pub fn grant(&self, subject: Entity, ability: Ability) {
        self.state.lock().unwrap().insert_permission(subject, &ability, false);
    }

    pub fn deny(&self, subject: Entity, ability: Ability) {
        self.state.lock().unwrap().insert_permission(subject, &ability, true);
    }

    pub fn assign_role(&self, user: Entity, role_id: u64, restricted_to: Scope) {
        self.state
            .lock()
            .unwrap()
            .assignments
            .push(RestrictedRole::new(user, role_id).restricted_to(restricted_to));
    }

    /// Raw stored permissions of a subject, with abilities joined
    pub fn stored_permissions(&self, subject: Entity) -> Vec<Permission> {
        let state = self.state.lock().unwrap();
        joined_permissions(&state, subject)
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if *self.fail_on.lock().unwrap() == Some(operation) {
            bail!("injected {} failure", operation);
        }
        Ok(())
    }
}

fn joined_permissions(state: &State, subject: Entity) -> Vec<Permission> {
    state
        .permissions
        .iter()
        .filter(|p| p.subject == subject)
        .map(|p| Permission {
            ability: state.abilities.iter().find(|a| a.id == p.ability_id).cloned(),
            ..p.clone()
        })
        .collect()
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    async fn get_roles(&self) -> Result<Vec<Role>> {
        self.check("get_roles")?;
        Ok(self.state.lock().unwrap().roles.clone())
    }

    async fn get_permissions(&self, subject: Entity) -> Result<Vec<Permission>> {
        self.check("get_permissions")?;
        self.permission_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(joined_permissions(&state, subject))
    }

    async fn get_roles_for_entity(&self, subject: Entity) -> Result<Vec<RestrictedRole>> {
        self.check("get_roles_for_entity")?;
        let state = self.state.lock().unwrap();
        Ok(state.assignments.iter().filter(|r| r.subject == subject).cloned().collect())
    }

    async fn assign_roles_for_entity(&self, subject: Entity, roles: &[RestrictedRole]) -> Result<()> {
        self.check("assign_roles_for_entity")?;
        let mut state = self.state.lock().unwrap();
        for role in roles {
            state.assignments.push(RestrictedRole { subject, ..role.clone() });
        }
        Ok(())
    }

    async fn clear_roles_for_entity(&self, subject: Entity) -> Result<()> {
        self.check("clear_roles_for_entity")?;
        self.state.lock().unwrap().assignments.retain(|r| r.subject != subject);
        Ok(())
    }

    async fn allow(&self, subject: Entity, abilities: &[Ability]) -> Result<()> {
        self.check("allow")?;
        let mut state = self.state.lock().unwrap();
        for ability in abilities {
            state.insert_permission(subject, ability, false);
        }
        Ok(())
    }

    async fn forbid(&self, subject: Entity, abilities: &[Ability]) -> Result<()> {
        self.check("forbid")?;
        let mut state = self.state.lock().unwrap();
        for ability in abilities {
            state.insert_permission(subject, ability, true);
        }
        Ok(())
    }

    async fn revoke(&self, subject: Entity, abilities: &[Ability]) -> Result<()> {
        self.check("revoke")?;
        let mut state = self.state.lock().unwrap();
        let ids: Vec<u64> = abilities.iter().filter_map(|a| state.find_ability(a)).collect();
        state.permissions.retain(|p| !(p.subject == subject && ids.contains(&p.ability_id)));
        Ok(())
    }
}

#[async_trait::async_trait]
impl TransactionManager for MemoryRepository {
    async fn run<'a>(&self, work: BoxFuture<'a, Result<()>>) -> Result<()> {
        let snapshot = self.state.lock().unwrap().clone();

        let result = work.await;
        if result.is_err() {
            *self.state.lock().unwrap() = snapshot;
        }
        result
    }
}

pub const TTL: Duration = Duration::from_secs(60);

pub fn engine(repo: &Arc<MemoryRepository>, ttl: Duration) -> Rbac {
    Rbac::new(repo.clone(), repo.clone(), ttl)
}
