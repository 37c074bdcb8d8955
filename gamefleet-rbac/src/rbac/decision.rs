//! Authorization rules evaluated against a resolved permission map
//!
//! Every function here is pure: the engine resolves the map (from cache or
//! storage) and hands it over.

use crate::rbac::types::{AbilityName, Entity, Permission};
use std::collections::HashMap;

type PermissionMap = HashMap<AbilityName, Vec<Permission>>;

fn permissions_for<'a>(map: &'a PermissionMap, name: &AbilityName) -> &'a [Permission] {
    map.get(name).map(Vec::as_slice).unwrap_or_default()
}

fn is_global_grant(permission: &Permission) -> bool {
    !permission.forbidden && permission.ability.as_ref().is_some_and(|a| a.scope.is_global())
}

fn covers(permission: &Permission, target: Entity) -> bool {
    permission.ability.as_ref().is_some_and(|a| a.scope.covers(target))
}

/// All of `abilities` granted globally.
///
/// Any forbidden permission for a requested name denies the whole check.
/// Entity-scoped grants do not count.
pub fn can(map: &PermissionMap, abilities: &[AbilityName]) -> bool {
    for name in abilities {
        let permissions = permissions_for(map, name);
        if permissions.iter().any(|p| p.forbidden) {
            return false;
        }
        if !permissions.iter().any(is_global_grant) {
            return false;
        }
    }
    true
}

/// At least one of `abilities` granted globally. Forbidden entries are skipped.
pub fn can_one_of(map: &PermissionMap, abilities: &[AbilityName]) -> bool {
    abilities.iter().any(|name| permissions_for(map, name).iter().any(is_global_grant))
}

/// All of `abilities` granted for `target`, globally, kind-wide or on the instance.
///
/// A forbidden permission for a requested name denies the whole check
/// whatever its scope.
pub fn can_for_entity(map: &PermissionMap, target: Entity, abilities: &[AbilityName]) -> bool {
    for name in abilities {
        let permissions = permissions_for(map, name);
        if permissions.iter().any(|p| p.forbidden) {
            return false;
        }
        if !permissions.iter().any(|p| covers(p, target)) {
            return false;
        }
    }
    true
}

/// At least one of `abilities` granted for `target`.
///
/// An ability counts only if no permission covering `target` forbids it, so a
/// forbid still wins over a grant for the same ability, but does not stop the
/// other requested abilities from being considered.
pub fn can_any_for_entity(map: &PermissionMap, target: Entity, abilities: &[AbilityName]) -> bool {
    abilities.iter().any(|name| {
        let mut matching = permissions_for(map, name).iter().filter(|p| covers(p, target)).peekable();
        matching.peek().is_some() && matching.all(|p| !p.forbidden)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::resolve::group_by_ability;
    use crate::rbac::types::{Ability, EntityType, Scope};

    fn user() -> Entity {
        Entity::user(1)
    }

    fn map(permissions: Vec<Permission>) -> PermissionMap {
        group_by_ability(permissions)
    }

    fn allow(ability: Ability) -> Permission {
        Permission::allow(user(), ability)
    }

    fn forbid(ability: Ability) -> Permission {
        Permission::forbid(user(), ability)
    }

    #[test]
    fn test_can_requires_global_grant() {
        let map = map(vec![
            allow(Ability::global(AbilityName::View)),
            allow(Ability::for_entity(AbilityName::Edit, Entity::server(1))),
        ]);

        assert!(can(&map, &[AbilityName::View]));
        assert!(!can(&map, &[AbilityName::Edit]));
        assert!(!can(&map, &[AbilityName::View, AbilityName::Edit]));
        assert!(!can(&map, &[AbilityName::Delete]));
    }

    #[test]
    fn test_can_forbid_dominates() {
        let map = map(vec![
            allow(Ability::global(AbilityName::View)),
            allow(Ability::global(AbilityName::Edit)),
            forbid(Ability::global(AbilityName::Edit)),
        ]);

        assert!(!can(&map, &[AbilityName::Edit]));
        assert!(!can(&map, &[AbilityName::View, AbilityName::Edit]));
        assert!(can(&map, &[AbilityName::View]));
    }

    #[test]
    fn test_can_one_of_skips_forbidden() {
        let map = map(vec![
            forbid(Ability::global(AbilityName::Edit)),
            allow(Ability::global(AbilityName::View)),
        ]);

        assert!(can_one_of(&map, &[AbilityName::Edit, AbilityName::View]));
        assert!(!can_one_of(&map, &[AbilityName::Edit]));
        assert!(!can_one_of(&map, &[]));
    }

    #[test]
    fn test_can_one_of_ignores_entity_grants() {
        let map = map(vec![allow(Ability::for_entity(AbilityName::View, Entity::server(1)))]);
        assert!(!can_one_of(&map, &[AbilityName::View]));
    }

    #[test]
    fn test_can_for_entity_scopes() {
        let target = Entity::server(123);
        let map = map(vec![
            allow(Ability::global(AbilityName::View)),
            allow(Ability::new(AbilityName::Edit, Scope::kind(EntityType::Server))),
            allow(Ability::for_entity(AbilityName::GameServerStart, target)),
            allow(Ability::for_entity(AbilityName::GameServerStop, Entity::server(999))),
            allow(Ability::new(AbilityName::Delete, Scope::kind(EntityType::Game))),
        ]);

        assert!(can_for_entity(&map, target, &[AbilityName::View]));
        assert!(can_for_entity(&map, target, &[AbilityName::Edit]));
        assert!(can_for_entity(&map, target, &[AbilityName::GameServerStart]));
        assert!(!can_for_entity(&map, target, &[AbilityName::GameServerStop]));
        assert!(!can_for_entity(&map, target, &[AbilityName::Delete]));
        assert!(can_for_entity(
            &map,
            target,
            &[AbilityName::View, AbilityName::Edit, AbilityName::GameServerStart]
        ));
    }

    #[test]
    fn test_can_for_entity_forbid_ignores_scope() {
        let map = map(vec![
            allow(Ability::global(AbilityName::View)),
            forbid(Ability::for_entity(AbilityName::View, Entity::server(5))),
        ]);

        assert!(!can_for_entity(&map, Entity::server(5), &[AbilityName::View]));
        assert!(!can_for_entity(&map, Entity::server(6), &[AbilityName::View]));
    }

    #[test]
    fn test_can_any_for_entity() {
        let target = Entity::server(123);
        let map = map(vec![
            allow(Ability::for_entity(AbilityName::GameServerStart, target)),
            allow(Ability::global(AbilityName::View)),
            forbid(Ability::for_entity(AbilityName::View, target)),
        ]);

        assert!(can_any_for_entity(&map, target, &[AbilityName::GameServerStart]));
        assert!(!can_any_for_entity(&map, target, &[AbilityName::View]));
        // A forbidden ability does not hide a later granted one
        assert!(can_any_for_entity(&map, target, &[AbilityName::View, AbilityName::GameServerStart]));
        // The forbid only covers server 123
        assert!(can_any_for_entity(&map, Entity::server(7), &[AbilityName::View]));
        assert!(!can_any_for_entity(&map, Entity::server(7), &[AbilityName::GameServerStart]));
    }

    #[test]
    fn test_duplicate_permissions_do_not_change_outcome() {
        let target = Entity::server(1);
        let single = map(vec![allow(Ability::global(AbilityName::View))]);
        let doubled = map(vec![
            allow(Ability::global(AbilityName::View)),
            allow(Ability::global(AbilityName::View)),
        ]);

        for m in [&single, &doubled] {
            assert!(can(m, &[AbilityName::View]));
            assert!(can_for_entity(m, target, &[AbilityName::View]));
            assert!(can_any_for_entity(m, target, &[AbilityName::View]));
        }
    }
}
