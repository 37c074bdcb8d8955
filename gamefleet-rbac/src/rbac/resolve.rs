//! Merging a subject's direct and role-inherited permissions

use crate::rbac::types::{AbilityName, Permission, Scope};
use std::collections::HashMap;

/// Narrow a role's permissions to the scope its assignment is restricted to.
///
/// - `Global`: everything passes.
/// - `Kind`: only permissions whose ability has that entity type.
/// - `Instance`: only permissions whose ability targets that entity ID.
///
/// Restricted roles never pass global abilities through.
pub fn filter_by_restriction(permissions: Vec<Permission>, restriction: Scope) -> Vec<Permission> {
    match restriction {
        Scope::Global => permissions,
        Scope::Kind { kind } => permissions
            .into_iter()
            .filter(|p| p.ability.as_ref().and_then(|a| a.scope.entity_type()) == Some(kind))
            .collect(),
        Scope::Instance { entity } => permissions
            .into_iter()
            .filter(|p| p.ability.as_ref().and_then(|a| a.scope.entity_id()) == Some(entity.id))
            .collect(),
    }
}

/// Group permissions by ability name, dropping those without a joined ability.
pub fn group_by_ability(permissions: Vec<Permission>) -> HashMap<AbilityName, Vec<Permission>> {
    let mut grouped: HashMap<AbilityName, Vec<Permission>> = HashMap::new();
    for permission in permissions {
        let Some(name) = permission.ability.as_ref().map(|a| a.name) else {
            continue;
        };
        grouped.entry(name).or_default().push(permission);
    }
    grouped
}
