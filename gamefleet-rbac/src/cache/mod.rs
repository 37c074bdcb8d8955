//! Caching module for Gamefleet
//!
//! Provides a TTL cache with a background sweep. The RBAC engine uses it to
//! keep resolved permission sets per subject.

pub mod ttl;

pub use ttl::{CacheEntry, TtlCache, DEFAULT_CLEANUP_INTERVAL};

use crate::rbac::{AbilityName, Entity, Permission};
use std::collections::HashMap;
use std::sync::Arc;

/// A subject's fully resolved permissions, grouped by ability name
pub type ResolvedPermissions = Arc<HashMap<AbilityName, Vec<Permission>>>;

/// Cache of resolved permission sets keyed by subject
pub type PermissionCache = TtlCache<Entity, ResolvedPermissions>;
