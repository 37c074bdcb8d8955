//! Gamefleet RBAC (Role-Based Access Control) Module
//!
//! Decides whether a user may use an ability, globally or on one entity, by
//! aggregating the user's direct permissions with those inherited through
//! assigned roles.
//!
//! # Resolution
//! - Direct permissions of the user are merged with the permissions of each
//!   assigned role.
//! - A role assignment restricted to an entity kind or instance only
//!   contributes abilities inside that restriction.
//! - The merged set is grouped by ability name and cached per user.
//!
//! # Precedence
//! - A forbidden permission beats any grant for the same ability.
//! - `can`/`can_one_of` only count global grants; the `*_for_entity` checks
//!   also count kind-wide and instance grants covering the target.
//!
//! # Example
//! ```rust,ignore
//! let rbac = Rbac::new(tx, repo, Duration::from_secs(60));
//!
//! if rbac.can_for_entity(user_id, EntityType::Server, 42, &[AbilityName::GameServerStart]).await? {
//!     start_server(42).await?;
//! }
//! ```

pub mod decision;
mod engine;
mod errors;
pub mod resolve;
mod traits;
mod types;

// Public exports
pub use engine::Rbac;
pub use errors::{RbacError, RbacResult};
pub use traits::{Repository, TransactionManager};
pub use types::{
    Ability, AbilityName, Entity, EntityType, Permission, RestrictedRole, Role, Scope,
    UnknownAbilityError,
};
