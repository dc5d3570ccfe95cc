//! # modeladmin-auth
//!
//! The user and permission layer consumed by the modeladmin crates:
//!
//! - [`user`] - The [`AdminUser`](user::AdminUser) value object seen per request
//! - [`permissions`] - Permissions, groups, and the registry of permission
//!   records that exist in the system
//! - [`testers`] - Per-object permission testers for tree-structured content
//!
//! Authentication itself (passwords, sessions, login flows) is a host
//! concern and lives outside this workspace; this crate only models the
//! authorization data the admin layer needs to decide what to show.

pub mod permissions;
pub mod testers;
pub mod user;

// Re-export the most commonly used types at the crate root.
pub use permissions::{Group, Permission, PermissionRegistry};
pub use testers::{ObjectPermissionTester, StaticPermissionTester};
pub use user::AdminUser;
