// handlers/users/mod.rs - Admin user management
//
// GET    /api/v1/users
// GET    /api/v1/users/:id
// POST   /api/v1/users
// PUT    /api/v1/users/:id
// DELETE /api/v1/users/:id
//
// The whole router sits behind `require_token` + `require_admin`.
pub mod read;
pub mod write;

pub use read::{get_user, list_users};
pub use write::{create_user, delete_user, update_user};

use crate::models::Role;

/// Admins may assign any role.
pub const ASSIGNABLE_ROLES: [Role; 3] = [Role::User, Role::Publisher, Role::Admin];
