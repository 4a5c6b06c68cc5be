//! Authenticated user identity.

use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// Role attached to an account by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// The user record held client-side after login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    /// Display name.
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub role: Role,
}
