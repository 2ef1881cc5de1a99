//! # Group Module
//!
//! A group is an access-controlled set of users sharing one bearer token and
//! one expense ledger.

use serde::{Deserialize, Serialize};

use crate::validator::{self, Validator};

/// Minimum number of users in a group
pub const MIN_USERS: usize = 2;

/// Maximum number of users in a group
pub const MAX_USERS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Assigned by the store on insert
    pub id: i64,
    pub name: String,
    /// Bearer secret, assigned by the store on insert and never changed
    pub token: String,
    pub users: Vec<String>,
    /// Optimistic concurrency counter, bumped on every update
    pub version: i64,
}

impl Group {
    /// Unsaved group; `id`, `token` and `version` are filled in by the store
    pub fn new(name: impl Into<String>, users: Vec<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            token: String::new(),
            users,
            version: 0,
        }
    }

    pub fn has_user(&self, user: &str) -> bool {
        self.users.iter().any(|u| u == user)
    }
}

/// Check the caller-controlled fields of a group (`name`, `users`)
pub fn validate_group(v: &mut Validator, group: &Group) {
    v.check(
        validator::is_short_text(&group.name),
        "name",
        "must be 3-50 characters long and contain only letters, numbers, spaces, hyphens, and underscores",
    );

    v.check(
        validator::unique(&group.users),
        "users",
        "must not contain duplicate values",
    );
    v.check(
        group.users.len() >= MIN_USERS,
        "users",
        "must contain at least two values",
    );
    v.check(
        group.users.len() <= MAX_USERS,
        "users",
        "must contain at most fifty values",
    );
    v.check(
        validator::all(&group.users, |u| validator::is_short_text(u)),
        "users",
        "each value must be 3-50 characters long and contain only letters, numbers, spaces, hyphens, and underscores",
    );
}
