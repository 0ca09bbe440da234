//! Allowed and admin users
//!
//! The user list has one user per line: a username followed by an optional
//! role token. A role token from the admin set grants admin rights.

use crate::error::ConfigError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};


/// What to do when the user list cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UserListPolicy {
    /// Fall back to a single bootstrap identity
    #[default]
    FailOpen,
    /// Abort with an error
    FailFast,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserList {
    pub allowed: BTreeSet<String>,
    pub admins: BTreeSet<String>,
}

impl UserList {
    /// A list where `user` is both the only allowed user and the only admin
    pub fn single(user: &str) -> Self {
        Self {
            allowed: BTreeSet::from([user.to_string()]),
            admins: BTreeSet::from([user.to_string()]),
        }
    }

    /// Grant admin rights without adding the user to the allowed set
    pub fn with_admin(mut self, user: &str) -> Self {
        if self.admins.insert(user.to_string()) {
            debug!("Added admin {} from environment", user);
        }
        self
    }

    /// Admins that are not in the allowed set
    pub fn admins_not_allowed(&self) -> Vec<&str> {
        self.admins
            .difference(&self.allowed)
            .map(String::as_str)
            .collect()
    }
}

/// Parse user list text
pub fn parse_user_list<S: AsRef<str>>(content: &str, admin_roles: &[S]) -> UserList {
    let mut users = UserList::default();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(username) = fields.next() else {
            continue;
        };

        users.allowed.insert(username.to_string());

        if let Some(role) = fields.next() {
            if admin_roles.iter().any(|r| r.as_ref() == role) {
                users.admins.insert(username.to_string());
            }
        }
    }

    users
}

/// Load the user list, applying `policy` when the file cannot be read
pub fn load_user_list<S: AsRef<str>>(
    path: &Path,
    admin_roles: &[S],
    policy: UserListPolicy,
    fallback_user: &str,
) -> Result<UserList, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let users = parse_user_list(&content, admin_roles);
            info!(
                "Loaded {} allowed user(s), {} admin(s) from {}",
                users.allowed.len(),
                users.admins.len(),
                path.display()
            );
            Ok(users)
        }
        Err(source) => match policy {
            UserListPolicy::FailOpen => {
                warn!(
                    "Cannot read user list {} ({}), falling back to {}",
                    path.display(),
                    source,
                    fallback_user
                );
                Ok(UserList::single(fallback_user))
            }
            UserListPolicy::FailFast => Err(ConfigError::UserList {
                path: path.to_path_buf(),
                source,
            }),
        },
    }
}
