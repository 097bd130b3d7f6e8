//! Who is acting.
//!
//! Every command that reads or writes a wishlist runs as one registered user.
//! The user id is resolved through a chain:
//!
//! 1. `--as <user>`: explicit per-command override
//! 2. `WISHES_IDENTITY` env var: session level
//! 3. `identity` in `~/.wishes/config.toml`: global default
//!
//! A resolved id that was never registered is treated the same as no id at all.

use std::env;

use crate::config::Config;
use crate::error::{Result, WishError};
use crate::model::User;
use crate::storage::WishStore;

/// Environment variable consulted after `--as`.
pub const IDENTITY_VAR: &str = "WISHES_IDENTITY";

/// Shown when no identity can be resolved or the user is not registered.
pub const IDENTITY_REQUIRED: &str = "not signed in: pass --as <user>, \
    set WISHES_IDENTITY, or add `identity = \"...\"` to ~/.wishes/config.toml, \
    and register with `wishes user register`";

/// Resolve the acting user id, or `None` when no source yields one.
pub fn resolve_identity(explicit: Option<&str>, config: &Config) -> Option<String> {
    resolve_from(explicit, env::var(IDENTITY_VAR).ok(), config)
}

fn resolve_from(explicit: Option<&str>, from_env: Option<String>, config: &Config) -> Option<String> {
    if let Some(id) = explicit
        && !id.is_empty()
    {
        return Some(id.to_string());
    }

    if let Some(id) = from_env
        && !id.is_empty()
    {
        return Some(id);
    }

    config.identity.clone()
}

/// The registered user the current command acts as.
///
/// Fails with [`WishError::Unauthenticated`] when no identity resolves or
/// it names a user that does not exist.
pub fn current_user(store: &impl WishStore, explicit: Option<&str>, config: &Config) -> Result<User> {
    let Some(id) = resolve_identity(explicit, config) else {
        return Err(WishError::Unauthenticated);
    };
    match store.load_user(&id)? {
        Some(user) => Ok(user),
        None => {
            tracing::debug!(user = %id, "identity is not registered");
            Err(WishError::Unauthenticated)
        }
    }
}
