//! User registration.

use clap::{Subcommand, ValueEnum};
use wishes::model::AuthMethod;
use wishes::storage::Storage;

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a user with an empty profile.
    Register {
        /// User ID, e.g. "alice".
        id: String,

        /// How the user signs in.
        #[arg(long, value_enum, default_value = "password")]
        auth: AuthArg,
    },
}

/// CLI-facing sign-in method, mapped to the domain `AuthMethod`.
#[derive(Debug, Clone, ValueEnum)]
pub enum AuthArg {
    Password,
    Google,
}

impl AuthArg {
    pub(super) fn to_domain(&self) -> AuthMethod {
        match self {
            Self::Password => AuthMethod::Password,
            Self::Google => AuthMethod::Google,
        }
    }
}

pub(super) fn cmd_register(storage: &Storage, id: &str, auth: AuthMethod) -> Result<(), String> {
    let id = id.trim();
    if id.is_empty() {
        return Err("user ID cannot be empty".to_string());
    }

    let user = storage
        .create_user(id, auth)
        .map_err(|e| format!("failed to register user: {e}"))?;

    eprintln!("Registered {} ({})", user.id, user.auth_method.as_str());
    Ok(())
}
