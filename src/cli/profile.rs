//! Profile commands: show, edit.

use clap::{Args, Subcommand, ValueEnum};
use wishes::model::{ProfileField, User};
use wishes::profile::ProfileEditor;
use wishes::storage::Storage;

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show every field. This is the default.
    Show,

    /// Change fields and save them together.
    Edit(ProfileEdits),
}

#[derive(Debug, Args)]
pub struct ProfileEdits {
    #[arg(long)]
    nickname: Option<String>,

    /// Whole years, 0 to 150.
    #[arg(long)]
    age: Option<String>,

    #[arg(long)]
    gender: Option<String>,

    /// `NNN-NNNN` or seven digits.
    #[arg(long)]
    postal_code: Option<String>,

    #[arg(long)]
    address: Option<String>,

    /// Comma-separated, e.g. "hiking, jazz".
    #[arg(long)]
    interests: Option<String>,

    /// Reset a field to "not entered". Can be specified multiple times.
    #[arg(long, value_enum)]
    clear: Vec<FieldArg>,
}

impl ProfileEdits {
    fn values(&self) -> [(ProfileField, Option<&str>); 6] {
        [
            (ProfileField::Nickname, self.nickname.as_deref()),
            (ProfileField::Age, self.age.as_deref()),
            (ProfileField::Gender, self.gender.as_deref()),
            (ProfileField::PostalCode, self.postal_code.as_deref()),
            (ProfileField::Address, self.address.as_deref()),
            (ProfileField::Interests, self.interests.as_deref()),
        ]
    }
}

/// CLI-facing profile field, mapped to the domain `ProfileField`.
#[derive(Debug, Clone, ValueEnum)]
pub enum FieldArg {
    Nickname,
    Age,
    Gender,
    PostalCode,
    Address,
    Interests,
}

impl FieldArg {
    fn to_domain(&self) -> ProfileField {
        match self {
            Self::Nickname => ProfileField::Nickname,
            Self::Age => ProfileField::Age,
            Self::Gender => ProfileField::Gender,
            Self::PostalCode => ProfileField::PostalCode,
            Self::Address => ProfileField::Address,
            Self::Interests => ProfileField::Interests,
        }
    }
}

pub(super) fn cmd_show(storage: &Storage, user: &User) -> Result<(), String> {
    let editor = ProfileEditor::load(storage, &user.id).map_err(|e| e.to_string())?;
    let profile = editor.profile();

    println!("{:<12} {}", "user", user.id);
    println!("{:<12} {}", "sign-in", editor.auth_method().as_str());
    for field in ProfileField::ALL {
        println!("{:<12} {}", field.to_string(), profile.display(field));
    }
    Ok(())
}

pub(super) fn cmd_edit(storage: &Storage, user: &User, edits: &ProfileEdits) -> Result<(), String> {
    let mut editor = ProfileEditor::load(storage, &user.id).map_err(|e| e.to_string())?;

    for (field, value) in edits.values() {
        if let Some(value) = value {
            editor.set(field, value).map_err(|e| e.to_string())?;
        }
    }
    for field in &edits.clear {
        editor.clear(field.to_domain()).map_err(|e| e.to_string())?;
    }

    let saved = editor
        .save()
        .map_err(|e| format!("failed to save profile: {e}"))?;
    if saved {
        eprintln!("Profile saved");
    } else {
        eprintln!("Nothing to change");
    }
    Ok(())
}
