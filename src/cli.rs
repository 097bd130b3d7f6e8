//! CLI interface for Wishes.
//!
//! Each subcommand is non-interactive except `triage`: arguments in,
//! plain text out on stdout. Diagnostics go to stderr.
//!
//! Commands split into three groups:
//!
//! - `wishes user|catalog`: setup. Only `catalog list --unrated` needs a signed-in user.
//! - `wishes add|pick|list|show|move|promote|demote|complete|done|date|plan`: one wish at a time.
//! - `wishes triage|history|profile`: the longer flows.
//!
//! Wish arguments take a full UUID or unambiguous prefix.

mod catalog;
mod format;
mod history;
mod profile;
mod triage;
mod user;
mod wish;

use clap::{Parser, Subcommand, ValueEnum};
use jiff::civil::Date;
use wishes::achievements::Window;
use wishes::config::Config;
use wishes::error::WishError;
use wishes::identity::{self, IDENTITY_REQUIRED};
use wishes::lifecycle::Transition;
use wishes::model::{Month, User, WishDraft, WishStatus, parse_cost};
use wishes::storage::Storage;

use catalog::CatalogCommand;
use profile::ProfileCommand;
use user::UserCommand;

/// Wishes: decide what you want to do, then go do it.
#[derive(Debug, Parser)]
#[command(name = "wishes", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Act as this user instead of `WISHES_IDENTITY` or the configured identity.
    #[arg(long = "as", global = true)]
    identity: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: from catalog to achievement
  1. wishes user register alice
  2. wishes catalog import base-wishes.json
  3. wishes --as alice triage
     → l = want it, d = not interested, r = already done, u = undo
  4. wishes --as alice promote 3f2a
  5. wishes --as alice complete 3f2a --on 2024-06-03 --reflection "Worth it."
  6. wishes --as alice history --window 1y --month 2024-06

Set WISHES_IDENTITY or `identity = "alice"` in ~/.wishes/config.toml to drop --as."#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage users.
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Manage the shared catalog of base wishes.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Write your own wish. It starts as a candidate. Prints the wish ID.
    Add {
        title: String,

        /// What it is about.
        #[arg(long)]
        detail: String,

        /// Free-text time commitment, e.g. "2 days".
        #[arg(long, default_value = "")]
        duration: String,

        /// Cost in whole yen, e.g. `30000` or `¥30,000`.
        #[arg(long)]
        cost: Option<String>,

        #[arg(long)]
        image_url: Option<String>,
    },

    /// List your wishes, grouped by status.
    List {
        /// Only this status.
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show one wish in full.
    Show {
        /// Wish ID: full UUID or unambiguous prefix.
        wish: String,
    },

    /// Classify one catalog entry without a triage session. Prints the wish ID.
    Pick {
        /// Catalog entry ID: full UUID or unambiguous prefix.
        entry: String,

        #[arg(long, value_enum, default_value = "candidate")]
        status: StatusArg,

        /// The date it happened (YYYY-MM-DD). Required with `--status achieved`.
        #[arg(long)]
        on: Option<Date>,

        /// How it went. Required with `--status achieved`.
        #[arg(long)]
        reflection: Option<String>,
    },

    /// Drop a wish into a bucket, as the board's drag and drop does.
    Move {
        wish: String,

        /// `want-soon`, `candidate`, `achieved` (needs --on and --reflection), or `achieved-undated`.
        #[arg(long, value_enum)]
        to: StatusArg,

        #[arg(long)]
        on: Option<Date>,

        #[arg(long)]
        reflection: Option<String>,
    },

    /// Move a candidate to want-soon. At most five at a time.
    Promote { wish: String },

    /// Move a want-soon wish back to the candidates.
    Demote { wish: String },

    /// Mark a wish achieved on a known date.
    Complete {
        wish: String,

        /// The date it happened (YYYY-MM-DD).
        #[arg(long)]
        on: Date,

        /// How it went.
        #[arg(long)]
        reflection: String,
    },

    /// Mark a wish achieved without knowing when.
    Done {
        wish: String,

        #[arg(long)]
        reflection: Option<String>,
    },

    /// Fill in the date of a wish marked done without one.
    Date {
        wish: String,

        #[arg(long)]
        on: Date,
    },

    /// Set the goal and action plan texts (markdown).
    Plan {
        wish: String,

        #[arg(long)]
        goal: Option<String>,

        #[arg(long = "action")]
        action_plan: Option<String>,
    },

    /// Classify unrated catalog entries one at a time.
    Triage,

    /// Achievements per month, with an optional drill-down.
    History {
        #[arg(long, value_enum, default_value = "3m")]
        window: WindowArg,

        /// List what was achieved in this month (YYYY-MM).
        #[arg(long)]
        month: Option<Month>,
    },

    /// Show or edit your profile.
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommand>,
    },
}

/// CLI-facing wish status, mapped to the domain `WishStatus`.
#[derive(Debug, Clone, ValueEnum)]
pub enum StatusArg {
    Candidate,
    WantSoon,
    /// Achieved on a known date.
    Achieved,
    /// Achieved, date unknown.
    AchievedUndated,
    NotInterested,
}

impl StatusArg {
    fn to_domain(&self) -> WishStatus {
        match self {
            Self::Candidate => WishStatus::Candidate,
            Self::WantSoon => WishStatus::WantSoon,
            Self::Achieved => WishStatus::AchievedWithDate,
            Self::AchievedUndated => WishStatus::AchievedUnknownDate,
            Self::NotInterested => WishStatus::NotInterested,
        }
    }
}

/// CLI-facing history window, mapped to the domain `Window`.
#[derive(Debug, Clone, ValueEnum)]
pub enum WindowArg {
    #[value(name = "1m")]
    OneMonth,
    #[value(name = "3m")]
    ThreeMonths,
    #[value(name = "1y")]
    OneYear,
    All,
}

impl WindowArg {
    fn to_domain(&self) -> Window {
        match self {
            Self::OneMonth => Window::OneMonth,
            Self::ThreeMonths => Window::ThreeMonths,
            Self::OneYear => Window::OneYear,
            Self::All => Window::AllTime,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();
    let today = jiff::Zoned::now().date();
    let signed_in = || current_user(config, storage, cli.identity.as_deref());

    match cli.command {
        Command::User { command } => match command {
            UserCommand::Register { id, auth } => user::cmd_register(storage, &id, auth.to_domain()),
        },
        Command::Catalog { command } => match command {
            CatalogCommand::Import { file } => catalog::cmd_import(storage, &file),
            CatalogCommand::List { unrated: false } => catalog::cmd_list(storage, None),
            CatalogCommand::List { unrated: true } => {
                catalog::cmd_list(storage, Some(&signed_in()?))
            }
        },
        Command::Add {
            title,
            detail,
            duration,
            cost,
            image_url,
        } => {
            let cost = cost.as_deref().map(parse_cost).transpose()?.unwrap_or(0);
            let draft = WishDraft {
                title,
                detail,
                duration,
                cost,
                image_url,
            };
            wish::cmd_add(storage, &signed_in()?, draft)
        }
        Command::List { status, json } => wish::cmd_list(
            storage,
            &signed_in()?,
            status.as_ref().map(StatusArg::to_domain),
            json,
        ),
        Command::Show { wish } => wish::cmd_show(storage, &signed_in()?, &wish),
        Command::Pick {
            entry,
            status,
            on,
            reflection,
        } => catalog::cmd_pick(
            storage,
            &signed_in()?,
            &entry,
            status.to_domain(),
            on,
            reflection,
            today,
        ),
        Command::Move {
            wish,
            to,
            on,
            reflection,
        } => {
            let transition =
                Transition::into_bucket(to.to_domain(), on, reflection).map_err(|e| e.to_string())?;
            wish::cmd_move(storage, &signed_in()?, &wish, transition, today)
        }
        Command::Promote { wish } => {
            wish::cmd_move(storage, &signed_in()?, &wish, Transition::Promote, today)
        }
        Command::Demote { wish } => {
            wish::cmd_move(storage, &signed_in()?, &wish, Transition::Demote, today)
        }
        Command::Complete {
            wish,
            on,
            reflection,
        } => wish::cmd_move(
            storage,
            &signed_in()?,
            &wish,
            Transition::Complete { on, reflection },
            today,
        ),
        Command::Done { wish, reflection } => wish::cmd_move(
            storage,
            &signed_in()?,
            &wish,
            Transition::CompleteUndated { reflection },
            today,
        ),
        Command::Date { wish, on } => wish::cmd_date(storage, &signed_in()?, &wish, on, today),
        Command::Plan {
            wish,
            goal,
            action_plan,
        } => wish::cmd_plan(storage, &signed_in()?, &wish, goal, action_plan),
        Command::Triage => triage::cmd_triage(storage, &signed_in()?),
        Command::History { window, month } => {
            history::cmd_history(storage, &signed_in()?, window.to_domain(), month, today)
        }
        Command::Profile { command } => match command.unwrap_or(ProfileCommand::Show) {
            ProfileCommand::Show => profile::cmd_show(storage, &signed_in()?),
            ProfileCommand::Edit(edits) => profile::cmd_edit(storage, &signed_in()?, &edits),
        },
    }
}

/// The registered user this invocation acts as.
fn current_user(config: &Config, storage: &Storage, explicit: Option<&str>) -> Result<User, String> {
    identity::current_user(storage, explicit, config).map_err(|e| match e {
        WishError::Unauthenticated => IDENTITY_REQUIRED.to_string(),
        other => other.to_string(),
    })
}
