//! Wishes: a personal wishlist with a fixed status lifecycle.
//!
//! Users triage a shared catalog of base wishes, move their own wishes
//! between candidate, want-soon and achieved, and review monthly history.
//! The binary in `main.rs` is a thin clap front end over these modules.

pub mod achievements;
pub mod config;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod profile;
pub mod storage;
pub mod triage;
