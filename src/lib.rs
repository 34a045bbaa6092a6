//! OpenClaw connection manager for a content site.
//!
//! Issues one named application password per user through the host's
//! credential store, tags content created by requests authenticated with it,
//! and reports per-user usage.
//!
//! ## Modules
//! - `cli`: Command-line handlers
//! - `core`: Attribution, credential lifecycle, stats, admin views, host seam
//! - `models`: Data structures
//! - `util`: Secrets and logging

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod util;

pub use crate::error::{ClawError, ClawResult};
