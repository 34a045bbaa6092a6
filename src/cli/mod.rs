//! CLI routing and command dispatch.

use crate::core::paths::SitePaths;
use crate::core::site_store::SiteStore;
use anyhow::{bail, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use std::path::PathBuf;

pub mod api;
pub mod connection;
pub mod site;
pub mod uninstall;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: SitePaths,
    pub non_interactive: bool,
}

impl CliContext {
    /// Automation never waits on another writer.
    pub fn open(&self) -> Result<SiteStore> {
        if self.non_interactive {
            SiteStore::try_open(&self.paths)
        } else {
            SiteStore::open(&self.paths)
        }
    }

    /// Create or reopen the site, under the same wait rule as `open`.
    pub fn init(&self, home_url: Option<&str>) -> Result<SiteStore> {
        if self.non_interactive {
            SiteStore::try_init(&self.paths, home_url)
        } else {
            SiteStore::init(&self.paths, home_url)
        }
    }

    /// Ask before a destructive step. `--yes` skips the prompt; without it,
    /// non-interactive runs refuse.
    pub fn confirm(&self, prompt: &str, yes: bool) -> Result<bool> {
        if yes {
            return Ok(true);
        }
        if self.non_interactive {
            bail!("--non-interactive requires --yes for this command");
        }
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        other => Err(format!("invalid format: {} (use table|json)", other)),
    }
}

pub(crate) fn format_time(t: DateTime<Utc>) -> String {
    let local: DateTime<Local> = t.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Parser, Debug)]
#[command(name = "clawpress", version, about = "Connect OpenClaw to a content site with application passwords")]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "CLAWPRESS_NON_INTERACTIVE")]
    pub non_interactive: bool,

    /// Debug logging (CLAWPRESS_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ctx = CliContext {
            paths: SitePaths::resolve(self.root),
            non_interactive: self.non_interactive,
        };

        match self.command {
            Commands::Site { command } => site::run(&ctx, command),
            Commands::Nonce(args) => connection::run_nonce(&ctx, args),
            Commands::Connect(args) => connection::run_connect(&ctx, args),
            Commands::Revoke(args) => connection::run_revoke(&ctx, args),
            Commands::Status(args) => connection::run_status(&ctx, args),
            Commands::Roster(args) => connection::run_roster(&ctx, args),
            Commands::Api { command } => api::run(&ctx, command),
            Commands::Content { command } => api::run_content(&ctx, command),
            Commands::Uninstall(args) => uninstall::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the local site (init, users)
    Site {
        #[command(subcommand)]
        command: site::SiteCommand,
    },
    /// Issue an action token for connect or revoke
    Nonce(connection::NonceArgs),
    /// Create the OpenClaw application password and show it once
    Connect(connection::ConnectArgs),
    /// Revoke the OpenClaw application password
    Revoke(connection::RevokeArgs),
    /// Show connection state and usage for a user
    Status(connection::StatusArgs),
    /// List every user with an active OpenClaw connection
    Roster(connection::RosterArgs),
    /// Send a content API request (optionally with an application password)
    Api {
        #[command(subcommand)]
        command: api::ApiCommand,
    },
    /// Inspect, trash, or delete content items
    Content {
        #[command(subcommand)]
        command: api::ContentCommand,
    },
    /// Remove attribution tags and pending messages (credentials are kept)
    Uninstall(uninstall::UninstallArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("json"), Ok(OutputFormat::Json));
        assert!(parse_format("xml").is_err());
    }

    #[test]
    fn test_parse_connect() {
        let cli = Cli::try_parse_from([
            "clawpress", "--root", "/tmp/site", "connect", "--user", "alice", "--nonce", "abc",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/site")));
        assert!(matches!(cli.command, Commands::Connect(_)));
    }
}
