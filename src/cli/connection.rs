use crate::cli::site::parse_login;
use crate::cli::{format_time, parse_format, CliContext, OutputFormat};
use crate::constants;
use crate::core::admin::{Page, Plugin, RosterEntry, View};
use crate::core::stats::UsageStats;
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

fn parse_action(s: &str) -> Result<String, String> {
    match s {
        "create" => Ok(constants::ACTION_CREATE.to_string()),
        "revoke" => Ok(constants::ACTION_REVOKE.to_string()),
        other => Err(format!("invalid action '{}' (use create|revoke)", other)),
    }
}

#[derive(Args, Debug)]
pub struct NonceArgs {
    /// create|revoke
    #[arg(value_parser = parse_action)]
    pub action: String,

    /// Acting user
    #[arg(long, value_parser = parse_login)]
    pub user: String,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Acting user
    #[arg(long, value_parser = parse_login)]
    pub user: String,

    /// Token from `clawpress nonce create`
    #[arg(long)]
    pub nonce: String,

    /// Output format: table|json
    #[arg(long, value_parser = parse_format, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Acting user
    #[arg(long, value_parser = parse_login)]
    pub user: String,

    /// Token from `clawpress nonce revoke`
    #[arg(long)]
    pub nonce: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,

    /// Output format: table|json
    #[arg(long, value_parser = parse_format, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Acting user
    #[arg(long, value_parser = parse_login)]
    pub user: String,

    /// Render as the page reached right after a successful connect
    #[arg(long)]
    pub created: bool,

    /// Output format: table|json
    #[arg(long, value_parser = parse_format, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct RosterArgs {
    /// Acting user (needs list_users)
    #[arg(long, value_parser = parse_login)]
    pub user: String,

    /// Output format: table|json
    #[arg(long, value_parser = parse_format, default_value = "table")]
    pub format: OutputFormat,
}

pub fn run_nonce(ctx: &CliContext, args: NonceArgs) -> Result<()> {
    let store = ctx.open()?;
    let user = store.require_user(&args.user)?;
    let plugin = Plugin::from_site(store.data());
    println!("{}", plugin.issue_nonce(&args.action, &user)?);
    Ok(())
}

pub fn run_connect(ctx: &CliContext, args: ConnectArgs) -> Result<()> {
    let mut store = ctx.open()?;
    let user = store.require_user(&args.user)?;
    let plugin = Plugin::from_site(store.data());

    let redirect = plugin.handle_create(&mut store, &user, &args.nonce)?;
    store.save()?;

    let page = plugin.render_page(&mut store, &user, redirect.created)?;
    store.save()?;
    print_page(&plugin, &user.login, &page, args.format)
}

pub fn run_revoke(ctx: &CliContext, args: RevokeArgs) -> Result<()> {
    let mut store = ctx.open()?;
    let user = store.require_user(&args.user)?;
    let plugin = Plugin::from_site(store.data());

    let prompt = format!(
        "Are you sure you want to revoke the {} connection? You will need to reconfigure {} with a new password.",
        plugin.integration().reserved_name,
        plugin.integration().reserved_name
    );
    if !ctx.confirm(&prompt, args.yes)? {
        println!("Aborted");
        return Ok(());
    }

    let response = plugin.handle_revoke(&mut store, &user, &args.nonce);
    store.save()?;

    if args.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("serialize response")?
        );
    }
    if !response.success {
        bail!("{}", response.data);
    }
    if args.format == OutputFormat::Table {
        println!("{}", response.data);
    }
    Ok(())
}

pub fn run_status(ctx: &CliContext, args: StatusArgs) -> Result<()> {
    let mut store = ctx.open()?;
    let user = store.require_user(&args.user)?;
    let plugin = Plugin::from_site(store.data());

    let page = plugin.render_page(&mut store, &user, args.created)?;
    store.save()?;
    print_page(&plugin, &user.login, &page, args.format)
}

pub fn run_roster(ctx: &CliContext, args: RosterArgs) -> Result<()> {
    let store = ctx.open()?;
    let viewer = store.require_user(&args.user)?;
    let plugin = Plugin::from_site(store.data());
    let entries = plugin.roster(&store, &viewer)?;

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&entries).context("serialize roster")?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No users are connected to {}", plugin.integration().reserved_name);
        return Ok(());
    }
    println!("{}", roster_table(&entries));
    Ok(())
}

fn print_page(plugin: &Plugin, login: &str, page: &Page, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(page).context("serialize page")?);
        return Ok(());
    }

    let name = &plugin.integration().reserved_name;
    if let Some(notice) = &page.notice {
        println!("error: {}\n", notice);
    }

    match &page.view {
        View::JustCreated {
            connection,
            config_json,
        } => {
            println!("Connection Created!\n");
            println!(
                "Important: This password will only be shown once. Copy it now and paste it into your {} config.\n",
                name
            );
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.add_row(vec![bold("Site URL"), Cell::new(&connection.site_url)]);
            table.add_row(vec![bold("Username"), Cell::new(&connection.username)]);
            table.add_row(vec![bold("Password"), Cell::new(&connection.password)]);
            println!("{}\n", table);
            println!("Or copy as JSON for your {} config:\n{}\n", name, config_json);
            println!("Paste this into your {} config, then you're all set.", name);
        }
        View::Connected { credential, stats } => {
            println!("Connected\n");
            println!("An {} Application Password is active for this site.\n", name);
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.add_row(vec![bold("Status"), Cell::new("Active")]);
            table.add_row(vec![bold("Created"), Cell::new(format_time(credential.created))]);
            table.add_row(vec![
                bold("Last Used"),
                Cell::new(
                    credential
                        .last_used
                        .map(format_time)
                        .unwrap_or_else(|| "Never".to_string()),
                ),
            ]);
            println!("{}\n", table);
            print_stats(stats);
            println!(
                "\nRevoking disconnects {} from your site. You can create a new connection afterward:\n  clawpress nonce revoke --user {}",
                name, login
            );
        }
        View::Disconnected => {
            println!("Not Connected\n");
            println!(
                "Create a secure connection to let {} manage your content. You'll be given credentials to paste into your {} config:",
                name, name
            );
            println!("  clawpress nonce create --user {}", login);
            println!("  clawpress connect --user {} --nonce <TOKEN>", login);
        }
    }
    Ok(())
}

fn print_stats(stats: &UsageStats) {
    println!("Posts created: {}    Media uploaded: {}", stats.post_count, stats.media_count);
    if stats.recent_posts.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![bold("ID"), bold("Title"), bold("Type"), bold("Date"), bold("Status")]);
    for item in &stats.recent_posts {
        table.add_row(vec![
            item.id.to_string(),
            item.title.clone(),
            item.kind.to_string(),
            format_time(item.date),
            item.status.to_string(),
        ]);
    }
    println!("{}", table);
}

fn roster_table(entries: &[RosterEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        bold("User"),
        bold("Role"),
        bold("Created"),
        bold("Last Used"),
        bold("Posts"),
        bold("Media"),
    ]);
    for entry in entries {
        table.add_row(vec![
            entry.user.login.clone(),
            entry.user.role.to_string(),
            format_time(entry.credential.created),
            entry
                .credential
                .last_used
                .map(format_time)
                .unwrap_or_else(|| "Never".to_string()),
            entry.stats.post_count.to_string(),
            entry.stats.media_count.to_string(),
        ]);
    }
    table
}

fn bold(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}
