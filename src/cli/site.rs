use crate::cli::{parse_format, CliContext, OutputFormat};
use crate::core::credentials;
use crate::models::integration::Integration;
use crate::models::user::Role;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;

pub(crate) fn parse_login(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("login cannot be empty".into());
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' || c == '@')
    {
        return Err("only [a-zA-Z0-9._@-] allowed".into());
    }
    Ok(s.to_string())
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse()
}

#[derive(Subcommand, Debug)]
pub enum SiteCommand {
    /// Create the site directory and site.toml
    Init(InitArgs),
    /// Add a user
    AddUser(AddUserArgs),
    /// List users and whether each is connected
    Users(UsersArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Public home URL handed to the agent
    #[arg(long, value_name = "URL")]
    pub home_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddUserArgs {
    /// Login name
    #[arg(value_parser = parse_login)]
    pub login: String,

    /// administrator|editor|author|contributor|subscriber
    #[arg(long, value_parser = parse_role, default_value = "administrator")]
    pub role: Role,
}

#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Output format: table|json
    #[arg(long, value_parser = parse_format, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct UserItem {
    id: u64,
    login: String,
    role: Role,
    connected: bool,
}

pub fn run(ctx: &CliContext, cmd: SiteCommand) -> Result<()> {
    match cmd {
        SiteCommand::Init(args) => run_init(ctx, args),
        SiteCommand::AddUser(args) => run_add_user(ctx, args),
        SiteCommand::Users(args) => run_users(ctx, args),
    }
}

fn run_init(ctx: &CliContext, args: InitArgs) -> Result<()> {
    let store = ctx.init(args.home_url.as_deref())?;
    println!("site initialized at {}", store.paths().root.display());
    println!("home url: {}", store.data().site.home_url);
    Ok(())
}

fn run_add_user(ctx: &CliContext, args: AddUserArgs) -> Result<()> {
    let mut store = ctx.open()?;
    let user = store.add_user(&args.login, args.role)?;
    store.save()?;
    println!("Added {} (id {}, {})", user.login, user.id, user.role);
    Ok(())
}

fn run_users(ctx: &CliContext, args: UsersArgs) -> Result<()> {
    let store = ctx.open()?;
    let integration: Integration = store.data().plugin.integration();
    let mut items = Vec::new();
    for user in &store.data().users {
        let connected = credentials::lookup(&store, &integration, user.id)
            .with_context(|| format!("look up credential for {}", user.login))?
            .is_some();
        items.push(UserItem {
            id: user.id,
            login: user.login.clone(),
            role: user.role,
            connected,
        });
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&items).context("serialize users")?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No users found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Login").add_attribute(Attribute::Bold),
        Cell::new("Role").add_attribute(Attribute::Bold),
        Cell::new(&integration.reserved_name).add_attribute(Attribute::Bold),
    ]);
    for item in items {
        table.add_row(vec![
            item.id.to_string(),
            item.login,
            item.role.to_string(),
            if item.connected { "connected" } else { "-" }.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
