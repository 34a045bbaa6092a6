use crate::cli::site::parse_login;
use crate::cli::{format_time, parse_format, CliContext, OutputFormat};
use crate::constants;
use crate::core::admin::Plugin;
use crate::core::ports::{ContentStore, CredentialStore};
use crate::core::request::RequestContext;
use crate::error::ClawError;
use crate::models::content::{ContentId, ContentKind, NewContent, PostStatus};
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;
use zeroize::Zeroizing;

/// Statuses a client may request for new content.
fn parse_status(s: &str) -> Result<PostStatus, String> {
    match s.parse::<PostStatus>()? {
        PostStatus::Trash | PostStatus::Inherit => Err(format!(
            "status '{}' cannot be set on new content (use publish|draft|pending|private|future)",
            s
        )),
        status => Ok(status),
    }
}

#[derive(Subcommand, Debug)]
pub enum ApiCommand {
    /// Create a post
    Post(ApiArgs),
    /// Create a page
    Page(ApiArgs),
    /// Upload a media attachment
    Upload(ApiArgs),
}

#[derive(Args, Debug)]
pub struct ApiArgs {
    /// Authenticating user
    #[arg(long, value_parser = parse_login)]
    pub user: String,

    /// Application password; without it the request uses a session login
    #[arg(long, env = "CLAWPRESS_APP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Item title (file name for uploads)
    #[arg(long)]
    pub title: String,

    /// publish|draft|pending|private|future
    #[arg(long, value_parser = parse_status)]
    pub status: Option<PostStatus>,
}

#[derive(Subcommand, Debug)]
pub enum ContentCommand {
    /// List a user's content
    List(ContentListArgs),
    /// Move an item to the trash
    Trash(ContentIdArgs),
    /// Permanently delete an item and its metadata
    Delete(ContentIdArgs),
}

#[derive(Args, Debug)]
pub struct ContentListArgs {
    /// Author login
    #[arg(long, value_parser = parse_login)]
    pub user: String,

    /// Output format: table|json
    #[arg(long, value_parser = parse_format, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ContentIdArgs {
    pub id: ContentId,
}

#[derive(Serialize)]
struct ContentRow {
    id: ContentId,
    kind: ContentKind,
    title: String,
    status: PostStatus,
    date: String,
    via_integration: bool,
}

pub fn run(ctx: &CliContext, cmd: ApiCommand) -> Result<()> {
    let (kind, args) = match cmd {
        ApiCommand::Post(args) => (ContentKind::Post, args),
        ApiCommand::Page(args) => (ContentKind::Page, args),
        ApiCommand::Upload(args) => (ContentKind::Attachment, args),
    };

    let mut store = ctx.open()?;
    let plugin = Plugin::from_site(store.data());
    let request = match args.password {
        Some(password) => {
            let password = Zeroizing::new(password);
            match store.authenticate(&args.user, &password)? {
                Some((user, uuid)) => RequestContext::api(user, uuid),
                None => bail!("incorrect application password for {}", args.user),
            }
        }
        None => RequestContext::api_session(store.require_user(&args.user)?.id),
    };

    let author = store.require_user(&args.user)?;
    let capability = match kind {
        ContentKind::Post => "edit_posts",
        ContentKind::Page => "edit_pages",
        ContentKind::Attachment => "upload_files",
    };
    if !author.can(capability) {
        // Authentication already stamped last_used.
        store.save()?;
        return Err(ClawError::PermissionDenied.into());
    }

    let mut item = NewContent::new(author.id, kind, args.title);
    if let Some(status) = args.status {
        item = item.with_status(status);
    }
    let created = plugin.content_pipeline().insert(&mut store, &request, item)?;
    store.save()?;

    let tagged = created.meta.contains_key(constants::ATTRIBUTION_META_KEY);
    println!(
        "Created {} {} ({}){}",
        created.kind,
        created.id,
        created.status,
        if tagged {
            format!(" via {}", plugin.integration().reserved_name)
        } else {
            String::new()
        }
    );
    Ok(())
}

pub fn run_content(ctx: &CliContext, cmd: ContentCommand) -> Result<()> {
    match cmd {
        ContentCommand::List(args) => run_list(ctx, args),
        ContentCommand::Trash(args) => {
            let mut store = ctx.open()?;
            store
                .trash_item(args.id)
                .with_context(|| format!("trash item {}", args.id))?;
            store.save()?;
            println!("Trashed {}", args.id);
            Ok(())
        }
        ContentCommand::Delete(args) => {
            let mut store = ctx.open()?;
            store
                .delete_item(args.id)
                .with_context(|| format!("delete item {}", args.id))?;
            store.save()?;
            println!("Deleted {}", args.id);
            Ok(())
        }
    }
}

fn run_list(ctx: &CliContext, args: ContentListArgs) -> Result<()> {
    let store = ctx.open()?;
    let author = store.require_user(&args.user)?;
    let mut rows: Vec<ContentRow> = store
        .data()
        .content
        .iter()
        .filter(|c| c.author == author.id)
        .map(|c| ContentRow {
            id: c.id,
            kind: c.kind,
            title: c.title.clone(),
            status: c.status,
            date: format_time(c.date),
            via_integration: c.meta.contains_key(constants::ATTRIBUTION_META_KEY),
        })
        .collect();
    rows.sort_by(|a, b| b.id.cmp(&a.id));

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows).context("serialize content")?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No content found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Via").add_attribute(Attribute::Bold),
    ]);
    for row in rows {
        table.add_row(vec![
            row.id.to_string(),
            row.kind.to_string(),
            row.title,
            row.status.to_string(),
            row.date,
            if row.via_integration {
                store.data().plugin.reserved_name.clone()
            } else {
                "-".to_string()
            },
        ]);
    }
    println!("{}", table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_rejects_trash_and_inherit() {
        assert_eq!(parse_status("draft"), Ok(PostStatus::Draft));
        assert_eq!(parse_status("future"), Ok(PostStatus::Future));
        assert!(parse_status("trash").is_err());
        assert!(parse_status("inherit").is_err());
        assert!(parse_status("bogus").is_err());
    }
}
