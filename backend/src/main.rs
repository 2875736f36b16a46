//! `shared-lists` command line: drives the list core against the configured
//! sync strategy and prints JSON results.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use shared_lists::config::SharedListsSettings;
use shared_lists::domain::list_stats::summaries_for;
use shared_lists::domain::{
    BearerToken, Error, ItemDraft, ItemId, ListId, Locale, Session, TitleEditor, UserId,
};
use shared_lists::wiring::{Services, build_services};

/// `shared-lists` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "shared-lists",
    about = "Manage shared shopping lists through the configured persistence strategy",
    version
)]
struct CliArgs {
    /// Acting user id.
    #[arg(long, env = "SHARED_LISTS_USER", value_name = "id")]
    user: String,
    /// Bearer credential for the Persistence Service.
    #[arg(long, env = "SHARED_LISTS_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Message language; overrides `SHARED_LISTS_LOCALE`.
    #[arg(long, value_name = "en|cs")]
    locale: Option<Locale>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lists the acting user belongs to.
    Lists {
        /// Include archived lists.
        #[arg(long)]
        include_archived: bool,
    },
    /// One list in full, re-read from the persistence side.
    Show { list: String },
    /// Create a list owned by the acting user.
    Create { title: String },
    /// Rename a list.
    Rename { list: String, title: String },
    /// Archive a list.
    Archive { list: String },
    /// Restore an archived list.
    Unarchive { list: String },
    /// Delete a list permanently.
    Delete { list: String },
    /// Append an item.
    AddItem {
        list: String,
        name: String,
        #[arg(long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Flip an item's resolved flag.
    Toggle { list: String, item: String },
    /// Remove an item.
    RemoveItem { list: String, item: String },
    /// Invite users to a list.
    Invite {
        list: String,
        #[arg(required = true)]
        users: Vec<String>,
    },
    /// Remove a member from a list.
    RemoveMember { list: String, user: String },
    /// Leave a list.
    Leave { list: String },
    /// Users who could be invited to a list.
    Candidates { list: String },
    /// Resolved and unresolved item counts per list.
    Stats,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = SharedListsSettings::load_from_iter([OsString::from("shared-lists")])
        .wrap_err("load settings")?;
    let services = build_services(&settings).wrap_err("assemble list core")?;
    let session = session_for(&args, services.locale)?;

    let outcome = match services.store.load(&session).await {
        Ok(_) => run(&services, &session, args.command).await,
        Err(error) => Err(error),
    };
    match outcome {
        Ok(value) => {
            emit(&value)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            debug!(code = ?error.code(), message = error.message(), "command failed");
            emit(&json!({
                "error": {
                    "code": error.code(),
                    "message": error.localized_message(session.locale()),
                    "detail": error.message(),
                    "details": error.details(),
                }
            }))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn session_for(args: &CliArgs, default_locale: Locale) -> Result<Session> {
    let user = UserId::new(args.user.as_str()).map_err(|error| eyre!("--user: {error}"))?;
    let mut session = Session::new(user).with_locale(args.locale.unwrap_or(default_locale));
    if let Some(token) = args.token.as_deref().and_then(BearerToken::new) {
        session = session.with_credential(token);
    }
    Ok(session)
}

async fn run(services: &Services, session: &Session, command: Command) -> Result<Value, Error> {
    let store = &services.store;
    let editor = &services.editor;
    match command {
        Command::Lists { include_archived } => {
            to_json(&store.get_lists_by_user(session.user_id(), include_archived))
        }
        Command::Show { list } => {
            let id = ListId::new(list)?;
            editor.view_list(session, &id)?;
            store.fetch_list(session, &id).await?;
            to_json(&editor.view_list(session, &id)?)
        }
        Command::Create { title } => to_json(&store.create_list(session, &title).await?),
        Command::Rename { list, title } => {
            let id = ListId::new(list)?;
            let current = editor.view_list(session, &id)?;
            let mut title_editor = TitleEditor::new(id);
            title_editor.begin_edit(session, &current)?;
            title_editor.update_draft(title);
            to_json(&title_editor.submit(session, editor).await?)
        }
        Command::Archive { list } => to_json(&store.archive_list(session, &ListId::new(list)?).await?),
        Command::Unarchive { list } => {
            to_json(&store.unarchive_list(session, &ListId::new(list)?).await?)
        }
        Command::Delete { list } => {
            let id = ListId::new(list)?;
            store.delete_list(session, &id).await?;
            Ok(json!({ "deleted": id }))
        }
        Command::AddItem {
            list,
            name,
            quantity,
            unit,
        } => {
            let draft = ItemDraft::new(name, quantity, unit.as_deref());
            to_json(&editor.add_item(session, &ListId::new(list)?, &draft).await?)
        }
        Command::Toggle { list, item } => to_json(
            &editor
                .toggle_item_resolved(session, &ListId::new(list)?, &ItemId::new(item)?)
                .await?,
        ),
        Command::RemoveItem { list, item } => to_json(
            &editor
                .remove_item(session, &ListId::new(list)?, &ItemId::new(item)?)
                .await?,
        ),
        Command::Invite { list, users } => {
            let users = users
                .into_iter()
                .map(user_id)
                .collect::<Result<Vec<_>, _>>()?;
            to_json(&editor.invite_members(session, &ListId::new(list)?, &users).await?)
        }
        Command::RemoveMember { list, user } => to_json(
            &editor
                .remove_member(session, &ListId::new(list)?, &user_id(user)?)
                .await?,
        ),
        Command::Leave { list } => to_json(&editor.leave_list(session, &ListId::new(list)?).await?),
        Command::Candidates { list } => {
            to_json(&editor.invite_candidates(session, &ListId::new(list)?).await?)
        }
        Command::Stats => to_json(&summaries_for(
            session.user_id(),
            &store.get_lists_by_user(session.user_id(), true),
        )),
    }
}

fn user_id(raw: String) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|error| Error::not_found(format!("user: {error}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|error| Error::invariant_violation(error.to_string()))
}

fn emit(value: &Value) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
