use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_event_details, load_settings, submit_new_event, ClientError, EventDraft, EventEditor,
    EventsBackend, HttpEventsClient, QueryController, QueryEvent, ReferenceData,
};
use shared::{
    domain::{CategoryRef, CityRef, EventId, SortKey},
    error::{
        CREATE_EVENT_FAILED, DELETE_EVENT_FAILED, EVENT_CREATED, EVENT_DELETED, EVENT_NOT_FOUND,
        EVENT_UPDATED, UPDATE_EVENT_FAILED,
    },
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(about = "Browse and manage events through the events API")]
struct Cli {
    /// Overrides the API base URL from events.toml / environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of events.
    List(ListArgs),
    /// Interactive search session.
    Browse,
    /// Show an event with its recommendations.
    Show { id: String },
    Create(EventFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: EventFields,
    },
    Delete { id: String },
    Cities,
    Categories,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    title: Option<String>,
    /// City id or name; repeatable.
    #[arg(long = "city")]
    cities: Vec<String>,
    /// Category id or name; repeatable.
    #[arg(long = "category")]
    categories: Vec<String>,
    /// title, description or eventDate
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Args, Debug, Default)]
struct EventFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long = "category")]
    categories: Vec<String>,
    /// RFC 3339 or `YYYY-MM-DD HH:MM` (UTC).
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    let backend: Arc<dyn EventsBackend> = Arc::new(
        HttpEventsClient::new(&settings.api_base_url)
            .with_context(|| format!("invalid api url '{}'", settings.api_base_url))?,
    );
    debug!(api = %settings.api_base_url, page_size = settings.page_size, "events client ready");

    match cli.command {
        Command::List(args) => {
            let controller = QueryController::from_settings(backend, &settings);
            list_once(&controller, args).await?;
        }
        Command::Browse => {
            let controller = QueryController::from_settings(backend, &settings);
            browse(&controller).await?;
        }
        Command::Show { id } => {
            let details = load_event_details(backend.as_ref(), &EventId::new(id))
                .await
                .map_err(|err| anyhow!(err.user_message(EVENT_NOT_FOUND)))?;
            render::print_details(&details);
        }
        Command::Create(fields) => {
            let reference = ReferenceData::fetch(backend.as_ref())
                .await
                .context("failed to load cities and categories")?;
            let mut draft = EventDraft::default();
            apply_fields(&mut draft, fields, &reference)?;
            match submit_new_event(backend.as_ref(), &draft, Utc::now()).await {
                Ok(()) => println!("{EVENT_CREATED}"),
                Err(ClientError::Validation(report)) => {
                    render::print_validation(&report);
                    bail!("invalid event");
                }
                Err(err) => bail!(err.user_message(CREATE_EVENT_FAILED)),
            }
        }
        Command::Update { id, fields } => {
            let reference = ReferenceData::fetch_lenient(backend.as_ref()).await;
            let mut editor =
                EventEditor::load(backend.as_ref(), &EventId::new(id), Some(&reference))
                    .await
                    .map_err(|err| anyhow!(err.user_message(EVENT_NOT_FOUND)))?;
            apply_fields(&mut editor.draft, fields, &reference)?;
            editor
                .submit(backend.as_ref())
                .await
                .map_err(|err| anyhow!(err.user_message(UPDATE_EVENT_FAILED)))?;
            println!("{EVENT_UPDATED}");
        }
        Command::Delete { id } => {
            backend
                .delete_event(&EventId::new(id))
                .await
                .map_err(|err| anyhow!(err.user_message(DELETE_EVENT_FAILED)))?;
            println!("{EVENT_DELETED}");
        }
        Command::Cities => {
            let cities = backend
                .list_cities()
                .await
                .context("failed to load cities")?;
            render::print_reference(
                &ReferenceData {
                    cities,
                    categories: Vec::new(),
                },
                true,
            );
        }
        Command::Categories => {
            let categories = backend
                .list_categories()
                .await
                .context("failed to load categories")?;
            render::print_reference(
                &ReferenceData {
                    cities: Vec::new(),
                    categories,
                },
                false,
            );
        }
    }

    Ok(())
}

async fn list_once(controller: &Arc<QueryController>, args: ListArgs) -> Result<()> {
    let mut events = controller.subscribe();
    let reference = controller.activate().await;

    if let Some(title) = args.title {
        controller.set_title_query(title).await;
    }
    let cities = args
        .cities
        .iter()
        .map(|key| resolve_city(&reference, key).map(|city| city.id))
        .collect::<Result<Vec<_>>>()?;
    controller.set_city_ids(cities).await;
    let categories = args
        .categories
        .iter()
        .map(|key| resolve_category(&reference, key).map(|category| category.id))
        .collect::<Result<Vec<_>>>()?;
    controller.set_category_ids(categories).await;
    if let Some(sort) = args.sort.as_deref() {
        controller.set_sort_key(Some(parse_sort(sort)?)).await;
    }
    for _ in 1..args.page.max(1) {
        controller.next_page().await;
    }

    loop {
        match events.recv().await {
            Ok(QueryEvent::ResultsUpdated(page)) => {
                render::print_page(&page);
                return Ok(());
            }
            Ok(QueryEvent::QueryFailed(message)) => bail!(message),
            Ok(QueryEvent::EventDeleted(_)) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => bail!("listing pipeline stopped"),
        }
    }
}

async fn browse(controller: &Arc<QueryController>) -> Result<()> {
    let mut events = controller.subscribe();
    let reference = controller.activate().await;
    println!(
        "commands: title <text>, city <name>, category <name>, sort <title|description|eventDate|none>, next, prev, delete <id>, quit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(QueryEvent::ResultsUpdated(page)) => render::print_page(&page),
                Ok(QueryEvent::QueryFailed(message)) => eprintln!("{message}"),
                Ok(QueryEvent::EventDeleted(id)) => println!("{EVENT_DELETED}: {id}"),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !handle_browse_command(controller, &reference, line.trim()).await {
                    break;
                }
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}

/// Returns `false` when the session should end.
async fn handle_browse_command(
    controller: &Arc<QueryController>,
    reference: &ReferenceData,
    line: &str,
) -> bool {
    let (command, argument) = line
        .split_once(' ')
        .map(|(command, argument)| (command, argument.trim()))
        .unwrap_or((line, ""));

    let outcome = match command {
        "" => Ok(()),
        "quit" | "exit" => return false,
        "title" => {
            controller.set_title_query(argument).await;
            Ok(())
        }
        "city" => match resolve_city(reference, argument) {
            Ok(city) => {
                controller.toggle_city(city.id).await;
                Ok(())
            }
            Err(err) => Err(err),
        },
        "category" => match resolve_category(reference, argument) {
            Ok(category) => {
                controller.toggle_category(category.id).await;
                Ok(())
            }
            Err(err) => Err(err),
        },
        "sort" if argument == "none" => {
            controller.set_sort_key(None).await;
            Ok(())
        }
        "sort" => match parse_sort(argument) {
            Ok(sort) => {
                controller.set_sort_key(Some(sort)).await;
                Ok(())
            }
            Err(err) => Err(err),
        },
        "next" => {
            let page = controller.next_page().await;
            println!("page {page}");
            Ok(())
        }
        "prev" => {
            let page = controller.previous_page().await;
            println!("page {page}");
            Ok(())
        }
        "delete" => controller
            .delete_event(&EventId::new(argument))
            .await
            .map_err(|err| anyhow!(err.user_message(DELETE_EVENT_FAILED))),
        other => Err(anyhow!("unknown command '{other}'")),
    };

    if let Err(err) = outcome {
        eprintln!("{err}");
    }
    true
}

fn apply_fields(
    draft: &mut EventDraft,
    fields: EventFields,
    reference: &ReferenceData,
) -> Result<()> {
    if let Some(title) = fields.title {
        draft.title = title;
    }
    if let Some(address) = fields.address {
        draft.address = address;
    }
    if let Some(city) = fields.city.as_deref() {
        draft.selected_city = Some(resolve_city(reference, city)?);
    }
    if !fields.categories.is_empty() {
        draft.selected_categories = fields
            .categories
            .iter()
            .map(|key| resolve_category(reference, key))
            .collect::<Result<Vec<_>>>()?;
    }
    if let Some(date) = fields.date.as_deref() {
        draft.event_date = Some(parse_event_date(date)?);
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    Ok(())
}

fn resolve_city(reference: &ReferenceData, key: &str) -> Result<CityRef> {
    reference
        .find_city(key)
        .cloned()
        .ok_or_else(|| anyhow!("unknown city '{key}'"))
}

fn resolve_category(reference: &ReferenceData, key: &str) -> Result<CategoryRef> {
    reference
        .find_category(key)
        .cloned()
        .ok_or_else(|| anyhow!("unknown category '{key}'"))
}

fn parse_sort(value: &str) -> Result<SortKey> {
    SortKey::parse(value)
        .ok_or_else(|| anyhow!("unknown sort key '{value}'; use title, description or eventDate"))
}

fn parse_event_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .with_context(|| format!("invalid date '{value}'"))
}
