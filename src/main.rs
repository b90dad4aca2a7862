//! Courier command line: inspect dispatch decisions without the host app.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use courier::address::{
    AddressResolver, Canonicalizer, Directory, E164Canonicalizer, InMemoryDirectory, Recipient,
};
use courier::attachment::ProgressReader;
use courier::config::{self, Config};
use courier::content::locator::{self, LocatorKind};
use courier::content::openers::SchemeOpener;
use courier::content::{ContentReference, ResourceOpener};
use courier::job::DescriptorBuilder;
use courier::notify::{DeliveryFailureNotifier, LogNotifier};
use courier::policy::FallbackPolicy;
use courier::store::SqliteStore;

/// Courier, the outbound media dispatch core.
#[derive(Parser)]
#[command(name = "courier", version, about)]
struct Cli {
    /// Config file (default: `~/.courier/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Print the job descriptor for a destination.
    Descriptor {
        /// Raw destination (number or group id).
        destination: String,
    },
    /// Print the fallback verdict for a destination.
    Fallback {
        /// Raw destination (number or group id).
        destination: String,
    },
    /// Resolve a number into a push address.
    Address {
        /// Raw number.
        number: String,
        /// Local recipient id to attach.
        #[arg(long, default_value_t = 0)]
        recipient_id: i64,
    },
    /// Classify a content reference and show its exported locator.
    Locate {
        /// Content reference URL.
        reference: String,
    },
    /// Fetch an external content reference.
    Fetch {
        /// Content reference URL (`file://`, `http://`, `https://`).
        reference: String,
        /// Write the content here instead of discarding it.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Raise the delivery-failed notification for a stored message.
    NotifyFailed {
        /// Local message id.
        message_id: i64,
        /// SQLite message database.
        #[arg(long)]
        db: PathBuf,
    },
}

/// Collaborators assembled from config.
struct Runtime {
    canonicalizer: Arc<dyn Canonicalizer>,
    directory: Arc<dyn Directory>,
    policy: FallbackPolicy,
}

impl Runtime {
    fn from_config(config: &Config) -> Self {
        let canonicalizer: Arc<dyn Canonicalizer> = Arc::new(E164Canonicalizer::new(
            config.address.local_country_code.clone(),
        ));
        let directory: Arc<dyn Directory> = Arc::new(InMemoryDirectory::from_entries(
            config.directory.entries.iter().cloned(),
        ));
        let policy = FallbackPolicy::new(
            Arc::clone(&canonicalizer),
            Arc::clone(&directory),
            Arc::new(config.fallback.clone()),
        );
        Self {
            canonicalizer,
            directory,
            policy,
        }
    }
}

/// Classification printed by `locate`.
#[derive(Serialize)]
struct LocateReport {
    reference: String,
    local: bool,
    kind: &'static str,
    id: Option<i64>,
    external: Option<String>,
}

/// Verdict printed by `fallback`.
#[derive(Serialize)]
struct FallbackReport {
    destination: String,
    canonical: Option<String>,
    supported: bool,
    approval_required: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_dir()?.join("config.toml"),
    };
    let config = config::load_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let _logging_guard = match config.logging.logs_dir.as_deref() {
        Some(dir) => Some(courier::logging::init_production(dir)?),
        None => {
            courier::logging::init_cli();
            None
        }
    };

    let runtime = Runtime::from_config(&config);

    match cli.command {
        Command::Descriptor { destination } => {
            let builder = DescriptorBuilder::new(runtime.policy.clone());
            let descriptor = builder.build(&destination).await;
            print_json(&descriptor)
        }
        Command::Fallback { destination } => {
            let verdict = runtime.policy.evaluate(&destination).await;
            print_json(&FallbackReport {
                destination,
                canonical: verdict.canonical.map(|c| c.into_string()),
                supported: verdict.supported,
                approval_required: verdict.approval_required,
            })
        }
        Command::Address {
            number,
            recipient_id,
        } => {
            let resolver = AddressResolver::new(runtime.canonicalizer, runtime.directory);
            let recipient = Recipient {
                id: recipient_id,
                number,
            };
            let address = resolver.resolve(&recipient).await?;
            print_json(&address)
        }
        Command::Locate { reference } => handle_locate(&reference),
        Command::Fetch { reference, out } => handle_fetch(&reference, out).await,
        Command::NotifyFailed { message_id, db } => {
            let store = Arc::new(SqliteStore::open(&db).await?);
            let notifier = DeliveryFailureNotifier::new(
                store.clone(),
                store,
                Arc::new(LogNotifier),
            );
            notifier.notify_delivery_failed(message_id).await;
            Ok(())
        }
    }
}

fn handle_locate(raw: &str) -> anyhow::Result<()> {
    let reference = ContentReference::parse(raw)?;
    let (kind, id) = match locator::classify(&reference)? {
        LocatorKind::Part(id) => ("part", Some(id)),
        LocatorKind::Thumbnail(id) => ("thumbnail", Some(id)),
        LocatorKind::External => ("external", None),
    };
    let external = locator::to_external_locator(&reference)
        .ok()
        .map(|r| r.to_string());
    print_json(&LocateReport {
        reference: reference.to_string(),
        local: locator::is_local(&reference),
        kind,
        id,
        external,
    })
}

async fn handle_fetch(raw: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    let reference = ContentReference::parse(raw)?;
    if locator::is_local(&reference) {
        anyhow::bail!("{reference} lives in encrypted storage and cannot be fetched here");
    }

    let opener = SchemeOpener::with_http()?;
    let stream = opener.open(&reference).await?;
    let mut reader = ProgressReader::new(
        stream,
        0,
        Arc::new(|current: u64, _total: u64| {
            tracing::trace!(current, "fetch progress");
        }),
    );

    match out {
        Some(path) => {
            let mut file = tokio::fs::File::create(&path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?;
            tokio::io::copy(&mut reader, &mut file).await?;
        }
        None => {
            tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
        }
    }

    info!(bytes = reader.bytes_read(), "fetched {reference}");
    println!("{}", reader.bytes_read());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
