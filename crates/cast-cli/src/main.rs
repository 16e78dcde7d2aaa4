use anyhow::Context;
use clap::{Parser, Subcommand};

use cast_config::CastConfig;
use cast_store::{DocStore, Filter};

#[derive(Parser)]
#[command(name = "castaway", version, about = "Bring the pool app document store to its declared state")]
struct Cli {
    /// Store path override (defaults to config `store.path`).
    #[arg(long, global = true)]
    db: Option<String>,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug detail.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full bootstrap sequence (idempotent; safe to rerun).
    Init,
    /// Report collection and fixture state without writing anything.
    Status,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("castaway error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = CastConfig::load_with_dotenv().context("failed to load configuration")?;
    let path = cli.db.unwrap_or_else(|| config.store.path.clone());

    match cli.command {
        Commands::Init => init(&path, &config).await,
        Commands::Status => status(&path).await,
    }
}

async fn init(path: &str, config: &CastConfig) -> anyhow::Result<()> {
    if path != ":memory:" {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
    }

    let store = DocStore::open_local(path)
        .await
        .with_context(|| format!("failed to open store at {path}"))?;
    let report = cast_seed::run(&store, &config.seed)
        .await
        .context("bootstrap run failed")?;

    println!(
        "bootstrap complete: {} collections, {} indexes, {} seasons, {} identities",
        report.collections, report.indexes, report.seasons, report.identities
    );
    if report.reset.previous_identity {
        println!(
            "fixture reset: {} pools, {} memberships, {} picks removed, {} back-references cleared",
            report.reset.pools_deleted,
            report.reset.memberships_deleted,
            report.reset.picks_deleted,
            report.reset.backrefs_cleared
        );
    } else {
        println!("fixture reset: fresh identity created");
    }
    Ok(())
}

async fn status(path: &str) -> anyhow::Result<()> {
    let store = DocStore::open_local(path)
        .await
        .with_context(|| format!("failed to open store at {path}"))?;

    for collection in cast_core::collections::ALL {
        if store.collection_exists(collection).await? {
            let docs = store.count(collection, None).await?;
            let indexes = store.index_names(collection).await?.len();
            println!("{collection}: {docs} documents, {indexes} indexes");
        } else {
            println!("{collection}: absent");
        }
    }

    if store.collection_exists(cast_core::collections::USERS).await? {
        let fixtures = store
            .count(
                cast_core::collections::USERS,
                Some(&Filter::eq(
                    "username",
                    cast_seed::identities::FIXTURE_USERNAME,
                )),
            )
            .await?;
        println!("fixture identity present: {}", fixtures == 1);
    }
    Ok(())
}


fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CASTAWAY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
