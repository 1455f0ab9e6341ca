use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nook_common::config::{NookConfig, StorageKind};
use nook_common::{APP_NAME, logging, path_guard};
use nook_store::{CollectionBackend, TaskStore};
use nook_web::{TasksState, ValentineState, tasks_router, valentine_router};
use tracing::info;

mod shell;

use shell::Shell;

#[derive(Debug, Parser)]
#[command(name = "nook", about = "To-do list and valentine keepsake apps", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate local setup, generate default config, and migrate both databases.
    Doctor,
    /// To-do list manager.
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },
    /// Wishlist, watchlist and halloween keeper.
    Valentine {
        #[command(subcommand)]
        command: ValentineCommand,
    },
}

#[derive(Debug, Subcommand)]
enum TasksCommand {
    /// Serve the to-do web app.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Interactive terminal menu over the same database.
    Shell,
}

#[derive(Debug, Subcommand)]
enum ValentineCommand {
    /// Serve the valentine web app.
    Serve {
        #[arg(long)]
        bind: Option<String>,
        /// Storage backend: sqlite or json-files.
        #[arg(long)]
        storage: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Doctor) => doctor(),
        Some(Command::Tasks { command }) => tasks(command),
        Some(Command::Valentine { command }) => valentine(command),
        None => {
            println!("{APP_NAME} CLI ready.");
            println!("Run `nook doctor` to generate and validate local config.");
            Ok(())
        }
    }
}

fn load_initialized_config() -> Result<NookConfig> {
    let (config, _, _) = NookConfig::load_or_create()?;
    config.validate_and_prepare()?;
    logging::init(&config.log_level);
    Ok(config)
}

fn doctor() -> Result<()> {
    let (config, path, created) = NookConfig::load_or_create()?;
    config.validate_and_prepare()?;
    logging::init(&config.log_level);

    let tasks_db = config.tasks_db_path();
    TaskStore::initialize(&tasks_db)
        .with_context(|| format!("failed to migrate {}", tasks_db.display()))?;
    let backend = collection_backend(&config, config.valentine.storage);
    backend
        .initialize()
        .context("failed to prepare valentine storage")?;

    println!("{APP_NAME} doctor: OK");
    println!("config: {}", path.display());
    println!("data_dir: {}", config.data_dir.display());
    println!("tasks_db: {}", tasks_db.display());
    println!("valentine_storage: {}", config.valentine.storage.as_str());
    println!("created_config: {created}");

    Ok(())
}

fn tasks(command: TasksCommand) -> Result<()> {
    let config = load_initialized_config()?;
    let db_path = config.tasks_db_path();
    // Schema is migrated once per process, before any request or prompt.
    let store = TaskStore::initialize(&db_path)
        .with_context(|| format!("failed to migrate {}", db_path.display()))?;

    match command {
        TasksCommand::Serve { bind } => {
            drop(store);
            let bind = bind.unwrap_or_else(|| config.tasks.bind.clone());
            let static_dir = path_guard::ensure_dir(&config.resolve(&config.tasks.static_dir))?;
            info!(db = %db_path.display(), static_dir = %static_dir.display(), "starting tasks app");
            println!("web_status: starting");
            println!("bind: {bind}");
            println!("db: {}", db_path.display());
            let app = tasks_router(TasksState {
                db_path,
                static_dir,
            });
            block_on(nook_web::serve(&bind, app))?;
        }
        TasksCommand::Shell => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            Shell::new(&store, stdin.lock(), stdout.lock()).run()?;
        }
    }
    Ok(())
}

fn valentine(command: ValentineCommand) -> Result<()> {
    let config = load_initialized_config()?;

    match command {
        ValentineCommand::Serve { bind, storage } => {
            let storage = match storage {
                Some(raw) => StorageKind::parse(&raw)
                    .ok_or_else(|| anyhow::anyhow!("unsupported storage backend: {raw}"))?,
                None => config.valentine.storage,
            };
            let backend = collection_backend(&config, storage);
            backend
                .initialize()
                .context("failed to prepare valentine storage")?;

            let static_dir = path_guard::ensure_dir(&config.resolve(&config.valentine.static_dir))?;
            for subdir in ["photos", "music"] {
                path_guard::ensure_dir(&static_dir.join(subdir))?;
            }

            let bind = bind.unwrap_or_else(|| config.valentine.bind.clone());
            info!(storage = storage.as_str(), static_dir = %static_dir.display(), "starting valentine app");
            println!("web_status: starting");
            println!("bind: {bind}");
            println!("storage: {}", storage.as_str());
            let app = valentine_router(ValentineState {
                backend,
                static_dir,
            });
            block_on(nook_web::serve(&bind, app))?;
        }
    }
    Ok(())
}

fn collection_backend(config: &NookConfig, storage: StorageKind) -> CollectionBackend {
    match storage {
        StorageKind::Sqlite => CollectionBackend::Sqlite(config.valentine_db_path()),
        StorageKind::JsonFiles => {
            CollectionBackend::JsonFiles(config.resolve(&config.valentine.json_dir))
        }
    }
}

fn block_on(server: impl Future<Output = Result<()>>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server)
}
