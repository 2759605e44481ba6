//! Task Forest server
//!
//! Serves per-user task hierarchies over HTTP and offers a few admin commands.

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use task_forest::cli::{Cli, Command, ServeArgs, TasksArgs, UserCommand};
use task_forest::config::{Config, ConfigLoader, ConfigPaths};
use task_forest::db::Database;
use task_forest::server;
use task_forest::service::{RegisterInput, TaskService, UserService};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // --config takes the place of TASK_FOREST_CONFIG_PATH
    let explicit_config = cli.config.clone();
    let mut loader = ConfigLoader::load_with(ConfigPaths::discover(), |key| match key {
        "TASK_FOREST_CONFIG_PATH" => explicit_config
            .clone()
            .or_else(|| std::env::var(key).ok()),
        _ => std::env::var(key).ok(),
    })?;
    if let Some(path) = loader.config_path() {
        info!("Using config file {}", path.display());
    }

    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.into();
    }
    let config = loader.into_config();

    match cli.command {
        Some(Command::Serve(args)) => run_server(config, args).await?,
        None => run_server(config, ServeArgs::default()).await?,
        Some(Command::User(cmd)) => run_user_command(&config, cmd).await?,
        Some(Command::Tasks(args)) => run_tasks_command(&config, args).await?,
    }

    Ok(())
}

fn open_database(config: &Config) -> Result<Arc<Database>> {
    let db = Database::open_path(&config.server.db_path)?;
    info!("Database opened at {}", config.server.db_path.display());
    Ok(Arc::new(db))
}

async fn run_server(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let db = open_database(&config)?;
    let state = server::state_from_config(db, &config)?;

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let (shutdown_tx, _bound, handle) = server::start_server(state, addr).await?;

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C");
    let _ = shutdown_tx.send(());
    handle.await?;

    Ok(())
}

async fn run_user_command(config: &Config, cmd: UserCommand) -> Result<()> {
    let db = open_database(config)?;
    let users =
        UserService::new(db).with_hash_iterations(config.auth.password_iterations);

    match cmd {
        UserCommand::Add {
            username,
            password,
            name,
        } => {
            let user = users
                .register(RegisterInput {
                    username,
                    password,
                    name,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserCommand::List => {
            let list = users.list().await?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
    }
    Ok(())
}

async fn run_tasks_command(config: &Config, args: TasksArgs) -> Result<()> {
    let db = open_database(config)?;
    let tasks = TaskService::new(db.clone(), db);
    let owner = args.owner.as_deref();

    let json = if args.flat {
        serde_json::to_string_pretty(&tasks.list_tasks(owner).await?)?
    } else {
        serde_json::to_string_pretty(&tasks.list_task_tree(owner).await?)?
    };
    println!("{}", json);
    Ok(())
}
