//! Lembrete Server
//!
//! Serves a line-oriented task protocol over TCP and dispatches due
//! reminders through an external notify command on a fixed tick.

use anyhow::Result;
use clap::Parser;
use lembrete_server::cli::Cli;
use lembrete_server::config::Config;
use lembrete_server::notify::{ExecNotifier, LogNotifier, Notifier};
use lembrete_server::scheduler::ReminderScheduler;
use lembrete_server::server::Server;
use lembrete_server::store::TaskStore;
use std::fs::OpenOptions;
use std::sync::Arc;
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

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };

    // CLI overrides
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(tasks_file) = cli.tasks_file {
        config.server.tasks_path = tasks_file;
    }
    if let Some(tick) = cli.tick {
        config.scheduler.tick_seconds = tick;
    }

    info!("Starting lembrete-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Task file: {:?}", config.server.tasks_path);

    let store = TaskStore::open(&config.server.tasks_path)?;

    let notifier: Arc<dyn Notifier> = match &config.notify.command {
        Some(command) => Arc::new(ExecNotifier::new(command, config.notify.args.clone())),
        None => {
            info!("No notify command configured; reminders will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let scheduler = ReminderScheduler::new(
        store.clone(),
        notifier,
        config.scheduler.tick(),
        config.scheduler.notify_timeout(),
    );
    tokio::spawn(scheduler.run());

    let server = Server::bind(
        &config.listen_addr(),
        store,
        config.server.max_connections,
    )
    .await?;
    info!("Servidor ouvindo em {}", config.listen_addr());
    server.run().await
}
