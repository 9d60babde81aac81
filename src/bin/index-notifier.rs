use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use index_notifier::app::App;
use index_notifier::server;
use index_notifier::store::{LogFilter, LogSort, NotificationType, PageRequest};
use index_notifier::utils::config_loader;
use index_notifier::utils::logging::{self, LogLevel};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "index-notifier.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one notification for a URL
    Notify {
        #[arg(long)]
        url: String,
        #[arg(long = "type", value_enum, default_value = "updated")]
        notification_type: TypeArg,
    },
    /// Apply the configured retention policy once
    Rotate,
    /// Query the notification log
    Logs {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        orderby: Option<String>,
        #[arg(long)]
        order: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        per_page: usize,
    },
    /// Show the latest log entry for a subject
    Latest {
        #[arg(long)]
        subject: u64,
    },
    /// Delete every log entry
    PurgeLogs,
    /// Remove stored data if delete_data_on_uninstall is "yes"
    Uninstall,
    /// Serve the HTTP surface and run rotation on schedule
    Serve,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Updated,
    Deleted,
}

impl From<TypeArg> for NotificationType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Updated => NotificationType::UrlUpdated,
            TypeArg::Deleted => NotificationType::UrlDeleted,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Open log store, build dispatcher and rotation engine
    // -------------------------------

    let app = Arc::new(App::build(service_config)?);

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command {
        Command::Notify { url, notification_type } => {
            match app.dispatcher.send(&url, notification_type.into()).await {
                Ok(outcome) => println!("{} accepted ({})", url, outcome.status),
                Err(err) => bail!("[{}] {}", err.status_tag(), err),
            }
        }
        Command::Rotate => {
            let report = app.rotate().await?;
            println!("rotation '{}' deleted {} entries", report.policy.name(), report.deleted);
        }
        Command::Logs { search, orderby, order, page, per_page } => {
            let filter = LogFilter { search_term: search };
            let sort = LogSort::from_params(orderby.as_deref(), order.as_deref());
            let result = app.store.query(&filter, sort, PageRequest::page(page, per_page))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Latest { subject } => match app.store.latest_for_subject(subject)? {
            Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
            None => println!("no log entry for subject {}", subject),
        },
        Command::PurgeLogs => {
            let deleted = app.store.delete_all()?;
            println!("deleted {} log entries", deleted);
        }
        Command::Uninstall => {
            if app.uninstall()? {
                println!("log data removed");
            } else {
                warn!("log data kept");
            }
        }
        Command::Serve => {
            let policy = app.config.rotation.policy();
            let interval = Duration::from_secs(app.config.rotation.interval_seconds);
            let schedule = app.rotation.spawn_schedule(policy, interval);
            info!("Service starting...");
            let served = server::server::start(app.clone()).await;
            schedule.abort();
            served?;
        }
    }

    Ok(())
}
