//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use muni_core::backend::{HttpResponder, Responder};
use muni_core::config::{self, Config};
use muni_core::kb::{KbResponder, ProcedureStore};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "muni")]
#[command(version)]
#[command(about = "Municipal procedures chat assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the procedure .txt files (overrides config)
    #[arg(long, value_name = "DIR", env = "MUNI_KB_DIR")]
    kb_dir: Option<PathBuf>,

    /// URL of a remote chat backend (overrides config)
    #[arg(long, value_name = "URL", env = "MUNI_BACKEND_URL")]
    backend: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Interactive chat session (default)
    Chat,
    /// Ask a single question and print the reply
    Ask {
        /// The question to ask
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Print the raw reply as JSON instead of markup
        #[arg(long)]
        json: bool,
    },
    /// Render reply markup from a file (or stdin) to an HTML fragment
    Render {
        /// Input file; reads stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Inspect the local knowledge base
    Kb {
        #[command(subcommand)]
        command: KbCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum KbCommands {
    /// List all procedure titles
    List,
    /// Show one procedure by title or code
    Show {
        /// Title or code of the procedure
        #[arg(value_name = "KEY")]
        key: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

/// Logs go to a daily-rolled file under ${MUNI_HOME}/logs; stdout stays
/// clean for the chat itself. Level comes from RUST_LOG, default info.
fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Ok(file_appender) = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("muni.log")
        .build(config::paths::logs_dir())
    else {
        return;
    };

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("load config")?;
    if let Some(dir) = cli.kb_dir {
        config.kb_dir = Some(dir);
    }
    if let Some(url) = cli.backend {
        config.backend_url = Some(url);
    }

    // default to chat mode
    match cli.command {
        None | Some(Commands::Chat) => commands::chat::run(&config).await,

        Some(Commands::Ask { message, json }) => commands::ask::run(&config, &message, json).await,

        Some(Commands::Render { file }) => commands::render::run(file.as_deref()),

        Some(Commands::Kb { command }) => match command {
            KbCommands::List => commands::kb::list(&config),
            KbCommands::Show { key } => commands::kb::show(&config, &key),
        },

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

/// Remote backend when a URL is configured, local knowledge base otherwise.
pub(crate) fn build_responder(config: &Config) -> Result<Responder> {
    if let Some(url) = &config.backend_url {
        tracing::info!(%url, "using remote chat backend");
        Ok(Responder::Http(HttpResponder::new(url.clone())))
    } else {
        let kb_dir = config.kb_dir();
        let store = ProcedureStore::load_dir(&kb_dir)
            .with_context(|| format!("load procedures from {}", kb_dir.display()))?;
        Ok(Responder::Kb(KbResponder::new(store)))
    }
}
