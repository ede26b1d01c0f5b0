//! Entrypoint of the portfolio binary

use dotenvy::dotenv;
use portfolio_clap_blocks::logging::LoggingConfig;

mod commands {
    pub(crate) mod add;
    pub(crate) mod common;
    pub(crate) mod delete;
    pub(crate) mod get;
    pub(crate) mod ingest_image;
    pub(crate) mod list;
    pub(crate) mod page;
    pub(crate) mod update;
}

enum ReturnCode {
    Failure = 1,
}

#[derive(Debug, clap::Parser)]
#[clap(
    name = "portfolio",
    version,
    about = "Portfolio catalog command line tools",
    long_about = r#"Portfolio catalog command line tools

Examples:
    # List every project in the catalog
    portfolio list --store-url https://store.example.com

    # Show the second page of Java projects, six per page
    portfolio page --category java --cursor <cursor of the first page>

    # Add a project with an embedded, compressed screenshot
    portfolio add --name Chess --short-description "Chess engine" \
        --detailed-description "A UCI chess engine" --category game --image shot.png

    # Try the CLI out against an empty in-process store with debug logging
    portfolio list --store memory -v
"#
)]
struct Config {
    #[clap(flatten)]
    logging_config: LoggingConfig,

    #[clap(subcommand)]
    command: Option<Command>,
}

// Ignoring clippy here since this enum is just used for running
// the CLI command
#[allow(clippy::large_enum_variant)]
#[derive(Debug, clap::Parser)]
enum Command {
    /// List catalog entries, optionally by category or search term
    List(commands::list::Config),

    /// Show one catalog entry
    Get(commands::get::Config),

    /// Page through catalog entries, newest first
    Page(commands::page::Config),

    /// Add a catalog entry
    Add(commands::add::Config),

    /// Change fields of a catalog entry
    Update(commands::update::Config),

    /// Delete a catalog entry
    Delete(commands::delete::Config),

    /// Process image files the way `add --image` would and print the resulting references
    IngestImage(commands::ingest_image::Config),
}

fn main() -> Result<(), std::io::Error> {
    // load all environment variables from .env before doing anything
    load_dotenv();

    let config: Config = clap::Parser::parse();

    if let Err(e) = init_logs(&config.logging_config) {
        eprintln!("Initializing logs failed: {e}");
        std::process::exit(ReturnCode::Failure as _);
    }

    let tokio_runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    tokio_runtime.block_on(async move {
        match config.command {
            None => println!("command required, -h/--help for help"),
            Some(Command::List(config)) => {
                if let Err(e) = commands::list::command(config).await {
                    eprintln!("List command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
            Some(Command::Get(config)) => {
                if let Err(e) = commands::get::command(config).await {
                    eprintln!("Get command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
            Some(Command::Page(config)) => {
                if let Err(e) = commands::page::command(config).await {
                    eprintln!("Page command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
            Some(Command::Add(config)) => {
                if let Err(e) = commands::add::command(config).await {
                    eprintln!("Add command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
            Some(Command::Update(config)) => {
                if let Err(e) = commands::update::command(config).await {
                    eprintln!("Update command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
            Some(Command::Delete(config)) => {
                if let Err(e) = commands::delete::command(config).await {
                    eprintln!("Delete command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
            Some(Command::IngestImage(config)) => {
                if let Err(e) = commands::ingest_image::command(config).await {
                    eprintln!("Ingest image command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
        }
    });

    Ok(())
}

/// Source the .env file before initialising the Config struct - this sets
/// any envs in the file, which the Config struct then uses.
///
/// Precedence is given to existing env variables.
fn load_dotenv() {
    match dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            // a missing env file is fine, clap applies the defaults
        }
        Err(e) => {
            eprintln!("FATAL Error loading config from: {e}");
            eprintln!("Aborting");
            std::process::exit(1);
        }
    };
}

/// Log to stderr so stdout only ever carries command output
fn init_logs(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = config.env_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}
