//! Folio CLI - run and inspect the portfolio backend.

mod commands;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use folio_core::config::LogFormat;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio - portfolio backend with contact and chat relays")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to $FOLIO_CONFIG, then ./folio.json5)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address
        #[arg(long)]
        bind: Option<String>,

        /// Serve the built front end with SPA fallback
        #[arg(long)]
        production: bool,
    },

    /// Query the health endpoint of a running server
    Status {
        /// Port of the running server
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration completeness
    Doctor {
        /// Also check the SMTP connection
        #[arg(long)]
        smtp: bool,
    },

    /// Show or validate configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective configuration with secrets redacted
    Show,

    /// Validate configuration
    Validate,
}

fn init_tracing(debug: bool, format: LogFormat) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(false)).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = folio_core::Config::load_with(cli.config.as_deref());
    let settings = config
        .as_ref()
        .map(|c| c.settings.clone())
        .unwrap_or_default();
    init_tracing(cli.verbose || settings.debug, settings.log_format);

    let command = cli.command.unwrap_or(Commands::Serve {
        port: None,
        bind: None,
        production: false,
    });

    match command {
        Commands::Serve {
            port,
            bind,
            production,
        } => {
            let args = commands::serve::ServeArgs {
                port,
                bind,
                production,
            };
            commands::run_serve(config, args).await?;
        }

        Commands::Status { port } => {
            let args = commands::status::StatusArgs { port };
            commands::run_status(config, args).await?;
        }

        Commands::Doctor { smtp } => {
            let args = commands::doctor::DoctorArgs { smtp };
            commands::run_doctor(config, args).await?;
        }

        Commands::Config { action } => {
            let action = match action {
                Some(ConfigCommands::Validate) => commands::config::ConfigAction::Validate,
                Some(ConfigCommands::Show) | None => commands::config::ConfigAction::Show,
            };
            commands::run_config(config, action)?;
        }
    }

    Ok(())
}
