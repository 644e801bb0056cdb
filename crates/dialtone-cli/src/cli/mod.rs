//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use dialtone_core::{config, interrupt, logging};

mod commands;

#[derive(Parser)]
#[command(name = "dialtone")]
#[command(version)]
#[command(about = "Phone-number login and profile dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with a mobile number and store the fetched profile
    Login {
        /// Mobile number (09XXXXXXXXX)
        #[arg(long, value_name = "NUMBER")]
        phone: String,
    },

    /// Log out and clear the stored profile
    Logout,

    /// Show the logged-in profile
    Whoami,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
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

    interrupt::init().context("install Ctrl+C handler")?;

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config);

    // default to the dashboard
    let Some(command) = cli.command else {
        return commands::dashboard::run(&config);
    };

    match command {
        Commands::Login { phone } => commands::auth::login(&config, &phone).await,
        Commands::Logout => {
            commands::auth::logout(&config);
            Ok(())
        }
        Commands::Whoami => {
            commands::auth::whoami(&config);
            Ok(())
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
