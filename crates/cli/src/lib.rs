pub mod commands;
pub mod render;

use clap::{Parser, Subcommand};
use quotedesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "quotedesk",
    about = "Quotedesk operator CLI",
    long_about = "Build and submit product quotes against the quote backend and maintain its database.",
    after_help = "Examples:\n  quotedesk products\n  quotedesk quote --customer Acme --add 2 --color 0=black\n  quotedesk session"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Backend base URL (overrides api.base_url)")]
    api_url: Option<String>,
    #[arg(long, global = true, help = "Database URL (overrides database.url)")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List the backend's product catalog")]
    Products,
    #[command(about = "Build a draft from flags, submit it and print the confirmed quote")]
    Quote(commands::quote::QuoteArgs),
    #[command(about = "Start an interactive line-oriented quoting session")]
    Session,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo product catalog unless products already exist")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_base_url: self.api_url.clone(),
            database_url: self.database_url.clone(),
            ..ConfigOverrides::default()
        }
    }
}

/// Logs go to stderr so stdout stays a clean command payload.
fn init_logging(overrides: &ConfigOverrides) {
    use quotedesk_core::config::LogFormat::*;
    use tracing::Level;

    let options = LoadOptions { overrides: overrides.clone(), ..LoadOptions::default() };
    let Ok(config) = AppConfig::load(options) else {
        return;
    };
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let overrides = cli.overrides();
    init_logging(&overrides);

    let result = match cli.command {
        Command::Products => commands::products::run(overrides),
        Command::Quote(args) => commands::quote::run(args, overrides),
        Command::Session => commands::session::run(overrides),
        Command::Migrate => commands::migrate::run(overrides),
        Command::Seed => commands::seed::run(overrides),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(overrides) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
