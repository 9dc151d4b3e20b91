//! kcwater - Fetch water usage from the KC Water customer portal

use kcwater::{
    cli::{Cli, Command, parse_day, parse_month},
    client::{Endpoints, UsageClient},
    clock::SystemClock,
    config::resolve_credentials,
    diagnostics::FileDumpSink,
    error::{KcWaterError, Result},
    output::get_formatter,
    types::{UsageHistory, UsageKind},
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Turn the "not logged in" soft failure into an error for the CLI
fn require_history(history: Option<UsageHistory>) -> Result<UsageHistory> {
    history.ok_or(KcWaterError::NotLoggedIn)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --quiet and --verbose override RUST_LOG
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("kcwater=debug,kcwater_core=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kcwater=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.json || !is_terminal::is_terminal(std::io::stdout()) {
        colored::control::set_override(false);
    }

    let clock = SystemClock::from_args(cli.timezone.as_deref(), cli.utc)?;
    info!("Judging completed readings by {} wall-clock time", clock.zone().name());

    let credentials = resolve_credentials(
        cli.username.clone(),
        cli.password.clone(),
        cli.credentials.as_deref(),
    )?;

    let mut client = UsageClient::new(credentials)
        .with_endpoints(Endpoints::new(&cli.base_url))
        .with_clock(Arc::new(clock));

    if let Some(dir) = &cli.dump_dir {
        std::fs::create_dir_all(dir)?;
        info!("Dumping raw responses to {}", dir.display());
        client = client.with_diagnostics(Arc::new(FileDumpSink::new(dir)));
    }

    client.login().await?;

    let formatter = get_formatter(cli.json);

    match cli.command.unwrap_or(Command::Latest) {
        Command::Hourly { date } => {
            let date = match date.as_deref() {
                Some(s) => parse_day(s)?,
                None => client.today(),
            };
            let history = require_history(client.get_usage_hourly(date).await?)?;
            println!("{}", formatter.format_history(UsageKind::Hourly, &history));
        }

        Command::Daily { date } => {
            let date = match date.as_deref() {
                Some(s) => parse_month(s)?,
                None => client.today(),
            };
            let history = require_history(client.get_usage_daily(date).await?)?;
            println!("{}", formatter.format_history(UsageKind::Daily, &history));
        }

        Command::Account => {
            println!("{}", formatter.format_account(client.session()));
        }

        Command::Latest => {
            let daily = require_history(client.get_usage_daily_today().await?)?;
            let hourly = require_history(client.get_usage_hourly_today().await?)?;
            println!("{}", formatter.format_latest(daily.last(), hourly.last()));
        }
    }

    Ok(())
}
