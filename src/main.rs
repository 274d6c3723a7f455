use clap::{Args, Parser, Subcommand};
use padel_booker::config::{retry_delay, LoggingSettings, Settings, SettingsError};
use padel_booker::core::{BookingError, Orchestrator};
use padel_booker::services::{BookingClient, ClientError, Credentials, PlaytomicClient};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Book padel courts on Playtomic as soon as matching slots open
#[derive(Debug, Parser)]
#[command(name = "padel-booker", version, about)]
struct Cli {
    /// Configuration file (defaults to config/default.toml + config/local.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search and book (default)
    Run(RunArgs),
    /// Log into every configured account and report the selected endpoint
    Check,
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Search only; never create a reservation
    #[arg(long)]
    dry_run: bool,

    /// Override run.max_attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Override run.retry_delay_secs
    #[arg(long)]
    retry_delay: Option<f64>,
}

fn init_tracing(logging: &LoggingSettings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

async fn run(settings: &Settings, args: RunArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let mut options = settings.run_options()?;
    options.dry_run |= args.dry_run;
    if let Some(max_attempts) = args.max_attempts {
        options.max_attempts = max_attempts;
    }
    if let Some(delay) = args.retry_delay {
        options.retry_delay = retry_delay(delay)?;
    }

    let accounts = settings.account_plans()?;
    let policy = settings.free_method_policy();
    let notifier = settings.notifier();
    let tenants = &settings.booking.tenants;

    if options.dry_run {
        info!("Dry run: no reservation will be made");
    }
    info!(
        "Starting booking for {} account(s) across {} venue(s)",
        accounts.len(),
        tenants.len()
    );

    let orchestrator = Orchestrator::new(tenants, &policy, &options, notifier.as_ref(), |credentials: Credentials| {
        let config = settings
            .client_config()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        PlaytomicClient::new(credentials, config)
    });

    Ok(orchestrator.run(&accounts).await?)
}

async fn check(settings: &Settings) -> Result<bool, Box<dyn std::error::Error>> {
    if settings.booking.tenants.is_empty() {
        return Err(Box::new(BookingError::NoVenues));
    }
    info!("{} venue(s) configured", settings.booking.tenants.len());

    let mut all_ok = true;

    for plan in settings.account_plans()? {
        let credentials = match plan.credentials {
            Ok(credentials) => credentials,
            Err(msg) => {
                warn!("{}: {}", plan.label, msg);
                all_ok = false;
                continue;
            }
        };

        let client = PlaytomicClient::new(credentials, settings.client_config()?)?;
        match client.login().await {
            Ok(session) => info!(
                "{}: logged in, payments via {} ({})",
                plan.label, session.payment_endpoint.kind, session.payment_endpoint.base_url
            ),
            Err(e) => {
                error!("{}: login failed: {}", plan.label, e);
                all_ok = false;
            }
        }
    }

    Ok(all_ok)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&settings.logging);

    let outcome = match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(&settings, args).await,
        Command::Check => check(&settings).await,
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
