use clap::{Parser, Subcommand};
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use space_weather_monitor::app::Application;
use space_weather_monitor::config::Config;
use space_weather_monitor::display::ExportFormat;
use space_weather_monitor::fetcher::SwpcFetcher;
use space_weather_monitor::monitor::{CycleOutcome, SpaceWeatherMonitor};
use space_weather_monitor::sinks::{copy_export, CopyOutcome, StdoutSink, SystemClipboard};

#[derive(Parser)]
#[command(name = "space-weather-monitor")]
#[command(about = "Solar wind statistics from the NOAA SWPC 6-hour feeds", long_about = None)]
struct Cli {
    /// Override the magnetic field feed URL
    #[arg(long)]
    magnetic_url: Option<String>,

    /// Override the plasma feed URL
    #[arg(long)]
    plasma_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the refresh scheduler and the dashboard API (default)
    Serve,
    /// Fetch once and print the statistics
    Once,
    /// Fetch once and copy an export to the clipboard
    Copy {
        #[arg(long, value_enum, default_value_t = ExportFormat::Summary)]
        format: ExportFormat,
    },
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,space_weather_monitor=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.magnetic_url {
        config.magnetic_feed_url = url;
    }
    if let Some(url) = cli.plasma_url {
        config.plasma_feed_url = url;
    }
    info!("Starting space weather monitor with config: {:?}", config);

    let fetcher = SwpcFetcher::new(
        config.magnetic_feed_url.clone(),
        config.plasma_feed_url.clone(),
        config.http_timeout(),
    )?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = Application::build(config, fetcher).await?;
            app.run_until_stopped().await?;
        }
        Command::Once => {
            let monitor = SpaceWeatherMonitor::new(fetcher, StdoutSink);
            if let CycleOutcome::Failed(e) = monitor.run_cycle().await {
                return Err(e.into());
            }
        }
        Command::Copy { format } => {
            let monitor = SpaceWeatherMonitor::new(fetcher, StdoutSink);
            if let CycleOutcome::Failed(e) = monitor.run_cycle().await {
                return Err(e.into());
            }

            let mut clipboard = SystemClipboard::holding();
            let outcome = copy_export(&mut clipboard, format, monitor.current().as_deref());
            println!("{}", outcome.message());
            if let CopyOutcome::Failed(reason) = outcome {
                return Err(reason.into());
            }
        }
    }

    Ok(())
}
