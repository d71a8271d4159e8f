use std::{error::Error, io, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};

use installment_planner::{
    api::{self, AppState, RateLimits},
    calendar::{HolidayCalendar, JsonFileHolidays},
    config::Settings,
    distributor,
    domain::{Distribution, FixedHolidaySource, Holiday},
    telemetry,
};

#[derive(Debug, Parser)]
#[command(name = "installment_planner", version, about = "Spread a total over due dates to the cent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the per-date and per-month amounts for TOTAL over DD/MM/YYYY dates
    Distribute {
        #[arg(allow_hyphen_values = true)]
        total: String,
        dates: Vec<String>,
    },
    /// Print the holidays of YEAR
    Holidays {
        year: i32,
        /// JSON file of fixed holidays (`[{"day", "month", "name"}]`)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run the HTTP API
    Serve,
}

#[tokio::main] // using Tokio runtime for async
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // `distribute` is pure; a broken configuration must not stop it.
    let (settings, ignored) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) if matches!(cli.command, Command::Distribute { .. }) => (Settings::default(), Some(e)),
        Err(e) => return Err(e.into()),
    };
    telemetry::init_tracing(&settings.log.level, settings.log.json);
    if let Some(e) = ignored {
        tracing::warn!(error = %e, "Ignoring invalid configuration");
    }

    match cli.command {
        Command::Distribute { total, dates } => {
            let distribution = distributor::distribute_raw(&total, &dates)?;
            print_distribution(&distribution)?;
        }
        Command::Holidays { year, file } => {
            let source: Arc<dyn FixedHolidaySource> = match file {
                Some(path) => Arc::new(JsonFileHolidays::new(path)),
                None => api::holiday_source(&settings),
            };
            let calendar = HolidayCalendar::new(source);
            let holidays = calendar.holidays_for_year(year).await?;
            print_holidays(&holidays)?;
        }
        Command::Serve => serve(settings).await?,
    }

    Ok(())
}

fn print_distribution(distribution: &Distribution) -> Result<(), installment_planner::Error> {
    let mut out = csv::Writer::from_writer(io::stdout());
    out.write_record(["date", "amount"])?;
    for (date, amount) in &distribution.per_date {
        out.write_record([date.to_string(), amount.to_string()])?;
    }
    out.write_record(["month", "amount"])?;
    for (month, amount) in &distribution.per_month {
        out.write_record([month.to_string(), amount.to_string()])?;
    }
    out.flush()?;
    Ok(())
}

fn print_holidays(holidays: &[Holiday]) -> Result<(), installment_planner::Error> {
    let mut out = csv::Writer::from_writer(io::stdout());
    out.write_record(["date", "name"])?;
    for holiday in holidays {
        out.write_record([holiday.date.as_str(), holiday.name.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

async fn serve(settings: Settings) -> Result<(), Box<dyn Error>> {
    let state = AppState::from_settings(&settings)?;
    let limits = RateLimits::from_settings(&settings.rate_limit);
    let pruning = limits.spawn_pruning(Duration::from_secs(
        settings.rate_limit.prune_interval_secs.max(1),
    ));
    let app = api::build_router(state, &limits);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await?;

    pruning.abort();
    tracing::info!("Server stopped");
    Ok(())
}
