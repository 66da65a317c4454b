//! Streamflow Prediction Tool - housekeeping commands
//!
//! Administrative entry point for forecast dataset housekeeping:
//! 1. Report the most recent ECMWF / WRF-Hydro forecast on disk
//! 2. Remove a watershed's forecast folders (kept while shared)
//! 3. Remove all of a watershed's resources (layers, forecasts, catalog)
//!
//! Usage:
//!   spt_housekeeping latest-ecmwf <root> [folder|most_recent]
//!   spt_housekeeping latest-wrf-hydro <root> [token|most_recent]
//!   spt_housekeeping remove-forecasts <watershed_id> [all|ecmwf|wrf_hydro]
//!   spt_housekeeping remove-watershed <watershed_id>
//!   spt_housekeeping reach-index <file> <comid> [guess]   (netcdf feature)
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string
//!   RUST_LOG     - log filter (overrides spt.toml)

use spt_housekeeping::cleanup::{self, StepOutcome};
use spt_housekeeping::config::{self, ServiceConfig};
use spt_housekeeping::db::PgSessionFactory;
use spt_housekeeping::locator::{self, ForecastSelector, MOST_RECENT};
use spt_housekeeping::model::{ForecastScope, Watershed};
use spt_housekeeping::remote::ckan::CkanClient;
use spt_housekeeping::remote::geoserver::GeoServerClient;
use spt_housekeeping::store::{SessionFactory, WatershedSession};
use std::env;
use std::error::Error;
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage:
  spt_housekeeping latest-ecmwf <root> [folder|most_recent]
  spt_housekeeping latest-wrf-hydro <root> [token|most_recent]
  spt_housekeeping remove-forecasts <watershed_id> [all|ecmwf|wrf_hydro]
  spt_housekeeping remove-watershed <watershed_id>
  spt_housekeeping reach-index <file> <comid> [guess]";

fn main() {
    let config = config::load_config().unwrap_or_else(|e| {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    });
    init_tracing(&config);

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };
    let rest = &args[1..];

    let result = match command.as_str() {
        "latest-ecmwf" => latest_ecmwf(rest),
        "latest-wrf-hydro" => latest_wrf_hydro(rest),
        "remove-forecasts" => remove_forecasts(&config, rest),
        "remove-watershed" => remove_watershed(&config, rest),
        "reach-index" => reach_index(rest),
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    }
}

fn init_tracing(config: &ServiceConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn selector_arg(rest: &[String], index: usize) -> ForecastSelector {
    ForecastSelector::from(rest.get(index).map(String::as_str).unwrap_or(MOST_RECENT))
}

fn watershed_id_arg(rest: &[String]) -> Result<i32, Box<dyn Error>> {
    let raw = rest.first().ok_or("missing <watershed_id>")?;
    raw.parse::<i32>()
        .map_err(|_| format!("invalid watershed id '{}'", raw).into())
}

// ---------------------------------------------------------------------------
// Locator commands
// ---------------------------------------------------------------------------

fn latest_ecmwf(rest: &[String]) -> Result<(), Box<dyn Error>> {
    let root = rest.first().ok_or("missing <root>")?;
    match locator::find_global_forecast_files(Path::new(root), &selector_arg(rest, 1)) {
        Some(forecast) => {
            println!("✓ ECMWF forecast issued {}", forecast.issued_at.to_rfc3339());
            for file in &forecast.files {
                println!("   {}", file.display());
            }
        }
        None => println!("⚠ No ECMWF forecast found under {}", root),
    }
    Ok(())
}

fn latest_wrf_hydro(rest: &[String]) -> Result<(), Box<dyn Error>> {
    let root = rest.first().ok_or("missing <root>")?;
    match locator::find_regional_forecast_file(Path::new(root), &selector_arg(rest, 1)) {
        Some(file) => println!("✓ WRF-Hydro forecast: {}", file.display()),
        None => println!("⚠ No WRF-Hydro forecast found under {}", root),
    }
    Ok(())
}

#[cfg(feature = "netcdf")]
fn reach_index(rest: &[String]) -> Result<(), Box<dyn Error>> {
    let file = rest.first().ok_or("missing <file>")?;
    let comid: i64 = rest.get(1).ok_or("missing <comid>")?.parse()?;
    let guess = rest.get(2).map(|g| g.parse::<usize>()).transpose()?;

    match spt_housekeeping::reach::find_reach_index_in_file(Path::new(file), comid, guess)? {
        Some(index) => println!("✓ COMID {} is at index {}", comid, index),
        None => println!("⚠ COMID {} not found in {}", comid, file),
    }
    Ok(())
}

#[cfg(not(feature = "netcdf"))]
fn reach_index(_rest: &[String]) -> Result<(), Box<dyn Error>> {
    Err("reach-index requires building with --features netcdf".into())
}

// ---------------------------------------------------------------------------
// Cleanup commands
// ---------------------------------------------------------------------------

fn load_watershed(sessions: &PgSessionFactory, watershed_id: i32) -> Result<Watershed, Box<dyn Error>> {
    let mut session = sessions.open()?;
    let watershed = session.load_watershed(watershed_id)?;
    session.close()?;
    Ok(watershed)
}

fn remove_forecasts(config: &ServiceConfig, rest: &[String]) -> Result<(), Box<dyn Error>> {
    let watershed_id = watershed_id_arg(rest)?;
    let scope: ForecastScope = rest.get(1).map(String::as_str).unwrap_or("all").parse()?;

    let sessions = PgSessionFactory::from_env(&config.database.schema)?;
    let watershed = load_watershed(&sessions, watershed_id)?;

    println!("🗑  Removing forecasts for {} ({})", watershed.watershed_name, watershed.subbasin_name);
    let result = cleanup::remove_forecast_files(&sessions, &watershed, scope);
    for (source, outcome) in &result.steps {
        print_outcome(&source.to_string(), outcome);
    }

    let failed = result.steps.iter().filter(|(_, outcome)| outcome.is_failed()).count();
    if failed > 0 {
        return Err(format!("{} forecast cleanup step(s) failed", failed).into());
    }
    Ok(())
}

fn remove_watershed(config: &ServiceConfig, rest: &[String]) -> Result<(), Box<dyn Error>> {
    let watershed_id = watershed_id_arg(rest)?;

    let sessions = PgSessionFactory::from_env(&config.database.schema)?;
    let watershed = load_watershed(&sessions, watershed_id)?;

    let settings = {
        let mut session = sessions.open()?;
        let settings = session.main_settings()?;
        session.close()?;
        settings
    };

    let http = config::build_http_client(&config.http)?;
    let geoserver = GeoServerClient::new(http.clone(), &watershed.geoserver, &settings.app_instance_id);
    let ckan = CkanClient::for_data_store(http, &watershed.data_store);

    println!("🗑  Removing watershed {} ({})", watershed.watershed_name, watershed.subbasin_name);
    let report = cleanup::remove_watershed_resources(&sessions, &geoserver, &ckan, &watershed);

    println!("\nMap layers:");
    for (kind, outcome) in &report.map_layers.steps {
        print_outcome(&kind.to_string(), outcome);
    }
    println!("Forecasts:");
    for (source, outcome) in &report.forecasts.steps {
        print_outcome(&source.to_string(), outcome);
    }
    println!("Catalog:");
    print_outcome("rapid input", &report.catalog);

    if report.is_clean() {
        println!("\n🎉 Watershed resources removed");
        Ok(())
    } else {
        Err(format!("{} cleanup step(s) failed", report.failures().len()).into())
    }
}

fn print_outcome(label: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Removed => println!("   ✓ {} - removed", label),
        StepOutcome::Retained { other_owners } => {
            println!("   ↺ {} - kept, shared with {} other watershed(s)", label, other_owners)
        }
        StepOutcome::Skipped(reason) => println!("   - {} - skipped ({})", label, reason),
        StepOutcome::Failed(e) => eprintln!("   ✗ {} - {}", label, e),
    }
}
