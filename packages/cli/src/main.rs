#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the travel emissions calculator.
//!
//! Without a subcommand an interactive menu is shown: plan a trip, browse
//! the product catalog or country list, or start the API gateway. The
//! subcommands do the same things non-interactively and print JSON.

mod batch;
mod planner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::Select;
use travel_emissions_provider::{EmissionsProvider, HttpEmissionsProvider, ProviderConfig};
use travel_emissions_server::{ServerConfig, countries::country_options};

#[derive(Parser)]
#[command(
    name = "travel_emissions_cli",
    about = "Estimate the emissions a traveller is exposed to"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the emission product catalog
    Products,

    /// Print the country list, sorted for selection
    Countries,

    /// Compute the average for a trip request
    Average {
        /// JSON file shaped like a `POST /average` body (stdin if omitted)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Log each leg's day-by-day values
        #[arg(long)]
        daily: bool,
    },

    /// Start the API gateway
    Serve {
        /// Address to bind (defaults to `BIND_ADDR` or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (defaults to `PORT` or 5000)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Top-level actions of the interactive menu.
enum Action {
    PlanTrip,
    ListProducts,
    ListCountries,
    StartServer,
}

impl Action {
    const ALL: &[Self] = &[
        Self::PlanTrip,
        Self::ListProducts,
        Self::ListCountries,
        Self::StartServer,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::PlanTrip => "Plan a trip",
            Self::ListProducts => "List emission products",
            Self::ListCountries => "List countries",
            Self::StartServer => "Start server",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive().await;
    };

    match command {
        Commands::Products => print_products(&provider()?).await?,
        Commands::Countries => print_countries(&provider()?).await?,
        Commands::Average { file, daily } => {
            let body = batch::read_body(file.as_deref())?;
            let result = batch::run(&provider()?, &body, daily).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Serve { bind, port } => {
            let mut config = ServerConfig::from_env();
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
    }

    Ok(())
}

async fn interactive() -> Result<(), Box<dyn std::error::Error>> {
    println!("Travel Emissions Calculator");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::PlanTrip => planner::run(&provider()?).await?,
        Action::ListProducts => print_products(&provider()?).await?,
        Action::ListCountries => print_countries(&provider()?).await?,
        Action::StartServer => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(travel_emissions_server::interactive::run())
            })
            .await??;
        }
    }

    Ok(())
}

fn provider() -> Result<HttpEmissionsProvider, Box<dyn std::error::Error>> {
    Ok(HttpEmissionsProvider::new(ProviderConfig::from_env())?)
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(travel_emissions_server::run_server(config))
    })
    .await??;
    Ok(())
}

async fn print_products(provider: &dyn EmissionsProvider) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = provider.products().await?;
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

async fn print_countries(
    provider: &dyn EmissionsProvider,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = country_options(provider.countries().await?);
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}
