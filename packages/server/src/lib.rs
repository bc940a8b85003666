#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API gateway for the travel emissions calculator.
//!
//! Forwards catalog and country lookups to the upstream emissions API and
//! answers trip requests by averaging each leg's daily emissions. The
//! gateway is stateless: every request is served from the provider.

pub mod countries;
pub mod error;
mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use travel_emissions_provider::{EmissionsProvider, HttpEmissionsProvider, ProviderConfig};
use travel_emissions_server_models::ValidationError;

pub use error::ApiError;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5000;

/// Address used when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Largest accepted JSON request body.
pub const JSON_LIMIT: usize = 30 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    /// Upstream emissions data source.
    pub provider: Arc<dyn EmissionsProvider>,
}

/// Listening and upstream settings for the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Upstream provider settings.
    pub provider: ProviderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            provider: ProviderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT` and the provider variables, falling back
    /// to the defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            bind_addr,
            port,
            provider: ProviderConfig::from_env(),
        }
    }
}

/// Registers the gateway routes and the JSON body settings.
///
/// Undecodable bodies (including a `trips` field that is not an array) are
/// reported as [`ApiError::Validation`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            log::error!("Rejected request body: {err}");
            ApiError::from(ValidationError::Body {
                message: err.to_string(),
            })
            .into()
        });

    cfg.app_data(json)
        .route("/health", web::get().to(handlers::health))
        .route("/emissions", web::get().to(handlers::products))
        .route("/countries", web::get().to(handlers::countries))
        .route("/average", web::post().to(handlers::average));
}

/// Starts the gateway with the given configuration.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP client cannot be built,
/// the server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Using emissions API at {}", config.provider.base_url);
    let provider = HttpEmissionsProvider::new(config.provider).map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState {
        provider: Arc::new(provider),
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
