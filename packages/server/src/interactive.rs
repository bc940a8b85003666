//! Interactive mode for the server.
//!
//! Prompts for the bind address, port and upstream URL before starting
//! the gateway.

use dialoguer::{Confirm, Input};
use travel_emissions_provider::ProviderConfig;

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Prompts are pre-filled from the environment (see
/// [`ServerConfig::from_env`]); the answers are passed straight to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Travel Emissions Server");
    println!();

    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let base_url: String = Input::new()
        .with_prompt("Emissions API URL")
        .default(defaults.provider.base_url.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.provider.base_url.clone());

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(ServerConfig {
        bind_addr,
        port,
        provider: ProviderConfig::new(base_url, defaults.provider.timeout),
    })
    .await
}
