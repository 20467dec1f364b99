use pin_gateway::{
    api::Server,
    config::{Config, DEFAULT_CONFIG_PATH},
    gpio::SimulatedPins,
    registry::AliasRegistry,
};
use tracing::info;

/// The main entry point for the pin gateway.
///
/// This function initializes logging, loads the configuration (path from the
/// first argument, or `config/default.toml`), builds the alias registry and
/// starts the API server on top of the simulated pin driver.
#[tokio::main] // Marks the async main function to be run by the Tokio runtime.
async fn main() -> anyhow::Result<()> {
    // Initialize logging using tracing_subscriber.
    // This sets up a default formatter that prints logs to stdout.
    tracing_subscriber::fmt::init();

    // Pick the configuration file: first CLI argument, or the default path.
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    // Load the configuration; `?` propagates read and parse errors.
    let config = Config::load(&path)?;
    info!("Pin gateway starting with config from {}: {:?}", path, config.api);

    // Build the alias registry once. It stays immutable for the process
    // lifetime and is handed to the validator by the server.
    let registry = AliasRegistry::from_config(&config.aliases)?;
    info!("Registered aliases: {:?}", registry.names());

    // Create the API server on top of the in-memory pin driver.
    let server = Server::new(config, registry, SimulatedPins::new());
    // Bind and serve until shutdown or a fatal I/O error.
    server.start().await?;

    Ok(())
}
