use std::net::TcpListener;
use std::sync::Arc;

use contactly::auth::AuthService;
use contactly::configuration::get_configuration;
use contactly::contacts::ContactStore;
use contactly::email_client::{EmailClient, SenderEmail};
use contactly::rate_limit::RateLimiter;
use contactly::startup::run;
use contactly::store::UserStore;
use contactly::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let sender = SenderEmail::parse(configuration.email.sender.clone()).map_err(|e| {
        tracing::error!("Invalid sender address: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;
    let email_client = EmailClient::new(
        configuration.email.base_url.clone(),
        sender,
        reqwest::Client::new(),
    );

    let auth_service = AuthService::new(
        Arc::new(UserStore::new()),
        RateLimiter::new(&configuration.rate_limit),
        configuration.jwt.clone(),
    );
    let contact_store = ContactStore::new();

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        auth_service,
        contact_store,
        email_client,
        configuration.application.clone(),
    )?;

    server.await
}
