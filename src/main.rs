use actix_web::{App, HttpServer, web};
use chat_proxy::provider::{CompletionProvider, GenAiProvider};
use chat_proxy::server::{self, cors_headers};
use chat_proxy::{ProviderConfig, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is fine; the environment may already be populated
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Ok(path) = dotenv {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let provider_config = ProviderConfig::from_env().map_err(std::io::Error::other)?;
    let server_config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    tracing::info!(
        "Using model {} (temperature {}, api key {})",
        provider_config.model,
        provider_config.temperature,
        if provider_config.api_key.is_some() { "configured" } else { "from provider default" }
    );

    let provider: Arc<dyn CompletionProvider> = Arc::new(GenAiProvider::new(&provider_config));
    let provider = web::Data::from(provider);

    tracing::info!(
        "Starting server at http://{}:{}/ (Swagger UI at /swagger-ui/)",
        server_config.host,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(provider.clone())
            .wrap(cors_headers())
            .configure(server::configure)
    })
    .bind((server_config.host.as_str(), server_config.port))?
    .run()
    .await
}
