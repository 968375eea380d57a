use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{web, App, HttpServer};
use tiny_alipay_gateway::alipay::http_client;
use tiny_alipay_gateway::config::AppConfig;
use tiny_alipay_gateway::gateway::gateway_handlers::{
    build_process_handler, notification_handler, return_handler,
};
use tiny_alipay_gateway::utils;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// The main entry point for the application.
///
/// This asynchronous function sets up logging, loads the environment, validates
/// the Alipay merchant settings and starts the HTTP server with the payment,
/// notification and return routes behind the rate limiter.
///
/// # Parameters
///
/// This function does not take any parameters directly, but it reads
/// environment variables and command-line arguments:
///
/// - The first command-line argument is the path of the environment file.
///   If not provided, it defaults to `.env`.
/// - `RUST_LOG` sets the log filter (default `info`).
///
/// # Returns
///
/// A `std::io::Result<()>`. An error means the configuration was invalid, the
/// HTTP client or rate limiter could not be built, or the server failed to
/// bind its address.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 👇 Load env file from args
    let env_file = utils::ensure_dotenv_loaded();
    info!("📦 Loading environment from {env_file}");

    let config = AppConfig::load().map_err(|e| {
        error!("🚨 Invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    let client = http_client().map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    if config.settings.dev_mode {
        warn!("⚠️  Developer mode: requests go to the Alipay sandbox.");
    }
    if let Some(endpoint) = &config.gateway_endpoint {
        warn!("⚠️  Alipay gateway URL overridden: {endpoint}");
    }

    let server_port = config.server_port;
    info!("🚀 Server starting on http://127.0.0.1:{}", server_port);
    info!("🔗 Notify URL: {}", config.notify_url());

    let governor_conf = GovernorConfigBuilder::default()
        .burst_size(config.governor_burst)
        .seconds_per_request(config.governor_per_second)
        .finish()
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Invalid GOVERNOR_BURST / GOVERNOR_PER_SECOND",
            )
        })?;

    HttpServer::new(move || {
        App::new()
            .wrap(Governor::new(&governor_conf))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(client.clone()))
            .service(build_process_handler)
            .service(notification_handler)
            .service(return_handler)
    })
    .bind(("127.0.0.1", server_port))?
    .run()
    .await
}
