use actix_web::{web, App, HttpServer, middleware};
use invoice_service::api::{ApiState, AppConfig, configure_routes};
use invoice_service::telemetry;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use anyhow::Result;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    tracing::info!("Starting invoice service");

    // Initialize Prometheus metrics
    prometheus::default_registry()
        .register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;
    telemetry::register_metrics();

    let config = AppConfig::load()?;
    let host = config.host.clone();
    let port = config.port;

    tracing::info!(
        database = %config.database_url,
        documents = %config.document_dir.display(),
        smtp = %format!("{}:{}", config.smtp_host, config.smtp_port),
        "configuration loaded"
    );

    let state = web::Data::new(ApiState::new(config).await?);

    tracing::info!("Starting server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
