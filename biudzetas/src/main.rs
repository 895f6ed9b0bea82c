// biudzetas/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use biudzetas::{build_state, web, AppConfig};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting biudzetas server...");

  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);

  let app_state = build_state(app_config.clone())
    .await
    .context("Failed to initialise application state")?;
  tracing::info!("Database ready and templates loaded.");

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
