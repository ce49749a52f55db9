use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use std::net::TcpListener;
use std::time::Duration;
use studymate_server::config::CorsConfig;
use studymate_server::{routes, AppState, Settings};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn build_cors(config: &CorsConfig) -> Cors {
    if !config.enabled {
        // CORS disabled - use most restrictive settings
        return Cors::default();
    }

    let cors = if config.allow_any_origin {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec!["Authorization", "Content-Type"])
            .expose_headers(vec!["Content-Disposition"])
            .supports_credentials()
    };

    cors.max_age(config.max_age as usize)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Settings::new().context("Failed to load configuration")?;
    info!("Configuration loaded successfully ({} environment)", config.environment);
    if config.ai.api_key.is_empty() {
        warn!("ai.api_key is empty; analysis and flashcard requests will be rejected upstream");
    }

    let state = AppState::new(config.clone())
        .await
        .context("Failed to initialize application state")?;
    let state = web::Data::new(state);

    // Forget users whose AI budget window has gone idle
    let housekeeping = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let pruned = housekeeping.ai_budget.prune().await;
            if pruned > 0 {
                debug!(pruned, "Pruned idle AI budget entries");
            }
        }
    });

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))
        .context("Failed to bind listener")?;
    info!("Starting server at http://{}:{}", config.server.host, config.server.port);

    let cors_config = config.cors.clone();
    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&cors_config))
            .wrap(Logger::default())
            .app_data(server_state.clone())
            .configure(routes::configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .context("HTTP server error")?;

    state.shutdown().await?;
    info!("Server stopped");
    Ok(())
}
