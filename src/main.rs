use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Server,
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use todo_auth_api::{config::Config, db, route::create_router, token::Keys, AppState};

// Entry point of the application
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::create_tables(&pool).await?;
    tracing::info!(database_url = %config.database_url, "database ready");

    let app_state = Arc::new(AppState {
        db: pool,
        keys: Keys::new(config.jwt_secret.as_bytes()),
    });

    // Browser clients need the Authorization header allowed through CORS
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let app = create_router(app_state).layer(cors);

    tracing::info!(addr = %config.bind_addr, "server started");
    Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
