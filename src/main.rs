mod config;
mod event;
mod routes;
mod services;
mod state;
mod validate;

#[tokio::main]
async fn main() {
    // A missing .env is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(
        canvas_size = config.canvas_size,
        cooldown = ?config.cooldown,
        oauth = config.discord.is_some(),
        static_dir = %config.static_dir.display(),
        "configuration loaded"
    );

    let state = state::AppState::new(config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "pixelplace listening");
    axum::serve(listener, app).await.expect("server failed");
}
