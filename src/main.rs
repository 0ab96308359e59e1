mod app;
mod auth;
mod config;
mod display;
mod error;
mod lots;
mod reservations;
mod state;
mod stats;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "parkwise=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;

    sqlx::migrate!("./migrations").run(&state.db).await?;

    // Exactly one admin account must exist; safe to call on every boot.
    let admin = auth::repo::User::ensure_admin(&state.db, &state.config).await?;
    tracing::info!(admin_id = %admin.id, email = %admin.email, "admin account ready");

    let app = app::build_app(state);
    app::serve(app).await
}
