use sea_orm::Database;
use tracing::info;

use savora_api::config::ApiConfig;
use savora_api::infra::google::GoogleTokenClient;
use savora_api::infra::notify::HttpNotifier;
use savora_api::router::build_router;
use savora_api::state::AppState;

#[tokio::main]
async fn main() {
    savora_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let google = GoogleTokenClient::new(config.google_client_id.clone());
    let notifier = HttpNotifier::new(
        config.brevo_api_key.clone(),
        config.brevo_sender_email.clone(),
        config.sms_api_url.clone(),
        config.sms_api_key.clone(),
    );

    let state = AppState {
        db,
        token_keys: config.token_keys(),
        production: config.production,
        google,
        notifier,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
