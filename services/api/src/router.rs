use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use savora_core::health::{healthz, readyz};
use savora_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{logout, refresh_token, register, send_otp, social_login, verify_otp},
    user::get_me,
};
use crate::middleware::authenticate;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate,
        ));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Credentials
        .route("/send-otp", post(send_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/register", post(register))
        .route("/social-login", post(social_login))
        .route("/refresh-token", post(refresh_token))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
