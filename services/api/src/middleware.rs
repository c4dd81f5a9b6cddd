use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use savora_auth_types::cookie::{REFRESH_TOKEN_COOKIE, clear_refresh_cookie, set_refresh_cookie};

use crate::domain::types::User;
use crate::state::AppState;
use crate::usecase::authenticate::{AuthOutcome, AuthenticateUseCase};

const X_ACCESS_TOKEN: &str = "x-access-token";

/// Authenticated user attached to the request by [`authenticate`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Arc<User>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user = parts.extensions.get::<CurrentUser>().cloned();
        async move { user.ok_or(StatusCode::UNAUTHORIZED) }
    }
}

fn bearer_token(req: &Request) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|t| t.trim().to_owned())
}

/// Session-authenticator layer: validates the bearer access token and, when
/// it is expired (only), transparently consumes the refresh cookie once.
///
/// On a lazy refresh the rotated pair is surfaced to the client as a new
/// refresh cookie plus the `X-Access-Token` response header. Refresh
/// failures clear the stale cookie before rejecting.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let bearer = bearer_token(&req);
    let refresh_cookie = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_owned());

    let usecase = AuthenticateUseCase {
        users: state.user_repo(),
        keys: state.token_keys.clone(),
    };

    match usecase
        .execute(bearer.as_deref(), refresh_cookie.as_deref())
        .await
    {
        Ok(AuthOutcome { user, rotated }) => {
            req.extensions_mut().insert(CurrentUser(Arc::new(user)));
            let mut response = next.run(req).await;
            match rotated {
                Some(tokens) => {
                    let jar = set_refresh_cookie(
                        CookieJar::new(),
                        tokens.refresh_token,
                        state.token_keys.refresh_ttl_secs,
                        state.production,
                    );
                    if let Ok(value) = HeaderValue::from_str(&tokens.access_token) {
                        response
                            .headers_mut()
                            .insert(HeaderName::from_static(X_ACCESS_TOKEN), value);
                    }
                    (jar, response).into_response()
                }
                None => response,
            }
        }
        Err(err) if err.clears_refresh_cookie() => {
            let jar = clear_refresh_cookie(CookieJar::new(), state.production);
            (jar, err).into_response()
        }
        Err(err) => err.into_response(),
    }
}
