//! Cookie builders for the refresh token.
//!
//! The refresh token travels in an HTTP-only cookie; the access token never
//! does (it is returned in the response body or the `X-Access-Token` header).

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Set the refresh-token cookie on the jar.
///
/// Production serves cross-site app clients: `Secure` + `SameSite=None`.
/// Other modes run over plain HTTP, so `SameSite=Lax` without `Secure`.
///
/// ```
/// use axum_extra::extract::cookie::{CookieJar, SameSite};
/// use savora_auth_types::cookie::{set_refresh_cookie, REFRESH_TOKEN_COOKIE};
///
/// let jar = set_refresh_cookie(CookieJar::new(), "value".to_string(), 2_592_000, true);
/// let cookie = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(2_592_000)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// assert_eq!(cookie.same_site(), Some(SameSite::None));
///
/// let jar = set_refresh_cookie(CookieJar::new(), "value".to_string(), 2_592_000, false);
/// let cookie = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
/// assert!(!cookie.secure().unwrap_or(false));
/// assert_eq!(cookie.same_site(), Some(SameSite::Lax));
/// ```
pub fn set_refresh_cookie(
    jar: CookieJar,
    value: String,
    max_age_secs: u64,
    production: bool,
) -> CookieJar {
    let cookie = Cookie::build((REFRESH_TOKEN_COOKIE, value))
        .path("/")
        .max_age(Duration::seconds(max_age_secs as i64))
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .build();
    jar.add(cookie)
}

/// Clear the refresh-token cookie by setting Max-Age to 0.
///
/// Attributes must match the set path exactly or browsers keep the stale
/// cookie, which would retry a dead refresh token forever.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use savora_auth_types::cookie::{
///     clear_refresh_cookie, set_refresh_cookie, REFRESH_TOKEN_COOKIE,
/// };
///
/// let jar = set_refresh_cookie(CookieJar::new(), "r".to_string(), 2_592_000, false);
/// let jar = clear_refresh_cookie(jar, false);
/// let cookie = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_refresh_cookie(jar: CookieJar, production: bool) -> CookieJar {
    let cookie = Cookie::build((REFRESH_TOKEN_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .build();
    jar.add(cookie)
}
