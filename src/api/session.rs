use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::auth::{AuthError, SessionToken, SESSION_TTL};
use super::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

/// HTTP-only session cookie scoped to the whole site. Lives exactly as long
/// as the token inside it and is never refreshed.
pub fn session_cookie(token: &SessionToken, secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token.value.clone())
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(CookieDuration::seconds(SESSION_TTL.as_secs() as i64))
        .finish()
}

/// Extractor for protected routes: rejects the request with 401 unless the
/// session cookie carries a valid token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState missing; rejecting protected request");
            return ready(Err(AuthError::Unauthenticated));
        };

        let cookie = req.cookie(AUTH_COOKIE);
        let result = state
            .auth
            .authorize(cookie.as_ref().map(|c| c.value()))
            .map(|username| AuthenticatedUser { username });

        ready(result)
    }
}
