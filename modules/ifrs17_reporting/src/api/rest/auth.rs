//! Session login, logout and the guard for operational routes

use super::{
    dto::LoginForm,
    error::{map_domain_error, Problem},
};
use crate::domain::Authenticator;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "ifrs17_session";

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><title>IFRS 17 Reporting - Sign in</title></head>
<body>
<form method="post" action="/login">
<label>Username <input name="username" autocomplete="username"></label>
<label>Password <input name="password" type="password" autocomplete="current-password"></label>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#;

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// Verify credentials and set the session cookie
pub async fn login(
    Extension(auth): Extension<Arc<Authenticator>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), Problem> {
    let session = auth
        .login(
            form.username.as_deref().unwrap_or_default(),
            form.password.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(map_domain_error)?;

    let cookie = Cookie::build((SESSION_COOKIE, session.id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok((jar.add(cookie), Redirect::to("/dashboard")))
}

pub async fn logout(
    Extension(auth): Extension<Arc<Authenticator>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        auth.logout(cookie.value());
    }
    let removal = Cookie::build(SESSION_COOKIE).path("/").build();
    (jar.remove(removal), Redirect::to("/login"))
}

/// Let requests with a live session through; send everyone else to `/login`
pub async fn require_session(
    State(auth): State<Arc<Authenticator>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| auth.session(cookie.value()));

    match session {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "Unauthenticated request redirected");
            Redirect::to("/login").into_response()
        }
    }
}
