//! Authentication middleware that runs the session gate and handles redirects.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::{StatusCode, header::LOCATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    AppState,
    auth::{GateDecision, SessionValues, authenticate, build_log_in_redirect_url},
    user::SQLiteUserStore,
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for looking up users by session.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks the request's session against the stored user sessions.
///
/// The matched user is placed into the request and the request executed normally if the
/// session is valid, otherwise a `302 Found` redirect to the log-in page is returned.
/// The redirect is the same whether the session was missing, malformed or unknown.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
pub async fn auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session_values = SessionValues::from_jar(&jar);
    let store = SQLiteUserStore::new(state.db_connection);

    match authenticate(&session_values, &store) {
        GateDecision::Proceed(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        GateDecision::Redirect => {
            let log_in_redirect_url = build_log_in_redirect_url(&request);
            (StatusCode::FOUND, [(LOCATION, log_in_redirect_url)]).into_response()
        }
    }
}
