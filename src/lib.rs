//! Expense Tracker is a small web app for keeping track of personal income
//! and expenses.
//!
//! This library provides a REST API that directly serves HTML pages.
//! Every protected page sits behind a session gate that checks the
//! `session-sign-id` cookie against the session identifier stored for a user.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod db;
mod endpoints;
mod home;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod password;
mod routing;
mod session;
mod statement;
mod timezone;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{GateDecision, SESSION_KEY, SessionValues, authenticate};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use session::{decode_session_id, encode_session_id, generate_session_id};
pub use statement::{
    NewStatement, Statement, StatementID, compute_balance, create_statement,
    list_statements_for_user,
};
pub use user::{
    NewUser, SQLiteUserStore, User, UserID, UserStore, create_user, get_user_by_email,
    get_user_by_id, get_user_by_session_id, set_session_id,
};

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The session token from the client could not be decoded into a session
    /// identifier.
    ///
    /// The string holds the decoding error and must never be shown to the
    /// client.
    #[error("invalid session token: {0}")]
    InvalidSessionToken(String),

    /// A user was created with an empty display name.
    #[error("name cannot be empty")]
    EmptyName,

    /// The email address is already registered to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The external statement ID already exists in the database.
    #[error("the statement ID already exists in the database")]
    DuplicateStatementId,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("statement.statement_id") =>
            {
                Error::DuplicateStatementId
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let conn = Connection::open_in_memory().unwrap();

        let error: Error = conn
            .query_row("SELECT 1 WHERE 1 = 0", [], |row| row.get::<_, i64>(0))
            .unwrap_err()
            .into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn not_found_renders_404() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn session_errors_render_generic_500() {
        let response = Error::InvalidSessionToken("bad padding".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
