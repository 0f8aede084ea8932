//! Code for creating the user table and fetching users from the database.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use email_address::EmailAddress;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name shown on the user's pages.
    pub name: String,
    /// The email address the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The identifier of the user's current session, `None` if logged out.
    ///
    /// Only one session can be live at a time. Logging in replaces it.
    pub session_id: Option<String>,
}

/// The details needed to register a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The name shown on the user's pages, must not be blank.
    pub name: String,
    /// The email address the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Looks up users by their current session.
pub trait UserStore {
    /// Get the user whose stored session identifier equals `raw_session_id`.
    ///
    /// Returns `Ok(None)` if no user has that session.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store could not be queried.
    fn find_user_by_session_id(&self, raw_session_id: &str) -> Result<Option<User>, Error>;
}

/// A [UserStore] backed by the application's SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a user store that shares `connection` with the rest of the app.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// # Errors
    ///
    /// Returns [Error::DatabaseLockError] if the connection lock is poisoned
    /// or [Error::SqlError] if the query failed.
    fn find_user_by_session_id(&self, raw_session_id: &str) -> Result<Option<User>, Error> {
        let connection = self
            .connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_session_id(raw_session_id, &connection)
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                session_id TEXT UNIQUE
                )",
        (),
    )?;

    Ok(())
}

const SELECT_USER: &str = "SELECT id, name, email, password, session_id FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: EmailAddress::new_unchecked(raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        session_id: row.get(4)?,
    })
}

/// Create and insert a new user into the database.
///
/// The new user starts without a session.
///
/// # Errors
///
/// Returns a:
/// - [Error::EmptyName] if the name is blank,
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let name = new_user.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    connection.execute(
        "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3)",
        (name, new_user.email.as_str(), new_user.password_hash.as_str()),
    )?;

    Ok(User {
        id: UserID::new(connection.last_insert_rowid()),
        name: name.to_owned(),
        email: new_user.email,
        password_hash: new_user.password_hash,
        session_id: None,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered
/// user, or [Error::SqlError] if the query failed.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has that email, or
/// [Error::SqlError] if the query failed.
pub fn get_user_by_email(email: &EmailAddress, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email"))?
        .query_row(&[(":email", email.as_str())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user whose current session identifier is exactly `raw_session_id`.
///
/// An empty identifier never matches a user.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query failed.
pub fn get_user_by_session_id(
    raw_session_id: &str,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    if raw_session_id.is_empty() {
        return Ok(None);
    }

    connection
        .prepare(&format!("{SELECT_USER} WHERE session_id = :session_id"))?
        .query_row(&[(":session_id", raw_session_id)], map_user_row)
        .optional()
        .map_err(|error| error.into())
}

/// Replace the session identifier stored for `user_id`.
///
/// Passing `None` ends the user's session.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered
/// user, or [Error::SqlError] if the update failed.
pub fn set_session_id(
    user_id: UserID,
    session_id: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET session_id = ?1 WHERE id = ?2",
        (session_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn insert_test_user(
    name: &str,
    email: &str,
    session_id: Option<&str>,
    connection: &Connection,
) -> User {
    let user = create_user(
        NewUser {
            name: name.to_owned(),
            email: email.parse().expect("Could not parse test email"),
            password_hash: PasswordHash::new_unchecked("hashed_password"),
        },
        connection,
    )
    .expect("Could not create test user");

    set_session_id(user.id, session_id, connection).expect("Could not set test session");

    User {
        session_id: session_id.map(str::to_owned),
        ..user
    }
}
