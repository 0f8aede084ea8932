//! Statements record a single income or expense for a user.

use rusqlite::{Connection, Row};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, UserID};

/// Alias for the integer type used for statement row IDs.
pub type StatementID = i64;

/// A single recorded income (positive amount) or expense (negative amount).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The statement's row ID in the application database.
    pub id: StatementID,
    /// What the money was for.
    pub description: String,
    /// The signed amount, positive for income and negative for expenses.
    pub amount: f64,
    /// When the transaction happened, in UTC.
    pub operation_time: OffsetDateTime,
    /// The identifier the statement had in the system it came from.
    pub statement_id: String,
    /// The user that owns the statement.
    pub user_id: UserID,
}

/// The details needed to record a new statement.
#[derive(Debug, Clone)]
pub struct NewStatement {
    /// What the money was for.
    pub description: String,
    /// The signed amount, positive for income and negative for expenses.
    pub amount: f64,
    /// When the transaction happened.
    pub operation_time: OffsetDateTime,
    /// The identifier the statement had in the system it came from, must be unique.
    pub statement_id: String,
    /// The user that owns the statement.
    pub user_id: UserID,
}

/// Create the statement table.
///
/// Statements are deleted along with the user that owns them.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_statement_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS statement (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                operation_time TEXT NOT NULL,
                statement_id TEXT UNIQUE NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_statement_user_time
            ON statement(user_id, operation_time)",
        (),
    )?;

    Ok(())
}

/// Insert a new statement into the database.
///
/// The operation time is stored in UTC so that statements sort chronologically.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateStatementId] if the external statement ID is already in use,
/// - [Error::SqlError] if the user does not exist or some other SQL error occurred.
pub fn create_statement(
    new_statement: NewStatement,
    connection: &Connection,
) -> Result<Statement, Error> {
    let operation_time = new_statement.operation_time.to_offset(UtcOffset::UTC);

    connection.execute(
        "INSERT INTO statement (description, amount, operation_time, statement_id, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &new_statement.description,
            new_statement.amount,
            operation_time,
            &new_statement.statement_id,
            new_statement.user_id.as_i64(),
        ),
    )?;

    Ok(Statement {
        id: connection.last_insert_rowid(),
        description: new_statement.description,
        amount: new_statement.amount,
        operation_time,
        statement_id: new_statement.statement_id,
        user_id: new_statement.user_id,
    })
}

fn map_statement_row(row: &Row) -> Result<Statement, rusqlite::Error> {
    Ok(Statement {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        operation_time: row.get(3)?,
        statement_id: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
    })
}

/// Get all statements owned by `user_id`, newest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query failed.
pub fn list_statements_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Statement>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, operation_time, statement_id, user_id
            FROM statement
            WHERE user_id = :user_id
            ORDER BY operation_time DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_statement_row)?
        .map(|maybe_statement| maybe_statement.map_err(Error::from))
        .collect()
}

/// The sum of the signed amounts of `statements`.
pub fn compute_balance(statements: &[Statement]) -> f64 {
    statements.iter().map(|statement| statement.amount).sum()
}
