//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, statement::create_statement_table, user::create_user_table};

/// Create the tables for the domain models if they do not exist yet.
///
/// Foreign key enforcement is switched on for `connection` so that statements
/// always belong to an existing user.
///
/// # Errors
///
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_statement_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
