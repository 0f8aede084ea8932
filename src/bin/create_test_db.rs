use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_tracker::{
    NewStatement, NewUser, PasswordHash, ValidatedPassword, create_statement, create_user,
    initialize_db, set_session_id,
};

/// A utility for creating a test database for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The database has one user, "Test User" (test@example.com) with the password
/// "test" and the session "test_session_123", who owns one income and one expense.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: "test@example.com".parse()?,
            password_hash,
        },
        &conn,
    )?;
    set_session_id(user.id, Some("test_session_123"), &conn)?;

    println!("Creating test statements...");

    let now = OffsetDateTime::now_utc();

    for (description, amount, statement_id, age) in [
        ("Salary", 1000.0, "stmt_001", Duration::days(2)),
        ("Groceries", -500.0, "stmt_002", Duration::days(1)),
    ] {
        create_statement(
            NewStatement {
                description: description.to_owned(),
                amount,
                operation_time: now - age,
                statement_id: statement_id.to_owned(),
                user_id: user.id,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
