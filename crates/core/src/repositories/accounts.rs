//! Login account storage operations.
//!
//! Registration, credential checks and account lookup. The authentication
//! error never discloses whether a username exists: an unknown username and a
//! wrong password both surface as [`PatientError::InvalidCredentials`].

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::account::{Account, NewAccount, Role};
use crate::db::Database;
use crate::error::{PatientError, PatientResult};
use crate::password;
use prs_types::{EmailAddress, NonEmptyText};

const ACCOUNT_COLUMNS: &str =
    "id, username, password_hash, email, first_name, last_name, role, created_at";

/// Service for account operations.
#[derive(Clone)]
pub struct AccountService {
    db: Database,
}

impl AccountService {
    /// Creates a new service over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Registers a new account. The role defaults to `patient`.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidAccount` for a blank username/password,
    /// a malformed email or an unknown role, and
    /// `PatientError::UsernameTaken` when the username already exists.
    pub fn register(&self, input: NewAccount) -> PatientResult<Account> {
        let username = NonEmptyText::new(&input.username)
            .map_err(|_| PatientError::InvalidAccount("Username may not be blank.".into()))?
            .into_string();

        if input.password.trim().is_empty() {
            return Err(PatientError::InvalidAccount(
                "Password may not be blank.".into(),
            ));
        }

        let role = match input.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => Role::default(),
            Some(raw) => raw.parse::<Role>().map_err(|()| {
                PatientError::InvalidAccount(format!("\"{raw}\" is not a valid role."))
            })?,
        };

        let email = match input.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            None => String::new(),
            Some(raw) => EmailAddress::parse(raw)
                .map_err(|e| PatientError::InvalidAccount(e.to_string()))?
                .as_str()
                .to_string(),
        };

        let password_hash = password::hash_password(&input.password)?;
        let first_name = input.first_name.unwrap_or_default();
        let last_name = input.last_name.unwrap_or_default();
        let created_at = Utc::now();

        let conn = self.db.lock();
        let inserted = conn.execute(
            "INSERT INTO users (username, password_hash, email, first_name, last_name, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                username,
                password_hash,
                email,
                first_name,
                last_name,
                role.as_str(),
                created_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(Account {
                id: conn.last_insert_rowid(),
                username,
                password_hash,
                email,
                first_name,
                last_name,
                role,
                created_at,
            }),
            Err(e) if is_unique_violation(&e) => Err(PatientError::UsernameTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidCredentials` for an unknown username or
    /// a wrong password — deliberately the same error for both.
    pub fn authenticate(&self, username: &str, password_attempt: &str) -> PatientResult<Account> {
        let conn = self.db.lock();
        let account = conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                account_from_row,
            )
            .optional()?
            .ok_or(PatientError::InvalidCredentials)?;

        if !password::verify_password(password_attempt, &account.password_hash) {
            return Err(PatientError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Fetches the account behind an established session.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Unauthenticated` when the id no longer resolves
    /// to an account.
    pub fn get(&self, account_id: i64) -> PatientResult<Account> {
        let conn = self.db.lock();
        conn.query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?1"),
            params![account_id],
            account_from_row,
        )
        .optional()?
        .ok_or(PatientError::Unauthenticated)
    }
}

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let role: String = row.get(6)?;
    let role = role.parse::<Role>().map_err(|()| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("invalid role {role:?}").into(),
        )
    })?;

    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        role,
        created_at: row.get(7)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
