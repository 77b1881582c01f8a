use rusqlite::{params, ErrorCode, OptionalExtension};

use crate::db::models::User;
use crate::db::StoreError;
use crate::state::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Email already taken")]
    DuplicateEmail,

    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<rusqlite::Error> for CredentialError {
    fn from(e: rusqlite::Error) -> Self {
        CredentialError::Storage(StoreError::Sql(e))
    }
}

impl From<r2d2::Error> for CredentialError {
    fn from(e: r2d2::Error) -> Self {
        CredentialError::Storage(StoreError::Pool(e))
    }
}

/// The logged-in user as seen by the rest of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserIdentity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Create a user with a bcrypt hash of `password`.
pub fn register_user(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
    cost: u32,
) -> Result<(), CredentialError> {
    let conn = pool.get()?;

    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Err(CredentialError::DuplicateEmail);
    }

    let hash = bcrypt::hash(password, cost)?;

    match conn.execute(
        "INSERT INTO user (uname, email, password) VALUES (?1, ?2, ?3)",
        params![username, email, hash],
    ) {
        Ok(_) => Ok(()),
        // Lost a race with a concurrent signup for the same email
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(CredentialError::DuplicateEmail)
        }
        Err(e) => Err(e.into()),
    }
}

/// Check `password` against the stored hash for `email`.
pub fn authenticate(
    pool: &DbPool,
    email: &str,
    password: &str,
) -> Result<UserIdentity, CredentialError> {
    let conn = pool.get()?;

    let user = conn
        .query_row(
            "SELECT id, uname, email, password FROM user WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                })
            },
        )
        .optional()?
        .ok_or(CredentialError::InvalidCredentials)?;

    match bcrypt::verify(password, &user.password_hash) {
        Ok(true) => Ok(user.into()),
        Ok(false) => Err(CredentialError::InvalidCredentials),
        Err(e) => {
            tracing::warn!("Stored password hash for user {} is unreadable: {}", user.id, e);
            Err(CredentialError::InvalidCredentials)
        }
    }
}
