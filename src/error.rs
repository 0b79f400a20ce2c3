//! The error type shared by every operation on the attendance store.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendanceError {
    /// The current identity is not allowed to perform the operation.
    #[error("Forbidden: administrator privileges are required")]
    Forbidden,

    #[error("Invalid username, email or password")]
    InvalidCredentials,

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness or foreign-key constraint rejected the write. The transaction that triggered it
    /// has been rolled back.
    #[error("Error: {0}")]
    ConstraintViolation(String),

    /// A required field was empty or only whitespace.
    #[error("Error: {0} is required")]
    MissingField(&'static str),

    #[error("Database error: {0}")]
    Database(DieselError),

    #[error("Could not connect to the database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Could not hash password: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error("Could not read roster: {0}")]
    Roster(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Could not write output: {0}")]
    Output(#[from] serde_json::Error),
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;

impl AttendanceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the caller can recover from this error by correcting its input, as opposed to a fatal
    /// store or environment failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Forbidden
                | Self::InvalidCredentials
                | Self::NotFound { .. }
                | Self::ConstraintViolation(_)
                | Self::MissingField(_)
        )
    }

    /// Fails with [`AttendanceError::MissingField`] if `value` is blank.
    pub(crate) fn require_field(field: &'static str, value: &str) -> AttendanceResult<()> {
        if value.trim().is_empty() {
            Err(Self::MissingField(field))
        } else {
            Ok(())
        }
    }

    /// Replaces the store's constraint message with one meant for the user. Other errors pass through.
    pub(crate) fn describe_violation(self, message: impl Into<String>) -> Self {
        match self {
            Self::ConstraintViolation(_) => Self::ConstraintViolation(message.into()),
            other => other,
        }
    }
}

impl From<DieselError> for AttendanceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(
                kind @ (DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation),
                info,
            ) => {
                let what = match kind {
                    DatabaseErrorKind::UniqueViolation => "already exists",
                    _ => "is still referenced",
                };
                Self::ConstraintViolation(format!("record {what} ({})", info.message()))
            }
            other => Self::Database(other),
        }
    }
}

impl From<argon2::password_hash::Error> for AttendanceError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(err)
    }
}
