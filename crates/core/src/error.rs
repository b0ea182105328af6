use api_shared::wire::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("no patient with id {0}")]
    PatientNotFound(String),
    #[error("username is already taken")]
    UsernameTaken,
    #[error("invalid account data: {0}")]
    InvalidAccount(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("patient id allocation retries exhausted")]
    IdAllocationExhausted,
    #[error("failed to hash password: {0}")]
    PasswordHash(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
