use bcrypt::BcryptError;
use thiserror::Error;

pub type AssistDbResult<T> = Result<T, AssistDbError>;

#[derive(Error, Debug)]
pub enum AssistDbError {
    #[error("errored on hashing using bcrypt: {0}")]
    HashError(#[from] BcryptError),

    #[error("database query failed with: {0}")]
    QueryError(#[from] diesel::result::Error),

    #[error("failed to (de)serialize stored data: {0}")]
    SerdeError(#[from] serde_json::Error),

    // Missing or malformed input, detected before anything is written
    #[error("{0}")]
    Validation(String),

    // A referenced workshop, product, or user does not exist
    #[error("{0}")]
    ReferenceNotFound(String),

    // Same message for an unknown email and a wrong password
    #[error("Invalid email or password")]
    Authentication,

    #[error("Admin account is deactivated")]
    AccountDisabled,

    #[error("{0} not found")]
    NotFound(&'static str),

    // A restrict-on-delete relation protects historical records
    #[error("{0}")]
    ReferenceInUse(String),

    #[error("no unused transaction id left after {0} attempts")]
    IdSpaceExhausted(usize),

    #[error("transaction {0} has no service detail record")]
    DetailMissing(String),
}

impl AssistDbError {
    pub(crate) fn validation(msg: impl ToString) -> Self {
        Self::Validation(msg.to_string())
    }
}

/// Turn diesel's `NotFound` into our own entity-aware variant.
pub(crate) trait OrNotFound<T> {
    fn or_not_found(self, entity: &'static str) -> AssistDbResult<T>;
}

impl<T> OrNotFound<T> for Result<T, diesel::result::Error> {
    fn or_not_found(self, entity: &'static str) -> AssistDbResult<T> {
        self.map_err(|e| match e {
            diesel::result::Error::NotFound => AssistDbError::NotFound(entity),
            e => e.into(),
        })
    }
}
