use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("Initial setup has not been completed")]
    SetupIncomplete,

    #[error("Initial setup has already been completed")]
    SetupAlreadyComplete,

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl TrackerError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.into())
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = TrackerError::from(ValidationError::RatioOutOfRange(6.0));
        assert_eq!(
            err.to_string(),
            "Conversion ratio must be between 3 and 5 yd/kg (got 6)"
        );
    }

    #[test]
    fn test_storage_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("disk full").context("failed to insert meal");
        let err = TrackerError::from(inner);
        assert_eq!(
            err.to_string(),
            "Storage error: failed to insert meal: disk full"
        );
    }
}
