// Validation errors
//
// Failed checks are not errors: they are recorded as `FieldFailure`s. The
// types here cover programmer mistakes and faults raised by link operations.

use gauntlet_core::RequestLocation;
use thiserror::Error;

/// Error raised by a user-supplied link operation.
pub type LinkError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ValidationError {
    /// A custom validator name is not camelCase or PascalCase.
    #[error("invalid validator name `{0}`: expected camelCase or PascalCase")]
    InvalidName(String),

    /// `check(name)` referenced a validator that was never registered.
    #[error("no validator registered under `{0}`")]
    UnknownValidator(String),

    /// A link operation failed; the chain run was aborted.
    #[error("link {index} of chain {location}.{field} failed: {source}")]
    LinkFault {
        location: RequestLocation,
        field: String,
        index: usize,
        #[source]
        source: LinkError,
    },

    #[error("invalid validation config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_fault_display() {
        let err = ValidationError::LinkFault {
            location: RequestLocation::Query,
            field: "id".to_string(),
            index: 2,
            source: "lookup timed out".into(),
        };

        assert_eq!(
            err.to_string(),
            "link 2 of chain query.id failed: lookup timed out"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_name_display() {
        let err = ValidationError::InvalidName("is_even".to_string());
        assert!(err.to_string().contains("is_even"));
    }
}
