//! Error types for anydate operations.
//!
//! Unparseable input never produces an error: it produces an invalid value.
//! The variants here cover contract violations only, and their messages are
//! relied upon verbatim by callers.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnyDateError {
    /// An object-notation field held something other than a string, a number
    /// or a function producing one of those.
    #[error("Unsupported value type \"{type_name}\" for {target} object notation")]
    UnsupportedFieldType {
        type_name: &'static str,
        target: &'static str,
    },

    /// A strict cell received a value that is not an instance of its type.
    #[error("Expected a {expected} value for \"{field}\"")]
    UnexpectedValueType {
        expected: &'static str,
        field: String,
    },

    /// A strict cell received an invalid value.
    #[error("Can not set \"Invalid date\" to \"{field}\"")]
    InvalidAssignment { field: String },
}

pub type Result<T> = std::result::Result<T, AnyDateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_field_type_message() {
        let e = AnyDateError::UnsupportedFieldType {
            type_name: "object",
            target: "DateTime",
        };
        assert_eq!(
            e.to_string(),
            "Unsupported value type \"object\" for DateTime object notation"
        );
    }

    #[test]
    fn test_unexpected_value_type_message() {
        let e = AnyDateError::UnexpectedValueType {
            expected: "DateOnly",
            field: "birthday".to_string(),
        };
        assert_eq!(e.to_string(), "Expected a DateOnly value for \"birthday\"");
    }

    #[test]
    fn test_invalid_assignment_message() {
        let e = AnyDateError::InvalidAssignment {
            field: "created_at".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Can not set \"Invalid date\" to \"created_at\""
        );
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<AnyDateError>();
    }
}
