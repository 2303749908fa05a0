use std::fmt;

use crate::model::item::EventKind;
use crate::store::StoreError;

/// Machine-readable error codes for scripts and frontends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyName,
    MissingRate,
    InvalidRate,
    InvalidRateText,
    MalformedInput,
    EmptyResult,
    NotComputable,
    StoreWriteFailed,
    StoreReadFailed,
    LockContention,
    ConfigParseError,
    EncodeFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyName => "E1001",
            Self::MissingRate => "E1002",
            Self::InvalidRate => "E1003",
            Self::InvalidRateText => "E1004",
            Self::MalformedInput => "E2001",
            Self::EmptyResult => "E2002",
            Self::NotComputable => "E3001",
            Self::StoreWriteFailed => "E5001",
            Self::StoreReadFailed => "E5002",
            Self::LockContention => "E5003",
            Self::ConfigParseError => "E6001",
            Self::EncodeFailed => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyName => "Item name is empty",
            Self::MissingRate => "Drop rate not set",
            Self::InvalidRate => "Drop rate not allowed",
            Self::InvalidRateText => "Drop rate could not be parsed",
            Self::MalformedInput => "Backup text is malformed",
            Self::EmptyResult => "Backup contains no valid items",
            Self::NotComputable => "Probability not computable",
            Self::StoreWriteFailed => "Failed to write item data",
            Self::StoreReadFailed => "Failed to read item data",
            Self::LockContention => "Data directory is locked",
            Self::ConfigParseError => "Config file parse error",
            Self::EncodeFailed => "Failed to encode items",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::EmptyName => Some("Pass a non-empty item name."),
            Self::MissingRate => Some("Set both rates, e.g. `--drop 1/64 --rare 1/4096`."),
            Self::InvalidRate => Some("Use one of 1/8, 1/16, 1/32, 1/64, 1/128, 1/256, 1/4096."),
            Self::InvalidRateText => Some("Write the rate as `64` or `1/64`."),
            Self::MalformedInput => {
                Some("Check that the backup text was copied completely and is valid JSON.")
            }
            Self::EmptyResult => Some("The backup must contain at least one named item with a rate."),
            Self::NotComputable => None,
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::StoreReadFailed => Some("Check read permissions on the data directory."),
            Self::LockContention => Some("Retry after the other `dt` process finishes."),
            Self::ConfigParseError => Some("Fix syntax in the droptrack config.toml and retry."),
            Self::EncodeFailed => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Rejected input to `add` or `change_rate`, identified by field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("item name must not be empty")]
    EmptyName,

    #[error("drop rate is required")]
    MissingDropRate,

    #[error("rare rate is required")]
    MissingRareRate,

    #[error("1/{denom} is not an allowed {kind} rate")]
    InvalidRate { kind: EventKind, denom: u32 },

    #[error("cannot parse rate '{input}': expected `N` or `1/N`")]
    InvalidRateText { input: String },
}

impl ValidationError {
    /// Name of the offending input field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::MissingDropRate => "dropDenom",
            Self::MissingRareRate => "rareDenom",
            Self::InvalidRate { kind, .. } => kind.denom_field(),
            Self::InvalidRateText { .. } => "rate",
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyName => ErrorCode::EmptyName,
            Self::MissingDropRate | Self::MissingRareRate => ErrorCode::MissingRate,
            Self::InvalidRate { .. } => ErrorCode::InvalidRate,
            Self::InvalidRateText { .. } => ErrorCode::InvalidRateText,
        }
    }
}

/// Every classified failure a core operation can return.
#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed backup: {reason}")]
    MalformedInput { reason: String },

    #[error("backup contains no valid items")]
    EmptyResult,

    #[error("probability not computable for denominator {denominator}")]
    InvalidInput { denominator: f64 },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode items: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DropError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(err) => err.code(),
            Self::MalformedInput { .. } => ErrorCode::MalformedInput,
            Self::EmptyResult => ErrorCode::EmptyResult,
            Self::InvalidInput { .. } => ErrorCode::NotComputable,
            Self::Store(err) => err.code(),
            Self::Encode(_) => ErrorCode::EncodeFailed,
        }
    }

    /// Remediation hint derived from the error code.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

#[cfg(test)]
mod tests {
    use super::{DropError, ErrorCode, ValidationError};
    use crate::model::item::EventKind;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::EmptyName,
            ErrorCode::MissingRate,
            ErrorCode::InvalidRate,
            ErrorCode::InvalidRateText,
            ErrorCode::MalformedInput,
            ErrorCode::EmptyResult,
            ErrorCode::NotComputable,
            ErrorCode::StoreWriteFailed,
            ErrorCode::StoreReadFailed,
            ErrorCode::LockContention,
            ErrorCode::ConfigParseError,
            ErrorCode::EncodeFailed,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::InvalidRate.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn validation_errors_name_their_field() {
        assert_eq!(ValidationError::EmptyName.field(), "name");
        assert_eq!(ValidationError::MissingDropRate.field(), "dropDenom");
        assert_eq!(ValidationError::MissingRareRate.field(), "rareDenom");
        let invalid = ValidationError::InvalidRate {
            kind: EventKind::Rare,
            denom: 13,
        };
        assert_eq!(invalid.field(), "rareDenom");
        assert_eq!(invalid.to_string(), "1/13 is not an allowed rare rate");
    }

    #[test]
    fn drop_error_codes_follow_variant() {
        let err = DropError::from(ValidationError::MissingRareRate);
        assert_eq!(err.code(), ErrorCode::MissingRate);
        assert_eq!(DropError::EmptyResult.code().code(), "E2002");
        assert!(DropError::EmptyResult.hint().is_some());
    }
}
