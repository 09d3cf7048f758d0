use std::fmt;

use serde::{Deserialize, Serialize};

/// Failure class of a remote storage call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    Conflict,
    Transient,
    InvalidInput,
    Other,
}

impl ErrorKind {
    /// Maps an S3 error code onto a kind. Unknown codes are `Other`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "NoSuchBucket" | "NoSuchKey" | "NotFound" | "NoSuchUpload" => ErrorKind::NotFound,
            "AccessDenied"
            | "AllAccessDisabled"
            | "AccountProblem"
            | "ExpiredToken"
            | "InvalidAccessKeyId"
            | "InvalidToken"
            | "SignatureDoesNotMatch" => ErrorKind::AccessDenied,
            "BucketAlreadyExists"
            | "BucketAlreadyOwnedByYou"
            | "BucketNotEmpty"
            | "OperationAborted"
            | "PreconditionFailed" => ErrorKind::Conflict,
            "InvalidBucketName"
            | "InvalidArgument"
            | "InvalidRequest"
            | "InvalidLocationConstraint"
            | "IllegalLocationConstraintException"
            | "KeyTooLongError"
            | "EntityTooLarge"
            | "MalformedXML"
            | "TooManyBuckets" => ErrorKind::InvalidInput,
            "InternalError" | "ServiceUnavailable" | "SlowDown" | "RequestTimeout" => {
                ErrorKind::Transient
            }
            _ => ErrorKind::Other,
        }
    }

    /// Fallback for service errors that carry no code (e.g. HEAD responses).
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => ErrorKind::NotFound,
            401 | 403 => ErrorKind::AccessDenied,
            409 | 412 => ErrorKind::Conflict,
            400 => ErrorKind::InvalidInput,
            500..=599 => ErrorKind::Transient,
            _ => ErrorKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Transient => "transient",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct StorageError {
    pub kind: ErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        let cases = vec![
            ("NoSuchBucket", ErrorKind::NotFound),
            ("NoSuchKey", ErrorKind::NotFound),
            ("AccessDenied", ErrorKind::AccessDenied),
            ("SignatureDoesNotMatch", ErrorKind::AccessDenied),
            ("BucketNotEmpty", ErrorKind::Conflict),
            ("BucketAlreadyOwnedByYou", ErrorKind::Conflict),
            ("InvalidBucketName", ErrorKind::InvalidInput),
            ("IllegalLocationConstraintException", ErrorKind::InvalidInput),
            ("SlowDown", ErrorKind::Transient),
            ("SomethingNew", ErrorKind::Other),
        ];

        for (code, expected) in cases {
            assert_eq!(ErrorKind::from_code(code), expected, "failed for code: {}", code);
        }
    }

    #[test]
    fn test_from_status() {
        let cases = vec![
            (404, ErrorKind::NotFound),
            (403, ErrorKind::AccessDenied),
            (409, ErrorKind::Conflict),
            (503, ErrorKind::Transient),
            (418, ErrorKind::Other),
        ];

        for (status, expected) in cases {
            assert_eq!(ErrorKind::from_status(status), expected, "failed for status: {}", status);
        }
    }

    #[test]
    fn test_display_is_message_verbatim() {
        let err = StorageError::new(ErrorKind::Conflict, "BucketNotEmpty: not empty");
        assert_eq!(err.to_string(), "BucketNotEmpty: not empty");
        assert_eq!(err.kind.to_string(), "conflict");
    }
}
