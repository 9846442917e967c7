use serde::{Deserialize, Serialize};

/// Exception codes carried in `payload.exception.code` of a directive error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DependentServiceUnavailable,
    UnsupportedOperation,
    TargetOffline,
    ExpiredAccessToken,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DependentServiceUnavailable => "DEPENDENT_SERVICE_UNAVAILABLE",
            Self::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            Self::TargetOffline => "TARGET_OFFLINE",
            Self::ExpiredAccessToken => "EXPIRED_ACCESS_TOKEN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    pub code: ErrorCode,
    pub description: String,
}

impl Exception {
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub exception: Exception,
}
