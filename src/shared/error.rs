use crate::shared::validation::ValidationFailureKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    ValidationError {
        kind: ValidationFailureKind,
        message: String,
    },
    FormError(String),
    Network(String),
    Timeout(String),
    NotFound(String),
    Unauthorized(String),
    ConfigurationError(String),
    SerializationError(String),
    DeserializationError(String),
    Internal(String),
}

impl AppError {
    pub fn validation(kind: ValidationFailureKind, message: impl Into<String>) -> Self {
        AppError::ValidationError {
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::FormError(_) => "FORM_ERROR",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            AppError::SerializationError(_) => "SERIALIZATION_ERROR",
            AppError::DeserializationError(_) => "DESERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// UI にそのまま表示できるメッセージ
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError { message, .. } => message.clone(),
            AppError::FormError(message) => message.clone(),
            AppError::NotFound(_) => "The requested item no longer exists".to_string(),
            AppError::Unauthorized(_) => "You need to sign in to do that".to_string(),
            AppError::Timeout(_) => "The server took too long to respond".to_string(),
            AppError::Network(_) => "Could not reach the server".to_string(),
            _ => "Something went wrong! please try again".to_string(),
        }
    }

    pub fn is_form_error(&self) -> bool {
        matches!(self, AppError::FormError(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError { kind, message } => {
                write!(f, "Validation error ({}): {}", kind, message)
            }
            AppError::FormError(msg) => write!(f, "Form error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DeserializationError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_decode() {
            AppError::DeserializationError(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
