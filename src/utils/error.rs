use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{message}")]
    BusinessRule { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Auth,
    Configuration,
    Storage,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. }
            | Self::BusinessRule { .. }
            | Self::ValidationError { .. }
            | Self::MissingFieldError { .. } => ErrorCategory::Client,
            Self::Unauthorized { .. } | Self::Jwt(_) => ErrorCategory::Auth,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::DatabaseError(_) | Self::IoError(_) => ErrorCategory::Storage,
            Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client => ErrorSeverity::Low,
            ErrorCategory::Auth => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 穩定的機器可讀錯誤代碼，放在 HTTP 錯誤回應中
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::BusinessRule { .. } => "BUSINESS_RULE_VIOLATION",
            Self::ValidationError { .. } | Self::MissingFieldError { .. } => "VALIDATION_FAILED",
            Self::Unauthorized { .. } | Self::Jwt(_) => "UNAUTHORIZED",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "CONFIGURATION_ERROR",
            Self::DatabaseError(_) | Self::IoError(_) => "STORAGE_ERROR",
            Self::SerializationError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::NotFound { entity, .. } => {
                format!("Check that the {} id exists before retrying", entity)
            }
            Self::BusinessRule { .. } => {
                "Deactivate or delete the ACTIVE child records first".to_string()
            }
            Self::ValidationError { field, .. } | Self::MissingFieldError { field } => {
                format!("Fix the '{}' value in the request", field)
            }
            Self::Unauthorized { .. } | Self::Jwt(_) => {
                "Send a valid bearer token in the Authorization header".to_string()
            }
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Check the '{}' setting in the configuration file or CLI flags", field)
            }
            Self::DatabaseError(_) => {
                "Check that the database file is writable and not locked by another process"
                    .to_string()
            }
            Self::IoError(_) => "Check file permissions and available disk space".to_string(),
            Self::SerializationError(_) => "Report this error with the request payload".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Client | ErrorCategory::Auth => self.to_string(),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Storage => "The data store is unavailable".to_string(),
            ErrorCategory::Internal => "Internal server error".to_string(),
        }
    }
}
