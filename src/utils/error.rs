use thiserror::Error;

#[derive(Error, Debug)]
pub enum BreachError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input error: {message}")]
    InputError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BreachError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BreachError::HttpError(_) => ErrorCategory::Network,
            BreachError::CsvError(_) | BreachError::SerializationError(_) => ErrorCategory::Data,
            BreachError::IoError(_) => ErrorCategory::Storage,
            BreachError::ConfigError { .. }
            | BreachError::ConfigValidationError { .. }
            | BreachError::MissingConfigError { .. }
            | BreachError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            BreachError::InputError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Input | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BreachError::HttpError(_) => "Check your network connection and the API base URL, then retry",
            BreachError::CsvError(_) => "Make sure the CSV file is well formed and UTF-8 encoded",
            BreachError::SerializationError(_) => "Make sure the JSON file is valid",
            BreachError::IoError(_) => "Check that the file exists and that you have permission to read/write it",
            BreachError::MissingConfigError { .. } => {
                "Provide the missing value via command line flag, environment variable or config file"
            }
            BreachError::ConfigError { .. }
            | BreachError::ConfigValidationError { .. }
            | BreachError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again (see --help)"
            }
            BreachError::InputError { .. } => {
                "Provide at least one valid email address (user@domain.tld)"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BreachError::HttpError(e) if e.is_timeout() => {
                "The breach lookup service did not respond in time".to_string()
            }
            BreachError::HttpError(_) => "Could not reach the breach lookup service".to_string(),
            BreachError::IoError(e) => format!("File operation failed: {}", e),
            BreachError::MissingConfigError { field } => format!("{} is required", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BreachError>;
