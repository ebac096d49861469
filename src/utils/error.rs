use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Request to {url} timed out")]
    FetchTimeout { url: String },

    #[error("Network error while requesting {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Payload decode error: {message}")]
    DecodeError { message: String },

    #[error("Schema mismatch at {location}: {message}")]
    SchemaMismatch { location: String, message: String },

    #[error("Requested {requested} records but payload only has {available}")]
    InsufficientRecords { requested: usize, available: usize },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依嚴重程度決定程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ChartError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChartError::FetchTimeout { .. }
            | ChartError::NetworkError { .. }
            | ChartError::HttpStatusError { .. }
            | ChartError::HttpClientError(_) => ErrorCategory::Network,
            ChartError::DecodeError { .. }
            | ChartError::SchemaMismatch { .. }
            | ChartError::InsufficientRecords { .. } => ErrorCategory::Data,
            ChartError::ConfigValidationError { .. }
            | ChartError::InvalidConfigValueError { .. }
            | ChartError::MissingConfigError { .. }
            | ChartError::ValidationError { .. } => ErrorCategory::Configuration,
            ChartError::ZipError(_)
            | ChartError::CsvError(_)
            | ChartError::IoError(_)
            | ChartError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 暫時性網路問題，重試可能成功
            ChartError::FetchTimeout { .. } | ChartError::NetworkError { .. } => {
                ErrorSeverity::Medium
            }
            ChartError::HttpStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            ChartError::HttpStatusError { .. } | ChartError::HttpClientError(_) => {
                ErrorSeverity::High
            }
            ChartError::DecodeError { .. }
            | ChartError::SchemaMismatch { .. }
            | ChartError::InsufficientRecords { .. } => ErrorSeverity::High,
            ChartError::ConfigValidationError { .. }
            | ChartError::InvalidConfigValueError { .. }
            | ChartError::MissingConfigError { .. }
            | ChartError::ValidationError { .. } => ErrorSeverity::High,
            ChartError::IoError(_) | ChartError::ZipError(_) => ErrorSeverity::Critical,
            ChartError::CsvError(_) | ChartError::SerializationError(_) => ErrorSeverity::High,
        }
    }

    /// 是否值得再次嘗試同一個請求
    pub fn is_retryable(&self) -> bool {
        match self {
            ChartError::FetchTimeout { .. } | ChartError::NetworkError { .. } => true,
            ChartError::HttpStatusError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ChartError::FetchTimeout { .. } => {
                "Increase --timeout-seconds or check that the API server is responsive".to_string()
            }
            ChartError::NetworkError { url, .. } => {
                format!("Make sure the API server behind {} is running and reachable", url)
            }
            ChartError::HttpStatusError { status, .. } if *status >= 500 => {
                "The API server failed; retry later or raise --retry-attempts".to_string()
            }
            ChartError::HttpStatusError { status, .. } if *status == 404 => {
                "Check the endpoint path and the user ids being compared".to_string()
            }
            ChartError::HttpStatusError { .. } => {
                "Check the endpoint URL and any request headers".to_string()
            }
            ChartError::HttpClientError(_) => {
                "Check the endpoint URL format and TLS settings".to_string()
            }
            ChartError::DecodeError { .. } => {
                "The endpoint did not return JSON; verify it serves .json or JSONP".to_string()
            }
            ChartError::SchemaMismatch { .. } => {
                "The payload shape does not match the chart kind; check --chart and --endpoint"
                    .to_string()
            }
            ChartError::InsufficientRecords { available, .. } => format!(
                "Lower --limit to at most {} or drop --strict to clamp to the available records",
                available
            ),
            ChartError::ConfigValidationError { field, .. }
            | ChartError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in your configuration", field)
            }
            ChartError::MissingConfigError { field } => {
                format!("Add the '{}' setting to your configuration", field)
            }
            ChartError::ValidationError { .. } => {
                "Review the configuration for inconsistent values".to_string()
            }
            ChartError::IoError(_) | ChartError::ZipError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            ChartError::CsvError(_) | ChartError::SerializationError(_) => {
                "Inspect the series data for values that cannot be serialized".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch chart data: {}", self),
            ErrorCategory::Data => format!("Chart data is unusable: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not write chart output: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
