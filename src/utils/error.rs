use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Malformed input row at line {line}: expected 2 fields (name, obj_id), found {fields}")]
    MalformedRow { line: u64, fields: usize },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Ephemeris service error (status {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("No ephemeris data returned for '{object_id}': {detail}")]
    MissingEphemerisError { object_id: String, detail: String },

    #[error("Orbital element '{field}' missing for '{object_id}'")]
    MissingElementError { object_id: String, field: String },

    #[error("Invalid semi-major axis {value} AU for '{object_id}': must be positive and finite")]
    InvalidSemiMajorAxis { object_id: String, value: f64 },

    #[error("Ephemeris parse error: {message}")]
    ParseError { message: String },

    #[error("Time window error: {message}")]
    TimeWindowError { message: String },

    #[error("Cannot write output '{path}': {source}")]
    OutputError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, OrbitError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Service,
    Data,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl OrbitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OrbitError::IoError(_) => ErrorCategory::Input,
            OrbitError::CsvError(_) | OrbitError::MalformedRow { .. } => ErrorCategory::Input,
            OrbitError::ApiError(_) => ErrorCategory::Network,
            OrbitError::ServiceError { .. } => ErrorCategory::Service,
            OrbitError::MissingEphemerisError { .. }
            | OrbitError::MissingElementError { .. }
            | OrbitError::InvalidSemiMajorAxis { .. }
            | OrbitError::ParseError { .. }
            | OrbitError::TimeWindowError { .. } => ErrorCategory::Data,
            OrbitError::OutputError { .. } | OrbitError::SerializationError(_) => {
                ErrorCategory::Output
            }
            OrbitError::ConfigError { .. }
            | OrbitError::ConfigValidationError { .. }
            | OrbitError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路或服務端錯誤，稍後重跑可能成功
            ErrorCategory::Network | ErrorCategory::Service => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,   // 服務或網路錯誤，可重跑
            ErrorSeverity::High => 1,     // 輸入或資料錯誤
            ErrorSeverity::Critical => 3, // 無法寫出結果
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OrbitError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("File not found: {}", e)
            }
            OrbitError::IoError(e) => format!("Could not read the input file: {}", e),
            OrbitError::CsvError(e) => format!("The input table could not be read: {}", e),
            OrbitError::MalformedRow { line, .. } => {
                format!("Input row {} does not have exactly two columns", line)
            }
            OrbitError::ApiError(e) => format!("Could not reach the ephemeris service: {}", e),
            OrbitError::ServiceError { message, .. } => {
                format!("The ephemeris service rejected the query: {}", message)
            }
            OrbitError::MissingEphemerisError { object_id, .. } => {
                format!("The ephemeris service returned no data for '{}'", object_id)
            }
            OrbitError::MissingElementError { object_id, field } => format!(
                "The orbital elements for '{}' have no '{}' value",
                object_id, field
            ),
            OrbitError::OutputError { path, .. } => {
                format!("Could not write the results to {}", path)
            }
            OrbitError::InvalidSemiMajorAxis { object_id, value } => format!(
                "'{}' has semi-major axis {} AU, so no orbital period can be computed",
                object_id, value
            ),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OrbitError::IoError(_) => "Check that the input file exists and is readable",
            OrbitError::CsvError(_) | OrbitError::MalformedRow { .. } => {
                "Make sure the input CSV has a header row and two columns: name,obj_id"
            }
            OrbitError::ApiError(_) => {
                "Check your network connection and the --api-endpoint value, then run again"
            }
            OrbitError::ServiceError { .. } | OrbitError::MissingEphemerisError { .. } => {
                "Check that the object id names one small body in Horizons, e.g. '1;' or 'Ceres'"
            }
            OrbitError::MissingElementError { .. } | OrbitError::InvalidSemiMajorAxis { .. } => {
                "Only bodies on bound heliocentric orbits have a Kepler period; remove this row"
            }
            OrbitError::ParseError { .. } => {
                "The service response format may have changed; run with --verbose to inspect it"
            }
            OrbitError::TimeWindowError { .. } => {
                "The orbital period is too long to sample; remove this row"
            }
            OrbitError::OutputError { .. } | OrbitError::SerializationError(_) => {
                "Check that the output path is a writable file location with free disk space"
            }
            OrbitError::ConfigError { .. }
            | OrbitError::ConfigValidationError { .. }
            | OrbitError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and try again"
            }
        }
    }
}
