// Dashboard Error Types

use thiserror::Error;

/// Dashboard store and state error
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Save requested with nothing in the canvas
    #[error("No active dashboard to save")]
    NoActiveDashboard,

    /// Dashboard not found
    #[error("Dashboard not found: {0}")]
    NotFound(String),

    /// A dashboard with the same namespace/name exists
    #[error("Dashboard already exists: {0}")]
    AlreadyExists(String),

    /// Stale resource version on update
    #[error("Dashboard was modified concurrently: {0}")]
    Conflict(String),

    /// Authentication or authorization failed
    #[error("Not authorized to access dashboards: {0}")]
    Unauthorized(String),

    /// Connection failed
    #[error("Cannot connect to dashboard store: {0}")]
    ConnectionFailed(String),

    /// Request timeout
    #[error("Dashboard store response timeout")]
    Timeout,

    /// API error from the store
    #[error("Dashboard store error: {0}")]
    ApiError(String),

    /// JSON parsing error
    #[error("Response parse error: {0}")]
    ParseError(String),

    /// Name cannot be turned into a valid resource name
    #[error("Invalid dashboard name: {0}")]
    InvalidName(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DashboardError::Timeout
        } else if err.is_connect() {
            DashboardError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            DashboardError::ParseError(err.to_string())
        } else {
            DashboardError::ApiError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for DashboardError {
    fn from(err: toml::de::Error) -> Self {
        DashboardError::InvalidConfig(err.to_string())
    }
}

/// Result type for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Dashboard error codes for the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardErrorCode {
    NoActiveDashboard,
    NotFound,
    AlreadyExists,
    Conflict,
    Unauthorized,
    ConnectionFailed,
    Timeout,
    ApiError,
    ParseError,
    InvalidName,
    InvalidConfig,
    IoError,
}

impl DashboardErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardErrorCode::NoActiveDashboard => "DASHBOARD_NO_ACTIVE",
            DashboardErrorCode::NotFound => "DASHBOARD_NOT_FOUND",
            DashboardErrorCode::AlreadyExists => "DASHBOARD_EXISTS",
            DashboardErrorCode::Conflict => "DASHBOARD_CONFLICT",
            DashboardErrorCode::Unauthorized => "DASHBOARD_UNAUTHORIZED",
            DashboardErrorCode::ConnectionFailed => "DASHBOARD_CONNECTION_FAILED",
            DashboardErrorCode::Timeout => "DASHBOARD_TIMEOUT",
            DashboardErrorCode::ApiError => "DASHBOARD_API_ERROR",
            DashboardErrorCode::ParseError => "DASHBOARD_PARSE_ERROR",
            DashboardErrorCode::InvalidName => "DASHBOARD_INVALID_NAME",
            DashboardErrorCode::InvalidConfig => "DASHBOARD_INVALID_CONFIG",
            DashboardErrorCode::IoError => "DASHBOARD_IO_ERROR",
        }
    }
}

impl DashboardError {
    pub fn code(&self) -> DashboardErrorCode {
        match self {
            DashboardError::NoActiveDashboard => DashboardErrorCode::NoActiveDashboard,
            DashboardError::NotFound(_) => DashboardErrorCode::NotFound,
            DashboardError::AlreadyExists(_) => DashboardErrorCode::AlreadyExists,
            DashboardError::Conflict(_) => DashboardErrorCode::Conflict,
            DashboardError::Unauthorized(_) => DashboardErrorCode::Unauthorized,
            DashboardError::ConnectionFailed(_) => DashboardErrorCode::ConnectionFailed,
            DashboardError::Timeout => DashboardErrorCode::Timeout,
            DashboardError::ApiError(_) => DashboardErrorCode::ApiError,
            DashboardError::ParseError(_) => DashboardErrorCode::ParseError,
            DashboardError::InvalidName(_) => DashboardErrorCode::InvalidName,
            DashboardError::InvalidConfig(_) => DashboardErrorCode::InvalidConfig,
            DashboardError::IoError(_) => DashboardErrorCode::IoError,
        }
    }

    /// Whether re-invoking the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DashboardError::ConnectionFailed(_) | DashboardError::Timeout | DashboardError::Conflict(_)
        )
    }
}
