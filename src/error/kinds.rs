use std::{fmt, io};

/// Crate-wide `Result` type using [`WingmanError`] as the error.
pub type Result<T> = std::result::Result<T, WingmanError>;

/// Top-level error type.
#[derive(Debug)]
pub enum WingmanError {
    /// Remote API errors.
    Api(ApiError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// JSON encoding errors.
    Json(serde_json::Error),

    /// Line editor errors.
    Readline(String),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors talking to the user-search endpoint.
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be sent or the connection failed.
    Request(String),

    /// Server answered with a non-success status.
    Status { code: u16, message: String },

    /// The request exceeded the configured timeout.
    Timeout,

    /// Base URL or search path do not form a valid URL.
    InvalidUrl(String),

    /// Response body was not valid JSON.
    Decode(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for WingmanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WingmanError::Api(e) => write!(f, "API error: {e}"),
            WingmanError::Config(e) => write!(f, "Configuration error: {e}"),
            WingmanError::Io(e) => write!(f, "I/O error: {e}"),
            WingmanError::Json(e) => write!(f, "JSON error: {e}"),
            WingmanError::Readline(msg) => write!(f, "Readline error: {msg}"),
            WingmanError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Request(msg) => write!(f, "Request failed: {msg}"),
            ApiError::Status { code, message } => {
                write!(f, "Server returned {code}: {message}")
            }
            ApiError::Timeout => write!(f, "Request timed out"),
            ApiError::InvalidUrl(url) => write!(f, "Invalid URL: {url}"),
            ApiError::Decode(msg) => write!(f, "Could not decode response: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for WingmanError {}
impl std::error::Error for ApiError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to WingmanError ========================= */

impl From<io::Error> for WingmanError {
    fn from(err: io::Error) -> Self {
        WingmanError::Io(err)
    }
}

impl From<serde_json::Error> for WingmanError {
    fn from(err: serde_json::Error) -> Self {
        WingmanError::Json(err)
    }
}

impl From<ApiError> for WingmanError {
    fn from(err: ApiError) -> Self {
        WingmanError::Api(err)
    }
}

impl From<ConfigError> for WingmanError {
    fn from(err: ConfigError) -> Self {
        WingmanError::Config(err)
    }
}

impl From<reqwest::Error> for WingmanError {
    fn from(err: reqwest::Error) -> Self {
        WingmanError::Api(ApiError::from(err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Request(err.to_string())
        }
    }
}

impl From<reedline::ReedlineError> for WingmanError {
    fn from(err: reedline::ReedlineError) -> Self {
        WingmanError::Readline(err.to_string())
    }
}

impl From<String> for WingmanError {
    fn from(msg: String) -> Self {
        WingmanError::Generic(msg)
    }
}

impl From<&str> for WingmanError {
    fn from(msg: &str) -> Self {
        WingmanError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = WingmanError::from(ApiError::Status {
            code: 502,
            message: "Bad Gateway".to_string(),
        });
        assert_eq!(err.to_string(), "API error: Server returned 502: Bad Gateway");
        assert_eq!(ApiError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_config_error_display() {
        let err = WingmanError::from(ConfigError::InvalidValue {
            field: "mentions.page_size".to_string(),
            value: "0".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value '0' for field 'mentions.page_size'"
        );
    }

    #[test]
    fn test_generic_conversions() {
        let err: WingmanError = "boom".into();
        assert!(matches!(err, WingmanError::Generic(ref m) if m == "boom"));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        assert!(matches!(WingmanError::from(io_err), WingmanError::Io(_)));
    }
}
