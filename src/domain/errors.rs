/// Errors surfaced at the fallible edges of the chart: configuration,
/// wire ingestion, value-object construction and the JS facade.
/// The engine itself degrades instead of returning these.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    ValidationError(String),
    ParseError(String),
    ConfigurationError(String),
    RenderingError(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse Error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration Error: {}", msg),
            AppError::RenderingError(msg) => write!(f, "Rendering Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_the_kind() {
        let err = AppError::ConfigurationError("pool capacity is zero".into());
        assert_eq!(err.to_string(), "Configuration Error: pool capacity is zero");
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: AppError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}
