use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_argument - {0}")]
    InvalidArgument(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_argument<M: Into<String>>(message: M) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(message) => message,
            Self::InvalidData(message) => message,
            Self::Io(message) => message,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn display_joins_code_and_message() {
        let err = AppError::invalid_argument("month must be YYYY-MM");
        assert_eq!(err.to_string(), "invalid_argument - month must be YYYY-MM");
    }

    #[test]
    fn io_errors_convert_with_io_code() {
        let err: AppError = std::io::Error::other("disk gone").into();
        assert_eq!(err.code(), "io_error");
        assert_eq!(err.message(), "disk gone");
    }
}
