//! Application error type with process exit codes.
//!
//! Errors are classified so callers (and shell scripts) can distinguish bad
//! data from a model that cannot be fit, and both from plain usage/I/O
//! problems.

/// Error classification.
///
/// - `Usage`: bad flags, missing files, schema problems (exit 2)
/// - `Data`: no valid dated records remain after parsing (exit 3)
/// - `Model`: the estimator cannot be fit (too short / degenerate) (exit 4)
/// - `Terminal`: TUI / terminal handling failures (exit 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Data,
    Model,
    Terminal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::Data => 3,
            ErrorKind::Model | ErrorKind::Terminal => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Data, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Model, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_kind() {
        assert_eq!(AppError::usage("x").exit_code(), 2);
        assert_eq!(AppError::data("x").exit_code(), 3);
        assert_eq!(AppError::model("x").exit_code(), 4);
        assert_eq!(AppError::terminal("x").exit_code(), 4);
    }

    #[test]
    fn kinds_are_observable() {
        assert_eq!(AppError::data("no rows").kind(), ErrorKind::Data);
        assert_eq!(AppError::model("too short").kind(), ErrorKind::Model);
    }
}
