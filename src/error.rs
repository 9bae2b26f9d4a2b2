use thiserror::Error;

/// Errors raised by the estimation engine.
///
/// Every engine operation is deterministic given its inputs and seed, so none
/// of these are retried; they surface to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed abundance vector (empty, non-positive, non-integer).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Estimator name outside the registry.
    #[error("unknown method '{0}' (expected one of: empirical, chao1, ichao1, ace, jackknife, egghe_proot, minsample)")]
    UnknownMethod(String),

    /// Out-of-range tuning values (iterations, steps, confidence level, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested sampling target lies beyond the extrapolation asymptote.
    #[error("unsolvable: {0}")]
    Unsolvable(String),

    /// A bootstrap run was aborted through its cancel token.
    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

/// Error type of the `unseen` binary: a message plus the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let exit_code = match &err {
            EngineError::InvalidInput(_)
            | EngineError::UnknownMethod(_)
            | EngineError::InvalidConfiguration(_) => 2,
            EngineError::Unsolvable(_) => 3,
            EngineError::Cancelled => 130,
        };
        Self::new(exit_code, err.to_string())
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
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
