use std::fmt;

/// The four error kinds the core can raise.
///
/// Configuration and type errors are meant to be propagated straight back
/// to the caller with `?`. An `Invariant` error means the algorithm found
/// itself in a state that should be impossible; callers at the process
/// boundary (the CLI binary) treat it as fatal rather than recoverable,
/// rather than the source's `print` + `exit(1)` from deep inside the
/// engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DvsError {
    Config(String),
    Type(String),
    Value(String),
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, DvsError>;

impl DvsError {
    pub fn config(msg: impl Into<String>) -> Self {
        DvsError::Config(msg.into())
    }

    pub fn type_err(msg: impl Into<String>) -> Self {
        DvsError::Type(msg.into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        DvsError::Value(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        DvsError::Invariant(msg.into())
    }

    /// True for errors that indicate a programming bug rather than bad
    /// input; the CLI surfaces these by aborting instead of reporting them
    /// as ordinary failures.
    pub fn is_invariant(&self) -> bool {
        matches!(self, DvsError::Invariant(_))
    }
}

impl fmt::Display for DvsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DvsError::Config(msg) => write!(f, "config error: {msg}"),
            DvsError::Type(msg) => write!(f, "type error: {msg}"),
            DvsError::Value(msg) => write!(f, "value error: {msg}"),
            DvsError::Invariant(msg) => write!(f, "invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for DvsError {}
