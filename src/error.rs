//! Application error type.
//!
//! Every failure in the crate is an `AppError`: a coarse `ErrorKind` (which
//! also decides the process exit code) plus a human-readable message.

/// What went wrong, at the granularity an operator cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad flags, missing credential, inconsistent catalog.
    Config,
    /// Transport failure or non-success response from the statistics API.
    Fetch,
    /// Malformed period/date/value encoding (API response or snapshot).
    Parse,
    /// The snapshot file is absent or unreadable.
    MissingSnapshot,
    /// Input does not satisfy a transform precondition (cadence, length).
    Precondition,
    /// Local write or rendering failure.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::Fetch => 3,
            ErrorKind::Parse => 4,
            ErrorKind::MissingSnapshot => 5,
            ErrorKind::Precondition => 6,
            ErrorKind::Io => 7,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ErrorKind::Config => "config error",
            ErrorKind::Fetch => "fetch error",
            ErrorKind::Parse => "parse error",
            ErrorKind::MissingSnapshot => "missing snapshot",
            ErrorKind::Precondition => "precondition failed",
            ErrorKind::Io => "i/o error",
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

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn missing_snapshot(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingSnapshot, message)
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
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
