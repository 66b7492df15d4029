use std::fmt;
use thiserror::Error;

/// The error type for STS role assumption.
#[derive(Error, Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<String>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred.
///
/// The three kinds are mutually exclusive and cover every failure path of
/// the crate; no raw transport or XML error escapes without being wrapped
/// into one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Ambient AWS credentials are absent at construction time. Not
    /// retryable without fixing the environment.
    Credential,

    /// A fault occurred while computing the SigV4 signature. Callers must
    /// re-derive the request rather than retry as-is.
    Signing,

    /// STS rejected the request, or returned a malformed or incomplete
    /// response.
    RoleAssume,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
        }
    }

    /// Add a source error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Append a context entry, rendered after the message.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

// Convenience constructors, one per kind.
impl Error {
    /// Create a credential error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Credential, message)
    }

    /// Create a signing error.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Signing, message)
    }

    /// Create a role-assume error.
    pub fn role_assume(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RoleAssume, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for ctx in &self.context {
            write!(f, ", {ctx}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Credential => write!(f, "missing credentials"),
            ErrorKind::Signing => write!(f, "signing failed"),
            ErrorKind::RoleAssume => write!(f, "role assumption failed"),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::signing(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_with_context() {
        let err = Error::role_assume("failed to assume role")
            .with_context("role_arn: arn:aws:iam::123456789012:role/demo")
            .with_context("status: 500");

        assert_eq!(
            err.to_string(),
            "failed to assume role, role_arn: arn:aws:iam::123456789012:role/demo, status: 500"
        );
        assert_eq!(err.kind(), ErrorKind::RoleAssume);
    }

    #[test]
    fn test_kind_is_closed_set() {
        for kind in [
            ErrorKind::Credential,
            ErrorKind::Signing,
            ErrorKind::RoleAssume,
        ] {
            let err = Error::new(kind, "boom");
            assert_eq!(err.kind(), kind);
        }
    }
}
