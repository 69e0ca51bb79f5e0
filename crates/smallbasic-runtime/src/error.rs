//! Error types shared by every runtime class

use derive_more::{Display, From};

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Display, Debug, From)]
#[display("{kind}")]
pub struct RuntimeError {
    #[from]
    kind: Box<ErrorKind>,
}

impl<E> From<E> for RuntimeError
where
    ErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        RuntimeError {
            kind: Box::new(ErrorKind::from(error)),
        }
    }
}

impl RuntimeError {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        ErrorKind::NotFound {
            kind,
            name: name.into(),
        }
        .into()
    }

    pub fn invalid_argument(msg: impl std::fmt::Display) -> Self {
        ErrorKind::InvalidArgument(msg.to_string()).into()
    }

    pub fn empty(kind: &'static str, name: impl Into<String>) -> Self {
        ErrorKind::Empty {
            kind,
            name: name.into(),
        }
        .into()
    }

    pub fn network(msg: impl std::fmt::Display) -> Self {
        ErrorKind::Network(msg.to_string()).into()
    }

    pub fn image(msg: impl std::fmt::Display) -> Self {
        ErrorKind::Image(msg.to_string()).into()
    }

    pub fn not_initialized(what: &'static str) -> Self {
        ErrorKind::NotInitialized(what).into()
    }

    pub fn os(operation: &'static str, code: i32) -> Self {
        ErrorKind::Os { operation, code }.into()
    }

    pub fn unsupported(what: &'static str) -> Self {
        ErrorKind::Unsupported(what).into()
    }

    pub fn disconnected() -> Self {
        ErrorKind::Disconnected.into()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(*self.kind, ErrorKind::NotFound { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(*self.kind, ErrorKind::InvalidArgument(_))
    }

    pub fn is_not_initialized(&self) -> bool {
        matches!(*self.kind, ErrorKind::NotInitialized(_))
    }
}

#[derive(Display, Debug)]
pub enum ErrorKind {
    #[display("{kind} with name {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[display("Invalid argument: {_0}")]
    InvalidArgument(String),

    #[display("{kind} with name {name} is empty")]
    Empty { kind: &'static str, name: String },

    #[display("I/O error: {_0}")]
    Io(std::io::Error),

    #[display("Network error: {_0}")]
    Network(String),

    #[display("Image error: {_0}")]
    Image(String),

    #[display("{_0} is not initialized")]
    NotInitialized(&'static str),

    #[display("{operation} failed with OS error code {code}")]
    Os { operation: &'static str, code: i32 },

    #[display("Unsupported by this host: {_0}")]
    Unsupported(&'static str),

    #[display("UI thread is no longer running")]
    Disconnected,
}

impl From<std::io::Error> for ErrorKind {
    fn from(error: std::io::Error) -> Self {
        ErrorKind::Io(error)
    }
}

impl From<ureq::Error> for ErrorKind {
    fn from(error: ureq::Error) -> Self {
        ErrorKind::Network(error.to_string())
    }
}

impl From<png::DecodingError> for ErrorKind {
    fn from(error: png::DecodingError) -> Self {
        ErrorKind::Image(error.to_string())
    }
}

impl From<png::EncodingError> for ErrorKind {
    fn from(error: png::EncodingError) -> Self {
        ErrorKind::Image(error.to_string())
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            ErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = RuntimeError::not_found("Shape", "Shape7");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Shape with name Shape7 not found");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;
        let err: RuntimeError = std::io::Error::other("disk on fire").into();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
        assert!(err.source().is_some());
        assert!(RuntimeError::invalid_argument("x").source().is_none());
    }

    #[test]
    fn test_error_stays_pointer_sized() {
        assert_eq!(
            std::mem::size_of::<RuntimeError>(),
            std::mem::size_of::<usize>()
        );
    }
}
