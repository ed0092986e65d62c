use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for dirtystore operations.
///
/// Each kind describes one category of failure so callers can react to a
/// specific condition instead of parsing error messages.
///
/// # Examples
///
/// ```rust,ignore
/// use dirtystore::errors::{DirtyError, DirtyResult, ErrorKind};
///
/// fn example() -> DirtyResult<()> {
///     Err(DirtyError::new("Collection not found", ErrorKind::CollectionNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Store boundary errors
    /// Reading a value from the underlying key/value store failed
    StoreReadError,
    /// Writing a value to the underlying key/value store failed
    StoreWriteError,
    /// The adapter has not been initialized, or was already torn down
    StoreNotInitialized,

    // Collection lifecycle errors
    /// The collection does not exist
    CollectionNotFound,
    /// Removing the collection's data key failed during drop
    CollectionDropError,
    /// Auto-increment state was requested for a collection that was never defined
    MissingCollectionState,

    // Query errors
    /// A query option the adapter does not support was supplied
    UnsupportedQueryOption,
    /// A criteria tree was malformed (operator given a value of the wrong shape)
    InvalidCriteria,

    // IO and encoding errors - file store plumbing
    /// Generic IO error
    IOError,
    /// Error accessing the database file
    FileAccessError,
    /// Error encoding or decoding stored data
    EncodingError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::StoreReadError => write!(f, "Store read error"),
            ErrorKind::StoreWriteError => write!(f, "Store write error"),
            ErrorKind::StoreNotInitialized => write!(f, "Store not initialized"),
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::CollectionDropError => write!(f, "Collection drop error"),
            ErrorKind::MissingCollectionState => write!(f, "Missing collection state"),
            ErrorKind::UnsupportedQueryOption => write!(f, "Unsupported query option"),
            ErrorKind::InvalidCriteria => write!(f, "Invalid criteria"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileAccessError => write!(f, "File access error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom dirtystore error type.
///
/// `DirtyError` carries the error message, kind and an optional cause. Errors
/// from the underlying store are passed through unmodified as the cause of the
/// wrapping error; the adapter adds no retry logic.
///
/// # Examples
///
/// ```rust,ignore
/// use dirtystore::errors::{DirtyError, ErrorKind};
///
/// let err = DirtyError::new("Collection not found", ErrorKind::CollectionNotFound);
///
/// let cause = DirtyError::new("disk full", ErrorKind::IOError);
/// let err = DirtyError::new_with_cause("write failed", ErrorKind::StoreWriteError, cause);
/// ```
#[derive(Clone)]
pub struct DirtyError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DirtyError>>,
    backtrace: Backtrace,
}

impl DirtyError {
    /// Creates a new `DirtyError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DirtyError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Backtrace::new(),
        }
    }

    /// Creates a new `DirtyError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DirtyError) -> Self {
        DirtyError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DirtyError> {
        self.cause.as_deref()
    }
}

impl Display for DirtyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DirtyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for DirtyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for dirtystore operations.
///
/// `DirtyResult<T>` is shorthand for `Result<T, DirtyError>`. All fallible
/// adapter operations return this type.
pub type DirtyResult<T> = Result<T, DirtyError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for DirtyError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileAccessError,
            std::io::ErrorKind::PermissionDenied => ErrorKind::FileAccessError,
            _ => ErrorKind::IOError,
        };
        DirtyError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<serde_json::Error> for DirtyError {
    fn from(err: serde_json::Error) -> Self {
        DirtyError::new(
            &format!("Encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<String> for DirtyError {
    fn from(msg: String) -> Self {
        DirtyError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for DirtyError {
    fn from(msg: &str) -> Self {
        DirtyError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_error_new_creates_error() {
        let error = DirtyError::new("An error occurred", ErrorKind::IOError);
        assert_eq!(error.message(), "An error occurred");
        assert_eq!(error.kind(), &ErrorKind::IOError);
        assert!(error.cause().is_none());
    }

    #[test]
    fn dirty_error_new_with_cause_creates_error() {
        let cause = DirtyError::new("disk full", ErrorKind::IOError);
        let error = DirtyError::new_with_cause("write failed", ErrorKind::StoreWriteError, cause);
        assert_eq!(error.message(), "write failed");
        assert_eq!(error.kind(), &ErrorKind::StoreWriteError);
        assert!(error.cause().is_some());
    }

    #[test]
    fn dirty_error_display_formats_correctly() {
        let error = DirtyError::new("An error occurred", ErrorKind::IOError);
        assert_eq!(format!("{}", error), "An error occurred");
    }

    #[test]
    fn dirty_error_debug_formats_with_cause() {
        let cause = DirtyError::new("disk full", ErrorKind::IOError);
        let error = DirtyError::new_with_cause("write failed", ErrorKind::StoreWriteError, cause);
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("write failed"));
        assert!(formatted.contains("Caused by:"));
    }

    #[test]
    fn dirty_error_source_returns_cause() {
        let cause = DirtyError::new("disk full", ErrorKind::IOError);
        let error = DirtyError::new_with_cause("write failed", ErrorKind::StoreWriteError, cause);
        assert!(error.source().is_some());

        let error = DirtyError::new("An error occurred", ErrorKind::IOError);
        assert!(error.source().is_none());
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(format!("{}", ErrorKind::StoreReadError), "Store read error");
        assert_eq!(format!("{}", ErrorKind::StoreWriteError), "Store write error");
        assert_eq!(
            format!("{}", ErrorKind::MissingCollectionState),
            "Missing collection state"
        );
        assert_eq!(
            format!("{}", ErrorKind::UnsupportedQueryOption),
            "Unsupported query option"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DirtyError = io_err.into();
        assert_eq!(err.kind(), &ErrorKind::FileAccessError);
        assert!(err.message().contains("IO error"));

        let io_err = std::io::Error::other("unknown io error");
        let err: DirtyError = io_err.into();
        assert_eq!(err.kind(), &ErrorKind::IOError);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i64>("not json").unwrap_err();
        let err: DirtyError = json_err.into();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn test_from_string_and_str() {
        let err: DirtyError = String::from("boom").into();
        assert_eq!(err.kind(), &ErrorKind::InternalError);
        assert_eq!(err.message(), "boom");

        let err: DirtyError = "boom".into();
        assert_eq!(err.kind(), &ErrorKind::InternalError);
    }

    #[test]
    fn test_error_chain_with_different_kinds() {
        let root = DirtyError::new("file not found", ErrorKind::FileAccessError);
        let mid = DirtyError::new_with_cause("failed to read store", ErrorKind::StoreReadError, root);
        let top =
            DirtyError::new_with_cause("cannot describe collection", ErrorKind::StoreReadError, mid);

        assert_eq!(top.kind(), &ErrorKind::StoreReadError);
        let cause = top.cause().expect("cause should be present");
        assert_eq!(cause.kind(), &ErrorKind::StoreReadError);
        let root_cause = cause.cause().expect("root cause should be present");
        assert_eq!(root_cause.kind(), &ErrorKind::FileAccessError);
    }

    #[test]
    fn test_question_mark_operator_with_from() {
        fn parse_row_count(raw: &str) -> DirtyResult<u64> {
            let count: u64 = serde_json::from_str(raw)?;
            Ok(count)
        }

        assert_eq!(parse_row_count("42").unwrap(), 42);
        assert!(parse_row_count("nope").is_err());
    }
}
