use std::fmt;

/// Error types for import identifier resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// No resolver is registered for the resource type
    UnsupportedResourceType {
        importer: String,
        resource_type: String,
    },

    /// The importer was used before `init` succeeded
    NotInitialized { importer: String },

    /// A required attribute is missing or has the wrong type; the resource should be skipped
    InvalidAttribute {
        resource_name: String,
        attribute: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The remote API answered but no matching live resource exists
    NotFound { resource_type: String, key: String },

    /// The remote API call itself failed (network, auth, throttling)
    Api { operation: String, message: String },

    /// The caller cancelled the resolution
    Cancelled,

    /// The caller's deadline passed before or during the remote call
    DeadlineExceeded { operation: String },
}

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wiring problem: unsupported type or uninitialized importer. Never retried.
    Configuration,
    /// Declared configuration cannot be used for lookup; skip the resource
    Validation,
    /// Resource does not exist remotely yet
    NotFound,
    /// Remote call failed
    Transient,
    /// Cancelled or timed out by the caller
    Interrupted,
}

impl ResolveError {
    pub fn not_found(resource_type: &str, key: &str) -> Self {
        ResolveError::NotFound {
            resource_type: resource_type.to_string(),
            key: key.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::UnsupportedResourceType { .. } | ResolveError::NotInitialized { .. } => {
                ErrorKind::Configuration
            }
            ResolveError::InvalidAttribute { .. } => ErrorKind::Validation,
            ResolveError::NotFound { .. } => ErrorKind::NotFound,
            ResolveError::Api { .. } => ErrorKind::Transient,
            ResolveError::Cancelled | ResolveError::DeadlineExceeded { .. } => {
                ErrorKind::Interrupted
            }
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnsupportedResourceType {
                importer,
                resource_type,
            } => {
                write!(
                    f,
                    "resourceType not supported {} (importer '{}')",
                    resource_type, importer
                )
            }
            ResolveError::NotInitialized { importer } => {
                write!(f, "importer '{}' has not been initialized", importer)
            }
            ResolveError::InvalidAttribute {
                resource_name,
                attribute,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "skipping {} because its {} was not a {} but {}",
                    resource_name, attribute, expected, actual
                )
            }
            ResolveError::NotFound { resource_type, key } => {
                write!(f, "{} not found {}", resource_type, key)
            }
            ResolveError::Api { operation, message } => {
                write!(f, "{} failed: {}", operation, message)
            }
            ResolveError::Cancelled => write!(f, "resolution cancelled"),
            ResolveError::DeadlineExceeded { operation } => {
                write!(f, "deadline exceeded while running {}", operation)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Result type for resolution operations
pub type ResolveResult<T> = Result<T, ResolveError>;
