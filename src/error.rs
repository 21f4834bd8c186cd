use std::fmt;
use std::path::PathBuf;

/// Main error type for Granite operations
#[derive(Debug)]
pub enum GraniteError {
    Io {
        source: std::io::Error,
        context: String,
    },
    PathNotFound {
        path: PathBuf,
    },
    Config {
        message: String,
        path: Option<PathBuf>,
    },
    Pattern {
        pattern: String,
        reason: String,
    },
    Command {
        command: String,
        exit_code: Option<i32>,
    },
    Generic {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GraniteError {
    /// Convert a directory-walk failure, keeping the io error kind.
    /// Symlink loops carry no io error and are reported as `Other`.
    pub fn from_walk(err: walkdir::Error, context: String) -> Self {
        let source = match err.io_error() {
            Some(io) => std::io::Error::new(io.kind(), io.to_string()),
            None => std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
        };
        GraniteError::Io { source, context }
    }

    /// True when the underlying cause is a permission failure
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            GraniteError::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }
}

impl fmt::Display for GraniteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraniteError::Io { source, context } => {
                write!(f, "IO error during {}: {}", context, source)
            }
            GraniteError::PathNotFound { path } => {
                write!(f, "Directory '{}' not found", path.display())
            }
            GraniteError::Config { message, path } => {
                if let Some(path) = path {
                    write!(f, "Configuration error in {}: {}", path.display(), message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            GraniteError::Pattern { pattern, reason } => {
                write!(f, "Invalid exclude pattern '{}': {}", pattern, reason)
            }
            GraniteError::Command { command, exit_code } => {
                if let Some(code) = exit_code {
                    write!(f, "Command '{}' failed with exit code {}", command, code)
                } else {
                    write!(f, "Command '{}' was terminated by a signal", command)
                }
            }
            GraniteError::Generic { message, .. } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for GraniteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraniteError::Io { source, .. } => Some(source),
            GraniteError::Generic { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

// The reverse direction comes from anyhow's blanket impl over std errors
impl From<anyhow::Error> for GraniteError {
    fn from(err: anyhow::Error) -> Self {
        GraniteError::Generic {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraniteError>;

/// Attach a description of the failed operation to a lower-level error
pub trait ErrorContext<T> {
    fn with_io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn with_io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| GraniteError::Io {
            source: e,
            context: f(),
        })
    }
}
