//! Error handling for the powprim library
//!
//! The primitive operations themselves never fail: an unsupported feature is
//! resolved by dispatch, and caller contract violations are not checked. The
//! error type covers the ambient layers around them (configuration, cpuinfo
//! parsing and thread placement hints).

use thiserror::Error;

/// Main error type for the powprim library
#[derive(Error, Debug)]
pub enum PowprimError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A hardware description source could not be parsed
    #[error("Parse error in {source_name}: {message}")]
    Parse {
        /// Name of the source being parsed (e.g. a cpuinfo path)
        source_name: String,
        /// Error message describing the issue
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// Feature not supported on this build or platform
    #[error("Not supported: {feature}")]
    NotSupported {
        /// Description of the unsupported feature
        feature: String,
    },

    /// The OS rejected a core affinity hint
    #[error("Affinity hint for core {core} rejected: {message}")]
    Affinity {
        /// Core index that was requested
        core: usize,
        /// Error message from the OS
        message: String,
    },
}

impl PowprimError {
    /// Create a parse error
    pub fn parse<S: Into<String>, M: Into<String>>(source_name: S, message: M) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not supported error
    pub fn not_supported<S: Into<String>>(feature: S) -> Self {
        Self::NotSupported {
            feature: feature.into(),
        }
    }

    /// Create an affinity error
    pub fn affinity<S: Into<String>>(core: usize, message: S) -> Self {
        Self::Affinity {
            core,
            message: message.into(),
        }
    }

    /// Create an I/O error from a message
    pub fn io_error<S: Into<String>>(message: S) -> Self {
        Self::Io(std::io::Error::new(std::io::ErrorKind::Other, message.into()))
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Affinity { .. } => true,
            Self::Parse { .. } => false,
            Self::Configuration { .. } => false,
            Self::NotSupported { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse { .. } => "parse",
            Self::Configuration { .. } => "config",
            Self::NotSupported { .. } => "unsupported",
            Self::Affinity { .. } => "affinity",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PowprimError>;
