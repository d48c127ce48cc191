//! Unified error type for all liblog operations.

use std::path::PathBuf;

/// Error type for liblog operations.
#[derive(Debug)]
pub enum Error {
    /// A backend adapter was constructed while its backend could not be found.
    ProviderNotFound(&'static str),
    /// Positional substitution of a message template failed.
    Format {
        /// The template exactly as the caller supplied it.
        template: String,
        /// What went wrong while rendering.
        reason: String,
    },
    /// I/O error.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// Cyclic include detected in config sources.
    CyclicInclude(PathBuf),
    /// Invalid log level string.
    InvalidLevel(String),
}

impl Error {
    pub(crate) fn format(template: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProviderNotFound(backend) => write!(f, "log provider not found: {backend}"),
            Self::Format { template, reason } => {
                write!(f, "failed to format message template \"{template}\": {reason}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::CyclicInclude(p) => write!(f, "cyclic include: {}", p.display()),
            Self::InvalidLevel(level) => write!(f, "invalid log level: {level}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}
