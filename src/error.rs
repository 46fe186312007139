use std::fmt;
use thiserror::Error;

/// Tag attached to every error event emitted by the extractor
pub const PLUGIN_NAME: &str = "gettext-extract";

/// Errors raised while configuring the extractor or processing a file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// An `extensions` entry names a strategy other than `html` or `js`
    #[error("Invalid strategy {strategy} for extension {extension}")]
    InvalidStrategy { strategy: String, extension: String },

    /// The delimiter pattern could not be compiled
    #[error("Invalid delimiters {start} / {end}: {reason}")]
    InvalidDelimiter {
        start: String,
        end: String,
        reason: String,
    },

    /// The configured sort locale cannot be parsed or has no collation data
    #[error("Invalid sort locale {locale}: {reason}")]
    InvalidLocale { locale: String, reason: String },

    /// The file carried streamed content instead of a buffer
    #[error("Streaming not supported")]
    StreamingNotSupported,

    /// The same message was declared with two different plural forms
    #[error(
        "Incompatible plural definitions for {message}: {existing} / {conflicting} (in: {})",
        .references.join(", ")
    )]
    IncompatiblePlural {
        message: String,
        existing: String,
        conflicting: String,
        references: Vec<String>,
    },
}

/// Failure event forwarded through the pipeline instead of aborting it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginError {
    pub plugin: &'static str,
    pub error: ExtractError,
}

impl PluginError {
    pub fn new(error: ExtractError) -> Self {
        Self {
            plugin: PLUGIN_NAME,
            error,
        }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.plugin, self.error)
    }
}

impl std::error::Error for PluginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<ExtractError> for PluginError {
    fn from(error: ExtractError) -> Self {
        Self::new(error)
    }
}
