//! Error types for rendering and option loading.
//!
//! Every failure inside a render aborts the whole call. Only [`fdump`]
//! hands the error back to the caller; the convenience entry points treat
//! it as fatal.
//!
//! [`fdump`]: crate::fdump

use std::io;

use thiserror::Error;

/// Errors that can occur while rendering a dump or loading options.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The output sink rejected a write.
    #[error("failed to write dump output: {0}")]
    Write(#[from] io::Error),

    /// A custom dump hook failed while writing into its capture buffer.
    #[error("dump hook for {type_name} failed: {source}")]
    Hook {
        type_name: String,
        #[source]
        source: io::Error,
    },

    /// A custom dump hook produced text that is not valid UTF-8.
    #[error("dump hook for {type_name} produced output that is not valid UTF-8")]
    MalformedCapture { type_name: String },

    /// A field exclusion or home package pattern did not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An options file could not be read.
    #[error("failed to read options from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: io::Error,
    },

    /// An options document is not valid TOML for [`OptionsFile`](crate::OptionsFile).
    #[error("failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for dump operations.
pub type DumpResult<T> = Result<T, DumpError>;
