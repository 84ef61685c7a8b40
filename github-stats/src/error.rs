#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the statistics crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Every variant is fatal for a run: the binary prints the display string and
//! exits with a non-zero status. Nothing is retried.

use std::path::{Path, PathBuf};

/// Unified error type returned by the aggregator, the renderers and the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Missing or invalid environment input.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Human readable message describing the configuration problem.
        message: String
    },
    /// The GitHub API rejected a request or returned an unusable payload.
    #[error("remote query failed: {message}")]
    RemoteQuery {
        /// Human readable message describing the failure.
        message: String
    },
    /// A badge template could not be read.
    #[error("failed to read template at {path:?}: {source}")]
    Template {
        /// Location of the template file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// A rendered badge could not be written.
    #[error("failed to write badge at {path:?}: {source}")]
    Output {
        /// Location of the output file or directory.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    }
}

impl Error {
    /// Constructs a configuration error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the configuration failure.
    pub fn configuration<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Configuration {
            message: message.into()
        }
    }

    /// Constructs a remote query error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the failed request.
    pub fn remote<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::RemoteQuery {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<octocrab::Error> for Error {
    fn from(source: octocrab::Error) -> Self {
        Self::RemoteQuery {
            message: source.to_string()
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::RemoteQuery {
            message: format!("unexpected response shape: {source}")
        }
    }
}

/// Creates an [`Error::Template`] variant capturing the failing path and
/// source.
pub fn template_error(path: &Path, source: std::io::Error) -> Error {
    Error::Template {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Output`] variant capturing the failing path and source.
pub fn output_error(path: &Path, source: std::io::Error) -> Error {
    Error::Output {
        path: path.to_path_buf(),
        source
    }
}
