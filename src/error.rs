// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Error taxonomy shared by the loaders, the tree walker and the writers.
//! Every variant is terminal: nothing in the pipeline retries.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObfuscateError {
    #[error("input file not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("unsupported {0}")]
    UnsupportedFormat(String),

    #[error("failed to parse {}: {reason}", .path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("cannot serialise tree: {0}")]
    Serialization(String),

    #[error("tree is deeper than the recursion limit of {limit} levels")]
    RecursionLimitExceeded { limit: usize },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ObfuscateError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ObfuscateError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ObfuscateError::MalformedInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = ObfuscateError> = std::result::Result<T, E>;
