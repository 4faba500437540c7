// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Light-weight obfuscation of tree-shaped records.
//!
//! [`tree`] holds the document model, the shared walker and the JSON/XML
//! adapters; [`obfuscate`] holds the two transformations built on the
//! walker; [`pipeline`] runs one load-transform-save job for the CLI.

pub mod error;
pub mod obfuscate;
pub mod pipeline;
pub mod tree;

pub use error::{ObfuscateError, Result};
pub use obfuscate::{TransformKind, rename_structure, rewrite_dates, try_parse_date};
pub use tree::{Node, Scalar};
