// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

pub mod dates;
pub mod renamer;
pub mod words;

use crate::error::ObfuscateError;
use std::fmt;
use std::str::FromStr;

pub use dates::{CalendarDate, DateFormat, rewrite_dates, rewrite_dates_with, try_parse_date};
pub use renamer::{ROOT_TAG, rename_structure, rename_structure_with, rename_tree};
pub use words::{FormatChooser, RandomSource, WordSource};

/// The two obfuscations offered on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    JsonToXml,
    DateObfuscation,
}

impl TransformKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransformKind::JsonToXml => "json_to_xml",
            TransformKind::DateObfuscation => "date_obfuscation",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = ObfuscateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json_to_xml" => Ok(TransformKind::JsonToXml),
            "date_obfuscation" => Ok(TransformKind::DateObfuscation),
            other => Err(ObfuscateError::UnsupportedFormat(format!(
                "transformation type: {other}"
            ))),
        }
    }
}

/// Build the randomness for one job, seeded when the user asked for a
/// repeatable run.
pub fn create_random_source(seed: Option<u64>) -> RandomSource {
    match seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    }
}
