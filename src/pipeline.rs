// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! One obfuscation run: load the input once, transform it in memory and
//! persist the result once.  Output goes through a temporary file in the
//! destination directory and is only renamed into place after everything
//! else succeeded, so a failed run never leaves a half-written file.

use crate::error::{ObfuscateError, Result};
use crate::obfuscate::{
    FormatChooser, TransformKind, WordSource, rename_structure_with, rewrite_dates_with,
};
use crate::tree::{Node, Walker, parse_json, parse_markup, write_json, write_markup};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Input flavour, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Xml,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(SourceFormat::Json),
            Some("xml") => Ok(SourceFormat::Xml),
            _ => Err(ObfuscateError::UnsupportedFormat(format!(
                "file type for {} (only .json and .xml are supported)",
                path.display()
            ))),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::Json => "json",
            SourceFormat::Xml => "xml",
        })
    }
}

pub struct Job {
    input: PathBuf,
    output: PathBuf,
    kind: TransformKind,
    walker: Walker,
}

impl Job {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, kind: TransformKind) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            kind,
            walker: Walker::default(),
        }
    }

    pub fn with_walker(mut self, walker: Walker) -> Self {
        self.walker = walker;
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Load, transform and save.  Any failure aborts the whole job.
    pub fn run<S>(&self, source: &mut S) -> Result<()>
    where
        S: WordSource + FormatChooser + ?Sized,
    {
        let (format, tree) = self.load()?;
        let rendered = self.transform(format, &tree, source)?;
        self.save(&rendered)
    }

    /// Read and parse the input.  The extension picks the parser; a missing
    /// file is reported before the extension is looked at.
    pub fn load(&self) -> Result<(SourceFormat, Node)> {
        if !self.input.exists() {
            return Err(ObfuscateError::InputNotFound {
                path: self.input.clone(),
            });
        }
        let format = SourceFormat::from_path(&self.input)?;
        let text =
            fs::read_to_string(&self.input).map_err(|err| ObfuscateError::io(&self.input, err))?;
        let tree = match format {
            SourceFormat::Json => parse_json(&text, &self.input)?,
            SourceFormat::Xml => parse_markup(&text, &self.input, self.walker.max_depth())?,
        };
        debug!(
            path = %self.input.display(),
            %format,
            root = tree.kind(),
            "loaded input"
        );
        Ok((format, tree))
    }

    /// Run the selected obfuscation and render it in the output format.
    pub fn transform<S>(&self, format: SourceFormat, tree: &Node, source: &mut S) -> Result<String>
    where
        S: WordSource + FormatChooser + ?Sized,
    {
        debug!(kind = %self.kind, "transforming");
        match self.kind {
            TransformKind::JsonToXml => rename_structure_with(tree, source, &self.walker),
            TransformKind::DateObfuscation => {
                let rewritten = rewrite_dates_with(tree, source, &self.walker)?;
                match format {
                    SourceFormat::Json => write_json(&rewritten, &self.walker),
                    SourceFormat::Xml => write_markup(&rewritten, self.walker.max_depth()),
                }
            }
        }
    }

    /// Stage `contents` next to the destination and rename it into place.
    pub fn save(&self, contents: &str) -> Result<()> {
        let dir = self
            .output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut staged =
            NamedTempFile::new_in(dir).map_err(|err| ObfuscateError::io(&self.output, err))?;
        staged
            .write_all(contents.as_bytes())
            .map_err(|err| ObfuscateError::io(&self.output, err))?;
        staged
            .persist(&self.output)
            .map_err(|err| ObfuscateError::io(&self.output, err.error))?;
        info!(path = %self.output.display(), "data saved");
        Ok(())
    }
}
