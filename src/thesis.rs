//! Thesis index: which symbols have a written rationale.
//!
//! A thesis document registers a symbol with a level-2 heading (`## NVDA`).
//! The document is optional; a missing file is an empty index.

use std::io::ErrorKind;
use std::path::Path;

use log::debug;
use rustc_hash::FxHashSet;

use crate::error::{Error, Result};

/// Set of symbols with recorded thesis coverage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThesisIndex {
    symbols: FxHashSet<String>,
}

impl ThesisIndex {
    /// An index with no coverage.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collect every `## <symbol>` heading in `text`.
    pub fn parse(text: &str) -> Self {
        let symbols = text
            .lines()
            .filter_map(|line| line.trim().strip_prefix("## "))
            .map(str::trim)
            .filter(|sym| !sym.is_empty())
            .map(str::to_string)
            .collect();
        Self { symbols }
    }

    /// Read a thesis document; a file that does not exist yields an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let index = Self::parse(&String::from_utf8_lossy(&bytes));
                debug!("thesis index: {} symbols from {}", index.len(), path.display());
                Ok(index)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no thesis file at {}, using empty index", path.display());
                Ok(Self::empty())
            }
            Err(e) => Err(Error::ThesisRead {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ThesisIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().map(Into::into).collect(),
        }
    }
}
