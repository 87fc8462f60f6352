//! Fidelity "Positions" export adapter.
//!
//! The export starts with a title block, then a `Symbol,...` header, the
//! holding lines, and finally a footer of totals and disclosure boilerplate.

use csv::{ReaderBuilder, StringRecord};
use log::debug;

use super::SourceFormat;
use crate::error::{Error, Result};
use crate::types::RawRow;

/// Header token that opens the data region.
pub const HEADER_TOKEN: &str = "Symbol,";

/// Line prefixes that close the data region.
pub const FOOTER_PREFIXES: [&str; 7] = [
    "Totals",
    "Disclosure",
    "The data and information",
    "For more information",
    "Brokerage services",
    "Both are Fidelity",
    "\"Both are Fidelity",
];

/// Adapter for the Fidelity positions CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct FidelityPositions;

impl FidelityPositions {
    pub fn new() -> Self {
        Self
    }
}

impl SourceFormat for FidelityPositions {
    fn name(&self) -> &'static str {
        "fidelity"
    }

    fn extract(&self, text: &str) -> Result<Vec<RawRow>> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.lines().enumerate();

        lines
            .by_ref()
            .find(|(_, line)| line.starts_with(HEADER_TOKEN))
            .ok_or(Error::HeaderNotFound {
                expected: HEADER_TOKEN,
                format: self.name(),
            })?;

        let mut rows = Vec::new();
        for (idx, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            if is_footer(line) {
                debug!("footer reached at line {}", idx + 1);
                break;
            }
            rows.push(parse_line(line, idx + 1)?);
        }

        debug!("extracted {} rows from {} export", rows.len(), self.name());
        Ok(rows)
    }
}

/// Literal prefix match on the raw line; indented text is not a footer.
fn is_footer(line: &str) -> bool {
    FOOTER_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Parse one line with standard CSV quoting, padded to the fixed schema.
fn parse_line(line: &str, line_no: usize) -> Result<RawRow> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    reader
        .read_record(&mut record)
        .map_err(|source| Error::Csv {
            line: line_no,
            source,
        })?;

    Ok(RawRow::from_fields(record.iter()))
}
