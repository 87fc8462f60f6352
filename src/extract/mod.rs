//! Source format adapters: recover holding rows from a noisy export.
//!
//! Every brokerage wraps its positions table in a different preamble and
//! footer. A [`SourceFormat`] hides that behind one call, so the rest of the
//! pipeline only ever sees an ordered list of [`RawRow`]s.
//!
//! # Example
//!
//! ```
//! use allocheck::extract::{FidelityPositions, SourceFormat};
//! use allocheck::types::Column;
//!
//! let text = "Positions as of today\n\
//!             Symbol,Quantity,Last\n\
//!             VTI,10,250.00\n\
//!             \n\
//!             Totals,,\n";
//!
//! let rows = FidelityPositions::new().extract(text).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].get(Column::Symbol), "VTI");
//! ```

pub mod fidelity;

pub use fidelity::FidelityPositions;

use crate::error::{Error, Result};
use crate::types::RawRow;

/// A brokerage export layout.
pub trait SourceFormat {
    /// Short identifier used to select this adapter (e.g. `"fidelity"`).
    fn name(&self) -> &'static str;

    /// Locate the data region in `text` and return its rows in source order.
    fn extract(&self, text: &str) -> Result<Vec<RawRow>>;
}

/// Look up a built-in adapter by name (case-insensitive).
pub fn source_format(name: &str) -> Result<Box<dyn SourceFormat>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "fidelity" => Ok(Box::new(FidelityPositions::new())),
        _ => Err(Error::UnknownFormat(name.to_string())),
    }
}
