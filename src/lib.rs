//! # allocheck
//!
//! Reconcile a brokerage positions export against a target allocation policy
//! and produce a markdown decision report.
//!
//! ## Pipeline
//!
//! | Stage | Module | Input → Output |
//! |-------|--------|----------------|
//! | Extract | [`extract`] | export text → [`RawRow`]s |
//! | Normalize | [`normalize`] | [`RawRow`]s → [`Position`]s |
//! | Resolve | [`policy`] | [`TargetPolicy`] → [`PolicyTables`] |
//! | Reconcile | [`reconcile`] | positions + tables + thesis → [`Reconciliation`] |
//! | Render | [`report`] | [`Reconciliation`] → markdown |
//!
//! The whole pipeline is a pure function of its inputs: the same export,
//! policy, and thesis index always render to byte-identical markdown.
//!
//! ## Quick Start
//!
//! ```
//! use allocheck::{FidelityPositions, TargetPolicy, ThesisIndex};
//!
//! let export = "Positions\n\
//!               Symbol,Quantity,Last,$ Chg,% Chg,Bid,Ask,Volume,$ Avg Cost,$ Day G/L,% Day G/L,$ Total G/L,% Total G/L,Value\n\
//!               VTI,20,300.00,,,,,,,,,,,\"$6,000.00\"\n\
//!               NVDA,10,100.00,,,,,,,,,,,--\n\
//!               SPAXX**,,,,,,,,,,,,,\"$3,000.00\"\n\
//!               Totals,,,\n";
//!
//! let policy = TargetPolicy::from_json(r#"{
//!     "strategy_name": "Demo",
//!     "cash_symbols": ["SPAXX**"],
//!     "buckets": {
//!         "Core": { "target_total_pct": [50, 70], "positions": { "VTI": [50, 70] } },
//!         "Cash": { "target_total_pct": [0, 40], "positions": { "CASH": [0, 40] } }
//!     },
//!     "hard_caps": { "single_position_pct": 65 }
//! }"#).unwrap();
//!
//! let report = allocheck::build_report(
//!     export,
//!     &FidelityPositions::new(),
//!     &policy,
//!     &ThesisIndex::empty(),
//! ).unwrap();
//!
//! assert!(report.starts_with("# Portfolio Report — Demo"));
//! assert!(report.contains("**Total portfolio value:** $10,000.00"));
//! assert!(report.contains("| NVDA | Unassigned | 10.00% | — | REVIEW (not in targets) |"));
//! ```

pub mod error;
pub mod extract;
pub mod normalize;
pub mod policy;
pub mod reconcile;
pub mod report;
pub mod thesis;
pub mod types;

pub use error::{Error, Result};
pub use extract::{FidelityPositions, SourceFormat, source_format};
pub use normalize::{SymbolResolver, normalize_positions, parse_amount};
pub use policy::{BucketRoles, HardCaps, PolicyTables, TargetPolicy};
pub use reconcile::{
    Action, BucketStatus, Priority, Reconciliation, ReconciliationRow, reconcile,
};
pub use report::{MarkdownReport, render};
pub use thesis::ThesisIndex;
pub use types::{CASH_SYMBOL, Column, Position, RawRow, TargetRange, UNASSIGNED_BUCKET};

/// Extract, normalize, and bucket-assign the holdings in an export.
pub fn load_positions(
    text: &str,
    format: &dyn SourceFormat,
    policy: &TargetPolicy,
) -> Result<(Vec<Position>, PolicyTables)> {
    let rows = format.extract(text)?;
    let resolver = SymbolResolver::from_policy(policy);
    let mut positions = normalize_positions(&rows, &resolver);

    let tables = PolicyTables::resolve(policy);
    tables.assign_buckets(&mut positions);
    Ok((positions, tables))
}

/// Run the pipeline up to (and including) reconciliation.
pub fn reconcile_export(
    text: &str,
    format: &dyn SourceFormat,
    policy: &TargetPolicy,
    thesis: &ThesisIndex,
) -> Result<Reconciliation> {
    let (positions, tables) = load_positions(text, format, policy)?;
    reconcile(&positions, &tables, thesis)
}

/// Run the full pipeline and return the markdown report.
pub fn build_report(
    text: &str,
    format: &dyn SourceFormat,
    policy: &TargetPolicy,
    thesis: &ThesisIndex,
) -> Result<String> {
    let recon = reconcile_export(text, format, policy, thesis)?;
    Ok(render(&recon))
}
