//! Raw rows → typed positions.
//!
//! Numeric cells are parsed tolerantly: a malformed cell never aborts the
//! run, it just becomes absent and the defaulting rules take over.

use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::policy::TargetPolicy;
use crate::types::{CASH_SYMBOL, Column, Position, RawRow};

/// Maps raw export symbols to canonical ones.
#[derive(Debug, Clone, Default)]
pub struct SymbolResolver {
    aliases: FxHashMap<String, String>,
    cash_symbols: FxHashSet<String>,
}

impl SymbolResolver {
    pub fn new<A, C>(aliases: A, cash_symbols: C) -> Self
    where
        A: IntoIterator<Item = (String, String)>,
        C: IntoIterator<Item = String>,
    {
        Self {
            aliases: aliases.into_iter().collect(),
            cash_symbols: cash_symbols
                .into_iter()
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }

    pub fn from_policy(policy: &TargetPolicy) -> Self {
        Self::new(
            policy.alias_map.clone(),
            policy.cash_symbols.iter().cloned(),
        )
    }

    /// Canonical symbol for a trimmed raw symbol.
    ///
    /// Aliases apply first; cash detection then overrides, matching either
    /// the configured set or any symbol containing "cash".
    pub fn canonical(&self, raw: &str) -> String {
        if self.cash_symbols.contains(raw) || raw.to_lowercase().contains("cash") {
            return CASH_SYMBOL.to_string();
        }
        self.aliases
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }
}

/// Parse a decorated numeric cell such as `$1,234.50`, `-3.2%`, or `--`.
///
/// Returns `None` for empty, placeholder, unparseable, or non-finite input.
pub fn parse_amount(cell: &str) -> Option<f64> {
    let s = cell.trim();
    if s.is_empty() || s == "--" {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | '%' | ',')).collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert raw rows to positions, dropping rows with a blank symbol.
///
/// Every position comes back in [`crate::types::UNASSIGNED_BUCKET`];
/// bucket assignment belongs to the policy tables.
pub fn normalize_positions(rows: &[RawRow], resolver: &SymbolResolver) -> Vec<Position> {
    let mut positions = Vec::with_capacity(rows.len());

    for row in rows {
        let raw_symbol = row.get(Column::Symbol).trim();
        if raw_symbol.is_empty() {
            continue;
        }

        let symbol = resolver.canonical(raw_symbol);
        let quantity = tolerant(row, Column::Quantity, raw_symbol).unwrap_or(0.0);
        let last_price = tolerant(row, Column::Last, raw_symbol).unwrap_or(0.0);
        let value = tolerant(row, Column::Value, raw_symbol)
            .unwrap_or_else(|| implied_value(quantity, last_price, raw_symbol));

        positions.push(Position::new(symbol, quantity, last_price, value));
    }

    debug!(
        "normalized {} positions from {} rows",
        positions.len(),
        rows.len()
    );
    positions
}

/// `quantity × last_price`, or `0.0` if the product overflows.
fn implied_value(quantity: f64, last_price: f64, symbol: &str) -> f64 {
    let value = quantity * last_price;
    if value.is_finite() {
        value
    } else {
        warn!("{symbol}: quantity × last overflows, treating value as 0");
        0.0
    }
}

/// Parse a cell, logging when a non-empty cell had to be discarded.
fn tolerant(row: &RawRow, column: Column, symbol: &str) -> Option<f64> {
    let cell = row.get(column);
    let parsed = parse_amount(cell);
    if parsed.is_none() && !matches!(cell.trim(), "" | "--") {
        warn!(
            "{symbol}: unparseable {} cell {cell:?}, treating as absent",
            column.header()
        );
    }
    parsed
}
