//! Core types: RawRow, Position, TargetRange, and display helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical symbol assigned to every cash-like holding.
pub const CASH_SYMBOL: &str = "CASH";

/// Bucket name for holdings no policy bucket claims.
pub const UNASSIGNED_BUCKET: &str = "Unassigned";

/// Tolerance for every percentage comparison.
pub const EPSILON: f64 = 1e-9;

/// The fixed column schema of a positions export, in source order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Symbol,
    Quantity,
    Last,
    DollarChange,
    PercentChange,
    Bid,
    Ask,
    Volume,
    AvgCost,
    DayGainDollar,
    DayGainPercent,
    TotalGainDollar,
    TotalGainPercent,
    Value,
    Basis,
    DayRange,
    YearRange,
    EarningsDate,
    DividendAmount,
    DividendExDate,
}

impl Column {
    /// Every column, positionally.
    pub const ALL: [Column; 20] = [
        Column::Symbol,
        Column::Quantity,
        Column::Last,
        Column::DollarChange,
        Column::PercentChange,
        Column::Bid,
        Column::Ask,
        Column::Volume,
        Column::AvgCost,
        Column::DayGainDollar,
        Column::DayGainPercent,
        Column::TotalGainDollar,
        Column::TotalGainPercent,
        Column::Value,
        Column::Basis,
        Column::DayRange,
        Column::YearRange,
        Column::EarningsDate,
        Column::DividendAmount,
        Column::DividendExDate,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Header text as it appears in the export.
    pub fn header(self) -> &'static str {
        match self {
            Column::Symbol => "Symbol",
            Column::Quantity => "Quantity",
            Column::Last => "Last",
            Column::DollarChange => "$ Chg",
            Column::PercentChange => "% Chg",
            Column::Bid => "Bid",
            Column::Ask => "Ask",
            Column::Volume => "Volume",
            Column::AvgCost => "$ Avg Cost",
            Column::DayGainDollar => "$ Day G/L",
            Column::DayGainPercent => "% Day G/L",
            Column::TotalGainDollar => "$ Total G/L",
            Column::TotalGainPercent => "% Total G/L",
            Column::Value => "Value",
            Column::Basis => "Basis",
            Column::DayRange => "Day Range",
            Column::YearRange => "52W Range",
            Column::EarningsDate => "Earnings Date",
            Column::DividendAmount => "Div Amt",
            Column::DividendExDate => "Div Ex-Date",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One holding line of raw string fields, exactly [`Column::COUNT`] wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<String>,
}

impl RawRow {
    /// Build a row from positional fields, padding missing trailing columns
    /// with empty strings and dropping any extras.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = fields
            .into_iter()
            .take(Column::COUNT)
            .map(Into::into)
            .collect();
        fields.resize(Column::COUNT, String::new());
        Self { fields }
    }

    /// Field for a known column.
    pub fn get(&self, column: Column) -> &str {
        &self.fields[column.index()]
    }

    /// Field looked up by its header text.
    pub fn field(&self, header: &str) -> Option<&str> {
        Column::ALL
            .iter()
            .find(|c| c.header() == header)
            .map(|c| self.get(*c))
    }
}

/// A normalized holding.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Position {
    /// Canonical symbol, after alias and cash resolution
    pub symbol: String,
    pub quantity: f64,
    pub last_price: f64,
    /// Market value in dollars
    pub value: f64,
    /// Policy bucket; [`UNASSIGNED_BUCKET`] until assigned
    pub bucket: String,
}

impl Position {
    pub fn new(symbol: impl Into<String>, quantity: f64, last_price: f64, value: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            last_price,
            value,
            bucket: UNASSIGNED_BUCKET.to_string(),
        }
    }
}

/// An inclusive `[low, high]` percentage band.
///
/// Deserializes from a two-element JSON array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)")]
pub struct TargetRange {
    pub low: f64,
    pub high: f64,
}

impl TargetRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// True if `pct` is below the band (beyond tolerance).
    pub fn is_below(&self, pct: f64) -> bool {
        pct < self.low - EPSILON
    }

    /// True if `pct` is above the band (beyond tolerance).
    pub fn is_above(&self, pct: f64) -> bool {
        pct > self.high + EPSILON
    }
}

impl From<(f64, f64)> for TargetRange {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl fmt::Display for TargetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}%", Bound(self.low), Bound(self.high))
    }
}

/// Whole-number bounds render without decimals; fractional ones keep them.
struct Bound(f64);

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A configured limit such as a hard cap: `12%`, or `12.5%` when fractional.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limit(pub f64);

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", Bound(self.0))
    }
}

/// A percentage rendered with two decimals, e.g. `12.50%`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pct(pub f64);

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

/// A dollar amount rendered with thousands separators, e.g. `$10,000.00`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Usd(pub f64);

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = format!("{:.2}", self.0.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        if self.0 < 0.0 {
            write!(f, "-${grouped}.{cents}")
        } else {
            write!(f, "${grouped}.{cents}")
        }
    }
}
