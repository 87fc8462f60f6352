//! Target allocation policy: JSON loading, validation, and flattening.
//!
//! The policy file is hierarchical (buckets own symbols). Reconciliation
//! needs flat lookups instead, so [`PolicyTables::resolve`] inverts it once
//! into immutable tables that are passed explicitly down the pipeline.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{Position, TargetRange, UNASSIGNED_BUCKET};

/// A target allocation policy as written in the policy JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetPolicy {
    #[serde(default = "default_strategy_name")]
    pub strategy_name: String,
    /// Raw export symbol → canonical symbol
    #[serde(default)]
    pub alias_map: BTreeMap<String, String>,
    /// Raw symbols always treated as cash
    #[serde(default)]
    pub cash_symbols: BTreeSet<String>,
    #[serde(default)]
    pub hard_caps: HardCaps,
    pub buckets: BTreeMap<String, BucketPolicy>,
    #[serde(default)]
    pub bucket_roles: BucketRoles,
}

fn default_strategy_name() -> String {
    "Strategy".into()
}

/// One bucket: its total band and the symbols it owns.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketPolicy {
    pub target_total_pct: TargetRange,
    #[serde(default)]
    pub positions: BTreeMap<String, TargetRange>,
}

/// Absolute ceilings, in percent of total portfolio value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HardCaps {
    #[serde(default = "default_single_position")]
    pub single_position_pct: f64,
    #[serde(default = "default_speculation_bucket")]
    pub speculation_bucket_pct: f64,
}

fn default_single_position() -> f64 {
    12.0
}
fn default_speculation_bucket() -> f64 {
    10.0
}

impl Default for HardCaps {
    fn default() -> Self {
        Self {
            single_position_pct: default_single_position(),
            speculation_bucket_pct: default_speculation_bucket(),
        }
    }
}

/// Which bucket names carry special meaning.
///
/// Defaults reproduce the conventional `Core` / `Cash` / `Speculation`
/// names, so a policy only needs this section when it renames buckets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BucketRoles {
    #[serde(default = "default_core")]
    pub core: String,
    #[serde(default = "default_cash")]
    pub cash: String,
    #[serde(default = "default_speculation")]
    pub speculation: String,
    /// Buckets excluded from thesis coverage; `[core, cash]` when omitted.
    #[serde(default)]
    pub thesis_exempt: Option<Vec<String>>,
}

fn default_core() -> String {
    "Core".into()
}
fn default_cash() -> String {
    "Cash".into()
}
fn default_speculation() -> String {
    "Speculation".into()
}

impl Default for BucketRoles {
    fn default() -> Self {
        Self {
            core: default_core(),
            cash: default_cash(),
            speculation: default_speculation(),
            thesis_exempt: None,
        }
    }
}

impl BucketRoles {
    /// True if positions in `bucket` need no thesis.
    pub fn is_thesis_exempt(&self, bucket: &str) -> bool {
        match &self.thesis_exempt {
            Some(list) => list.iter().any(|b| b == bucket),
            None => bucket == self.core || bucket == self.cash,
        }
    }
}

impl TargetPolicy {
    /// Load and validate a policy JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::PolicyRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: TargetPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> Result<()> {
        let caps = [
            ("single_position_pct", self.hard_caps.single_position_pct),
            ("speculation_bucket_pct", self.hard_caps.speculation_bucket_pct),
        ];
        for (name, cap) in caps {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(Error::Policy(format!("hard cap {name} must be > 0, got {cap}")));
            }
        }

        let mut owner: FxHashMap<&str, &str> = FxHashMap::default();
        for (bucket_name, bucket) in &self.buckets {
            check_range(&format!("bucket {bucket_name}"), bucket.target_total_pct)?;
            for (symbol, range) in &bucket.positions {
                check_range(&format!("{symbol} in bucket {bucket_name}"), *range)?;
                if let Some(prev) = owner.insert(symbol, bucket_name) {
                    return Err(Error::Policy(format!(
                        "symbol {symbol} listed in both {prev} and {bucket_name}"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn check_range(what: &str, range: TargetRange) -> Result<()> {
    if !range.low.is_finite() || !range.high.is_finite() {
        return Err(Error::Policy(format!("target range for {what} is not finite")));
    }
    if range.low < 0.0 || range.low > range.high {
        return Err(Error::Policy(format!(
            "target range for {what} must satisfy 0 <= low <= high, got [{}, {}]",
            range.low, range.high
        )));
    }
    Ok(())
}

/// Flat, read-only lookups derived from a [`TargetPolicy`].
#[derive(Debug, Clone)]
pub struct PolicyTables {
    pub strategy_name: String,
    symbol_ranges: FxHashMap<String, TargetRange>,
    bucket_ranges: FxHashMap<String, TargetRange>,
    symbol_buckets: FxHashMap<String, String>,
    /// Bucket → member symbols, sorted
    bucket_members: FxHashMap<String, Vec<String>>,
    pub caps: HardCaps,
    pub roles: BucketRoles,
}

impl PolicyTables {
    /// Flatten the policy hierarchy.
    pub fn resolve(policy: &TargetPolicy) -> Self {
        let mut symbol_ranges = FxHashMap::default();
        let mut bucket_ranges = FxHashMap::default();
        let mut symbol_buckets = FxHashMap::default();
        let mut bucket_members = FxHashMap::default();

        for (bucket_name, bucket) in &policy.buckets {
            bucket_ranges.insert(bucket_name.clone(), bucket.target_total_pct);
            for (symbol, range) in &bucket.positions {
                symbol_ranges.insert(symbol.clone(), *range);
                symbol_buckets.insert(symbol.clone(), bucket_name.clone());
            }
            bucket_members.insert(
                bucket_name.clone(),
                bucket.positions.keys().cloned().collect(),
            );
        }

        debug!(
            "resolved policy '{}': {} buckets, {} targeted symbols",
            policy.strategy_name,
            bucket_ranges.len(),
            symbol_ranges.len()
        );

        Self {
            strategy_name: policy.strategy_name.clone(),
            symbol_ranges,
            bucket_ranges,
            symbol_buckets,
            bucket_members,
            caps: policy.hard_caps,
            roles: policy.bucket_roles.clone(),
        }
    }

    /// Target band for a canonical symbol, if any bucket lists it.
    pub fn symbol_range(&self, symbol: &str) -> Option<TargetRange> {
        self.symbol_ranges.get(symbol).copied()
    }

    /// Target band for a bucket's total.
    pub fn bucket_range(&self, bucket: &str) -> Option<TargetRange> {
        self.bucket_ranges.get(bucket).copied()
    }

    /// Bucket that owns `symbol`, or [`UNASSIGNED_BUCKET`].
    pub fn bucket_of(&self, symbol: &str) -> &str {
        self.symbol_buckets
            .get(symbol)
            .map(String::as_str)
            .unwrap_or(UNASSIGNED_BUCKET)
    }

    /// Symbols configured in `bucket`.
    pub fn members(&self, bucket: &str) -> &[String] {
        self.bucket_members
            .get(bucket)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Set each position's bucket from the symbol assignment table.
    pub fn assign_buckets(&self, positions: &mut [Position]) {
        for p in positions.iter_mut() {
            p.bucket = self.bucket_of(&p.symbol).to_string();
            if p.bucket == UNASSIGNED_BUCKET {
                warn!("{} is not listed in any policy bucket", p.symbol);
            }
        }
    }
}
