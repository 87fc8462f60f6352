//! Reconciliation engine: actual weights vs target policy.
//!
//! Runs once over the full holding set and produces everything the report
//! shows: per-position weights and actions, bucket statuses, the
//! speculation alert, thesis coverage, and the priority list.

use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::policy::PolicyTables;
use crate::thesis::ThesisIndex;
use crate::types::{EPSILON, Position, TargetRange};

/// One position with its actual weight and (optional) target band.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationRow {
    #[serde(flatten)]
    pub position: Position,
    pub actual_pct: f64,
    pub target: Option<TargetRange>,
    pub action: Action,
}

/// Bucket status against its target band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BucketStatus {
    Ok,
    Under,
    Over,
    /// The bucket has no configured target.
    Untargeted,
}

impl BucketStatus {
    pub fn classify(actual_pct: f64, target: Option<TargetRange>) -> Self {
        match target {
            None => BucketStatus::Untargeted,
            Some(r) if r.is_below(actual_pct) => BucketStatus::Under,
            Some(r) if r.is_above(actual_pct) => BucketStatus::Over,
            Some(_) => BucketStatus::Ok,
        }
    }
}

impl fmt::Display for BucketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketStatus::Ok => write!(f, "OK"),
            BucketStatus::Under => write!(f, "UNDER"),
            BucketStatus::Over => write!(f, "OVER"),
            BucketStatus::Untargeted => write!(f, "—"),
        }
    }
}

/// Aggregate for one bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BucketSummary {
    pub name: String,
    pub value: f64,
    pub actual_pct: f64,
    pub target: Option<TargetRange>,
    pub status: BucketStatus,
}

/// Recommended action for a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    TrimConcentration,
    Review,
    Add,
    Trim,
    Hold,
}

impl Action {
    /// Decide the action for one position; the first matching rule wins.
    ///
    /// The hard cap is checked before the target band, so an extreme
    /// overweight is never reported as an ordinary trim.
    pub fn decide(actual_pct: f64, target: Option<TargetRange>, single_cap_pct: f64) -> Self {
        if actual_pct > single_cap_pct + EPSILON {
            return Action::TrimConcentration;
        }
        match target {
            None => Action::Review,
            Some(r) if r.is_below(actual_pct) => Action::Add,
            Some(r) if r.is_above(actual_pct) => Action::Trim,
            Some(_) => Action::Hold,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::TrimConcentration => write!(f, "TRIM (concentration)"),
            Action::Review => write!(f, "REVIEW (not in targets)"),
            Action::Add => write!(f, "ADD"),
            Action::Trim => write!(f, "TRIM"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// Raised when the speculation bucket is above its cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeculationAlert {
    pub bucket: String,
    pub actual_pct: f64,
    pub cap_pct: f64,
}

/// Thesis coverage for one non-exempt position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThesisEntry {
    pub symbol: String,
    pub bucket: String,
    pub covered: bool,
}

/// One entry of the "what to do first" list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Priority {
    BuildCore {
        bucket: String,
        actual_pct: f64,
        target: TargetRange,
        symbols: Vec<String>,
    },
    ReduceConcentration {
        symbol: String,
        actual_pct: f64,
        cap_pct: f64,
    },
    ConsiderTrim {
        symbol: String,
        actual_pct: f64,
        target: TargetRange,
    },
    CandidateAdd {
        symbol: String,
        actual_pct: f64,
        target: TargetRange,
    },
    WithinTargets,
}

/// Full result of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub strategy_name: String,
    pub total_value: f64,
    /// Positions in source order
    pub rows: Vec<ReconciliationRow>,
    /// Buckets, highest actual weight first
    pub buckets: Vec<BucketSummary>,
    pub speculation_alert: Option<SpeculationAlert>,
    /// Non-exempt positions in source order
    pub thesis: Vec<ThesisEntry>,
    /// Uncovered symbols, sorted and deduplicated
    pub missing_thesis: Vec<String>,
    pub priorities: Vec<Priority>,
}

impl Reconciliation {
    /// Rows ordered by descending actual weight (ties keep source order).
    pub fn rows_by_weight(&self) -> Vec<&ReconciliationRow> {
        let mut rows: Vec<&ReconciliationRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.actual_pct.total_cmp(&a.actual_pct));
        rows
    }

    pub fn bucket(&self, name: &str) -> Option<&BucketSummary> {
        self.buckets.iter().find(|b| b.name == name)
    }

    pub fn row(&self, symbol: &str) -> Option<&ReconciliationRow> {
        self.rows.iter().find(|r| r.position.symbol == symbol)
    }
}

/// Reconcile bucket-assigned positions against the policy tables.
///
/// Fails with [`Error::ZeroPortfolio`] when the total value is not a
/// strictly positive finite number, since no weight is defined in that case.
pub fn reconcile(
    positions: &[Position],
    tables: &PolicyTables,
    thesis: &ThesisIndex,
) -> Result<Reconciliation> {
    let total: f64 = positions.iter().map(|p| p.value).sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(Error::ZeroPortfolio { total });
    }

    let single_cap = tables.caps.single_position_pct;

    // 1. Per-position weights and actions
    let rows: Vec<ReconciliationRow> = positions
        .iter()
        .map(|p| {
            let actual_pct = p.value / total * 100.0;
            let target = tables.symbol_range(&p.symbol);
            ReconciliationRow {
                position: p.clone(),
                actual_pct,
                target,
                action: Action::decide(actual_pct, target, single_cap),
            }
        })
        .collect();

    // 2. Bucket totals, in first-appearance order before sorting
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut bucket_values: Vec<(&str, f64)> = Vec::new();
    for p in positions {
        match index.get(p.bucket.as_str()) {
            Some(&i) => bucket_values[i].1 += p.value,
            None => {
                index.insert(p.bucket.as_str(), bucket_values.len());
                bucket_values.push((p.bucket.as_str(), p.value));
            }
        }
    }

    let mut buckets: Vec<BucketSummary> = bucket_values
        .into_iter()
        .map(|(name, value)| {
            let actual_pct = value / total * 100.0;
            let target = tables.bucket_range(name);
            BucketSummary {
                name: name.to_string(),
                value,
                actual_pct,
                target,
                status: BucketStatus::classify(actual_pct, target),
            }
        })
        .collect();
    buckets.sort_by(|a, b| b.actual_pct.total_cmp(&a.actual_pct));

    // 3. Speculation cap
    let spec_cap = tables.caps.speculation_bucket_pct;
    let speculation_alert = buckets
        .iter()
        .find(|b| b.name == tables.roles.speculation)
        .filter(|b| b.actual_pct > spec_cap + EPSILON)
        .map(|b| SpeculationAlert {
            bucket: b.name.clone(),
            actual_pct: b.actual_pct,
            cap_pct: spec_cap,
        });

    // 4. Thesis coverage
    let thesis_entries: Vec<ThesisEntry> = rows
        .iter()
        .map(|r| &r.position)
        .filter(|p| !tables.roles.is_thesis_exempt(&p.bucket))
        .map(|p| ThesisEntry {
            symbol: p.symbol.clone(),
            bucket: p.bucket.clone(),
            covered: thesis.contains(&p.symbol),
        })
        .collect();

    let mut missing_thesis: Vec<String> = thesis_entries
        .iter()
        .filter(|e| !e.covered)
        .map(|e| e.symbol.clone())
        .collect();
    missing_thesis.sort();
    missing_thesis.dedup();

    let mut result = Reconciliation {
        strategy_name: tables.strategy_name.clone(),
        total_value: total,
        rows,
        buckets,
        speculation_alert,
        thesis: thesis_entries,
        missing_thesis,
        priorities: Vec::new(),
    };
    result.priorities = prioritize(&result, tables);

    debug!(
        "reconciled {} positions into {} buckets, {} priorities",
        result.rows.len(),
        result.buckets.len(),
        result.priorities.len()
    );
    Ok(result)
}

/// Build the priority list in fixed category order.
///
/// Categories are independent: one symbol may appear under more than one.
fn prioritize(recon: &Reconciliation, tables: &PolicyTables) -> Vec<Priority> {
    let mut priorities = Vec::new();
    let single_cap = tables.caps.single_position_pct;
    let core = &tables.roles.core;

    if let Some(target) = tables.bucket_range(core) {
        let actual_pct = recon.bucket(core).map_or(0.0, |b| b.actual_pct);
        if target.is_below(actual_pct) {
            priorities.push(Priority::BuildCore {
                bucket: core.clone(),
                actual_pct,
                target,
                symbols: tables.members(core).to_vec(),
            });
        }
    }

    let by_weight = recon.rows_by_weight();

    for r in &by_weight {
        if r.actual_pct > single_cap + EPSILON {
            priorities.push(Priority::ReduceConcentration {
                symbol: r.position.symbol.clone(),
                actual_pct: r.actual_pct,
                cap_pct: single_cap,
            });
        }
    }

    // Over band but under the cap; the cap case was handled above
    for r in &by_weight {
        let Some(target) = r.target else { continue };
        if target.is_above(r.actual_pct) && r.actual_pct <= single_cap + EPSILON {
            priorities.push(Priority::ConsiderTrim {
                symbol: r.position.symbol.clone(),
                actual_pct: r.actual_pct,
                target,
            });
        }
    }

    for r in &by_weight {
        let Some(target) = r.target else { continue };
        if target.is_below(r.actual_pct) {
            priorities.push(Priority::CandidateAdd {
                symbol: r.position.symbol.clone(),
                actual_pct: r.actual_pct,
                target,
            });
        }
    }

    if priorities.is_empty() {
        priorities.push(Priority::WithinTargets);
    }
    priorities
}
