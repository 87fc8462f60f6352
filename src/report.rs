//! Markdown rendering of a [`Reconciliation`].
//!
//! Pure formatting: every number shown was computed by the reconciliation
//! engine, so the same result always renders to the same bytes.

use std::fmt;

use crate::reconcile::{Priority, Reconciliation};
use crate::types::{Limit, Pct, TargetRange, Usd};

/// Borrowing wrapper that renders a reconciliation as markdown.
pub struct MarkdownReport<'a> {
    recon: &'a Reconciliation,
}

impl<'a> MarkdownReport<'a> {
    pub fn new(recon: &'a Reconciliation) -> Self {
        Self { recon }
    }
}

/// Render the full markdown report.
pub fn render(recon: &Reconciliation) -> String {
    MarkdownReport::new(recon).to_string()
}

fn target_cell(target: Option<TargetRange>) -> String {
    target.map_or_else(|| "—".to_string(), |t| t.to_string())
}

impl fmt::Display for MarkdownReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.recon;

        writeln!(f, "# Portfolio Report — {}", r.strategy_name)?;
        writeln!(f)?;
        writeln!(f, "**Total portfolio value:** {}", Usd(r.total_value))?;
        writeln!(f)?;

        writeln!(f, "## Bucket summary")?;
        writeln!(f)?;
        writeln!(f, "| Bucket | Actual % | Target % | Status |")?;
        writeln!(f, "|---|---:|---:|---|")?;
        for b in &r.buckets {
            writeln!(
                f,
                "| {} | {} | {} | {} |",
                b.name,
                Pct(b.actual_pct),
                target_cell(b.target),
                b.status
            )?;
        }

        if let Some(alert) = &r.speculation_alert {
            writeln!(f)?;
            writeln!(
                f,
                "**Alert:** {} bucket is {} which is above the cap ({}).",
                alert.bucket,
                Pct(alert.actual_pct),
                Pct(alert.cap_pct)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "## Thesis coverage")?;
        writeln!(f)?;
        writeln!(f, "| Symbol | Bucket | Thesis? |")?;
        writeln!(f, "|---|---|---|")?;
        for e in &r.thesis {
            let mark = if e.covered { "✅" } else { "⚠️ missing" };
            writeln!(f, "| {} | {} | {} |", e.symbol, e.bucket, mark)?;
        }
        if !r.missing_thesis.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "**Add thesis sections for:** {}",
                r.missing_thesis.join(", ")
            )?;
        }

        writeln!(f)?;
        writeln!(f, "## Position actions")?;
        writeln!(f)?;
        writeln!(f, "| Symbol | Bucket | Actual % | Target % | Action |")?;
        writeln!(f, "|---|---|---:|---:|---|")?;
        for row in r.rows_by_weight() {
            writeln!(
                f,
                "| {} | {} | {} | {} | {} |",
                row.position.symbol,
                row.position.bucket,
                Pct(row.actual_pct),
                target_cell(row.target),
                row.action
            )?;
        }

        writeln!(f)?;
        writeln!(f, "## Priority list (what to do first)")?;
        writeln!(f)?;
        for p in &r.priorities {
            writeln!(f, "- {p}")?;
        }

        writeln!(f)?;
        writeln!(f, "## Notes")?;
        writeln!(f)?;
        writeln!(
            f,
            "- This report is decision support, not an instruction to trade. \
             You control execution and timing."
        )
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::BuildCore {
                bucket,
                actual_pct,
                target,
                symbols,
            } => {
                write!(
                    f,
                    "Build **{bucket}**: currently {} vs target {target}. ",
                    Pct(*actual_pct)
                )?;
                if symbols.is_empty() {
                    write!(f, "Route new money and trims primarily to {bucket} holdings.")
                } else {
                    write!(
                        f,
                        "Route new money and trims primarily to {}.",
                        symbols.join("/")
                    )
                }
            }
            Priority::ReduceConcentration {
                symbol,
                actual_pct,
                cap_pct,
            } => write!(
                f,
                "Reduce concentration: **{symbol}** is {} (cap {}).",
                Pct(*actual_pct),
                Limit(*cap_pct)
            ),
            Priority::ConsiderTrim {
                symbol,
                actual_pct,
                target,
            } => write!(
                f,
                "Consider trimming: **{symbol}** is {} vs target {target}.",
                Pct(*actual_pct)
            ),
            Priority::CandidateAdd {
                symbol,
                actual_pct,
                target,
            } => write!(
                f,
                "Candidate to add: **{symbol}** is {} vs target {target}.",
                Pct(*actual_pct)
            ),
            Priority::WithinTargets => write!(
                f,
                "Portfolio is within target ranges. Maintain contributions and review monthly."
            ),
        }
    }
}
