//! Command implementations: read inputs → run the pipeline → emit output.

use std::fs;
use std::path::{Path, PathBuf};

use allocheck::types::{Pct, Usd};
use allocheck::{Reconciliation, TargetPolicy, ThesisIndex, source_format};
use log::info;

use crate::error::{Error, Result};
use crate::settings::Settings;

/// Inputs for a report run. `None` fields fall back to settings.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub csv: PathBuf,
    pub policy: Option<PathBuf>,
    pub thesis: Option<PathBuf>,
    pub out: Option<PathBuf>,
}

/// Read a positions export, replacing invalid UTF-8 rather than failing.
pub fn read_export(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::ExportRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn policy_path(settings: &Settings, flag: Option<&Path>) -> PathBuf {
    flag.map_or_else(|| settings.inputs.policy.clone(), Path::to_path_buf)
}

pub fn thesis_path(settings: &Settings, flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| settings.inputs.thesis.clone())
}

pub fn report_path(settings: &Settings, flag: Option<&Path>) -> PathBuf {
    flag.map_or_else(|| settings.report_path(), Path::to_path_buf)
}

/// Load the thesis index, or an empty one when no thesis source is configured.
pub fn load_thesis(path: Option<&Path>) -> Result<ThesisIndex> {
    match path {
        Some(p) => Ok(ThesisIndex::load(p)?),
        None => Ok(ThesisIndex::empty()),
    }
}

fn reconcile_file(
    settings: &Settings,
    csv: &Path,
    policy: &TargetPolicy,
    thesis: &ThesisIndex,
) -> Result<Reconciliation> {
    let format = source_format(&settings.source.format)?;
    let text = read_export(csv)?;
    info!("Reconciling {} ({} export)", csv.display(), format.name());
    Ok(allocheck::reconcile_export(
        &text,
        format.as_ref(),
        policy,
        thesis,
    )?)
}

/// Full pipeline: write the markdown report and return where it went.
pub fn run_report(settings: &Settings, opts: &ReportOptions) -> Result<PathBuf> {
    let policy_file = policy_path(settings, opts.policy.as_deref());
    info!("Loading policy from {}", policy_file.display());
    let policy = TargetPolicy::load(&policy_file)?;

    let thesis = load_thesis(thesis_path(settings, opts.thesis.as_deref()).as_deref())?;
    info!("Thesis index covers {} symbols", thesis.len());

    let recon = reconcile_file(settings, &opts.csv, &policy, &thesis)?;
    let markdown = allocheck::render(&recon);

    let out = report_path(settings, opts.out.as_deref());
    write_report(&out, &markdown)?;
    info!(
        "Report covers {} positions, {} priorities",
        recon.rows.len(),
        recon.priorities.len()
    );
    Ok(out)
}

/// Confirmation printed once the report is on disk.
pub fn report_written_line(path: &Path) -> String {
    format!("Wrote report to: {}", path.display())
}

/// Write the report, creating parent directories as needed.
pub fn write_report(path: &Path, markdown: &str) -> Result<()> {
    let write_err = |e| Error::ReportWrite {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, markdown).map_err(write_err)
}

/// Print normalized positions with their weights.
pub fn show_positions(
    settings: &Settings,
    csv: &Path,
    policy: Option<&Path>,
    json: bool,
) -> Result<()> {
    let policy = TargetPolicy::load(&policy_path(settings, policy))?;
    let recon = reconcile_file(settings, csv, &policy, &ThesisIndex::empty())?;

    if json {
        println!("{}", positions_json(&recon)?);
        return Ok(());
    }

    print!("{}", positions_table(&recon));
    Ok(())
}

/// Reconciliation rows as pretty-printed JSON, in export order.
pub fn positions_json(recon: &Reconciliation) -> Result<String> {
    Ok(serde_json::to_string_pretty(&recon.rows)?)
}

/// Plain-text positions table, in export order.
pub fn positions_table(recon: &Reconciliation) -> String {
    let mut out = format!("POSITIONS ({}):\n", Usd(recon.total_value));
    out.push_str(&format!(
        "  {:10} {:12} {:>12} {:>10} {:>14} {:>8}\n",
        "Symbol", "Bucket", "Quantity", "Last", "Value", "Weight"
    ));
    for row in &recon.rows {
        let p = &row.position;
        out.push_str(&format!(
            "  {:10} {:12} {:>12.3} {:>10.2} {:>14} {:>8}\n",
            p.symbol,
            p.bucket,
            p.quantity,
            p.last_price,
            Usd(p.value).to_string(),
            Pct(row.actual_pct).to_string(),
        ));
    }
    out
}

/// Validate a policy file and print a summary of it.
pub fn check_policy(settings: &Settings, policy: Option<&Path>) -> Result<()> {
    let path = policy_path(settings, policy);
    let policy = TargetPolicy::load(&path)?;
    print!("{}", policy_summary(&policy));
    Ok(())
}

pub fn policy_summary(policy: &TargetPolicy) -> String {
    let symbols: usize = policy.buckets.values().map(|b| b.positions.len()).sum();
    let mut out = format!("Policy '{}': OK\n", policy.strategy_name);
    out.push_str(&format!(
        "  {} buckets, {} targeted symbols, {} aliases, {} cash symbols\n",
        policy.buckets.len(),
        symbols,
        policy.alias_map.len(),
        policy.cash_symbols.len(),
    ));
    out.push_str(&format!(
        "  hard caps: single position {}, {} bucket {}\n",
        Pct(policy.hard_caps.single_position_pct),
        policy.bucket_roles.speculation,
        Pct(policy.hard_caps.speculation_bucket_pct),
    ));
    for (name, bucket) in &policy.buckets {
        out.push_str(&format!(
            "  {:14} {:>10}  {} symbols\n",
            name,
            bucket.target_total_pct.to_string(),
            bucket.positions.len()
        ));
    }
    out
}
