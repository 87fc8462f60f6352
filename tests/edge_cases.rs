//! Edge-case tests: malformed and adversarial exports through the public API.

use allocheck::{
    Action, Error, FidelityPositions, SourceFormat, SymbolResolver, TargetPolicy, ThesisIndex,
    normalize_positions,
};

const HEADER: &str = "Symbol,Quantity,Last,$ Chg,% Chg,Bid,Ask,Volume,$ Avg Cost,$ Day G/L,\
% Day G/L,$ Total G/L,% Total G/L,Value";

fn policy() -> TargetPolicy {
    TargetPolicy::from_json(
        r#"{
        "alias_map": { "BRK/B": "BRK.B" },
        "buckets": {
            "Core": { "target_total_pct": [50, 70], "positions": { "VTI": [40, 60] } },
            "Value": { "target_total_pct": [0, 50], "positions": { "BRK.B": [30, 50] } }
        },
        "hard_caps": { "single_position_pct": 100 }
    }"#,
    )
    .unwrap()
}

fn extract(text: &str) -> Vec<allocheck::RawRow> {
    FidelityPositions::new().extract(text).unwrap()
}

// ============================================================================
// Extraction boundaries
// ============================================================================

#[test]
fn blank_lines_before_footer_do_not_stop_extraction() {
    let text = format!("{HEADER}\nVTI,1,100\n\n\nSCHD,1,50\n\nTotals,,,\nAAPL,1,1\n");
    let rows = extract(&text);
    let symbols: Vec<&str> = rows.iter().map(|r| r.field("Symbol").unwrap()).collect();
    assert_eq!(symbols, ["VTI", "SCHD"]);
}

#[test]
fn each_footer_prefix_terminates() {
    for footer in allocheck::extract::fidelity::FOOTER_PREFIXES {
        let text = format!("{HEADER}\nVTI,1,100\n{footer} trailing text\nSCHD,1,50\n");
        assert_eq!(extract(&text).len(), 1, "footer {footer:?}");
    }
}

#[test]
fn header_only_export_has_no_rows() {
    assert!(extract(HEADER).is_empty());
}

#[test]
fn byte_order_mark_before_header() {
    let text = format!("\u{feff}{HEADER}\nVTI,1,100\n");
    assert_eq!(extract(&text).len(), 1);
}

#[test]
fn crlf_line_endings() {
    let text = format!("{HEADER}\r\nVTI,2,100,,,,,,,,,,,200\r\nTotals\r\n");
    let rows = extract(&text);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field("Value"), Some("200"));
}

#[test]
fn missing_header_names_the_token() {
    let err = FidelityPositions::new()
        .extract("Account Name,Value\nIRA,100\n")
        .unwrap_err();
    assert!(err.to_string().contains("Symbol,"));
}

// ============================================================================
// Normalization tolerance
// ============================================================================

#[test]
fn garbage_numbers_degrade_to_defaults() {
    let text = format!("{HEADER}\nVTI,abc,100,,,,,,,,,,,n/a\nSCHD,2,50,,,,,,,,,,,--\n");
    let rows = extract(&text);
    let positions = normalize_positions(&rows, &SymbolResolver::default());
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].quantity, 0.0);
    assert_eq!(positions[0].value, 0.0);
    assert!((positions[1].value - 100.0).abs() < 1e-9);
}

#[test]
fn blank_symbol_rows_are_dropped() {
    let text = format!("{HEADER}\n  ,1,100\n,2,50\nVTI,1,100\n");
    let rows = extract(&text);
    assert_eq!(rows.len(), 3);
    let positions = normalize_positions(&rows, &SymbolResolver::default());
    assert_eq!(positions.len(), 1);
}

#[test]
fn cash_detection_is_case_insensitive() {
    let text = format!("{HEADER}\nCore Cash Fund,,,,,,,,,,,,,500\nFDRXX**,,,,,,,,,,,,,500\n");
    let rows = extract(&text);
    let policy = TargetPolicy::from_json(r#"{ "cash_symbols": ["FDRXX**"], "buckets": {} }"#).unwrap();
    let positions = normalize_positions(&rows, &SymbolResolver::from_policy(&policy));
    assert!(positions.iter().all(|p| p.symbol == "CASH"));
}

#[test]
fn alias_resolves_before_bucket_lookup() {
    let text = format!("{HEADER}\nBRK/B,1,,,,,,,,,,,,400\nVTI,1,,,,,,,,,,,,600\n");
    let recon =
        allocheck::reconcile_export(&text, &FidelityPositions::new(), &policy(), &ThesisIndex::empty())
            .unwrap();
    let brk = recon.row("BRK.B").unwrap();
    assert_eq!(brk.position.bucket, "Value");
    assert_eq!(brk.action, Action::Hold);
}

// ============================================================================
// Reconciliation failures
// ============================================================================

#[test]
fn all_zero_values_is_zero_portfolio() {
    let text = format!("{HEADER}\nVTI,,,,,,,,,,,,,--\nSCHD,0,0\n");
    let err =
        allocheck::build_report(&text, &FidelityPositions::new(), &policy(), &ThesisIndex::empty())
            .unwrap_err();
    assert!(matches!(err, Error::ZeroPortfolio { .. }));
    assert!(err.to_string().contains("must be > 0"));
}

#[test]
fn negative_total_is_zero_portfolio() {
    let text = format!("{HEADER}\nVTI,,,,,,,,,,,,,-500\n");
    let err =
        allocheck::build_report(&text, &FidelityPositions::new(), &policy(), &ThesisIndex::empty())
            .unwrap_err();
    assert!(matches!(err, Error::ZeroPortfolio { .. }));
}

#[test]
fn empty_export_is_zero_portfolio() {
    let err =
        allocheck::build_report(HEADER, &FidelityPositions::new(), &policy(), &ThesisIndex::empty())
            .unwrap_err();
    assert!(matches!(err, Error::ZeroPortfolio { .. }));
}

#[test]
fn overflowing_quantity_times_last_never_reaches_report() {
    let policy = TargetPolicy::from_json(r#"{ "buckets": {} }"#).unwrap();
    let md = allocheck::build_report(
        "Symbol,Quantity,Last\nBIG,1e200,1e200\nVTI,1,100\n",
        &FidelityPositions::new(),
        &policy,
        &ThesisIndex::empty(),
    )
    .unwrap();
    assert!(!md.contains("NaN"));
    assert!(!md.contains("inf%"));
    assert!(md.contains("| VTI | Unassigned | 100.00% | — | TRIM (concentration) |"));
    assert!(md.contains("| BIG | Unassigned | 0.00% | — | REVIEW (not in targets) |"));
}

#[test]
fn infinite_total_is_zero_portfolio() {
    let text = format!("{HEADER}\nVTI,,,,,,,,,,,,,1e308\nSCHD,,,,,,,,,,,,,1e308\n");
    let err =
        allocheck::build_report(&text, &FidelityPositions::new(), &policy(), &ThesisIndex::empty())
            .unwrap_err();
    assert!(matches!(err, Error::ZeroPortfolio { total } if total.is_infinite()));
}

#[test]
fn symbol_in_two_buckets_is_policy_error() {
    let err = TargetPolicy::from_json(
        r#"{ "buckets": {
            "A": { "target_total_pct": [0, 50], "positions": { "VTI": [0, 50] } },
            "B": { "target_total_pct": [0, 50], "positions": { "VTI": [0, 50] } }
        } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Policy(_)));
}

#[test]
fn untargeted_symbol_is_review() {
    let text = format!("{HEADER}\nVTI,1,,,,,,,,,,,,900\nNEW,1,,,,,,,,,,,,100\n");
    let recon =
        allocheck::reconcile_export(&text, &FidelityPositions::new(), &policy(), &ThesisIndex::empty())
            .unwrap();
    let row = recon.row("NEW").unwrap();
    assert_eq!(row.position.bucket, "Unassigned");
    assert_eq!(row.action, Action::Review);
    assert!(row.target.is_none());
}
