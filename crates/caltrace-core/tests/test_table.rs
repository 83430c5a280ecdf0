mod common;

use caltrace_core::error::CaltraceError;
use caltrace_core::table::{export_csv, import_csv, ResultRow, ResultTable, COLUMNS};

fn row(cell_id: u32, frame: usize, intensity: f64, normalized: f64) -> ResultRow {
    ResultRow {
        cell_id,
        frame,
        intensity,
        normalized_intensity: normalized,
    }
}

#[test]
fn test_new_restores_canonical_order() {
    let table = ResultTable::new(vec![
        row(2, 1, 4.0, 0.0),
        row(1, 1, 2.0, 0.0),
        row(2, 0, 3.0, 0.0),
        row(1, 0, 1.0, 0.0),
    ]);
    let keys: Vec<(u32, usize)> = table.rows().iter().map(|r| (r.cell_id, r.frame)).collect();
    assert_eq!(keys, vec![(1, 0), (1, 1), (2, 0), (2, 1)]);
    assert_eq!(table.cell_ids(), &[1, 2]);
}

#[test]
fn test_get_rows_clamps_out_of_range() {
    let table = common::ramp_table(1);
    assert_eq!(table.get_rows(0, Some(2)).len(), 2);
    assert_eq!(table.get_rows(3, Some(100)).len(), 2);
    assert_eq!(table.get_rows(100, None).len(), 0);
    assert_eq!(table.get_rows(0, None).len(), 5);
}

#[test]
fn test_select_preserves_table_order_not_request_order() {
    let table = ResultTable::new(vec![
        row(1, 0, 1.0, 0.0),
        row(2, 0, 2.0, 0.0),
        row(3, 0, 3.0, 0.0),
    ]);
    let selected = table.select(&[3, 1]);
    assert_eq!(selected.cell_ids(), &[1, 3]);
    let ids: Vec<u32> = selected.rows().iter().map(|r| r.cell_id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_select_ignores_absent_cells() {
    let table = common::ramp_table(1);
    let selected = table.select(&[1, 99]);
    assert_eq!(selected.cell_ids(), &[1]);
    assert_eq!(selected.len(), 5);
    assert!(table.select(&[99]).is_empty());
}

#[test]
fn test_summary_statistics() {
    let table = common::ramp_table(1);
    let summary = table.summary();
    let stats = summary.get(&1).unwrap();
    assert!((stats.mean - 20.0).abs() < 1e-12);
    assert!((stats.min - 0.0).abs() < 1e-12);
    assert!((stats.max - 40.0).abs() < 1e-12);
    // population std of [0, 10, 20, 30, 40]
    assert!((stats.std - 200.0_f64.sqrt()).abs() < 1e-9);
    assert_eq!(stats.count, 5);
    assert!(!stats.flagged);
}

#[test]
fn test_summary_flags_nan_series() {
    let table = ResultTable::new(vec![
        row(1, 0, 1.0, f64::NAN),
        row(1, 1, 2.0, f64::NAN),
        row(2, 0, 1.0, 0.0),
    ]);
    let summary = table.summary();
    assert!(summary.get(&1).unwrap().flagged);
    assert!(!summary.get(&2).unwrap().flagged);
    // flagged cells still report moments over the finite raw samples
    assert!((summary.get(&1).unwrap().mean - 1.5).abs() < 1e-12);
}

#[test]
fn test_tabular_roundtrip_with_nan() {
    let table = ResultTable::new(vec![
        row(1, 0, 0.25, -100.0),
        row(1, 1, f64::NAN, f64::NAN),
        row(7, 0, 3.5, 50.0),
    ]);
    let tabular = table.to_tabular();
    assert_eq!(tabular[0], COLUMNS);
    assert_eq!(tabular.len(), 4);

    let restored = ResultTable::from_tabular(&tabular).unwrap();
    assert_eq!(restored.len(), 3);
    assert_eq!(restored.cell_ids(), &[1, 7]);
    assert!(restored.rows()[1].intensity.is_nan());
    assert!((restored.rows()[2].intensity - 3.5).abs() < 1e-12);
}

#[test]
fn test_csv_roundtrip() {
    let table = common::ramp_table(3);
    let csv = table.to_csv();
    let text = String::from_utf8(csv.clone()).unwrap();
    assert!(text.starts_with("cell_id,frame,intensity,normalized_intensity\n"));

    let restored = import_csv(&csv).unwrap();
    assert_eq!(restored.len(), table.len());
    for (a, b) in restored.rows().iter().zip(table.rows().iter()) {
        assert_eq!(a.cell_id, b.cell_id);
        assert_eq!(a.frame, b.frame);
        assert!((a.intensity - b.intensity).abs() < 1e-12);
        assert!((a.normalized_intensity - b.normalized_intensity).abs() < 1e-12);
    }
}

#[test]
fn test_import_rejects_wrong_header() {
    let csv = b"cell_id,frame,intensity\n1,0,2.0\n";
    match import_csv(csv) {
        Err(CaltraceError::Schema(_)) => {}
        other => panic!("expected Schema error, got {other:?}"),
    }

    let reordered = b"frame,cell_id,intensity,normalized_intensity\n0,1,2.0,0.0\n";
    assert!(matches!(
        import_csv(reordered),
        Err(CaltraceError::Schema(_))
    ));
}

#[test]
fn test_import_rejects_bad_field() {
    let csv = b"cell_id,frame,intensity,normalized_intensity\nabc,0,2.0,0.0\n";
    assert!(matches!(import_csv(csv), Err(CaltraceError::Schema(_))));
}

#[test]
fn test_import_rejects_duplicate_key() {
    let csv = b"cell_id,frame,intensity,normalized_intensity\n1,0,2.0,0.0\n1,0,3.0,0.0\n";
    assert!(matches!(import_csv(csv), Err(CaltraceError::Schema(_))));
}

#[test]
fn test_failed_import_leaves_caller_table_untouched() {
    let existing = common::ramp_table(1);
    let bad = b"not,a,valid,header\n";
    assert!(import_csv(bad).is_err());
    assert_eq!(existing.len(), 5);
}

#[test]
fn test_export_csv_subset() {
    let table = ResultTable::new(vec![
        row(1, 0, 1.0, 0.0),
        row(2, 0, 2.0, 0.0),
        row(3, 0, 3.0, 0.0),
    ]);
    let csv = export_csv(&table, Some(&[2]));
    let restored = import_csv(&csv).unwrap();
    assert_eq!(restored.cell_ids(), &[2]);
    assert_eq!(restored.len(), 1);

    let all = import_csv(&export_csv(&table, None)).unwrap();
    assert_eq!(all.len(), 3);
}
