use pathpivot::testing::{records, sample_records};
use pathpivot::{
    DuplicatePolicy, PathCatalog, PivotError, PivotOptions, PivotTransformer, Record, assemble, pivot,
    pivot_with, transform,
};

#[test]
fn zero_fills_paths_a_user_never_visited() -> anyhow::Result<()> {
    let catalog = PathCatalog::from_paths(["/a", "/b"]);
    let table = assemble(transform(&sample_records(), &catalog)?)?;

    assert_eq!(table.columns(), vec!["user_id", "/a", "/b"]);
    let rows: Vec<Vec<String>> = table.records().collect();
    assert_eq!(rows, vec![vec!["u1", "5", "3"], vec!["u2", "7", "0"]]);
    Ok(())
}

#[test]
fn empty_input_gives_user_id_only_table() -> anyhow::Result<()> {
    let table = pivot(&[])?;
    assert!(table.is_empty());
    assert!(table.catalog().is_empty());
    assert_eq!(table.columns(), vec!["user_id"]);
    Ok(())
}

#[test]
fn duplicate_path_last_write_wins() -> anyhow::Result<()> {
    let input = records([("u1", "/a", 5), ("u1", "/a", 9)]);
    let table = assemble(transform(&input, &PathCatalog::from_paths(["/a"]))?)?;
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("u1", "/a"), Some(9));
    Ok(())
}

#[test]
fn duplicate_path_rejected_when_configured() {
    let input = records([("u1", "/a", 5), ("u1", "/a", 9)]);
    let err = pivot_with(
        &input,
        PivotOptions {
            duplicates: DuplicatePolicy::Reject,
            parallel: false,
        },
    )
    .unwrap_err();
    assert!(matches!(err, PivotError::DuplicatePath { .. }));
}

#[test]
fn path_outside_catalog_is_schema_mismatch() {
    let input = records([("u1", "/a", 5)]);
    let err = transform(&input, &PathCatalog::from_paths(["/b"])).unwrap_err();
    assert!(matches!(err, PivotError::SchemaMismatch { .. }));
    assert!(err.to_string().contains("/a"));
}

/// Users interleaved across "files", with sparse path coverage.
fn scattered(users: u32, paths: u32) -> Vec<Record> {
    let mut out = Vec::new();
    for round in 0..3u32 {
        for u in 0..users {
            let user = (u * 7919 + round) % users;
            let p = (user + round * 3) % paths;
            if (user + p) % 4 != 0 {
                out.push(Record::new(
                    format!("user{user}"),
                    format!("/p{p}"),
                    i64::from(user * 10 + p),
                ));
            }
        }
    }
    out
}

#[test]
fn every_row_is_complete_and_conserves_lengths() -> anyhow::Result<()> {
    let input = scattered(200, 13);
    let table = pivot(&input)?;
    let catalog = table.catalog();

    for row in table.rows() {
        assert_eq!(row.values().len(), catalog.len());
        assert!(row.has_schema(catalog));
    }
    for r in &input {
        assert_eq!(table.get(&r.user_id, &r.path), Some(r.length));
    }
    // Cells without a record are zero, never missing.
    let touched: std::collections::HashSet<(&str, &str)> =
        input.iter().map(|r| (r.user_id.as_str(), r.path.as_str())).collect();
    for row in table.rows() {
        for (path, value) in row.cells() {
            if !touched.contains(&(row.user_id(), path)) {
                assert_eq!(value, 0);
            }
        }
    }
    Ok(())
}

#[test]
fn user_order_is_first_seen_and_repeatable() -> anyhow::Result<()> {
    let input = scattered(50, 5);
    let mut expected: Vec<&str> = Vec::new();
    for r in &input {
        if !expected.contains(&r.user_id.as_str()) {
            expected.push(&r.user_id);
        }
    }

    let first = pivot(&input)?;
    let second = pivot(&input)?;
    let order: Vec<&str> = first.rows().iter().map(|r| r.user_id()).collect();
    assert_eq!(order, expected);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn parallel_matches_sequential() -> anyhow::Result<()> {
    let input = scattered(2_000, 31);
    let catalog = PathCatalog::from_records(&input);
    let t = PivotTransformer::new(catalog);
    assert_eq!(t.transform(&input)?, t.transform_par(&input)?);

    let par = pivot_with(
        &input,
        PivotOptions {
            parallel: true,
            ..PivotOptions::default()
        },
    )?;
    assert_eq!(par, pivot(&input)?);
    Ok(())
}

#[test]
fn transform_leaves_inputs_untouched() -> anyhow::Result<()> {
    let input = sample_records();
    let catalog = PathCatalog::from_records(&input);
    let before = (input.clone(), catalog.clone());
    let _ = transform(&input, &catalog)?;
    assert_eq!((input, catalog), before);
    Ok(())
}
