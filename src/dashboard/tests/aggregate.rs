use crate::dashboard::aggregate::*;
use crate::dashboard::types::{LabelValue, StackedValue, TimePoint};
use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;

#[test]
fn test_value_counts_descending_with_stable_ties() -> Result<()> {
    let frame = df!(
        "category" => &[
            Some("Toys"),
            Some("Games"),
            Some("Books"),
            None,
            Some("Books"),
            Some("Puzzles"),
            Some("Toys"),
            Some("Books"),
        ],
    )?;

    assert_eq!(
        value_counts(&frame, "category")?,
        vec![
            LabelValue::new("Books", 3.0),
            LabelValue::new("Toys", 2.0),
            LabelValue::new("Games", 1.0),
            LabelValue::new("Puzzles", 1.0),
        ]
    );
    Ok(())
}

#[test]
fn test_sum_by_key_skips_null_keys_and_zeroes_null_values() -> Result<()> {
    let frame = df!(
        "region" => &[Some("North"), Some("South"), None, Some("North"), Some("West")],
        "sales" => &[Some(10.0), Some(5.0), Some(100.0), None, Some(f64::NAN)],
    )?;

    assert_eq!(
        sum_by_key(&frame, "region", "sales")?,
        vec![
            LabelValue::new("North", 10.0),
            LabelValue::new("South", 5.0),
            LabelValue::new("West", 0.0),
        ]
    );
    Ok(())
}

#[test]
fn test_sum_by_pair_sorted() -> Result<()> {
    let frame = df!(
        "category" => &["Toys", "Books", "Toys", "Books"],
        "region" => &[Some("South"), Some("North"), Some("South"), None],
        "sales" => &[1.0, 2.0, 3.0, 4.0],
    )?;

    assert_eq!(
        sum_by_pair(&frame, "category", "region", "sales")?,
        vec![
            StackedValue {
                category: "Books".to_owned(),
                group: "North".to_owned(),
                value: 2.0,
            },
            StackedValue {
                category: "Toys".to_owned(),
                group: "South".to_owned(),
                value: 4.0,
            },
        ]
    );
    Ok(())
}

#[test]
fn test_ranked_sums_top_and_bottom() -> Result<()> {
    let frame = df!(
        "product_id" => &["P3", "P1", "P2", "P4", "P1"],
        "sales" => &[5.0, 20.0, 5.0, 12.0, 10.0],
    )?;

    let top = ranked_sums(&frame, "product_id", "sales", 2, Rank::Top)?;
    assert_eq!(
        top,
        vec![LabelValue::new("P1", 30.0), LabelValue::new("P4", 12.0)]
    );

    // Ties resolve by label
    let bottom = ranked_sums(&frame, "product_id", "sales", 3, Rank::Bottom)?;
    let labels: Vec<&str> = bottom.iter().map(|v| v.label.as_str()).collect();
    assert_eq!(labels, vec!["P2", "P3", "P4"]);

    assert_eq!(
        ranked_sums(&frame, "product_id", "sales", 10, Rank::Top)?.len(),
        4
    );
    Ok(())
}

#[test]
fn test_sum_by_month_drops_undated_rows() -> Result<()> {
    let frame = df!(
        "order_date" => &[
            Some("2024-02-10"),
            Some("2024-01-05"),
            None,
            Some("2024-02-28"),
        ],
        "sales" => &[1.0, 2.0, 50.0, 4.0],
    )?
    .lazy()
    .with_columns([col("order_date").str().to_datetime(
        Some(TimeUnit::Milliseconds),
        None,
        StrptimeOptions {
            format: Some("%Y-%m-%d".into()),
            ..Default::default()
        },
        lit("raise"),
    )])
    .collect()?;

    let month = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
    assert_eq!(
        sum_by_month(&frame, "order_date", "sales")?,
        vec![
            TimePoint {
                period: month(1),
                value: 2.0,
            },
            TimePoint {
                period: month(2),
                value: 5.0,
            },
        ]
    );
    Ok(())
}

#[test]
fn test_group_values_keeps_first_appearance_order() -> Result<()> {
    let frame = df!(
        "bin" => &[Some(">20%"), Some("0%"), None, Some(">20%"), Some("0%")],
        "sales" => &[Some(1.0), None, Some(9.0), Some(3.0), Some(2.0)],
    )?;

    assert_eq!(
        group_values(&frame, "bin", "sales")?,
        vec![
            (">20%".to_owned(), vec![1.0, 3.0]),
            ("0%".to_owned(), vec![2.0]),
        ]
    );
    Ok(())
}

#[test]
fn test_histogram_counts_every_value() {
    let values = [Some(0.0), Some(1.0), Some(2.5), None, Some(f64::NAN), Some(10.0)];
    let bins = histogram(&values, 4);

    assert_eq!(bins.len(), 4);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
    assert_eq!(bins[0].start, 0.0);
    assert_eq!(bins[3].end, 10.0);
    // Maximum lands in the closed last bin
    assert_eq!(bins[3].count, 1);
}

#[test]
fn test_histogram_constant_column() {
    let bins = histogram(&[Some(4.0), Some(4.0)], 2);
    assert_eq!(bins.len(), 2);
    assert_eq!(bins[0].start, 3.5);
    assert_eq!(bins[1].end, 4.5);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
}

#[test]
fn test_histogram_empty() {
    assert!(histogram(&[None, None], 30).is_empty());
}

#[test]
fn test_box_summary_flags_outliers() -> Result<()> {
    let summary = box_summary("Books", &[5.0, 1.0, 100.0, 3.0, 2.0, 4.0])?.unwrap();

    assert_eq!(summary.count, 6);
    assert!((summary.median - 3.5).abs() < 1e-9);
    assert!((summary.q1 - 2.25).abs() < 1e-9);
    assert!((summary.q3 - 4.75).abs() < 1e-9);
    assert_eq!(summary.outliers, vec![100.0]);
    assert_eq!(summary.lower_whisker, 1.0);
    assert_eq!(summary.upper_whisker, 5.0);
    Ok(())
}

#[test]
fn test_box_summary_empty_group() -> Result<()> {
    assert!(box_summary("empty", &[])?.is_none());
    assert!(box_summary("nan", &[f64::NAN])?.is_none());
    Ok(())
}

#[test]
fn test_pearson() -> Result<()> {
    let ca = |v: &[Option<f64>]| Float64Chunked::from_slice_options(PlSmallStr::EMPTY, v);
    let a = ca(&[Some(1.0), Some(2.0), Some(3.0), None]);
    let b = ca(&[Some(2.0), Some(4.0), Some(6.0), Some(1.0)]);
    let c = ca(&[Some(3.0), Some(2.0), Some(1.0), Some(0.0)]);
    let flat = ca(&[Some(7.0), Some(7.0), Some(7.0), Some(7.0)]);

    assert!((pearson(&a, &b)?.unwrap() - 1.0).abs() < 1e-9);
    assert!((pearson(&a, &c)?.unwrap() + 1.0).abs() < 1e-9);
    assert_eq!(pearson(&a, &flat)?, None);
    assert_eq!(pearson(&ca(&[Some(1.0)]), &ca(&[Some(2.0)]))?, None);
    Ok(())
}

#[test]
fn test_correlation_matrix_shape() -> Result<()> {
    let frame = df!(
        "x" => &[1i64, 2, 3],
        "y" => &[Some(3.0), Some(1.0), Some(f64::NAN)],
        "z" => &[6.0, 4.0, 2.0],
    )?;
    let columns = ["x".to_owned(), "y".to_owned(), "z".to_owned()];
    let matrix = correlation_matrix(&frame, &columns)?;

    assert_eq!(matrix.columns, vec!["x", "y", "z"]);
    assert!((matrix.get(0, 0).unwrap() - 1.0).abs() < 1e-9);
    assert!((matrix.get(0, 2).unwrap() + 1.0).abs() < 1e-9);
    // NaN drops the third row, leaving two points
    assert!((matrix.get(0, 1).unwrap() + 1.0).abs() < 1e-9);
    assert_eq!(matrix.get(0, 1), matrix.get(1, 0));
    assert_eq!(matrix.get(3, 0), None);
    Ok(())
}

#[test]
fn test_hierarchy_roots_sum_children() {
    let pairs = vec![
        StackedValue {
            category: "Books".to_owned(),
            group: "East".to_owned(),
            value: 2.0,
        },
        StackedValue {
            category: "Books".to_owned(),
            group: "North".to_owned(),
            value: 3.0,
        },
        StackedValue {
            category: "Toys".to_owned(),
            group: "East".to_owned(),
            value: 4.0,
        },
    ];
    let nodes = hierarchy(&pairs);

    assert_eq!(nodes.len(), 5);
    assert_eq!(nodes[0].id, "Books");
    assert_eq!(nodes[0].value, 5.0);
    assert_eq!(nodes[1].id, "Toys");
    assert!(nodes[0].parent.is_none());

    let leaf = nodes.iter().find(|n| n.id == "Toys/East").unwrap();
    assert_eq!(leaf.parent.as_deref(), Some("Toys"));
    assert_eq!(leaf.label, "East");
}
