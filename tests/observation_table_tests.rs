// tests/observation_table_tests.rs
use chrono::NaiveDate;
use mixmetrics::ObservationTable;
use polars::prelude::*;

fn sample_df() -> DataFrame {
    DataFrame::new(vec![
        Series::new("fecha", &["2021-06-01", "2019-01-01", "2021-02-15", "2020-12-31"]),
        Series::new("ventas", &[4.0, 1.0, 3.0, 2.0]),
    ])
    .unwrap()
}

#[test]
fn parses_dates_and_reports_years() {
    let table = ObservationTable::new(sample_df(), "fecha").unwrap();

    assert_eq!(table.height(), 4);
    assert_eq!(table.distinct_years(), vec![2019, 2020, 2021]);
    assert_eq!(table.latest_year(), Some(2021));
    assert_eq!(table.date_column(), "fecha");
}

#[test]
fn empty_table_has_no_latest_year() {
    let df = DataFrame::new(vec![
        Series::new("fecha", Vec::<String>::new()),
        Series::new("ventas", Vec::<f64>::new()),
    ])
    .unwrap();
    let table = ObservationTable::new(df, "fecha").unwrap();

    assert_eq!(table.latest_year(), None);
    assert!(table.distinct_years().is_empty());
}

#[test]
fn malformed_date_is_rejected() {
    let df = DataFrame::new(vec![
        Series::new("fecha", &["2021-06-01", "not-a-date"]),
        Series::new("ventas", &[1.0, 2.0]),
    ])
    .unwrap();

    assert!(ObservationTable::new(df, "fecha").is_err());
}

#[test]
fn null_date_is_rejected() {
    let df = DataFrame::new(vec![
        Series::new("fecha", &[Some("2021-06-01"), None]),
        Series::new("ventas", &[1.0, 2.0]),
    ])
    .unwrap();

    assert!(ObservationTable::new(df, "fecha").is_err());
}

#[test]
fn missing_date_column_is_rejected() {
    let df = DataFrame::new(vec![Series::new("ventas", &[1.0])]).unwrap();

    assert!(ObservationTable::new(df, "fecha").is_err());
}

#[test]
fn metric_casts_integer_columns() {
    let df = DataFrame::new(vec![
        Series::new("fecha", &["2021-01-01", "2021-01-02"]),
        Series::new("unidades", &[3i64, 4i64]),
    ])
    .unwrap();
    let table = ObservationTable::new(df, "fecha").unwrap();

    let column = table.metric("unidades").unwrap();
    assert_eq!(column.sum(), Some(7.0));
}

#[test]
fn unknown_metric_is_a_lookup_error() {
    let table = ObservationTable::new(sample_df(), "fecha").unwrap();

    assert!(table.metric("inexistente").is_err());
}

#[test]
fn filter_date_range_is_inclusive_and_order_preserving() {
    let table = ObservationTable::new(sample_df(), "fecha").unwrap();

    let start = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
    let end = NaiveDate::from_ymd_opt(2021, 2, 15).unwrap();
    let filtered = table.filter_date_range(start, end).unwrap();

    assert_eq!(filtered.height(), 2);
    // Original row order survives the filter.
    assert_eq!(
        filtered.dates(),
        &[
            NaiveDate::from_ymd_opt(2021, 2, 15).unwrap(),
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        ]
    );
}

#[test]
fn filter_date_range_can_be_empty() {
    let table = ObservationTable::new(sample_df(), "fecha").unwrap();

    let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(1990, 12, 31).unwrap();
    let filtered = table.filter_date_range(start, end).unwrap();

    assert_eq!(filtered.height(), 0);
}
