// src/observation_table.rs

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// A time-indexed table of marketing observations: one row per dated record,
/// one numeric column per metric (investment channels, sales, price).
///
/// The date column holds ISO `%Y-%m-%d` strings; it is parsed once at
/// construction and kept alongside the frame. Rows need not be sorted or
/// unique by date, and nothing here assumes they are. The table is never
/// mutated after construction; every view below produces new data.
pub struct ObservationTable {
    df: DataFrame,
    date_column: String,
    dates: Vec<NaiveDate>,
}

impl ObservationTable {
    /// Wraps a loaded DataFrame, parsing its date column. A null or
    /// malformed date entry is an error: the loader is expected to hand over
    /// well-formed dates, and a violation should fail loudly at the boundary
    /// rather than inside an aggregation.
    pub fn new(df: DataFrame, date_column: &str) -> Result<Self, PolarsError> {
        let date_series = df.column(date_column)?.str()?;

        let mut dates = Vec::with_capacity(df.height());
        for opt_date in date_series.into_iter() {
            let raw = opt_date.ok_or(PolarsError::NoData(
                "date column contains a null entry".into(),
            ))?;
            let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                PolarsError::ComputeError(format!("invalid date '{}': {}", raw, e).into())
            })?;
            dates.push(parsed);
        }

        Ok(ObservationTable {
            df,
            date_column: date_column.to_string(),
            dates,
        })
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Parsed dates, one per row, in row order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Distinct calendar years present in the table, ascending.
    pub fn distinct_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.dates.iter().map(|d| d.year()).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// The most recent calendar year with at least one observation.
    pub fn latest_year(&self) -> Option<i32> {
        self.dates.iter().map(|d| d.year()).max()
    }

    /// A metric column as f64, cast from whatever numeric type the loader
    /// produced. An unknown name surfaces as a column-lookup error; it is
    /// never treated as an all-zero column.
    pub fn metric(&self, name: &str) -> Result<Float64Chunked, PolarsError> {
        let series = self.df.column(name)?;
        let cast = series.cast(&DataType::Float64)?;
        Ok(cast.f64()?.clone())
    }

    /// Restricts the table to observations dated within `[start, end]`,
    /// both endpoints inclusive. Row order is preserved.
    pub fn filter_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ObservationTable, PolarsError> {
        let mask = self
            .dates
            .iter()
            .map(|d| *d >= start && *d <= end)
            .collect::<BooleanChunked>();
        let df = self.df.filter(&mask)?;
        let dates = self
            .dates
            .iter()
            .copied()
            .filter(|d| *d >= start && *d <= end)
            .collect();

        Ok(ObservationTable {
            df,
            date_column: self.date_column.clone(),
            dates,
        })
    }
}
