// src/aggregator.rs

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::observation_table::ObservationTable;

/// How grouped observations are collapsed to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reducer {
    Sum,
    Mean,
}

impl Reducer {
    fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            Reducer::Sum => values.iter().sum::<f64>(),
            Reducer::Mean => values.iter().mean(),
        }
    }
}

/// Headline comparison of a year's total against the prior year.
///
/// `percentage_delta` is `None` when the prior-year total is zero: there is
/// no meaningful growth rate to report and the caller renders an explicit
/// "N/A" instead of a number. This is deliberately different from the chart
/// path ([`Aggregator::yoy_percentage_diff`]), which collapses the same case
/// to 0 so series stay finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodDelta {
    pub total: f64,
    pub prior_total: f64,
    pub absolute_delta: f64,
    pub percentage_delta: Option<f64>,
}

/// Per-channel variant of [`PeriodDelta`], one entry per metric card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDelta {
    pub channel: String,
    pub delta: PeriodDelta,
}

/// Pure aggregation views over an [`ObservationTable`].
///
/// Every method is a read over the borrowed table; repeated calls with the
/// same arguments return the same result, so callers are free to memoize.
pub struct Aggregator<'a> {
    table: &'a ObservationTable,
}

impl<'a> Aggregator<'a> {
    pub fn new(table: &'a ObservationTable) -> Self {
        Aggregator { table }
    }

    /// Sum of all listed metrics over rows dated in `year`. An empty metric
    /// list or a year with no rows both yield 0.0. An unknown metric name is
    /// an error, even when the year has no rows.
    pub fn yearly_total(&self, metrics: &[&str], year: i32) -> Result<f64, PolarsError> {
        let mut total = 0.0;
        for metric in metrics {
            total += self.metric_year_sum(metric, year)?;
        }
        Ok(total)
    }

    fn metric_year_sum(&self, metric: &str, year: i32) -> Result<f64, PolarsError> {
        let column = self.table.metric(metric)?;
        let mut sum = 0.0;
        for (date, value) in self.table.dates().iter().zip(&column) {
            if date.year() == year {
                sum += value.unwrap_or(0.0);
            }
        }
        Ok(sum)
    }

    /// Per-year sums of `metric` for every year present in the table,
    /// keyed ascending. Years without rows are absent rather than zero.
    pub fn yearly_series(&self, metric: &str) -> Result<BTreeMap<i32, f64>, PolarsError> {
        let column = self.table.metric(metric)?;
        let mut by_year = BTreeMap::new();
        for (date, value) in self.table.dates().iter().zip(&column) {
            *by_year.entry(date.year()).or_insert(0.0) += value.unwrap_or(0.0);
        }
        Ok(by_year)
    }

    /// Combined per-year total across several metrics, for the
    /// "total investment over years" style of chart.
    pub fn yearly_totals(&self, metrics: &[&str]) -> Result<BTreeMap<i32, f64>, PolarsError> {
        let mut combined: BTreeMap<i32, f64> = BTreeMap::new();
        for metric in metrics {
            for (year, value) in self.yearly_series(metric)? {
                *combined.entry(year).or_insert(0.0) += value;
            }
        }
        Ok(combined)
    }

    /// Monthly values of `metric` within `year`, reduced per month. Keys are
    /// calendar months 1-12; months with no rows in `year` are omitted.
    ///
    /// Null values count as 0 under [`Reducer::Sum`] but are excluded from
    /// [`Reducer::Mean`]; a month whose values are all null is omitted from
    /// the mean result rather than reported as NaN.
    pub fn monthly_series(
        &self,
        metric: &str,
        year: i32,
        reducer: Reducer,
    ) -> Result<BTreeMap<u32, f64>, PolarsError> {
        let column = self.table.metric(metric)?;

        let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (date, value) in self.table.dates().iter().zip(&column) {
            if date.year() != year {
                continue;
            }
            let group = by_month.entry(date.month()).or_default();
            if let Some(value) = value {
                group.push(value);
            }
        }

        let mut reduced = BTreeMap::new();
        for (month, values) in by_month {
            if values.is_empty() && reducer == Reducer::Mean {
                continue;
            }
            reduced.insert(month, reducer.reduce(&values));
        }
        Ok(reduced)
    }

    /// Year-over-year percentage change of `metric` between `year` and the
    /// year before: `(current - prior) / prior * 100`.
    ///
    /// A prior-year total of exactly zero (including a prior year with no
    /// rows at all) collapses to 0.0. That is a saturating fallback, not a
    /// correct growth rate; existing dashboards depend on it to keep chart
    /// series finite. The headline-card path reports the same case
    /// explicitly instead, see [`Aggregator::period_delta`].
    pub fn yoy_percentage_diff(&self, metric: &str, year: i32) -> Result<f64, PolarsError> {
        let current = self.metric_year_sum(metric, year)?;
        let prior = self.metric_year_sum(metric, year - 1)?;
        if prior == 0.0 {
            return Ok(0.0);
        }
        Ok((current - prior) / prior * 100.0)
    }

    /// Year-over-year percentage change per metric for each requested year,
    /// in the caller's order. The output for a metric is parallel to
    /// `years`: duplicate years produce duplicate entries. Metrics are
    /// computed in parallel.
    pub fn yoy_diff_matrix(
        &self,
        metrics: &[&str],
        years: &[i32],
    ) -> Result<HashMap<String, Vec<f64>>, PolarsError> {
        metrics
            .par_iter()
            .map(|metric| {
                let diffs = years
                    .iter()
                    .map(|&year| self.yoy_percentage_diff(metric, year))
                    .collect::<Result<Vec<f64>, PolarsError>>()?;
                Ok(((*metric).to_string(), diffs))
            })
            .collect()
    }

    /// Latest-year total of the listed metrics against the prior year, with
    /// the percentage left unset when the prior total is zero.
    pub fn period_delta(
        &self,
        metrics: &[&str],
        latest_year: i32,
    ) -> Result<PeriodDelta, PolarsError> {
        let total = self.yearly_total(metrics, latest_year)?;
        let prior_total = self.yearly_total(metrics, latest_year - 1)?;
        let absolute_delta = total - prior_total;
        let percentage_delta = if prior_total == 0.0 {
            None
        } else {
            Some(absolute_delta / prior_total * 100.0)
        };

        Ok(PeriodDelta {
            total,
            prior_total,
            absolute_delta,
            percentage_delta,
        })
    }

    /// One [`ChannelDelta`] per metric, in the caller's order, for the
    /// per-channel metric cards.
    pub fn channel_deltas(
        &self,
        metrics: &[&str],
        latest_year: i32,
    ) -> Result<Vec<ChannelDelta>, PolarsError> {
        metrics
            .iter()
            .map(|metric| {
                let delta = self.period_delta(&[*metric], latest_year)?;
                Ok(ChannelDelta {
                    channel: (*metric).to_string(),
                    delta,
                })
            })
            .collect()
    }
}
