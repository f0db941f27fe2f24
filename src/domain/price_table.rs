//! Date-indexed multi-symbol tables: closes, daily returns and equity curves,
//! plus the return correlation matrix and histograms drawn from them.
//!
//! Tables are an outer join on date. A symbol with no value on a date keeps a
//! gap (`None`); nothing is forward filled.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::metrics::sample_stdev;

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSeries {
    pub symbol: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateTable {
    pub symbols: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl DateTable {
    /// Outer join on date. Dates where every symbol is missing are dropped.
    pub fn outer_join(series: &[SymbolSeries]) -> Self {
        let width = series.len();
        let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for (col, s) in series.iter().enumerate() {
            for &(date, value) in &s.points {
                if value.is_finite() {
                    by_date.entry(date).or_insert_with(|| vec![None; width])[col] = Some(value);
                }
            }
        }

        DateTable {
            symbols: series.iter().map(|s| s.symbol.clone()).collect(),
            rows: by_date
                .into_iter()
                .filter(|(_, values)| values.iter().any(Option::is_some))
                .map(|(date, values)| TableRow { date, values })
                .collect(),
        }
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows
            .iter()
            .map(move |r| r.values.get(col).copied().flatten())
    }

    /// Non-missing values of one column, in date order.
    pub fn present(&self, col: usize) -> Vec<f64> {
        self.column(col).flatten().collect()
    }

    /// Percentage change of each column against its own previous value.
    pub fn returns(&self) -> DateTable {
        self.map_columns(|column| {
            let mut prev: Option<f64> = None;
            column
                .map(|value| {
                    let value = value?;
                    let r = prev.map(|p| value / p - 1.0);
                    prev = Some(value);
                    r
                })
                .collect()
        })
    }

    /// Growth of one unit, compounding a returns table with gaps as zero return.
    pub fn equity_curves(&self) -> DateTable {
        self.map_columns(|column| {
            let mut equity = 1.0;
            column
                .map(|r| {
                    equity *= 1.0 + r.unwrap_or(0.0);
                    Some(equity)
                })
                .collect()
        })
    }

    fn map_columns<F>(&self, mut f: F) -> DateTable
    where
        F: FnMut(&mut dyn Iterator<Item = Option<f64>>) -> Vec<Option<f64>>,
    {
        let columns: Vec<Vec<Option<f64>>> = (0..self.symbols.len())
            .map(|col| f(&mut self.column(col)))
            .collect();

        DateTable {
            symbols: self.symbols.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| TableRow {
                    date: row.date,
                    values: columns.iter().map(|c| c[i]).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    /// Row-major, `None` where the correlation is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j).copied().flatten())
    }
}

/// Pearson correlation over the dates where both columns are present.
pub fn correlation_matrix(returns: &DateTable) -> CorrelationMatrix {
    let n = returns.symbols.len();
    let columns: Vec<Vec<Option<f64>>> = (0..n).map(|c| returns.column(c).collect()).collect();

    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let corr = pairwise_pearson(&columns[i], &columns[j]);
            values[i][j] = corr;
            values[j][i] = corr;
        }
    }

    CorrelationMatrix {
        symbols: returns.symbols.clone(),
        values,
    }
}

fn pairwise_pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();

    let sx = sample_stdev(&xs).filter(|s| *s > 0.0)?;
    let sy = sample_stdev(&ys).filter(|s| *s > 0.0)?;
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let cov = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / (n - 1.0);

    Some((cov / (sx * sy)).clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }
}

/// Equal-width bins over the data range; the last bin includes its upper edge.
/// A constant sample is centred in a unit-wide range.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    if values.is_empty() || bins == 0 {
        return None;
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram { min, max, counts })
}
