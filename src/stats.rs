use std::fmt;

use serde::Serialize;

use crate::data::model::{BandDataset, Table};
use crate::error::LcError;

// ---------------------------------------------------------------------------
// Reductions over a magnitude column
// ---------------------------------------------------------------------------

fn present(values: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    values.iter().flatten().copied()
}

pub(crate) fn max_of(values: &[Option<f64>]) -> Option<f64> {
    present(values).reduce(f64::max)
}

pub(crate) fn min_of(values: &[Option<f64>]) -> Option<f64> {
    present(values).reduce(f64::min)
}

pub(crate) fn mean_of(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = present(values).fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean magnitude of a light curve, skipping missing observations.
///
/// `Ok(None)` when the column has no values at all.
pub fn mean_mag(table: &Table, column: &str) -> Result<Option<f64>, LcError> {
    Ok(mean_of(table.numeric(column)?))
}

/// Largest magnitude of a light curve (the faintest observation).
pub fn max_mag(table: &Table, column: &str) -> Result<Option<f64>, LcError> {
    Ok(max_of(table.numeric(column)?))
}

/// Smallest magnitude of a light curve (the brightest observation).
pub fn min_mag(table: &Table, column: &str) -> Result<Option<f64>, LcError> {
    Ok(min_of(table.numeric(column)?))
}

// ---------------------------------------------------------------------------
// Per-band statistics
// ---------------------------------------------------------------------------

/// Row of a [`StatsTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Max,
    Mean,
    Min,
}

impl Stat {
    /// Row order of every [`StatsTable`].
    pub const ALL: [Stat; 3] = [Stat::Max, Stat::Mean, Stat::Min];

    pub fn label(self) -> &'static str {
        match self {
            Stat::Max => "max",
            Stat::Mean => "mean",
            Stat::Min => "min",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// max / mean / min of one band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BandStats {
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub min: Option<f64>,
}

impl BandStats {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        match stat {
            Stat::Max => self.max,
            Stat::Mean => self.mean,
            Stat::Min => self.min,
        }
    }
}

/// Bands as columns × (max, mean, min) as rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StatsTable {
    /// Bands in the order they were requested.
    columns: Vec<(String, BandStats)>,
}

impl StatsTable {
    pub fn bands(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(band, _)| band.as_str())
    }

    /// Always `["max", "mean", "min"]`.
    pub fn row_labels(&self) -> [&'static str; 3] {
        Stat::ALL.map(Stat::label)
    }

    pub fn band(&self, band: &str) -> Option<&BandStats> {
        self.columns
            .iter()
            .find(|(name, _)| name == band)
            .map(|(_, stats)| stats)
    }

    /// One cell; `None` if the band is absent or its reduction is undefined.
    pub fn get(&self, band: &str, stat: Stat) -> Option<f64> {
        self.band(band).and_then(|s| s.get(stat))
    }

    pub fn num_bands(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Display for StatsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<6}", "")?;
        for (band, _) in &self.columns {
            write!(f, " {band:>10}")?;
        }
        writeln!(f)?;
        for stat in Stat::ALL {
            write!(f, "{:<6}", stat.label())?;
            for (_, stats) in &self.columns {
                match stats.get(stat) {
                    Some(v) => write!(f, " {v:>10.4}")?,
                    None => write!(f, " {:>10}", "NaN")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// max, mean and min of `column` for each requested band.
///
/// Bands appear in iteration order; a band requested twice is reported once.
pub fn calc_stats<I, S>(
    dataset: &BandDataset,
    bands: I,
    column: &str,
) -> Result<StatsTable, LcError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = StatsTable::default();
    for band in bands {
        let band = band.as_ref();
        if out.band(band).is_some() {
            continue;
        }
        let table = dataset.get(band).ok_or_else(|| LcError::BandNotFound {
            band: band.to_string(),
        })?;
        let stats = BandStats {
            max: max_mag(table, column)?,
            mean: mean_mag(table, column)?,
            min: min_mag(table, column)?,
        };
        log::debug!("band {band}: {stats:?}");
        out.columns.push((band.to_string(), stats));
    }
    Ok(out)
}
