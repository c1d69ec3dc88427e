//! Summary statistics and min-max normalization for light curves.
//!
//! A light curve is a [`Table`] of observations with a magnitude column.
//! Multi-band surveys are handled as a [`BandDataset`], one table per band,
//! usually produced with [`split_by_band`].
//!
//! ```no_run
//! use lcanalyzer::{calc_stats, load_dataset, normalize_lc, split_by_band};
//!
//! let table = load_dataset("lsst_object.csv")?;
//! let bands = split_by_band(&table, "band")?;
//! let stats = calc_stats(&bands, ["g", "r"], "psfMag")?;
//! println!("{stats}");
//! let curve = normalize_lc(&bands["g"], "psfMag")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod data;
pub mod error;
pub mod normalize;
pub mod stats;

pub use data::filter::{select_rows, split_by_band};
pub use data::loader::{load_dataset, load_dataset_with, LoadOptions};
pub use data::model::{BandDataset, Column, Table};
pub use error::LcError;
pub use normalize::{normalize_lc, MAGNITUDE_LIMIT};
pub use stats::{calc_stats, max_mag, mean_mag, min_mag, BandStats, Stat, StatsTable};
