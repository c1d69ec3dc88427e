/// Data layer: core types, loading, and band splitting.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named columns, missing values as None
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  band / object labels → BandDataset
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
