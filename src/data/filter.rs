use std::collections::BTreeMap;

use super::model::{BandDataset, Table};
use crate::error::LcError;

// ---------------------------------------------------------------------------
// Row selection by label
// ---------------------------------------------------------------------------

/// Group row indices by the label found in `column`.
///
/// Numeric labels are rendered with `Display` (`1.0` → `"1"`). Rows whose
/// label is missing belong to no group.
pub fn group_indices(table: &Table, column: &str) -> Result<BTreeMap<String, Vec<usize>>, LcError> {
    let col = table.column(column)?;
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for row in 0..table.len() {
        if let Some(label) = col.label_at(row) {
            groups.entry(label).or_default().push(row);
        }
    }
    Ok(groups)
}

/// Split a multi-band light curve into one table per band.
///
/// Rows keep their original order within each band.
pub fn split_by_band(table: &Table, band_column: &str) -> Result<BandDataset, LcError> {
    let groups = group_indices(table, band_column)?;
    log::debug!(
        "Split {} rows on '{band_column}' into {} bands",
        table.len(),
        groups.len()
    );
    Ok(groups
        .into_iter()
        .map(|(band, rows)| (band, table.take_rows(&rows)))
        .collect())
}

/// Rows whose `column` label equals `value`, e.g. a single object id.
pub fn select_rows(table: &Table, column: &str, value: &str) -> Result<Table, LcError> {
    let col = table.column(column)?;
    let rows: Vec<usize> = (0..table.len())
        .filter(|&row| col.label_at(row).as_deref() == Some(value))
        .collect();
    Ok(table.take_rows(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn survey() -> Table {
        Table::new()
            .with_column("objectId", Column::from_f64s([7.0, 7.0, 8.0, 7.0, 8.0]))
            .unwrap()
            .with_column(
                "band",
                Column::text([Some("g"), Some("r"), Some("g"), Some("g"), None]),
            )
            .unwrap()
            .with_column("psfMag", Column::from_f64s([21.0, 20.5, 19.0, 21.4, 18.0]))
            .unwrap()
    }

    #[test]
    fn split_keeps_row_order_and_drops_missing_band() {
        let bands = split_by_band(&survey(), "band").unwrap();
        assert_eq!(bands.keys().collect::<Vec<_>>(), ["g", "r"]);
        assert_eq!(
            bands["g"].numeric("psfMag").unwrap(),
            &[Some(21.0), Some(19.0), Some(21.4)]
        );
        assert_eq!(bands["r"].len(), 1);
    }

    #[test]
    fn split_on_unknown_column_fails() {
        assert!(matches!(
            split_by_band(&survey(), "filter"),
            Err(LcError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn select_rows_matches_numeric_label() {
        let obj = select_rows(&survey(), "objectId", "8").unwrap();
        assert_eq!(obj.numeric("psfMag").unwrap(), &[Some(19.0), Some(18.0)]);
    }

    #[test]
    fn select_rows_without_match_is_empty() {
        let none = select_rows(&survey(), "band", "z").unwrap();
        assert!(none.is_empty());
        assert_eq!(none.column_names(), survey().column_names());
    }
}
