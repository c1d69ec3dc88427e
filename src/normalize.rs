use crate::data::model::Table;
use crate::error::LcError;
use crate::stats::{max_mag, min_mag};

/// Magnitudes beyond this absolute value are instrument null markers.
pub const MAGNITUDE_LIMIT: f64 = 90.0;

/// Rescale a light curve so its brightest point is 0 and its faintest 1.
///
/// The range comes from shifting the *whole* table by the brightest
/// magnitude and then taking the column maximum of the shifted table.
/// Missing observations and 0/0 results (a constant light curve) become 0.
///
/// Fails with [`LcError::InvalidMagnitude`] before computing anything if
/// any value exceeds [`MAGNITUDE_LIMIT`] in absolute value.
pub fn normalize_lc(table: &Table, column: &str) -> Result<Vec<f64>, LcError> {
    let values = table.numeric(column)?;

    let invalid = values
        .iter()
        .enumerate()
        .find_map(|(row, v)| v.filter(|m| m.abs() > MAGNITUDE_LIMIT).map(|m| (row, m)));
    if let Some((row, value)) = invalid {
        log::warn!("Rejecting '{column}': row {row} holds {value}");
        return Err(LcError::InvalidMagnitude {
            column: column.to_string(),
            row,
            value,
        });
    }

    let Some(brightest) = min_mag(table, column)? else {
        return Ok(vec![0.0; values.len()]);
    };
    let faintest = max_mag(&table.shifted(brightest), column)?;
    if faintest == Some(0.0) {
        log::warn!("'{column}' is constant; normalized light curve is all zeros");
    }

    Ok(values
        .iter()
        .map(|v| match (v, faintest) {
            (Some(mag), Some(range)) => {
                let scaled = (mag - brightest) / range;
                if scaled.is_nan() {
                    0.0
                } else {
                    scaled
                }
            }
            _ => 0.0,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    const ABC: [&str; 3] = ["a", "b", "c"];

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 0.01, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn normalizes_positive_integers() {
        let rows = [[8.0, 9.0, 1.0], [1.0, 4.0, 1.0], [1.0, 2.0, 4.0], [1.0, 4.0, 1.0]];
        let t = Table::from_rows(&ABC, &rows).unwrap();
        assert_close(&normalize_lc(&t, "b").unwrap(), &[1.0, 0.285, 0.0, 0.285]);
    }

    #[test]
    fn constant_curves_become_zero() {
        for value in [1.0, 0.0] {
            let t = Table::from_rows(&ABC, &[[value; 3]; 4]).unwrap();
            assert_eq!(normalize_lc(&t, "b").unwrap(), vec![0.0; 4]);
        }
    }

    #[test]
    fn null_marker_magnitude_is_rejected() {
        let rows = [[8.0, 9.0, 1.0], [1.0, -99.9, 1.0], [1.0, 2.0, 4.0], [1.0, 4.0, 1.0]];
        let t = Table::from_rows(&ABC, &rows).unwrap();
        let err = normalize_lc(&t, "b").unwrap_err();
        assert_eq!(
            err,
            LcError::InvalidMagnitude {
                column: "b".into(),
                row: 1,
                value: -99.9
            }
        );
        assert!(err.to_string().contains("abs() larger than 90"));
    }

    #[test]
    fn limit_is_exclusive() {
        let t = Table::new()
            .with_column("mag", Column::from_f64s([90.0, -90.0, 45.0]))
            .unwrap();
        assert_close(&normalize_lc(&t, "mag").unwrap(), &[1.0, 0.0, 0.75]);
    }

    #[test]
    fn other_columns_do_not_trip_the_guard() {
        let t = Table::from_rows(&ABC, &[[-99.0, 20.0, 1.0], [500.0, 22.0, 1.0]]).unwrap();
        assert_close(&normalize_lc(&t, "b").unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn missing_observations_become_zero() {
        let t = Table::new()
            .with_column("mag", Column::numeric([Some(20.0), None, Some(22.0)]))
            .unwrap();
        assert_close(&normalize_lc(&t, "mag").unwrap(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn all_missing_column_becomes_zero() {
        let t = Table::new()
            .with_column("mag", Column::numeric([None, None]))
            .unwrap();
        assert_eq!(normalize_lc(&t, "mag").unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn text_column_cannot_be_normalized() {
        let t = Table::new()
            .with_column("band", Column::text([Some("g")]))
            .unwrap();
        assert!(matches!(normalize_lc(&t, "band"), Err(LcError::NotNumeric { .. })));
    }
}
