use std::collections::BTreeMap;

use crate::error::LcError;

// ---------------------------------------------------------------------------
// Column – one named field of a table
// ---------------------------------------------------------------------------

/// A single column of observations.
///
/// Numeric cells use `None` for missing values; NaN never survives
/// construction so reductions only have to skip `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    /// Labels such as band names or survey object ids.
    Text(Vec<Option<String>>),
}

impl Column {
    /// Build a numeric column, mapping NaN to missing.
    pub fn numeric<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Column::Numeric(
            values
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect(),
        )
    }

    /// Build a fully populated numeric column.
    pub fn from_f64s<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Column::numeric(values.into_iter().map(Some))
    }

    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Column::Text(values.into_iter().map(|v| v.map(Into::into)).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// The cell at `row` rendered as a label, `None` when missing or out of range.
    pub fn label_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Numeric(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            Column::Text(v) => v.get(row).cloned().flatten(),
        }
    }

    /// Subtract `offset` from every numeric cell. Text is carried unchanged.
    fn shifted(&self, offset: f64) -> Column {
        match self {
            Column::Numeric(v) => Column::numeric(v.iter().map(|x| x.map(|x| x - offset))),
            Column::Text(v) => Column::Text(v.clone()),
        }
    }

    fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    fn labels(&self) -> Vec<Option<String>> {
        (0..self.len()).map(|i| self.label_at(i)).collect()
    }

    /// Append the cells of `other`. Mixing numeric and text cells yields a
    /// text column, mirroring how the CSV loader infers types.
    pub(crate) fn append(&mut self, other: Column) {
        let current = std::mem::replace(self, Column::Numeric(Vec::new()));
        *self = match (current, other) {
            (Column::Numeric(mut a), Column::Numeric(b)) => {
                a.extend(b);
                Column::Numeric(a)
            }
            (Column::Text(mut a), Column::Text(b)) => {
                a.extend(b);
                Column::Text(a)
            }
            (current, other) => {
                let mut merged = current.labels();
                merged.extend(other.labels());
                Column::Text(merged)
            }
        };
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded light curve
// ---------------------------------------------------------------------------

/// Rows are observations, columns are named fields of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Column names in file order.
    column_names: Vec<String>,
    columns: BTreeMap<String, Column>,
    n_rows: usize,
}

/// Band name → the observations taken in that band.
pub type BandDataset = BTreeMap<String, Table>;

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an all-numeric table from row-major data, as test fixtures do.
    pub fn from_rows<R>(names: &[&str], rows: &[R]) -> Result<Self, LcError>
    where
        R: AsRef<[f64]>,
    {
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for (row_no, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != names.len() {
                return Err(LcError::LengthMismatch {
                    column: format!("row {row_no}"),
                    expected: names.len(),
                    actual: row.len(),
                });
            }
            for (col, &value) in columns.iter_mut().zip(row) {
                col.push(value);
            }
        }

        let mut table = Table::new();
        for (name, values) in names.iter().zip(columns) {
            table.push_column(*name, Column::from_f64s(values))?;
        }
        Ok(table)
    }

    /// Builder-style [`Table::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, LcError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Append a column. The first column fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), LcError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(LcError::DuplicateColumn { column: name });
        }
        if self.column_names.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(LcError::LengthMismatch {
                column: name,
                expected: self.n_rows,
                actual: column.len(),
            });
        }
        self.column_names.push(name.clone());
        self.columns.insert(name, column);
        Ok(())
    }

    /// Number of observations (rows).
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column(&self, name: &str) -> Result<&Column, LcError> {
        self.columns.get(name).ok_or_else(|| LcError::ColumnNotFound {
            column: name.to_string(),
        })
    }

    /// Values of a numeric column; text columns are rejected.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], LcError> {
        self.column(name)?
            .as_numeric()
            .ok_or_else(|| LcError::NotNumeric {
                column: name.to_string(),
            })
    }

    /// A copy with `offset` subtracted from every numeric cell of every column.
    pub fn shifted(&self, offset: f64) -> Table {
        Table {
            column_names: self.column_names.clone(),
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), col.shifted(offset)))
                .collect(),
            n_rows: self.n_rows,
        }
    }

    /// A new table holding the given rows in the given order.
    ///
    /// Every index must be smaller than [`Table::len`].
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            column_names: self.column_names.clone(),
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), col.take(indices)))
                .collect(),
            n_rows: indices.len(),
        }
    }

    /// Concatenate the rows of `other`, matching columns by name.
    pub(crate) fn append_rows(&mut self, other: Table) -> Result<(), LcError> {
        if self.column_names.is_empty() {
            *self = other;
            return Ok(());
        }
        if other.column_names != self.column_names {
            let column = other
                .column_names
                .iter()
                .find(|name| !self.columns.contains_key(*name))
                .or_else(|| self.column_names.iter().find(|n| !other.columns.contains_key(*n)))
                .cloned()
                .unwrap_or_default();
            return Err(LcError::ColumnNotFound { column });
        }
        let added = other.n_rows;
        for (name, col) in other.columns {
            if let Some(existing) = self.columns.get_mut(&name) {
                existing.append(col);
            }
        }
        self.n_rows += added;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Table {
        Table::from_rows(&["a", "b", "c"], &[[8.0, 9.0, 1.0], [1.0, 4.0, 1.0]]).unwrap()
    }

    #[test]
    fn from_rows_builds_columns_in_order() {
        let t = abc();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column_names(), &["a", "b", "c"]);
        assert_eq!(t.numeric("b").unwrap(), &[Some(9.0), Some(4.0)]);
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows: Vec<Vec<f64>> = vec![vec![1.0, 2.0], vec![3.0]];
        let err = Table::from_rows(&["a", "b"], rows.as_slice()).unwrap_err();
        assert!(matches!(err, LcError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = abc().numeric("mag").unwrap_err();
        assert_eq!(err, LcError::ColumnNotFound { column: "mag".into() });
    }

    #[test]
    fn text_column_is_not_numeric() {
        let t = abc()
            .with_column("band", Column::text([Some("g"), Some("r")]))
            .unwrap();
        assert!(matches!(t.numeric("band"), Err(LcError::NotNumeric { .. })));
    }

    #[test]
    fn push_column_checks_length_and_duplicates() {
        let mut t = abc();
        assert!(matches!(
            t.push_column("d", Column::from_f64s([1.0])),
            Err(LcError::LengthMismatch { .. })
        ));
        assert!(matches!(
            t.push_column("a", Column::from_f64s([1.0, 2.0])),
            Err(LcError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn nan_becomes_missing() {
        let col = Column::from_f64s([1.0, f64::NAN]);
        assert_eq!(col.as_numeric().unwrap(), &[Some(1.0), None]);
    }

    #[test]
    fn shifted_subtracts_from_every_numeric_column() {
        let t = abc()
            .with_column("band", Column::text([Some("g"), None::<&str>]))
            .unwrap();
        let s = t.shifted(1.0);
        assert_eq!(s.numeric("a").unwrap(), &[Some(7.0), Some(0.0)]);
        assert_eq!(s.numeric("b").unwrap(), &[Some(8.0), Some(3.0)]);
        assert_eq!(s.column("band").unwrap(), t.column("band").unwrap());
    }

    #[test]
    fn take_rows_reorders() {
        let t = abc().take_rows(&[1, 0, 1]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.numeric("a").unwrap(), &[Some(1.0), Some(8.0), Some(1.0)]);
    }

    #[test]
    fn append_rows_promotes_numeric_to_text() {
        let mut a = Table::new()
            .with_column("id", Column::from_f64s([1.0]))
            .unwrap();
        let b = Table::new()
            .with_column("id", Column::text([Some("x2")]))
            .unwrap();
        a.append_rows(b).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(
            a.column("id").unwrap(),
            &Column::Text(vec![Some("1".into()), Some("x2".into())])
        );
    }
}
