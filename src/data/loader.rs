use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Table};

/// Cells treated as missing when reading text formats.
const DEFAULT_NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

static JSON_NULL: JsonValue = JsonValue::Null;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How delimited text is parsed.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    delimiter: u8,
    null_markers: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field delimiter for text files (default: comma).
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the set of cell values read as missing.
    pub fn null_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    fn is_null(&self, cell: &str) -> bool {
        self.null_markers.iter().any(|m| m == cell)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a light-curve table from a file, first row as header.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Table> {
    load_dataset_with(path, &LoadOptions::default())
}

/// Load a table with explicit options.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – flat numeric and string columns
/// * `.json`            – `[{ "mjd": 59000.1, "band": "g", "psfMag": 21.3 }, ...]`
/// * `.tsv`             – tab-separated text
/// * anything else      – delimited text using `options.delimiter`
pub fn load_dataset_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Table> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "tsv" => load_delimited(path, &options.clone().delimiter(b'\t')),
        _ => load_delimited(path, options),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::debug!(
        "Loaded {} rows × {} columns from {}",
        table.len(),
        table.column_names().len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one observation per line.
/// A column is numeric when every non-missing cell parses as a float
/// (surrounding whitespace ignored); text cells are kept verbatim.
fn load_delimited(path: &Path, options: &LoadOptions) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .from_path(path)
        .context("opening delimited file")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        bail!("no header row");
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        for (col, value) in cells.iter_mut().zip(record.iter()) {
            col.push(value.to_string());
        }
    }

    let mut table = Table::new();
    for (name, raw) in headers.into_iter().zip(cells) {
        let column = infer_column(&raw, options);
        table.push_column(name, column)?;
    }
    Ok(table)
}

fn infer_column(raw: &[String], options: &LoadOptions) -> Column {
    let parsed: Option<Vec<Option<f64>>> = raw
        .iter()
        .map(|cell| {
            if options.is_null(cell) {
                Some(None)
            } else {
                cell.trim().parse::<f64>().ok().map(Some)
            }
        })
        .collect();

    match parsed {
        Some(values) => Column::numeric(values),
        None => Column::text(
            raw.iter()
                .map(|cell| (!options.is_null(cell)).then(|| cell.clone())),
        ),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Keys absent from a record are missing values for that row.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut order: Vec<String> = Vec::new();
    let mut cells: BTreeMap<String, Vec<&JsonValue>> = BTreeMap::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !cells.contains_key(key) {
                order.push(key.clone());
                cells.insert(key.clone(), vec![&JSON_NULL; i]);
            }
        }
        for (key, col) in cells.iter_mut() {
            col.push(obj.get(key).unwrap_or(&JSON_NULL));
        }
    }

    let mut table = Table::new();
    for name in order {
        let values = cells.remove(&name).unwrap_or_default();
        table.push_column(name, json_to_column(&values))?;
    }
    Ok(table)
}

fn json_to_column(values: &[&JsonValue]) -> Column {
    let all_numeric = values
        .iter()
        .all(|v| matches!(v, JsonValue::Number(_) | JsonValue::Null));
    if all_numeric {
        return Column::numeric(values.iter().map(|v| v.as_f64()));
    }
    Column::text(values.iter().map(|v| match v {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Integer and float columns become numeric; string and boolean columns
/// become text. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let mut chunk = Table::new();
        for (field, col) in schema.fields().iter().zip(batch.columns()) {
            let column = arrow_to_column(col)
                .with_context(|| format!("column '{}'", field.name()))?;
            chunk.push_column(field.name().clone(), column)?;
        }
        table.append_rows(chunk)?;
    }

    Ok(table)
}

// -- Parquet / Arrow helpers --

/// Convert one Arrow array into a column, nulls becoming missing cells.
fn arrow_to_column(col: &ArrayRef) -> Result<Column> {
    let column = match col.data_type() {
        DataType::Float64 => Column::numeric(
            col.as_primitive_opt::<Float64Type>()
                .context("expected Float64 array")?
                .iter(),
        ),
        DataType::Float32 => Column::numeric(
            col.as_primitive_opt::<Float32Type>()
                .context("expected Float32 array")?
                .iter()
                .map(|v| v.map(f64::from)),
        ),
        DataType::Int64 => Column::numeric(
            col.as_primitive_opt::<Int64Type>()
                .context("expected Int64 array")?
                .iter()
                .map(|v| v.map(|i| i as f64)),
        ),
        DataType::Int32 => Column::numeric(
            col.as_primitive_opt::<Int32Type>()
                .context("expected Int32 array")?
                .iter()
                .map(|v| v.map(f64::from)),
        ),
        DataType::Utf8 => Column::text(
            col.as_string_opt::<i32>()
                .context("expected Utf8 array")?
                .iter(),
        ),
        DataType::LargeUtf8 => Column::text(
            col.as_string_opt::<i64>()
                .context("expected LargeUtf8 array")?
                .iter(),
        ),
        DataType::Boolean => Column::text(
            col.as_boolean_opt()
                .context("expected Boolean array")?
                .iter()
                .map(|v| v.map(|b| b.to_string())),
        ),
        other => bail!("unsupported column type {other:?}"),
    };
    debug_assert_eq!(column.len(), col.len());
    Ok(column)
}
