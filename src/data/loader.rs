use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Dataset, dedupe_headers};

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// On-disk / on-wire encodings a dataset can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
    Parquet,
}

impl DataFormat {
    /// Pick a format from a file name or URL path. Unknown or missing
    /// extensions fall back to CSV.
    pub fn from_path(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "parquet" | "pq" => DataFormat::Parquet,
            "json" => DataFormat::Json,
            _ => DataFormat::Csv,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per row (default)
/// * `.json`    – `[{ "price": 9400, "model": "bmw x5", ... }, ...]`
/// * `.parquet` – flat table of scalar columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    let origin = path.display().to_string();
    match DataFormat::from_path(&origin) {
        DataFormat::Parquet => {
            let file = std::fs::File::open(path).context("opening parquet file")?;
            read_parquet(&origin, file)
        }
        DataFormat::Json => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&origin, &text)
        }
        DataFormat::Csv => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            read_csv(&origin, file)
        }
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per row.
/// Column types are inferred per column, see [`Column::from_text`].
pub fn read_csv<R: Read>(origin: &str, input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = dedupe_headers(
        &reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>(),
    );
    if headers.is_empty() {
        bail!("CSV has no header row");
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1, so data row `n` starts on line `n + 2` unless a
        // quoted field spans lines.
        let record = result.with_context(|| format!("CSV record {}", row_no + 1))?;
        if record.len() > headers.len() {
            let line = record.position().map_or(row_no as u64 + 2, |p| p.line());
            bail!(
                "CSV line {line}: {} fields but only {} columns",
                record.len(),
                headers.len()
            );
        }
        // Short rows are padded with missing values.
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::from_text(name, &cells))
        .collect();

    Dataset::new(origin, columns)
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "price": 9400, "model_year": 2011, "model": "bmw x5" },
///   ...
/// ]
/// ```
///
/// Column order follows first appearance of each key.
pub fn read_json(origin: &str, text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map_or(CellValue::Null, json_to_cell))
                .collect();
            Column::new(name, values)
        })
        .collect();

    Dataset::new(origin, columns)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Read a Parquet table of scalar columns from any chunk reader (a local
/// file or an in-memory HTTP body).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
pub fn read_parquet<R: ChunkReader + 'static>(origin: &str, input: R) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input)
        .context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, cells) in values.iter_mut().enumerate() {
            let col = batch.column(col_idx);
            cells.extend((0..batch.num_rows()).map(|row| extract_cell(col, row)));
        }
    }

    let columns = dedupe_headers(&names)
        .into_iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();

    Dataset::new(origin, columns)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Integer)
        }
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        _ => match arrow::util::display::array_value_to_string(col, row) {
            Ok(s) => CellValue::String(s),
            Err(_) => CellValue::Null,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{BooleanArray, Float64Array, Int32Array, StringArray, UInt64Array};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    use super::*;
    use crate::data::model::ColumnKind;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(DataFormat::from_path("vehicles_us.csv"), DataFormat::Csv);
        assert_eq!(DataFormat::from_path("/data/cars.PARQUET"), DataFormat::Parquet);
        assert_eq!(DataFormat::from_path("/raw/cars.json"), DataFormat::Json);
        assert_eq!(DataFormat::from_path("/raw/cars"), DataFormat::Csv);
    }

    #[test]
    fn reads_csv_with_mixed_columns() {
        let text = "price,model,odometer\n9400,bmw x5,145000\n25500,ford f-150,\n5500,hyundai sonata,110000\n";
        let ds = read_csv("inline", text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_names().collect::<Vec<_>>(), ["price", "model", "odometer"]);
        assert_eq!(ds.column("price").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(ds.column("model").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(ds.column("odometer").unwrap().null_count(), 1);
        assert_eq!(ds.origin, "inline");
    }

    #[test]
    fn pads_short_csv_rows() {
        let text = "a,b\n1,2\n3\n";
        let ds = read_csv("inline", text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.column("b").unwrap().values[1].is_null());
    }

    #[test]
    fn rejects_long_csv_rows() {
        let text = "a,b\n1,2,3\n";
        assert!(read_csv("inline", text.as_bytes()).is_err());
    }

    #[test]
    fn long_row_error_names_file_line() {
        let text = "a,b\n1,2\n3,4\n5,6,7\n";
        let err = read_csv("inline", text.as_bytes()).unwrap_err();
        assert_eq!(format!("{err:#}"), "CSV line 4: 3 fields but only 2 columns");
    }

    #[test]
    fn reads_json_records_in_key_order() {
        let text = r#"[
            {"speed": 120, "make": "ford", "price": 9400.5},
            {"speed": null, "make": "bmw", "price": 12000}
        ]"#;
        let ds = read_json("inline", text).unwrap();
        assert_eq!(ds.column_names().collect::<Vec<_>>(), ["speed", "make", "price"]);
        assert!(ds.column("speed").unwrap().is_numeric());
        assert!(ds.column("price").unwrap().is_numeric());
        assert_eq!(ds.column("price").unwrap().number(1), Some(12000.0));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        assert!(read_json("inline", r#"{"a": 1}"#).is_err());
        assert!(read_json("inline", "[1, 2]").is_err());
    }

    #[test]
    fn loads_csv_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vehicles_us.csv");
        std::fs::write(&path, "price,model\n1,a\n2,b\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.origin, path.display().to_string());
    }

    fn listings_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("model_year", DataType::Int32, true),
            Field::new("odometer", DataType::UInt64, false),
            Field::new("is_4wd", DataType::Boolean, true),
            Field::new("model", DataType::Utf8, true),
            Field::new("price", DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![Some(2011), None, Some(2015)])),
            Arc::new(UInt64Array::from(vec![145_000, 88_705, u64::MAX])),
            Arc::new(BooleanArray::from(vec![Some(true), Some(false), None])),
            Arc::new(StringArray::from(vec![Some("bmw x5"), None, Some("kia sorento")])),
            Arc::new(Float64Array::from(vec![Some(9400.0), Some(25500.5), None])),
        ];
        RecordBatch::try_new(schema, columns).unwrap()
    }

    #[test]
    fn reads_parquet_file_with_typed_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vehicles_us.parquet");
        let batch = listings_batch();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.column_names().collect::<Vec<_>>(),
            ["model_year", "odometer", "is_4wd", "model", "price"]
        );

        let year = ds.column("model_year").unwrap();
        assert_eq!(year.kind, ColumnKind::Numeric);
        assert_eq!(year.values[0], CellValue::Integer(2011));
        assert_eq!(year.null_count(), 1);

        let odometer = ds.column("odometer").unwrap();
        assert_eq!(odometer.kind, ColumnKind::Numeric);
        assert_eq!(odometer.values[1], CellValue::Integer(88_705));
        assert_eq!(odometer.values[2], CellValue::Float(u64::MAX as f64));

        let four_wd = ds.column("is_4wd").unwrap();
        assert_eq!(four_wd.kind, ColumnKind::Categorical);
        assert_eq!(four_wd.values[0], CellValue::Bool(true));
        assert!(four_wd.values[2].is_null());

        assert_eq!(ds.column("model").unwrap().kind, ColumnKind::Categorical);
        assert!(ds.column("model").unwrap().values[1].is_null());
        assert_eq!(ds.column("price").unwrap().number(1), Some(25500.5));
    }
}
