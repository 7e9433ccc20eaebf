use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, LargeListArray, ListArray, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::formatter::{self, parse_date};
use super::model::{IndexValue, IndexedSeries, PanelsInput, RawInput};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load dashboard input from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – top-level object of named panels (or array of positional
///   panels); each panel value is any accepted raw input shape
/// * `.csv`     – wide table: optional `date` column plus one numeric column
///   per series; becomes a single panel
/// * `.parquet` – rows of `name`, optional `dates` list, `values` list;
///   becomes a single panel
pub fn load_file(path: &Path) -> Result<PanelsInput> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn panel_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plot_0")
        .to_string()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema: named panels, each holding any accepted input shape:
///
/// ```json
/// {
///   "stocks": { "AAPL": { "date": ["2017-01-02", ...], "adj_close": [...] },
///               "GOOG": { "date": [...], "adj_close": [...] } },
///   "avg":    { "AAPL_avg": [149.1, 150.0, ...] }
/// }
/// ```
///
/// Key order in the file is the panel / series order on screen.
fn load_json(path: &Path) -> Result<PanelsInput> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    match &root {
        JsonValue::Object(panels) => {
            let named = panels
                .iter()
                .map(|(name, value)| {
                    let kind = formatter::validate_kind(value)
                        .with_context(|| format!("panel '{name}'"))?;
                    log::debug!("panel '{name}' classified as {kind}");
                    formatter::classify(value)
                        .with_context(|| format!("panel '{name}'"))
                        .map(|raw| (name.clone(), raw))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(PanelsInput::Named(named))
        }
        JsonValue::Array(panels) => {
            let positional = panels
                .iter()
                .enumerate()
                .map(|(i, value)| formatter::classify(value).with_context(|| format!("panel {i}")))
                .collect::<Result<Vec<_>>>()?;
            Ok(PanelsInput::Positional(positional))
        }
        _ => bail!("Expected top-level JSON object or array of panels"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names; an optional `date` column
/// (`YYYY-MM-DD`) becomes the shared index, every other column one series.
/// Empty cells become gaps.
fn load_csv(path: &Path) -> Result<PanelsInput> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let date_idx = headers.iter().position(|h| h == "date");
    let value_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != date_idx)
        .map(|(i, name)| (i, name.clone()))
        .collect();

    let mut dates: Vec<IndexValue> = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); value_cols.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        if let Some(di) = date_idx {
            let raw = record.get(di).unwrap_or("");
            let date = parse_date(raw).with_context(|| format!("CSV row {row_no}"))?;
            dates.push(IndexValue::Date(date));
        }

        for (slot, (col_idx, col_name)) in value_cols.iter().enumerate() {
            let cell = record.get(*col_idx).unwrap_or("").trim();
            let value = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>().with_context(|| {
                    format!("CSV row {row_no}, column '{col_name}': '{cell}' is not a number")
                })?
            };
            columns[slot].push(value);
        }
    }

    let series = value_cols
        .into_iter()
        .zip(columns)
        .map(|((_, name), values)| {
            let index = if date_idx.is_some() {
                dates.clone()
            } else {
                (0..values.len() as i64).map(IndexValue::Ordinal).collect()
            };
            (name, IndexedSeries { index, values })
        })
        .collect();

    Ok(PanelsInput::Named(vec![(
        panel_title(path),
        RawInput::SeriesMap(series),
    )]))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load series data from a Parquet file.
///
/// Expected schema:
/// - `name`: Utf8 – series name
/// - `dates`: List<Utf8>, nullable – ISO dates; ordinal index when null
/// - `values`: List<Float64> or List<Float32> – the series values
fn load_parquet(path: &Path) -> Result<PanelsInput> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut series: Vec<(String, IndexedSeries)> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let name_idx = schema
            .index_of("name")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'name' column"))?;
        let values_idx = schema
            .index_of("values")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'values' column"))?;
        let dates_idx = schema.index_of("dates").ok();

        let name_col = batch.column(name_idx);
        let values_col = batch.column(values_idx);

        for row in 0..batch.num_rows() {
            let name = extract_string(name_col, row)
                .with_context(|| format!("Row {row}: failed to read 'name'"))?;
            let values = extract_f64_list(values_col, row)
                .with_context(|| format!("Row {row}: failed to read 'values'"))?;

            let index = match dates_idx {
                Some(di) if !batch.column(di).is_null(row) => {
                    let raw = extract_string_list(batch.column(di), row)
                        .with_context(|| format!("Row {row}: failed to read 'dates'"))?;
                    raw.iter()
                        .map(|s| parse_date(s).map(IndexValue::Date))
                        .collect::<Result<Vec<_>, _>>()
                        .with_context(|| format!("Row {row}: invalid date"))?
                }
                _ => (0..values.len() as i64).map(IndexValue::Ordinal).collect(),
            };

            series.push((name, IndexedSeries { index, values }));
        }
    }

    Ok(PanelsInput::Named(vec![(
        panel_title(path),
        RawInput::SeriesMap(series),
    )]))
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    // The inner array can be Float64 or Float32
    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

fn extract_string_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<String>> {
    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    let strings = values_array
        .as_any()
        .downcast_ref::<StringArray>()
        .context("expected Utf8 list items")?;
    Ok(strings.iter().map(|v| v.unwrap_or("").to_string()).collect())
}
