//! Input normalization: reduces the accepted raw shapes to ordered groups of
//! named (index, values) series, validating shape and index compatibility
//! along the way.
//!
//! Shape dispatch happens exactly once, in [`classify`], which turns dynamic
//! JSON into the [`RawInput`] sum type. Everything after that matches on the
//! enum.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::style::{Alignment, PanelStyle, StyleInput};

use super::model::{
    IndexKind, IndexValue, IndexedSeries, InputKind, PanelsInput, RawInput, Record, Series,
    SeriesGroup, XRange,
};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Validation failures are synchronous and non-retryable: the caller must fix
/// the input and rebuild. No partial dashboards are produced.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(
        "data type is not valid: expected a record mapping, record list, \
         array, named array mapping or series, found {found}"
    )]
    TypeInvalid { found: String },

    #[error("elements are not uniformly typed, found: [{}]", .found.join(", "))]
    ShapeMismatch { found: Vec<String> },

    #[error("all arrays in one group should have the same length: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("all indices in one group should have the same type: expected {expected}, found {found}")]
    IndexTypeMismatch { expected: IndexKind, found: IndexKind },

    #[error("selected column '{column}' not found in record")]
    ColumnNotFound { column: String },

    #[error("style params list should contain one entry per panel: expected {expected}, found {found}")]
    ParamsCountMismatch { expected: usize, found: usize },

    #[error("invalid date '{value}' in 'date' column")]
    DateParse { value: String },
}

// ---------------------------------------------------------------------------
// Boundary classification: JSON → RawInput
// ---------------------------------------------------------------------------

fn json_kind_name(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Element-level shape inside a list or mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElemKind {
    Record,
    Array,
    Series,
    Other(&'static str),
}

impl ElemKind {
    fn name(self) -> &'static str {
        match self {
            ElemKind::Record => "record",
            ElemKind::Array => "array",
            ElemKind::Series => "series",
            ElemKind::Other(n) => n,
        }
    }
}

fn is_series_object(map: &serde_json::Map<String, JsonValue>) -> bool {
    map.len() == 2
        && matches!(map.get("index"), Some(JsonValue::Array(_)))
        && matches!(map.get("values"), Some(JsonValue::Array(_)))
}

fn elem_kind(v: &JsonValue) -> ElemKind {
    match v {
        JsonValue::Object(map) => {
            if is_series_object(map) {
                ElemKind::Series
            } else {
                ElemKind::Record
            }
        }
        JsonValue::Array(items) => {
            if items.iter().all(|x| x.is_number() || x.is_null()) {
                ElemKind::Array
            } else {
                ElemKind::Other("non-numeric array")
            }
        }
        other => ElemKind::Other(json_kind_name(other)),
    }
}

/// Check that `data` is one of the accepted top-level shapes and report which.
/// This is the cheap entry used by callers that only need validation.
pub fn validate_kind(data: &JsonValue) -> Result<InputKind, FormatError> {
    classify(data).map(|input| input.kind())
}

/// Resolve the input shape once, converting dynamic JSON into [`RawInput`].
///
/// Lists and mappings must be uniformly typed: every element a record, or
/// every element an array, or every element a series. Mixed collections fail
/// with [`FormatError::ShapeMismatch`] enumerating the offending kinds.
pub fn classify(data: &JsonValue) -> Result<RawInput, FormatError> {
    match data {
        JsonValue::Null => Ok(RawInput::Null),
        JsonValue::Array(items) => {
            if items.is_empty() {
                return Ok(RawInput::ArrayList(Vec::new()));
            }
            // A bare numeric array is wrapped into a one-element group.
            if items.iter().all(|x| x.is_number() || x.is_null()) {
                return Ok(RawInput::ArrayList(vec![json_numbers(items)?]));
            }
            let kinds: Vec<ElemKind> = items.iter().map(elem_kind).collect();
            if kinds.iter().all(|k| *k == ElemKind::Record) {
                let records = items
                    .iter()
                    .map(|v| parse_record(v.as_object().expect("record element")))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawInput::RecordList(records))
            } else if kinds.iter().all(|k| *k == ElemKind::Array) {
                let arrays = items
                    .iter()
                    .map(|v| json_numbers(v.as_array().expect("array element")))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawInput::ArrayList(arrays))
            } else if kinds.iter().all(|k| *k == ElemKind::Series) {
                let series = items
                    .iter()
                    .map(|v| parse_indexed_series(v.as_object().expect("series element")))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawInput::SeriesList(series))
            } else {
                Err(FormatError::ShapeMismatch {
                    found: kinds.iter().map(|k| k.name().to_string()).collect(),
                })
            }
        }
        JsonValue::Object(map) => {
            if map.is_empty() {
                return Ok(RawInput::RecordMap(Vec::new()));
            }
            // A bare series is wrapped into a one-element group.
            if is_series_object(map) {
                return Ok(RawInput::SeriesList(vec![parse_indexed_series(map)?]));
            }
            let kinds: Vec<ElemKind> = map.values().map(elem_kind).collect();
            if kinds.iter().all(|k| *k == ElemKind::Record) {
                let records = map
                    .iter()
                    .map(|(name, v)| {
                        parse_record(v.as_object().expect("record element"))
                            .map(|rec| (name.clone(), rec))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawInput::RecordMap(records))
            } else if kinds.iter().all(|k| *k == ElemKind::Array) {
                let arrays = map
                    .iter()
                    .map(|(name, v)| {
                        json_numbers(v.as_array().expect("array element"))
                            .map(|arr| (name.clone(), arr))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawInput::ArrayMap(arrays))
            } else if kinds.iter().all(|k| *k == ElemKind::Series) {
                let series = map
                    .iter()
                    .map(|(name, v)| {
                        parse_indexed_series(v.as_object().expect("series element"))
                            .map(|s| (name.clone(), s))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawInput::SeriesMap(series))
            } else {
                Err(FormatError::ShapeMismatch {
                    found: kinds.iter().map(|k| k.name().to_string()).collect(),
                })
            }
        }
        other => Err(FormatError::TypeInvalid {
            found: json_kind_name(other).to_string(),
        }),
    }
}

/// Numeric JSON array → values; `null` entries become NaN gaps.
fn json_numbers(items: &[JsonValue]) -> Result<Vec<f64>, FormatError> {
    items
        .iter()
        .map(|v| match v {
            JsonValue::Null => Ok(f64::NAN),
            other => other.as_f64().ok_or_else(|| FormatError::TypeInvalid {
                found: format!("{} in numeric array", json_kind_name(other)),
            }),
        })
        .collect()
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| FormatError::DateParse {
        value: s.to_string(),
    })
}

fn parse_record(obj: &serde_json::Map<String, JsonValue>) -> Result<Record, FormatError> {
    let mut record = Record::default();
    for (key, val) in obj {
        let items = val.as_array().ok_or_else(|| FormatError::TypeInvalid {
            found: format!("record field '{key}' of type {}", json_kind_name(val)),
        })?;
        if key == "date" {
            let dates = items
                .iter()
                .map(|v| match v {
                    JsonValue::String(s) => parse_date(s),
                    other => Err(FormatError::TypeInvalid {
                        found: format!("{} in 'date' column", json_kind_name(other)),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            record.dates = Some(dates);
        } else {
            record.columns.push((key.clone(), json_numbers(items)?));
        }
    }
    Ok(record)
}

fn parse_indexed_series(
    obj: &serde_json::Map<String, JsonValue>,
) -> Result<IndexedSeries, FormatError> {
    let index_items = obj
        .get("index")
        .and_then(JsonValue::as_array)
        .expect("series element has an index array");
    let value_items = obj
        .get("values")
        .and_then(JsonValue::as_array)
        .expect("series element has a values array");

    let index = index_items
        .iter()
        .map(|v| match v {
            JsonValue::String(s) => parse_date(s).map(IndexValue::Date),
            JsonValue::Number(n) => {
                n.as_i64()
                    .map(IndexValue::Ordinal)
                    .ok_or_else(|| FormatError::TypeInvalid {
                        found: "non-integer ordinal index".to_string(),
                    })
            }
            other => Err(FormatError::TypeInvalid {
                found: format!("{} in series index", json_kind_name(other)),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IndexedSeries {
        index,
        values: json_numbers(value_items)?,
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize one panel's raw input into a merged [`SeriesGroup`], returning
/// the series names in input order.
///
/// * Records contribute the column selected by `value_field`; a record's
///   `date` column, when present, becomes its index (set index wins over the
///   positional one).
/// * Unnamed (list) inputs get positional `series_{i}` names.
/// * Series sharing the group are outer-joined on their index; points absent
///   from a series become NaN gaps.
pub fn normalize(
    data: &RawInput,
    value_field: &str,
) -> Result<(SeriesGroup, Vec<String>), FormatError> {
    match data {
        RawInput::Null => Err(FormatError::TypeInvalid {
            found: "null".to_string(),
        }),
        RawInput::RecordList(records) => {
            let series = records
                .iter()
                .enumerate()
                .map(|(i, rec)| record_to_series(rec, format!("series_{i}"), value_field))
                .collect::<Result<Vec<_>, _>>()?;
            finish_group(merge_series(series)?)
        }
        RawInput::RecordMap(records) => {
            let series = records
                .iter()
                .map(|(name, rec)| record_to_series(rec, name.clone(), value_field))
                .collect::<Result<Vec<_>, _>>()?;
            finish_group(merge_series(series)?)
        }
        RawInput::ArrayList(arrays) => {
            let series = arrays
                .iter()
                .enumerate()
                .map(|(i, arr)| (format!("series_{i}"), arr))
                .collect::<Vec<_>>();
            finish_group(arrays_to_group(series)?)
        }
        RawInput::ArrayMap(arrays) => {
            let series = arrays
                .iter()
                .map(|(name, arr)| (name.clone(), arr))
                .collect::<Vec<_>>();
            finish_group(arrays_to_group(series)?)
        }
        RawInput::SeriesList(list) => {
            let series = list
                .iter()
                .enumerate()
                .map(|(i, s)| indexed_to_series(s, format!("series_{i}")))
                .collect::<Result<Vec<_>, _>>()?;
            finish_group(merge_series(series)?)
        }
        RawInput::SeriesMap(map) => {
            let series = map
                .iter()
                .map(|(name, s)| indexed_to_series(s, name.clone()))
                .collect::<Result<Vec<_>, _>>()?;
            finish_group(merge_series(series)?)
        }
    }
}

fn finish_group(group: SeriesGroup) -> Result<(SeriesGroup, Vec<String>), FormatError> {
    let names = group.names();
    Ok((group, names))
}

fn record_to_series(
    record: &Record,
    name: String,
    value_field: &str,
) -> Result<Series, FormatError> {
    let expected = record.row_count();
    for (_, col) in &record.columns {
        if col.len() != expected {
            return Err(FormatError::LengthMismatch {
                expected,
                found: col.len(),
            });
        }
    }
    if let Some(dates) = &record.dates {
        if dates.len() != expected {
            return Err(FormatError::LengthMismatch {
                expected,
                found: dates.len(),
            });
        }
    }

    let values = record
        .column(value_field)
        .ok_or_else(|| FormatError::ColumnNotFound {
            column: value_field.to_string(),
        })?
        .to_vec();

    // Set index wins over the positional one.
    let index: Vec<IndexValue> = match &record.dates {
        Some(dates) => dates.iter().copied().map(IndexValue::Date).collect(),
        None => (0..values.len() as i64).map(IndexValue::Ordinal).collect(),
    };

    Ok(Series {
        name,
        index,
        values,
    })
}

fn indexed_to_series(raw: &IndexedSeries, name: String) -> Result<Series, FormatError> {
    if raw.index.len() != raw.values.len() {
        return Err(FormatError::LengthMismatch {
            expected: raw.index.len(),
            found: raw.values.len(),
        });
    }
    Ok(Series {
        name,
        index: raw.index.clone(),
        values: raw.values.clone(),
    })
}

/// Raw arrays share one length (no join, ordinal index).
fn arrays_to_group(arrays: Vec<(String, &Vec<f64>)>) -> Result<SeriesGroup, FormatError> {
    let expected = arrays.first().map_or(0, |(_, arr)| arr.len());
    for (_, arr) in &arrays {
        if arr.len() != expected {
            return Err(FormatError::LengthMismatch {
                expected,
                found: arr.len(),
            });
        }
    }
    let series = arrays
        .into_iter()
        .map(|(name, arr)| Series {
            name,
            index: (0..expected as i64).map(IndexValue::Ordinal).collect(),
            values: arr.clone(),
        })
        .collect();
    Ok(SeriesGroup { series })
}

/// Outer-join a group of series on their indices. All indices must share one
/// kind; points a series does not cover become NaN gaps.
fn merge_series(mut series: Vec<Series>) -> Result<SeriesGroup, FormatError> {
    let mut expected: Option<IndexKind> = None;
    for s in &series {
        for iv in &s.index {
            let kind = iv.kind();
            match expected {
                Some(k) if k != kind => {
                    return Err(FormatError::IndexTypeMismatch { expected: k, found: kind });
                }
                Some(_) => {}
                None => expected = Some(kind),
            }
        }
    }

    // Nothing to join when every series already shares one index.
    let aligned = series
        .windows(2)
        .all(|pair| pair[0].index == pair[1].index);
    if aligned {
        return Ok(SeriesGroup { series });
    }

    let union: BTreeSet<IndexValue> = series
        .iter()
        .flat_map(|s| s.index.iter().copied())
        .collect();
    let merged_index: Vec<IndexValue> = union.into_iter().collect();

    for s in &mut series {
        let by_index: BTreeMap<IndexValue, f64> = s
            .index
            .iter()
            .copied()
            .zip(s.values.iter().copied())
            .collect();
        s.values = merged_index
            .iter()
            .map(|iv| by_index.get(iv).copied().unwrap_or(f64::NAN))
            .collect();
        s.index = merged_index.clone();
    }

    Ok(SeriesGroup { series })
}

// ---------------------------------------------------------------------------
// Dashboard-level formatting
// ---------------------------------------------------------------------------

/// The normalized form of a whole dashboard input.
#[derive(Debug, Clone)]
pub struct FormattedInput {
    /// (panel title, merged group), in input order.
    pub panels: Vec<(String, SeriesGroup)>,
    /// Unified x-span across every panel, `None` when no panel has data.
    pub x_range: Option<XRange>,
    /// Series names per panel, ordered like `panels`.
    pub names: Vec<Vec<String>>,
}

/// Top-level entry: normalize every panel and fold all indices into one
/// ordered range so each panel shares the same x-axis domain.
pub fn format_input_groups(
    input: &PanelsInput,
    value_field: &str,
) -> Result<FormattedInput, FormatError> {
    let named: Vec<(String, &RawInput)> = match input {
        PanelsInput::Named(panels) => panels.iter().map(|(t, d)| (t.clone(), d)).collect(),
        PanelsInput::Positional(panels) => panels
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("plot_{i}"), d))
            .collect(),
    };

    let mut panels = Vec::with_capacity(named.len());
    let mut names = Vec::with_capacity(named.len());
    let mut x_range: Option<XRange> = None;

    for (title, data) in named {
        let (group, group_names) = normalize(data, value_field)?;
        if let Some((lo, hi)) = group.index_limits() {
            x_range = Some(match x_range {
                Some(range) => {
                    if range.kind() != lo.kind() {
                        return Err(FormatError::IndexTypeMismatch {
                            expected: range.kind(),
                            found: lo.kind(),
                        });
                    }
                    XRange {
                        min: range.min.min(lo),
                        max: range.max.max(hi),
                    }
                }
                None => XRange { min: lo, max: hi },
            });
        }
        panels.push((title, group));
        names.push(group_names);
    }

    Ok(FormattedInput {
        panels,
        x_range,
        names,
    })
}

/// Resolve caller styling into one owned [`PanelStyle`] per panel, ordered
/// like `panel_titles`. Positional lists must match the panel count exactly.
pub fn format_style_params(
    panel_titles: &[String],
    params: &StyleInput,
) -> Result<Vec<PanelStyle>, FormatError> {
    match params {
        StyleInput::ByPanel(by_panel) => Ok(panel_titles
            .iter()
            .map(|title| by_panel.get(title).cloned().unwrap_or_default())
            .collect()),
        StyleInput::Positional(list) => {
            if list.len() != panel_titles.len() {
                return Err(FormatError::ParamsCountMismatch {
                    expected: panel_titles.len(),
                    found: list.len(),
                });
            }
            Ok(list.clone())
        }
    }
}

/// Resolve per-series axis alignment for every panel. Unset series default to
/// the left axis; alignment entries naming series absent from a panel are
/// dropped. Output ordering follows `names_by_panel`, not the caller mapping.
pub fn format_axis_alignment(
    alignment: &BTreeMap<String, Alignment>,
    names_by_panel: &[Vec<String>],
) -> Vec<Vec<(String, Alignment)>> {
    names_by_panel
        .iter()
        .map(|names| {
            names
                .iter()
                .map(|name| {
                    let al = alignment.get(name).copied().unwrap_or_default();
                    (name.clone(), al)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SIZE: usize = 50;

    fn uniform(len: usize) -> Vec<f64> {
        // Deterministic stand-in for uniform noise; values stay in [0, 100).
        (0..len).map(|i| ((i * 37 + 11) % 100) as f64).collect()
    }

    fn array_map_input(names: &[&str], len: usize) -> RawInput {
        RawInput::ArrayMap(
            names
                .iter()
                .map(|n| (n.to_string(), uniform(len)))
                .collect(),
        )
    }

    #[test]
    fn array_map_preserves_key_order() {
        let input = array_map_input(&["C", "A", "B"], SIZE);
        let (group, names) = normalize(&input, "adj_close").unwrap();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(group.names(), names);
    }

    #[test]
    fn array_map_round_trip() {
        let input = array_map_input(&["A", "B", "C"], SIZE);
        let (group, names) = normalize(&input, "adj_close").unwrap();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(group.len(), 3);
        for s in &group.series {
            assert_eq!(s.len(), SIZE);
            assert_eq!(s.index_kind(), Some(IndexKind::Ordinal));
        }
    }

    #[test]
    fn array_lengths_must_match() {
        let input = RawInput::ArrayMap(vec![
            ("A".to_string(), uniform(50)),
            ("B".to_string(), uniform(40)),
        ]);
        let err = normalize(&input, "adj_close").unwrap_err();
        match err {
            FormatError::LengthMismatch { expected, found } => {
                assert_eq!(expected, 50);
                assert_eq!(found, 40);
            }
            other => panic!("expected LengthMismatch, got {other:?}"),
        }
    }

    #[test]
    fn mixed_list_is_shape_mismatch() {
        let data = json!([{ "adj_close": [1.0, 2.0] }, [1.0, 2.0]]);
        let err = classify(&data).unwrap_err();
        match err {
            FormatError::ShapeMismatch { found } => {
                assert_eq!(found, vec!["record", "array"]);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn string_list_is_shape_mismatch() {
        let data = json!(["a", "b"]);
        assert!(matches!(
            classify(&data),
            Err(FormatError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn bare_array_and_series_are_wrapped() {
        let bare = classify(&json!([1.0, 2.0, 3.0])).unwrap();
        match bare {
            RawInput::ArrayList(arrays) => assert_eq!(arrays, vec![vec![1.0, 2.0, 3.0]]),
            other => panic!("expected single-array group, got {other:?}"),
        }

        let series = classify(&json!({ "index": [0, 1], "values": [5.0, 6.0] })).unwrap();
        match series {
            RawInput::SeriesList(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].values, vec![5.0, 6.0]);
            }
            other => panic!("expected single-series group, got {other:?}"),
        }
    }

    #[test]
    fn scalar_input_is_type_invalid() {
        let err = classify(&json!(10)).unwrap_err();
        match err {
            FormatError::TypeInvalid { found } => assert_eq!(found, "number"),
            other => panic!("expected TypeInvalid, got {other:?}"),
        }
    }

    #[test]
    fn null_passes_validation_but_not_normalization() {
        assert_eq!(validate_kind(&JsonValue::Null).unwrap(), InputKind::Null);
        assert!(matches!(
            normalize(&RawInput::Null, "adj_close"),
            Err(FormatError::TypeInvalid { .. })
        ));
    }

    #[test]
    fn record_list_extracts_value_field() {
        let arr0 = uniform(8);
        let arr1: Vec<f64> = uniform(8).iter().map(|v| v + 1000.0).collect();
        let data = json!([{ "col_0": arr0, "col_1": arr1.clone() }]);
        let input = classify(&data).unwrap();
        let (group, names) = normalize(&input, "col_1").unwrap();
        assert_eq!(names, vec!["series_0"]);
        assert_eq!(group.series[0].values, arr1);
    }

    #[test]
    fn missing_value_field_is_column_not_found() {
        let data = json!({ "AAPL": { "adj_close": [1.0, 2.0] } });
        let input = classify(&data).unwrap();
        let err = normalize(&input, "volume").unwrap_err();
        match err {
            FormatError::ColumnNotFound { column } => assert_eq!(column, "volume"),
            other => panic!("expected ColumnNotFound, got {other:?}"),
        }
    }

    #[test]
    fn record_date_column_becomes_index() {
        let data = json!({
            "AAPL": {
                "date": ["2017-01-02", "2017-01-03", "2017-01-04"],
                "adj_close": [100.0, 101.0, 99.5]
            }
        });
        let input = classify(&data).unwrap();
        let (group, _) = normalize(&input, "adj_close").unwrap();
        assert_eq!(group.index_kind(), Some(IndexKind::Date));
        assert_eq!(
            group.series[0].index[0],
            IndexValue::Date(parse_date("2017-01-02").unwrap())
        );
    }

    #[test]
    fn bad_date_is_reported() {
        let data = json!({
            "AAPL": { "date": ["not-a-date"], "adj_close": [1.0] }
        });
        assert!(matches!(
            classify(&data),
            Err(FormatError::DateParse { .. })
        ));
    }

    #[test]
    fn merge_unions_indices_with_gaps() {
        let data = json!({
            "AAPL": {
                "index": ["2017-01-02", "2017-01-03"],
                "values": [100.0, 101.0]
            },
            "GOOG": {
                "index": ["2017-01-03", "2017-01-04"],
                "values": [800.0, 802.0]
            }
        });
        let input = classify(&data).unwrap();
        let (group, names) = normalize(&input, "adj_close").unwrap();
        assert_eq!(names, vec!["AAPL", "GOOG"]);
        for s in &group.series {
            assert_eq!(s.len(), 3);
        }
        let aapl = &group.series[0];
        assert!(aapl.values[2].is_nan());
        let goog = &group.series[1];
        assert!(goog.values[0].is_nan());
        assert_eq!(goog.values[1], 800.0);
    }

    #[test]
    fn mixed_index_kinds_fail() {
        let input = RawInput::SeriesList(vec![
            IndexedSeries {
                index: (0..3).map(IndexValue::Ordinal).collect(),
                values: vec![1.0, 2.0, 3.0],
            },
            IndexedSeries {
                index: vec![IndexValue::Date(parse_date("2017-01-02").unwrap())],
                values: vec![1.0],
            },
        ]);
        assert!(matches!(
            normalize(&input, "adj_close"),
            Err(FormatError::IndexTypeMismatch { .. })
        ));
    }

    #[test]
    fn index_and_values_lengths_must_agree() {
        let input = RawInput::SeriesList(vec![IndexedSeries {
            index: (0..3).map(IndexValue::Ordinal).collect(),
            values: vec![1.0, 2.0],
        }]);
        assert!(matches!(
            normalize(&input, "adj_close"),
            Err(FormatError::LengthMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn shared_x_range_spans_all_panels() {
        let input = PanelsInput::Named(vec![
            ("p0".to_string(), array_map_input(&["A"], 10)),
            ("p1".to_string(), array_map_input(&["B"], 20)),
        ]);
        let formatted = format_input_groups(&input, "adj_close").unwrap();
        let range = formatted.x_range.unwrap();
        assert_eq!(range.min, IndexValue::Ordinal(0));
        assert_eq!(range.max, IndexValue::Ordinal(19));
        assert_eq!(formatted.names, vec![vec!["A"], vec!["B"]]);
    }

    #[test]
    fn positional_panels_get_synthesized_titles() {
        let input = PanelsInput::Positional(vec![
            array_map_input(&["A"], 5),
            array_map_input(&["B"], 5),
        ]);
        let formatted = format_input_groups(&input, "adj_close").unwrap();
        let titles: Vec<&str> = formatted
            .panels
            .iter()
            .map(|(t, _)| t.as_str())
            .collect();
        assert_eq!(titles, vec!["plot_0", "plot_1"]);
    }

    #[test]
    fn style_params_list_arity_is_checked() {
        let titles = vec!["p0".to_string(), "p1".to_string()];
        let params = StyleInput::Positional(vec![PanelStyle::default()]);
        let err = format_style_params(&titles, &params).unwrap_err();
        assert!(format!("{err}").contains("expected 2"));
        match err {
            FormatError::ParamsCountMismatch { expected, found } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected ParamsCountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn style_params_by_panel_fills_missing_panels() {
        let titles = vec!["stocks".to_string(), "avg".to_string()];
        let mut by_panel = BTreeMap::new();
        by_panel.insert(
            "avg".to_string(),
            PanelStyle {
                defaults: crate::style::LineStyleParams {
                    color: Some("orange".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let styles = format_style_params(&titles, &StyleInput::ByPanel(by_panel)).unwrap();
        assert_eq!(styles.len(), 2);
        assert!(styles[0].defaults.color.is_none());
        assert_eq!(styles[1].defaults.color.as_deref(), Some("orange"));
    }

    #[test]
    fn alignment_defaults_and_drops_unknown_names() {
        let mut alignment = BTreeMap::new();
        alignment.insert("GOOG".to_string(), Alignment::Right);
        alignment.insert("TSLA".to_string(), Alignment::Right); // not plotted

        let names = vec![vec!["AAPL".to_string(), "GOOG".to_string()]];
        let resolved = format_axis_alignment(&alignment, &names);
        assert_eq!(
            resolved,
            vec![vec![
                ("AAPL".to_string(), Alignment::Left),
                ("GOOG".to_string(), Alignment::Right),
            ]]
        );
    }
}
