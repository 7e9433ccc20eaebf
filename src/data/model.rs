use std::fmt;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// IndexValue – a single x-axis position
// ---------------------------------------------------------------------------

/// Which kind of x-index a series carries. All series merged into one panel
/// must agree on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Date,
    Ordinal,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Date => write!(f, "date"),
            IndexKind::Ordinal => write!(f, "ordinal"),
        }
    }
}

/// One x-axis position: a calendar date or an ordinal row number.
/// `Ord` so indices can be unioned in a `BTreeSet` during merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexValue {
    /// Mixed-kind collections never survive validation, so the derived
    /// cross-kind ordering is only ever exercised transiently.
    Ordinal(i64),
    Date(NaiveDate),
}

impl IndexValue {
    pub fn kind(&self) -> IndexKind {
        match self {
            IndexValue::Date(_) => IndexKind::Date,
            IndexValue::Ordinal(_) => IndexKind::Ordinal,
        }
    }

    /// Plot-space coordinate: dates map to days from CE, ordinals to themselves.
    pub fn as_f64(&self) -> f64 {
        match self {
            IndexValue::Date(d) => f64::from(d.num_days_from_ce()),
            IndexValue::Ordinal(i) => *i as f64,
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            IndexValue::Ordinal(i) => write!(f, "{i}"),
        }
    }
}

/// Inverse of [`IndexValue::as_f64`] for date axes, used when formatting
/// axis ticks and hover labels back into calendar dates.
pub fn date_from_plot_coord(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

// ---------------------------------------------------------------------------
// Record – one raw input element (mapping of field → numeric column)
// ---------------------------------------------------------------------------

/// A raw record: named numeric columns of one shared length, optionally a
/// parsed `date` column used as the index for every series derived from it.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Field name → values, in input order.
    pub columns: Vec<(String, Vec<f64>)>,
    /// Parsed `date` column, if the record had one.
    pub dates: Option<Vec<NaiveDate>>,
}

impl Record {
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Shared length of the record's columns (0 for an empty record).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |(_, v)| v.len())
    }
}

// ---------------------------------------------------------------------------
// IndexedSeries / Series – normalized line data
// ---------------------------------------------------------------------------

/// A raw series that carries its own explicit index.
#[derive(Debug, Clone)]
pub struct IndexedSeries {
    pub index: Vec<IndexValue>,
    pub values: Vec<f64>,
}

/// A normalized, named series ready for rendering. `index` and `values`
/// always have equal length; gap points introduced by merging hold NaN.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub index: Vec<IndexValue>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index_kind(&self) -> Option<IndexKind> {
        self.index.first().map(IndexValue::kind)
    }

    /// Minimum / maximum of the finite values, ignoring NaN gaps.
    pub fn value_limits(&self) -> Option<(f64, f64)> {
        let mut limits: Option<(f64, f64)> = None;
        for &v in &self.values {
            if v.is_nan() {
                continue;
            }
            limits = Some(match limits {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        limits
    }
}

// ---------------------------------------------------------------------------
// SeriesGroup – all series of one panel
// ---------------------------------------------------------------------------

/// The ordered series sharing one display panel. After normalization all
/// members share one `IndexKind` and one merged index.
#[derive(Debug, Clone, Default)]
pub struct SeriesGroup {
    pub series: Vec<Series>,
}

impl SeriesGroup {
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn index_kind(&self) -> Option<IndexKind> {
        self.series.iter().find_map(Series::index_kind)
    }

    pub fn names(&self) -> Vec<String> {
        self.series.iter().map(|s| s.name.clone()).collect()
    }

    /// Span of all indices in the group, if any series has data.
    pub fn index_limits(&self) -> Option<(IndexValue, IndexValue)> {
        let mut limits: Option<(IndexValue, IndexValue)> = None;
        for s in &self.series {
            for &iv in &s.index {
                limits = Some(match limits {
                    Some((lo, hi)) => (lo.min(iv), hi.max(iv)),
                    None => (iv, iv),
                });
            }
        }
        limits
    }
}

// ---------------------------------------------------------------------------
// RawInput – tagged input shape, resolved once at the boundary
// ---------------------------------------------------------------------------

/// The shape of user-supplied panel data. Classification happens exactly once
/// (see `formatter::classify`); the rest of the pipeline matches on this enum
/// and never re-inspects dynamic values.
#[derive(Debug, Clone)]
pub enum RawInput {
    /// Accepted by validation, rejected by normalization.
    Null,
    /// Sequence of records.
    RecordList(Vec<Record>),
    /// Mapping name → record, in input order.
    RecordMap(Vec<(String, Record)>),
    /// Sequence of raw numeric arrays.
    ArrayList(Vec<Vec<f64>>),
    /// Mapping name → numeric sequence, in input order.
    ArrayMap(Vec<(String, Vec<f64>)>),
    /// Sequence of series carrying their own index.
    SeriesList(Vec<IndexedSeries>),
    /// Mapping name → series carrying its own index, in input order.
    SeriesMap(Vec<(String, IndexedSeries)>),
}

impl RawInput {
    pub fn kind(&self) -> InputKind {
        match self {
            RawInput::Null => InputKind::Null,
            RawInput::RecordList(_) => InputKind::RecordList,
            RawInput::RecordMap(_) => InputKind::RecordMap,
            RawInput::ArrayList(_) => InputKind::ArrayList,
            RawInput::ArrayMap(_) => InputKind::ArrayMap,
            RawInput::SeriesList(_) => InputKind::SeriesList,
            RawInput::SeriesMap(_) => InputKind::SeriesMap,
        }
    }
}

/// Discriminator for [`RawInput`], also used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Null,
    RecordList,
    RecordMap,
    ArrayList,
    ArrayMap,
    SeriesList,
    SeriesMap,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Null => "null",
            InputKind::RecordList => "record list",
            InputKind::RecordMap => "record mapping",
            InputKind::ArrayList => "array list",
            InputKind::ArrayMap => "named array mapping",
            InputKind::SeriesList => "series list",
            InputKind::SeriesMap => "series mapping",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// PanelsInput / XRange – dashboard-level input and shared axis span
// ---------------------------------------------------------------------------

/// Top-level dashboard input: one `RawInput` per panel, either named or
/// positional (positional panels get synthesized `plot_{i}` titles).
#[derive(Debug, Clone)]
pub enum PanelsInput {
    Named(Vec<(String, RawInput)>),
    Positional(Vec<RawInput>),
}

impl PanelsInput {
    pub fn panel_count(&self) -> usize {
        match self {
            PanelsInput::Named(v) => v.len(),
            PanelsInput::Positional(v) => v.len(),
        }
    }
}

/// The x-axis span shared by every panel of a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRange {
    pub min: IndexValue,
    pub max: IndexValue,
}

impl XRange {
    pub fn kind(&self) -> IndexKind {
        self.min.kind()
    }
}
