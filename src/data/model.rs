use std::collections::{BTreeSet, HashMap};
use std::fmt;

use anyhow::{Result, bail};
use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common dataframe dtypes.
/// Used as a `BTreeMap` / `BTreeSet` key downstream so it must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Non-finite floats count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn is_numeric_or_null(&self) -> bool {
        matches!(
            self,
            CellValue::Integer(_) | CellValue::Float(_) | CellValue::Null
        )
    }
}

/// Tokens read as a missing value in text sources.
const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.contains(&s.trim())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// One named column of the table.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Build a column from already-typed cells.
    ///
    /// The column is numeric when every non-null cell is an integer or a
    /// float; an all-null column counts as numeric.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let kind = if values.iter().all(CellValue::is_numeric_or_null) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        };
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Infer a single type for a column of raw text cells.
    ///
    /// Tried in order: integer, float, boolean, text. Missing tokens become
    /// [`CellValue::Null`] regardless of the inferred type.
    pub fn from_text<S: AsRef<str>>(name: impl Into<String>, raw: &[S]) -> Self {
        let present = || raw.iter().map(|s| s.as_ref()).filter(|s| !is_null_token(s));

        let convert = |f: &dyn Fn(&str) -> CellValue| -> Vec<CellValue> {
            raw.iter()
                .map(|s| {
                    let s = s.as_ref();
                    if is_null_token(s) {
                        CellValue::Null
                    } else {
                        f(s)
                    }
                })
                .collect()
        };

        let values = if present().all(|s| s.trim().parse::<i64>().is_ok()) {
            convert(&|s: &str| CellValue::Integer(s.trim().parse().unwrap_or_default()))
        } else if present().all(|s| s.trim().parse::<f64>().is_ok()) {
            convert(&|s: &str| CellValue::Float(s.trim().parse().unwrap_or(f64::NAN)))
        } else if present().all(|s| parse_bool(s).is_some()) {
            convert(&|s: &str| CellValue::Bool(parse_bool(s).unwrap_or_default()))
        } else {
            convert(&|s: &str| CellValue::String(s.to_string()))
        };

        Column::new(name, values)
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Finite numeric value at `row`, if any.
    pub fn number(&self, row: usize) -> Option<f64> {
        self.values.get(row).and_then(CellValue::as_f64)
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Sorted set of distinct values.
    pub fn unique_values(&self) -> BTreeSet<CellValue> {
        self.values.iter().cloned().collect()
    }
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, …
pub fn dedupe_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for h in headers {
        let base = h.as_ref().to_string();
        let mut name = base.clone();
        while out.contains(&name) {
            let n = seen.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{base}.{n}");
        }
        out.push(name);
    }
    out
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table. Immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Human-readable origin (path or URL) the table was loaded from.
    pub origin: String,
    /// Columns in source order.
    pub columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Assemble a table, checking that all columns have the same length.
    pub fn new(origin: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        for col in &columns {
            if col.values.len() != n_rows {
                bail!(
                    "column '{}' has {} rows, expected {n_rows}",
                    col.name,
                    col.values.len()
                );
            }
        }
        Ok(Dataset {
            origin: origin.into(),
            columns,
            n_rows,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All `(column, value)` pairs of one row, in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (&str, &CellValue)> {
        self.columns
            .iter()
            .filter_map(move |c| c.values.get(row).map(|v| (c.name.as_str(), v)))
    }
}
