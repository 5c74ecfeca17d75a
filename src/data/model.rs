use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Column names consumed by the aggregators
// ---------------------------------------------------------------------------

pub mod columns {
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const CITY: &str = "City";
    pub const MODEL_YEAR: &str = "Model Year";
    pub const ELECTRIC_RANGE: &str = "Electric Range";
    pub const BASE_MSRP: &str = "Base MSRP";
    pub const EV_TYPE: &str = "Electric Vehicle Type";
    pub const CAFV_ELIGIBILITY: &str = "Clean Alternative Fuel Vehicle (CAFV) Eligibility";
}

// ---------------------------------------------------------------------------
// FieldValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value after best-effort numeric coercion.
/// Used as a grouping key, so it must be `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so we can put FieldValue in ordered collections --

/// Equality follows `Ord`, so `Eq`, `Ord` and `Hash` agree on every value.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    /// Nulls first, then numbers (integers and floats compared by value),
    /// then text.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn rank(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) | Float(_) => 1,
                Text(_) => 2,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Null, Null) => std::cmp::Ordering::Equal,
            _ => {
                // Mixed integer/float: compare numerically, then put the
                // integer first so the order stays total.
                let (a, b) = (self.as_f64().unwrap_or(0.0), other.as_f64().unwrap_or(0.0));
                a.total_cmp(&b).then_with(|| match (self, other) {
                    (Integer(_), Float(_)) => std::cmp::Ordering::Less,
                    (Float(_), Integer(_)) => std::cmp::Ordering::Greater,
                    _ => std::cmp::Ordering::Equal,
                })
            }
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Text(s) => s.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Null => {}
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    /// Coerce a raw CSV cell.
    ///
    /// Only cells that are *entirely* a decimal literal become numbers;
    /// `"120 miles"`, `"inf"` and `"NaN"` stay text. Empty cells are `Null`.
    pub fn coerce(raw: &str) -> FieldValue {
        let s = raw.trim();
        if s.is_empty() {
            return FieldValue::Null;
        }
        if is_decimal_literal(s) {
            if let Ok(i) = s.parse::<i64>() {
                return FieldValue::Integer(i);
            }
            if let Ok(f) = s.parse::<f64>() {
                if f.is_finite() {
                    return FieldValue::Float(f);
                }
            }
        }
        FieldValue::Text(raw.to_string())
    }

    /// Numeric view of the value, `None` for text and null.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// `-?(digits[.digits?] | .digits)([eE][+-]?digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

// ---------------------------------------------------------------------------
// VehicleRecord – one row of the registration table
// ---------------------------------------------------------------------------

/// A single registration (one CSV row): column_name → coerced value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleRecord {
    pub fields: BTreeMap<String, FieldValue>,
}

impl VehicleRecord {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Grouping key for `column`: trimmed text, or the display form of a
    /// numeric cell. Missing, null and blank cells yield `None`.
    pub fn key(&self, column: &str) -> Option<String> {
        match self.fields.get(column)? {
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            FieldValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Numeric value of `column`, `None` when absent or non-numeric.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.fields.get(column).and_then(FieldValue::as_f64)
    }

    pub fn make(&self) -> Option<String> {
        self.key(columns::MAKE)
    }

    pub fn model(&self) -> Option<String> {
        self.key(columns::MODEL)
    }

    pub fn city(&self) -> Option<String> {
        self.key(columns::CITY)
    }

    /// Model year; only integral cells count.
    pub fn model_year(&self) -> Option<i64> {
        self.fields.get(columns::MODEL_YEAR).and_then(FieldValue::as_i64)
    }

    pub fn electric_range(&self) -> Option<f64> {
        self.number(columns::ELECTRIC_RANGE)
    }

    /// Base MSRP; `Some(0.0)` means "not reported" and is left to callers.
    pub fn base_msrp(&self) -> Option<f64> {
        self.number(columns::BASE_MSRP)
    }

    pub fn ev_type(&self) -> Option<String> {
        self.key(columns::EV_TYPE)
    }

    pub fn cafv_eligibility(&self) -> Option<String> {
        self.key(columns::CAFV_ELIGIBILITY)
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for VehicleRecord {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        VehicleRecord {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Never mutated after loading.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records, in file order.
    pub records: Vec<VehicleRecord>,
    /// Header columns in file order.
    pub column_names: Vec<String>,
}

impl Dataset {
    pub fn new(column_names: Vec<String>, records: Vec<VehicleRecord>) -> Self {
        Dataset {
            records,
            column_names,
        }
    }

    /// Build a dataset from records alone; columns are collected in
    /// first-seen order.
    pub fn from_records(records: Vec<VehicleRecord>) -> Self {
        let mut column_names: Vec<String> = Vec::new();
        for rec in &records {
            for col in rec.fields.keys() {
                if !column_names.contains(col) {
                    column_names.push(col.clone());
                }
            }
        }
        Dataset {
            records,
            column_names,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }
}
