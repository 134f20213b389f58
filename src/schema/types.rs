//! Schema types

use crate::load::SqlValue;
use serde::{Deserialize, Serialize};

/// Coercion target of a destination column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueKind {
    Integer,
    Text,
    Boolean,
    Timestamp,
    Float,
    Unknown,
}

impl ValueKind {
    /// Resolve a kind from the destination's SQL type name.
    ///
    /// Parameters (`VARCHAR(64)`, `DECIMAL(18,3)`) and case are ignored.
    pub fn from_type_name(type_name: &str) -> Self {
        let upper = type_name.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();

        match base {
            "BIGINT" | "INT8" | "LONG" | "INTEGER" | "INT" | "INT4" | "INT32" | "SIGNED"
            | "SMALLINT" | "INT2" | "SHORT" | "TINYINT" | "INT1" | "HUGEINT" | "UBIGINT"
            | "UINTEGER" | "USMALLINT" | "UTINYINT" | "UHUGEINT" | "SERIAL" | "BIGSERIAL" => {
                ValueKind::Integer
            }
            "VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" | "CHARACTER"
            | "CHARACTER VARYING" => ValueKind::Text,
            "BOOLEAN" | "BOOL" | "LOGICAL" => ValueKind::Boolean,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT" | "FLOAT4" | "FLOAT8" | "REAL"
            | "DECIMAL" | "NUMERIC" => ValueKind::Float,
            "DATETIME" => ValueKind::Timestamp,
            other if other.starts_with("TIMESTAMP") => ValueKind::Timestamp,
            _ => ValueKind::Unknown,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "INTEGER"),
            ValueKind::Text => write!(f, "TEXT"),
            ValueKind::Boolean => write!(f, "BOOLEAN"),
            ValueKind::Timestamp => write!(f, "TIMESTAMP"),
            ValueKind::Float => write!(f, "FLOAT"),
            ValueKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Value range a numeric column can store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum NumericBounds {
    /// Integer column holding `min..=max`
    Integer { min: i128, max: i128 },
    /// Fixed-point column with `width` total and `scale` fractional digits
    Decimal { width: u32, scale: u32 },
    /// Single-precision float column
    Single,
}

impl NumericBounds {
    /// Storage bounds implied by a SQL type name, if narrower than the
    /// coerced value itself.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let upper = type_name.trim().to_ascii_uppercase();
        let (base, params) = match upper.split_once('(') {
            Some((base, rest)) => (base.trim(), Some(rest.trim_end_matches(')'))),
            None => (upper.as_str(), None),
        };

        let integer = |min: i128, max: i128| Some(NumericBounds::Integer { min, max });
        match base {
            "TINYINT" | "INT1" => integer(i8::MIN.into(), i8::MAX.into()),
            "SMALLINT" | "INT2" | "SHORT" => integer(i16::MIN.into(), i16::MAX.into()),
            "INTEGER" | "INT" | "INT4" | "INT32" | "SIGNED" | "SERIAL" => {
                integer(i32::MIN.into(), i32::MAX.into())
            }
            "UTINYINT" => integer(0, u8::MAX.into()),
            "USMALLINT" => integer(0, u16::MAX.into()),
            "UINTEGER" => integer(0, u32::MAX.into()),
            "UBIGINT" | "UHUGEINT" => integer(0, u64::MAX.into()),
            "REAL" | "FLOAT4" => Some(NumericBounds::Single),
            "DECIMAL" | "NUMERIC" => {
                let mut parts = params?.split(',').map(|p| p.trim().parse::<u32>());
                let width = parts.next()?.ok()?;
                let scale = match parts.next() {
                    Some(scale) => scale.ok()?,
                    None => 0,
                };
                (scale <= width).then_some(NumericBounds::Decimal { width, scale })
            }
            _ => None,
        }
    }

    /// Whether an integer fits
    pub fn admits_integer(&self, value: i64) -> bool {
        match *self {
            NumericBounds::Integer { min, max } => (min..=max).contains(&i128::from(value)),
            NumericBounds::Decimal { width, scale } => {
                Self::admits_decimal(value as f64, width, scale)
            }
            NumericBounds::Single => true,
        }
    }

    /// Whether a float fits
    pub fn admits_float(&self, value: f64) -> bool {
        match *self {
            NumericBounds::Decimal { width, scale } => Self::admits_decimal(value, width, scale),
            NumericBounds::Single => !value.is_finite() || value.abs() <= f64::from(f32::MAX),
            NumericBounds::Integer { .. } => true,
        }
    }

    // Rounded to `scale` digits, the value must keep fewer than `width` digits
    fn admits_decimal(value: f64, width: u32, scale: u32) -> bool {
        value.is_finite()
            && (value.abs() * 10f64.powi(scale as i32)).round() < 10f64.powi(width as i32)
    }
}

/// One destination column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name as reported by the destination
    pub name: String,
    /// Coercion target
    pub kind: ValueKind,
    /// Storage range for narrow numeric columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<NumericBounds>,
}

impl ColumnDef {
    /// Create a column definition without storage bounds
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            bounds: None,
        }
    }

    /// Create a column definition from the destination's SQL type name
    pub fn from_type_name(name: impl Into<String>, type_name: &str) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::from_type_name(type_name),
            bounds: NumericBounds::from_type_name(type_name),
        }
    }

    /// Whether a coerced value fits the column's storage range
    pub fn admits(&self, value: &SqlValue) -> bool {
        match (self.bounds, value) {
            (Some(bounds), SqlValue::Integer(i)) => bounds.admits_integer(*i),
            (Some(bounds), SqlValue::Float(f)) => bounds.admits_float(*f),
            _ => true,
        }
    }
}

/// Columns of one entity table in natural (ordinal) order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Table the schema was read from
    pub entity_type: String,
    /// Columns in destination order
    pub columns: Vec<ColumnDef>,
}

impl ColumnSchema {
    /// Create a schema
    pub fn new(entity_type: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            entity_type: entity_type.into(),
            columns,
        }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Kind of a named column
    pub fn kind_of(&self, column: &str) -> Option<ValueKind> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.kind)
    }

    /// Column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
