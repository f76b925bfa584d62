//! Runtime record values

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A field value inside a record being encoded or decoded.
///
/// The codec converts these to and from Avro binary under the direction of
/// the record's resolved schema; which variant a schema slot accepts is
/// decided by the slot, not the value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    /// Backs both `int` and `long` slots
    Integer(i64),
    /// Backs both `float` and `double` slots
    Float(f64),
    Bytes(Vec<u8>),
    /// Backs `string`, `uuid`, and enum-symbol slots
    String(String),
    /// Decimal as unscaled integer plus scale
    ScaledInteger(i64, u32),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Array(Vec<FieldValue>),
    Map(HashMap<String, FieldValue>),
    /// A nested record
    Struct(HashMap<String, FieldValue>),
}

impl FieldValue {
    /// Type name for error messages and debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "NULL",
            FieldValue::Boolean(_) => "BOOLEAN",
            FieldValue::Integer(_) => "INTEGER",
            FieldValue::Float(_) => "FLOAT",
            FieldValue::Bytes(_) => "BYTES",
            FieldValue::String(_) => "STRING",
            FieldValue::ScaledInteger(_, _) => "DECIMAL",
            FieldValue::Date(_) => "DATE",
            FieldValue::Time(_) => "TIME",
            FieldValue::Timestamp(_) => "TIMESTAMP",
            FieldValue::Array(_) => "ARRAY",
            FieldValue::Map(_) => "MAP",
            FieldValue::Struct(_) => "STRUCT",
        }
    }
}
