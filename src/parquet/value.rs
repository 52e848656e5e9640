/*******************************************************************************
 *     ___                  _   ____  ____
 *    / _ \ _   _  ___  ___| |_|  _ \| __ )
 *   | | | | | | |/ _ \/ __| __| | | |  _ \
 *   | |_| | |_| |  __/\__ \ |_| |_| | |_) |
 *    \__\_\\__,_|\___||___/\__|____/|____/
 *
 *  Copyright (c) 2014-2019 Appsicle
 *  Copyright (c) 2019-2026 QuestDB
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *  http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 *
 ******************************************************************************/

use std::cmp::Ordering;

use crate::parquet::error::{fmt_err, ParquetError, ParquetResult};
use crate::parquet::schema::{PhysicalType, SortOrder};

/// A single non-null value of a leaf column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Int96([u32; 3]),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    FixedLenByteArray(Vec<u8>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::ByteArray(s.into().into_bytes())
    }

    /// Whether this value can be stored in a column of `physical_type`.
    pub fn matches(&self, physical_type: PhysicalType) -> bool {
        match (self, physical_type) {
            (Value::Boolean(_), PhysicalType::Boolean)
            | (Value::Int32(_), PhysicalType::Int32)
            | (Value::Int64(_), PhysicalType::Int64)
            | (Value::Int96(_), PhysicalType::Int96)
            | (Value::Float(_), PhysicalType::Float)
            | (Value::Double(_), PhysicalType::Double)
            | (Value::ByteArray(_), PhysicalType::ByteArray) => true,
            (Value::FixedLenByteArray(v), PhysicalType::FixedLenByteArray(len)) => v.len() == len,
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "BOOLEAN",
            Value::Int32(_) => "INT32",
            Value::Int64(_) => "INT64",
            Value::Int96(_) => "INT96",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::ByteArray(_) => "BYTE_ARRAY",
            Value::FixedLenByteArray(_) => "FIXED_LEN_BYTE_ARRAY",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteArray(v) | Value::FixedLenByteArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Value::Float(v) => v.is_nan(),
            Value::Double(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Approximate number of bytes the value takes in PLAIN encoding.
    pub fn plain_size(&self) -> usize {
        match self {
            Value::Boolean(_) => 1,
            Value::Int32(_) | Value::Float(_) => 4,
            Value::Int64(_) | Value::Double(_) => 8,
            Value::Int96(_) => 12,
            Value::ByteArray(v) => 4 + v.len(),
            Value::FixedLenByteArray(v) => v.len(),
        }
    }
}

/// Compares two values of the same column under `order`.
///
/// Values of different variants compare by variant, which never happens for values
/// of a single column.
pub fn compare(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    let unsigned = order == SortOrder::Unsigned;
    match (a, b) {
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        (Value::Int32(a), Value::Int32(b)) if unsigned => (*a as u32).cmp(&(*b as u32)),
        (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
        (Value::Int64(a), Value::Int64(b)) if unsigned => (*a as u64).cmp(&(*b as u64)),
        (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
        (Value::Int96(a), Value::Int96(b)) => a.iter().rev().cmp(b.iter().rev()),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
        (Value::ByteArray(a), Value::ByteArray(b)) => a.cmp(b),
        (Value::FixedLenByteArray(a), Value::FixedLenByteArray(b)) => a.cmp(b),
        _ => variant_rank(a).cmp(&variant_rank(b)),
    }
}

fn variant_rank(value: &Value) -> u8 {
    match value {
        Value::Boolean(_) => 0,
        Value::Int32(_) => 1,
        Value::Int64(_) => 2,
        Value::Int96(_) => 3,
        Value::Float(_) => 4,
        Value::Double(_) => 5,
        Value::ByteArray(_) => 6,
        Value::FixedLenByteArray(_) => 7,
    }
}

/// A node of a row: the value tree mirroring the schema tree.
///
/// Required fields hold their value directly, optional fields may be `Null`,
/// repeated fields are `Repeated` and a group is a `Group` of its fields in schema order.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Value(Value),
    Group(Vec<Field>),
    Repeated(Vec<Field>),
}

impl Field {
    pub fn repeated<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Field>,
    {
        Field::Repeated(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Field::Null => "null",
            Field::Value(v) => v.type_name(),
            Field::Group(_) => "group",
            Field::Repeated(_) => "repeated",
        }
    }

    fn mismatch(&self, expected: &str) -> ParquetError {
        fmt_err!(
            SchemaMismatch,
            "expected {expected}, found {} field",
            self.kind()
        )
    }

    /// Converts an optional field, mapping `Null` to `None`.
    pub fn into_option<T>(self) -> ParquetResult<Option<T>>
    where
        T: TryFrom<Field, Error = ParquetError>,
    {
        match self {
            Field::Null => Ok(None),
            field => T::try_from(field).map(Some),
        }
    }

    /// Converts a repeated field into a vector.
    pub fn into_vec<T>(self) -> ParquetResult<Vec<T>>
    where
        T: TryFrom<Field, Error = ParquetError>,
    {
        match self {
            Field::Repeated(items) => items.into_iter().map(T::try_from).collect(),
            field => Err(field.mismatch("repeated")),
        }
    }

    /// Returns the fields of a group.
    pub fn into_group(self) -> ParquetResult<Vec<Field>> {
        match self {
            Field::Group(fields) => Ok(fields),
            field => Err(field.mismatch("group")),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Value(value)
    }
}

impl<T: Into<Field>> From<Option<T>> for Field {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Field::Null)
    }
}

macro_rules! scalar_conversions {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Field {
            fn from(value: $ty) -> Self {
                Field::Value(Value::$variant(value))
            }
        }

        impl TryFrom<Field> for $ty {
            type Error = ParquetError;

            fn try_from(field: Field) -> ParquetResult<Self> {
                match field {
                    Field::Value(Value::$variant(v)) => Ok(v),
                    field => Err(field.mismatch(stringify!($variant))),
                }
            }
        }
    };
}

scalar_conversions!(bool, Boolean);
scalar_conversions!(i32, Int32);
scalar_conversions!(i64, Int64);
scalar_conversions!(f32, Float);
scalar_conversions!(f64, Double);

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Value(Value::string(value))
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Value(Value::ByteArray(value.into_bytes()))
    }
}

impl From<Vec<u8>> for Field {
    fn from(value: Vec<u8>) -> Self {
        Field::Value(Value::ByteArray(value))
    }
}

impl TryFrom<Field> for String {
    type Error = ParquetError;

    fn try_from(field: Field) -> ParquetResult<Self> {
        let bytes = Vec::<u8>::try_from(field)?;
        String::from_utf8(bytes).map_err(|e| ParquetError::from(e.utf8_error()))
    }
}

impl TryFrom<Field> for Vec<u8> {
    type Error = ParquetError;

    fn try_from(field: Field) -> ParquetResult<Self> {
        match field {
            Field::Value(Value::ByteArray(v)) | Field::Value(Value::FixedLenByteArray(v)) => Ok(v),
            field => Err(field.mismatch("BYTE_ARRAY")),
        }
    }
}

impl TryFrom<Field> for Value {
    type Error = ParquetError;

    fn try_from(field: Field) -> ParquetResult<Self> {
        match field {
            Field::Value(v) => Ok(v),
            field => Err(field.mismatch("value")),
        }
    }
}

/// One entry of a leaf column: repetition and definition levels plus the value when it is
/// defined at the leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Triplet {
    pub def: i16,
    pub rep: i16,
    pub value: Option<Value>,
}

/// A logical row: one field per top level schema field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row(Vec<Field>);

impl Row {
    pub fn new(fields: Vec<Field>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Field> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.0
    }
}

impl From<Vec<Field>> for Row {
    fn from(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

impl IntoIterator for Row {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
