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

//! Typed rows: conversion between caller types and [`Row`]s, and the generic reader and
//! writer built on it.
use std::io::Write;
use std::marker::PhantomData;

use serde_json::{Map, Number, Value as Json};

use crate::parquet::error::{fmt_err, ParquetErrorExt, ParquetResult};
use crate::parquet::io::ReadAt;
use crate::parquet::schema::{LogicalType, Node, NodeKind, PhysicalType, Repetition, Schema};
use crate::parquet::value::{Field, Row, Value};
use crate::parquet_read::{ParquetFile, RowReader};
use crate::parquet_write::{ParquetWriter, WriterOptions};

/// A type that converts to and from rows of a schema.
pub trait ParquetRow: Sized {
    /// Converts `self` to a row of `schema`.
    fn to_row(&self, schema: &Schema) -> ParquetResult<Row>;

    /// Builds a value from a row read with `schema`.
    fn from_row(row: Row, schema: &Schema) -> ParquetResult<Self>;
}

impl ParquetRow for Row {
    fn to_row(&self, _schema: &Schema) -> ParquetResult<Row> {
        Ok(self.clone())
    }

    fn from_row(row: Row, _schema: &Schema) -> ParquetResult<Self> {
        Ok(row)
    }
}

/// JSON objects are rows addressed by field name. Missing fields are null.
impl ParquetRow for Json {
    fn to_row(&self, schema: &Schema) -> ParquetResult<Row> {
        let object = self
            .as_object()
            .ok_or_else(|| fmt_err!(SchemaMismatch, "a json row must be an object"))?;
        object_to_fields(object, schema.fields()).map(Row::new)
    }

    fn from_row(row: Row, schema: &Schema) -> ParquetResult<Self> {
        fields_to_object(row.into_fields(), schema.fields())
    }
}

fn object_to_fields(object: &Map<String, Json>, nodes: &[Node]) -> ParquetResult<Vec<Field>> {
    if let Some(unknown) = object.keys().find(|key| !nodes.iter().any(|n| n.name() == *key)) {
        return Err(fmt_err!(SchemaMismatch, "the schema has no field {unknown}"));
    }
    nodes
        .iter()
        .map(|node| {
            json_to_field(node, object.get(node.name()).unwrap_or(&Json::Null))
                .with_context(|_| format!("field {}", node.name()))
        })
        .collect()
}

fn json_to_field(node: &Node, json: &Json) -> ParquetResult<Field> {
    match (node.repetition(), json) {
        (Repetition::Optional | Repetition::Repeated, Json::Null) => Ok(Field::Null),
        (Repetition::Repeated, Json::Array(items)) => items
            .iter()
            .map(|item| json_to_instance(node, item))
            .collect::<ParquetResult<Vec<_>>>()
            .map(Field::Repeated),
        (Repetition::Repeated, other) => Err(fmt_err!(
            SchemaMismatch,
            "repeated field expects an array, found {other}"
        )),
        _ => json_to_instance(node, json),
    }
}

fn json_to_instance(node: &Node, json: &Json) -> ParquetResult<Field> {
    match node.kind() {
        NodeKind::Group(children) => match json {
            Json::Object(object) => object_to_fields(object, children).map(Field::Group),
            other => Err(fmt_err!(SchemaMismatch, "group expects an object, found {other}")),
        },
        NodeKind::Primitive { physical_type, .. } => {
            json_to_value(*physical_type, node.logical_type(), json).map(Field::Value)
        }
    }
}

fn json_to_value(
    physical_type: PhysicalType,
    logical_type: Option<LogicalType>,
    json: &Json,
) -> ParquetResult<Value> {
    let mismatch =
        || fmt_err!(SchemaMismatch, "{json} cannot be stored in a {physical_type:?} column");
    let unsigned = matches!(logical_type, Some(LogicalType::Integer { signed: false, .. }));
    match physical_type {
        PhysicalType::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(mismatch),
        PhysicalType::Int32 if unsigned => json
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(|v| Value::Int32(v as i32))
            .ok_or_else(mismatch),
        PhysicalType::Int32 => json
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int32)
            .ok_or_else(mismatch),
        PhysicalType::Int64 if unsigned => json
            .as_u64()
            .map(|v| Value::Int64(v as i64))
            .ok_or_else(mismatch),
        PhysicalType::Int64 => json.as_i64().map(Value::Int64).ok_or_else(mismatch),
        PhysicalType::Float => json.as_f64().map(|v| Value::Float(v as f32)).ok_or_else(mismatch),
        PhysicalType::Double => json.as_f64().map(Value::Double).ok_or_else(mismatch),
        PhysicalType::ByteArray => match (logical_type, json) {
            (_, Json::String(s)) => Ok(Value::string(s.as_str())),
            (Some(LogicalType::Json), other) => {
                Ok(Value::ByteArray(other.to_string().into_bytes()))
            }
            (_, Json::Array(items)) => json_bytes(items).map(Value::ByteArray).ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        PhysicalType::FixedLenByteArray(len) => {
            let bytes = match (logical_type, json) {
                (Some(LogicalType::Uuid), Json::String(s)) => parse_uuid(s),
                (_, Json::String(s)) => Some(s.as_bytes().to_vec()),
                (_, Json::Array(items)) => json_bytes(items),
                _ => None,
            };
            bytes
                .filter(|bytes| bytes.len() == len)
                .map(Value::FixedLenByteArray)
                .ok_or_else(mismatch)
        }
        PhysicalType::Int96 => match json {
            Json::Array(items) if items.len() == 3 => {
                let mut words = [0u32; 3];
                for (word, item) in words.iter_mut().zip(items) {
                    *word = item
                        .as_u64()
                        .and_then(|v| u32::try_from(v).ok())
                        .ok_or_else(mismatch)?;
                }
                Ok(Value::Int96(words))
            }
            _ => Err(mismatch()),
        },
    }
}

fn json_bytes(items: &[Json]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
        .collect()
}

fn parse_uuid(s: &str) -> Option<Vec<u8>> {
    let hex = s.bytes().filter(|&b| b != b'-').collect::<Vec<_>>();
    if hex.len() != 32 {
        return None;
    }
    hex.chunks(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(digits, 16).ok()
        })
        .collect()
}

fn format_uuid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(36);
    for (i, byte) in bytes.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn fields_to_object(fields: Vec<Field>, nodes: &[Node]) -> ParquetResult<Json> {
    if fields.len() != nodes.len() {
        return Err(fmt_err!(
            SchemaMismatch,
            "row has {} fields but the schema has {}",
            fields.len(),
            nodes.len()
        ));
    }
    let mut object = Map::with_capacity(nodes.len());
    for (node, field) in nodes.iter().zip(fields) {
        let json = field_to_json(node, field).with_context(|_| format!("field {}", node.name()))?;
        object.insert(node.name().to_string(), json);
    }
    Ok(Json::Object(object))
}

fn field_to_json(node: &Node, field: Field) -> ParquetResult<Json> {
    match (node.kind(), field) {
        (_, Field::Null) => Ok(Json::Null),
        (_, Field::Repeated(items)) => items
            .into_iter()
            .map(|item| field_to_json(node, item))
            .collect::<ParquetResult<Vec<_>>>()
            .map(Json::Array),
        (NodeKind::Group(children), Field::Group(fields)) => fields_to_object(fields, children),
        (NodeKind::Primitive { .. }, Field::Value(value)) => {
            Ok(value_to_json(node.logical_type(), value))
        }
        (_, other) => Err(fmt_err!(
            SchemaMismatch,
            "{other:?} does not match the schema field"
        )),
    }
}

fn value_to_json(logical_type: Option<LogicalType>, value: Value) -> Json {
    let unsigned = matches!(logical_type, Some(LogicalType::Integer { signed: false, .. }));
    match value {
        Value::Boolean(v) => Json::Bool(v),
        Value::Int32(v) if unsigned => Json::from(v as u32),
        Value::Int32(v) => Json::from(v),
        Value::Int64(v) if unsigned => Json::from(v as u64),
        Value::Int64(v) => Json::from(v),
        Value::Int96(words) => Json::from(words.to_vec()),
        Value::Float(v) => Number::from_f64(v as f64).map_or(Json::Null, Json::Number),
        Value::Double(v) => Number::from_f64(v).map_or(Json::Null, Json::Number),
        Value::FixedLenByteArray(bytes) if logical_type == Some(LogicalType::Uuid) => {
            Json::String(format_uuid(&bytes))
        }
        Value::ByteArray(bytes) if logical_type == Some(LogicalType::Json) => {
            match serde_json::from_slice(&bytes) {
                Ok(json) => json,
                Err(_) => Json::String(String::from_utf8_lossy(&bytes).into_owned()),
            }
        }
        Value::ByteArray(bytes) | Value::FixedLenByteArray(bytes) => {
            match String::from_utf8(bytes) {
                Ok(s) => Json::String(s),
                Err(err) => Json::from(err.into_bytes()),
            }
        }
    }
}

/// Writes typed rows to a parquet file.
pub struct GenericWriter<W: Write, T: ParquetRow> {
    writer: ParquetWriter<W>,
    _row: PhantomData<fn(&T)>,
}

impl<W: Write, T: ParquetRow> GenericWriter<W, T> {
    pub fn new(sink: W, schema: Schema, options: WriterOptions) -> ParquetResult<Self> {
        Ok(Self {
            writer: ParquetWriter::new(sink, schema, options)?,
            _row: PhantomData,
        })
    }

    pub fn schema(&self) -> &Schema {
        self.writer.schema()
    }

    /// Writes `rows` and returns how many were written. Nothing is written when one of
    /// them does not convert to the schema.
    pub fn write(&mut self, rows: &[T]) -> ParquetResult<usize> {
        let schema = self.writer.schema();
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, row)| row.to_row(schema).with_context(|_| format!("row {i} of the batch")))
            .collect::<ParquetResult<Vec<_>>>()?;
        self.writer.write(&rows)
    }

    pub fn write_row(&mut self, row: &T) -> ParquetResult<()> {
        let row = row.to_row(self.writer.schema())?;
        self.writer.write_row(&row)
    }

    /// Ends the current row group.
    pub fn flush(&mut self) -> ParquetResult<()> {
        self.writer.flush()
    }

    /// Writes the footer and returns the file size.
    pub fn close(&mut self) -> ParquetResult<u64> {
        self.writer.close()
    }

    pub fn into_inner(self) -> ParquetResult<W> {
        self.writer.into_inner()
    }
}

/// Reads typed rows from an open parquet file.
pub struct GenericReader<'a, R: ReadAt, T: ParquetRow> {
    rows: RowReader<'a, R>,
    _row: PhantomData<fn() -> T>,
}

impl<'a, R: ReadAt, T: ParquetRow> GenericReader<'a, R, T> {
    pub fn new(file: &'a ParquetFile<R>) -> Self {
        Self {
            rows: RowReader::new(file),
            _row: PhantomData,
        }
    }

    /// Total number of rows of the file.
    pub fn num_rows(&self) -> u64 {
        self.rows.num_rows()
    }

    pub fn position(&self) -> u64 {
        self.rows.position()
    }

    pub fn seek_to_row(&mut self, row: u64) -> ParquetResult<()> {
        self.rows.seek_to_row(row)
    }

    /// Fills `buffer` and returns how many rows were read; a short count means the end of
    /// the file was reached, and zero that no rows were left.
    pub fn read(&mut self, buffer: &mut [T]) -> ParquetResult<usize> {
        let schema = self.rows.file().schema();
        for (filled, slot) in buffer.iter_mut().enumerate() {
            match self.rows.next_row()? {
                Some(row) => *slot = T::from_row(row, schema)?,
                None => return Ok(filled),
            }
        }
        Ok(buffer.len())
    }
}

impl<R: ReadAt, T: ParquetRow> Iterator for GenericReader<'_, R, T> {
    type Item = ParquetResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let schema = self.rows.file().schema();
        self.rows
            .next_row()
            .transpose()
            .map(|row| row.and_then(|row| T::from_row(row, schema)))
    }
}

/// Writes `rows` as a complete file to `sink` and returns the sink.
pub fn write<W: Write, T: ParquetRow>(
    sink: W,
    schema: Schema,
    rows: &[T],
    options: WriterOptions,
) -> ParquetResult<W> {
    let mut writer = GenericWriter::new(sink, schema, options)?;
    writer.write(rows)?;
    writer.into_inner()
}

/// Reads every row of the file held by `source`.
pub fn read<R: ReadAt, T: ParquetRow>(source: R, size: u64) -> ParquetResult<Vec<T>> {
    let file = ParquetFile::open(source, size)?;
    let rows = GenericReader::new(&file).collect::<ParquetResult<Vec<T>>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::parquet::error::ParquetErrorCause;

    fn people() -> Schema {
        Schema::new(
            "people",
            vec![
                Node::string("FirstName", Repetition::Required),
                Node::string("LastName", Repetition::Optional),
                Node::repeated("Scores", PhysicalType::Int64),
            ],
        )
        .unwrap()
    }

    #[test]
    fn json_rows_are_addressed_by_name() {
        let schema = people();
        let row = json!({"LastName": "Solo", "FirstName": "Han"}).to_row(&schema).unwrap();
        assert_eq!(
            row,
            Row::new(vec!["Han".into(), "Solo".into(), Field::Null])
        );
        let back = Json::from_row(
            Row::new(vec!["Han".into(), Field::Null, Field::repeated([1i64])]),
            &schema,
        )
        .unwrap();
        assert_eq!(back, json!({"FirstName": "Han", "LastName": null, "Scores": [1]}));
    }

    #[test]
    fn json_mismatches() {
        let schema = people();
        for bad in [
            json!([1, 2]),
            json!({"FirstName": 1}),
            json!({"FirstName": "a", "Nickname": "b"}),
            json!({"FirstName": "a", "Scores": 3}),
        ] {
            let err = bad.to_row(&schema).unwrap_err();
            assert!(matches!(err.cause(), ParquetErrorCause::SchemaMismatch), "{bad}");
        }
    }

    #[test]
    fn uuids_are_formatted() {
        let node = Node::primitive("id", Repetition::Required, PhysicalType::FixedLenByteArray(16))
            .with_logical_type(LogicalType::Uuid);
        let text = "00112233-4455-6677-8899-aabbccddeeff";
        let value = json_to_value(
            PhysicalType::FixedLenByteArray(16),
            node.logical_type(),
            &json!(text),
        )
        .unwrap();
        assert_eq!(value_to_json(node.logical_type(), value), json!(text));
    }

    #[test]
    fn generic_round_trip() {
        let schema = people();
        let rows = vec![
            json!({"FirstName": "Luke", "LastName": "Skywalker", "Scores": [1, 2]}),
            json!({"FirstName": "R2", "LastName": null, "Scores": []}),
        ];
        let bytes = write(Vec::new(), schema, &rows, WriterOptions::new()).unwrap();
        let read_back: Vec<Json> = read(bytes.clone(), bytes.len() as u64).unwrap();
        assert_eq!(read_back, rows);

        let file = ParquetFile::open(bytes.as_slice(), bytes.len() as u64).unwrap();
        let mut reader = GenericReader::<_, Row>::new(&file);
        let mut buffer = vec![Row::default(); 3];
        assert_eq!(reader.read(&mut buffer).unwrap(), 2);
        assert_eq!(reader.read(&mut buffer).unwrap(), 0);
    }
}
