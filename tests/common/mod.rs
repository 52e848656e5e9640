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

#![allow(dead_code)]

use parquet_rows::{
    Compression, Field, Node, ParquetFile, ParquetWriter, PhysicalType, Repetition, Row, Schema,
    Version, WriterOptions,
};

pub const VERSIONS: [Version; 2] = [Version::V1, Version::V2];

pub const COMPRESSIONS: [Compression; 5] = [
    Compression::Uncompressed,
    Compression::Snappy,
    Compression::Gzip,
    Compression::Zstd,
    Compression::Lz4Raw,
];

#[derive(Debug, Clone, Copy)]
pub enum Null {
    None,
    Sparse,
    Dense,
}

pub const ALL_NULLS: [Null; 3] = [Null::None, Null::Dense, Null::Sparse];

pub fn is_null(i: usize, null: Null) -> bool {
    match null {
        Null::None => false,
        Null::Dense => i % 2 == 0,
        Null::Sparse => i % 10 == 0,
    }
}

/// `ID int64, Name string`.
pub fn people_schema() -> Schema {
    Schema::new(
        "people",
        vec![
            Node::required("ID", PhysicalType::Int64),
            Node::string("Name", Repetition::Required),
        ],
    )
    .unwrap()
}

pub fn person(id: i64, name: &str) -> Row {
    Row::new(vec![id.into(), name.into()])
}

pub fn write_rows(schema: Schema, rows: &[Row], options: WriterOptions) -> Vec<u8> {
    let mut writer = ParquetWriter::new(Vec::new(), schema, options).expect("create writer");
    let written = writer.write(rows).expect("write rows");
    assert_eq!(written, rows.len());
    writer.into_inner().expect("close writer")
}

pub fn open(bytes: &[u8]) -> ParquetFile<&[u8]> {
    ParquetFile::open(bytes, bytes.len() as u64).expect("open file")
}

pub fn read_rows(bytes: &[u8]) -> Vec<Row> {
    open(bytes)
        .rows()
        .collect::<Result<Vec<_>, _>>()
        .expect("read rows")
}

pub fn name_of(row: &Row) -> &str {
    row.get(1)
        .and_then(Field::as_value)
        .and_then(|value| value.as_str())
        .expect("name column")
}
