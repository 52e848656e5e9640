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

mod common;

use parquet_rows::{
    read, write, GenericReader, GenericWriter, LogicalType, Node, ParquetFile, ParquetRow,
    PhysicalType, Repetition, Row, Schema, WriterOptions,
};
use serde_json::{json, Value as Json};

use common::{people_schema, person};

fn names_schema() -> Schema {
    Schema::new(
        "names",
        vec![
            Node::string("FirstName", Repetition::Required),
            Node::string("LastName", Repetition::Optional),
        ],
    )
    .unwrap()
}

#[test]
fn json_rows_round_trip() {
    let rows = vec![
        json!({"FirstName": "Luke", "LastName": "Skywalker"}),
        json!({"FirstName": "Han", "LastName": "Solo"}),
        json!({"FirstName": "R2", "LastName": "D2"}),
    ];
    let bytes = write(Vec::new(), names_schema(), &rows, WriterOptions::new()).unwrap();
    let read_back: Vec<Json> = read(bytes.as_slice(), bytes.len() as u64).unwrap();
    assert_eq!(read_back, rows);
}

#[test]
fn repeated_json_field() {
    let schema = Schema::new("s", vec![Node::repeated("Key", PhysicalType::Int64)]).unwrap();
    let rows = vec![json!({"Key": [1]})];
    let bytes = write(Vec::new(), schema, &rows, WriterOptions::new()).unwrap();
    let read_back: Vec<Json> = read(bytes.as_slice(), bytes.len() as u64).unwrap();
    assert_eq!(read_back, rows);
}

#[test]
fn nested_json_rows() {
    let schema = Schema::new(
        "family",
        vec![
            Node::group(
                "P",
                Repetition::Repeated,
                vec![
                    Node::string("Name", Repetition::Required),
                    Node::required("Age", PhysicalType::Int32),
                ],
            ),
            Node::group(
                "F",
                Repetition::Optional,
                vec![Node::string("Name", Repetition::Required)],
            ),
            Node::primitive("Attrs", Repetition::Optional, PhysicalType::ByteArray)
                .with_logical_type(LogicalType::Json),
            Node::primitive("Count", Repetition::Required, PhysicalType::Int32)
                .with_logical_type(LogicalType::Integer {
                    bit_width: 32,
                    signed: false,
                }),
        ],
    )
    .unwrap();
    let rows = vec![
        json!({
            "P": [{"Name": "Leia", "Age": 19}, {"Name": "Luke", "Age": 19}],
            "F": {"Name": "Anakin"},
            "Attrs": {"force": true, "ships": [1, 2]},
            "Count": 4_000_000_000u32,
        }),
        json!({"P": [], "F": null, "Attrs": null, "Count": 0}),
    ];
    let bytes = write(Vec::new(), schema, &rows, WriterOptions::new()).unwrap();
    let read_back: Vec<Json> = read(bytes.as_slice(), bytes.len() as u64).unwrap();
    assert_eq!(read_back, rows);
}

#[test]
fn generic_writer_and_reader() {
    let mut writer = GenericWriter::<_, Row>::new(
        Vec::new(),
        people_schema(),
        WriterOptions::new().with_max_rows_per_row_group(4),
    )
    .unwrap();
    let rows = (0..10).map(|i| person(i, "x")).collect::<Vec<_>>();
    assert_eq!(writer.write(&rows[..6]).unwrap(), 6);
    for row in &rows[6..] {
        writer.write_row(row).unwrap();
    }
    let bytes = writer.into_inner().unwrap();

    let file = ParquetFile::open(bytes.as_slice(), bytes.len() as u64).unwrap();
    assert_eq!(file.num_row_groups(), 3);
    let mut reader = GenericReader::<_, Json>::new(&file);
    assert_eq!(reader.num_rows(), 10);
    reader.seek_to_row(7).unwrap();
    let mut buffer = vec![Json::Null; 5];
    assert_eq!(reader.read(&mut buffer).unwrap(), 3);
    assert_eq!(buffer[0], json!({"ID": 7, "Name": "x"}));
    assert_eq!(reader.position(), 10);
    assert_eq!(reader.read(&mut buffer).unwrap(), 0);
}

#[test]
fn rows_convert_to_and_from_json() {
    let schema = people_schema();
    let json = person(3, "Bob").to_row(&schema).map(|row| Json::from_row(row, &schema));
    assert_eq!(json.unwrap().unwrap(), json!({"ID": 3, "Name": "Bob"}));
}
