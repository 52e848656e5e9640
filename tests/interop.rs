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

use std::sync::Arc;

use bytes::Bytes;
use parquet::{
    basic::Compression as ParquetCompression,
    data_type::{ByteArray, ByteArrayType, Int32Type, Int64Type},
    file::{
        properties::{EnabledStatistics, WriterProperties, WriterVersion},
        reader::{FileReader, SerializedFileReader},
        writer::SerializedFileWriter,
    },
    record::RowAccessor,
    schema::parser::parse_message_type,
};
use parquet_rows::{
    Compression, Encoding, Field, Node, PhysicalType, Row, Schema, Value, WriterOptions,
};

use common::{open, people_schema, person, read_rows, write_rows, COMPRESSIONS, VERSIONS};

#[test]
fn other_readers_read_our_files() {
    let rows = (0..3000)
        .map(|i| person(i, &format!("name {}", i % 11)))
        .collect::<Vec<_>>();
    for compression in COMPRESSIONS {
        for version in VERSIONS {
            let options = WriterOptions::new()
                .with_compression(compression)
                .with_version(version)
                .with_page_buffer_size(2048)
                .with_page_checksum(true);
            let bytes = write_rows(people_schema(), &rows, options);

            let reader = SerializedFileReader::new(Bytes::from(bytes)).unwrap();
            assert_eq!(reader.metadata().file_metadata().num_rows(), 3000);
            let mut count = 0i64;
            for row in reader.get_row_iter(None).unwrap() {
                let row = row.unwrap();
                assert_eq!(row.get_long(0).unwrap(), count);
                assert_eq!(row.get_string(1).unwrap(), &format!("name {}", count % 11));
                count += 1;
            }
            assert_eq!(count, 3000, "{compression:?} {version:?}");
        }
    }
}

fn write_with_other_writer(version: WriterVersion, compression: ParquetCompression) -> Vec<u8> {
    let schema = parse_message_type(
        "message people {
            required int64 ID;
            required binary Name (STRING);
            optional int32 Age;
        }",
    )
    .unwrap();
    let props = WriterProperties::builder()
        .set_writer_version(version)
        .set_compression(compression)
        .set_statistics_enabled(EnabledStatistics::Page)
        .set_data_page_row_count_limit(100)
        .set_write_batch_size(50)
        .build();

    let ids = (0..1000i64).collect::<Vec<_>>();
    let names = ids
        .iter()
        .map(|i| ByteArray::from(format!("name {i}").as_str()))
        .collect::<Vec<_>>();
    let def_levels = ids.iter().map(|i| (i % 3 != 0) as i16).collect::<Vec<_>>();
    let ages = ids
        .iter()
        .filter(|i| *i % 3 != 0)
        .map(|i| (*i % 90) as i32)
        .collect::<Vec<_>>();

    let mut buffer = Vec::new();
    let mut writer = SerializedFileWriter::new(&mut buffer, Arc::new(schema), Arc::new(props))
        .expect("create file writer");
    let mut row_group = writer.next_row_group().expect("next row group");
    let mut column = row_group.next_column().unwrap().unwrap();
    column.typed::<Int64Type>().write_batch(&ids, None, None).unwrap();
    column.close().unwrap();
    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<ByteArrayType>()
        .write_batch(&names, None, None)
        .unwrap();
    column.close().unwrap();
    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<Int32Type>()
        .write_batch(&ages, Some(&def_levels), None)
        .unwrap();
    column.close().unwrap();
    row_group.close().expect("close row group writer");
    writer.close().expect("close file writer");
    buffer
}

fn ours(compression: ParquetCompression) -> Compression {
    match compression {
        ParquetCompression::UNCOMPRESSED => Compression::Uncompressed,
        ParquetCompression::SNAPPY => Compression::Snappy,
        ParquetCompression::LZ4_RAW => Compression::Lz4Raw,
        other => panic!("{other:?} is not used here"),
    }
}

fn expected_row(i: u64) -> Row {
    let age = if i % 3 == 0 {
        Field::Null
    } else {
        ((i % 90) as i32).into()
    };
    Row::new(vec![
        (i as i64).into(),
        format!("name {i}").into(),
        age,
    ])
}

#[test]
fn we_read_other_writers_files() {
    let codecs = [
        ParquetCompression::UNCOMPRESSED,
        ParquetCompression::SNAPPY,
        ParquetCompression::LZ4_RAW,
    ];
    for version in [WriterVersion::PARQUET_1_0, WriterVersion::PARQUET_2_0] {
        for compression in codecs {
            let bytes = write_with_other_writer(version, compression);
            let rows = read_rows(&bytes);
            assert_eq!(rows.len(), 1000);
            for (i, row) in rows.iter().enumerate() {
                assert_eq!(row, &expected_row(i as u64), "{version:?} {compression:?}");
            }

            let file = open(&bytes);
            let chunk = file.row_group(0).unwrap().column(0).unwrap();
            assert_eq!(chunk.compression().unwrap(), ours(compression));
            assert!(chunk.offset_index().unwrap().num_pages() > 1);
            let mut reader = file.rows();
            for start in [1u64, 99, 100, 101, 555, 999] {
                reader.seek_to_row(start).unwrap();
                assert_eq!(reader.next().unwrap().unwrap(), expected_row(start));
            }
        }
    }
}

#[test]
fn other_writers_statistics_are_understood() {
    let bytes =
        write_with_other_writer(WriterVersion::PARQUET_1_0, ParquetCompression::UNCOMPRESSED);
    let file = open(&bytes);
    let group = file.row_group(0).unwrap();
    let ids = group.column(0).unwrap().statistics().unwrap().unwrap();
    assert_eq!(ids.min, Some(Value::Int64(0)));
    assert_eq!(ids.max, Some(Value::Int64(999)));
    let ages = group.column(2).unwrap().statistics().unwrap().unwrap();
    assert_eq!(ages.null_count, 334);
    let chunk = group.column(0).unwrap();
    let page = chunk.column_index().unwrap().search(&Value::Int64(250));
    let locations = chunk.offset_index().unwrap().page_locations();
    assert!(locations[page].first_row_index <= 250);
    assert!(locations.get(page + 1).map_or(true, |next| next.first_row_index > 250));
}

#[test]
fn other_readers_read_our_delta_int32() {
    let schema = Schema::new("deltas", vec![Node::required("V", PhysicalType::Int32)]).unwrap();
    let values = [i32::MIN, i32::MAX, 0, -5, i32::MAX, i32::MIN, 1, i32::MIN];
    let rows = values
        .iter()
        .map(|v| Row::new(vec![(*v).into()]))
        .collect::<Vec<_>>();
    for version in VERSIONS {
        let options = WriterOptions::new()
            .with_version(version)
            .with_dictionary(false)
            .with_encoding(Encoding::DeltaBinaryPacked);
        let bytes = write_rows(schema.clone(), &rows, options);
        assert_eq!(read_rows(&bytes), rows);

        let reader = SerializedFileReader::new(Bytes::from(bytes)).unwrap();
        let read_back = reader
            .get_row_iter(None)
            .unwrap()
            .map(|row| row.unwrap().get_int(0).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(read_back, values, "{version:?}");
    }
}
