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
    Encoding, Field, Node, PhysicalType, Repetition, Row, Schema, Statistics, Value, WriterOptions,
};

use common::{open, people_schema, person, write_rows, VERSIONS};

fn scores_schema() -> Schema {
    Schema::new(
        "scores",
        vec![
            Node::optional("score", PhysicalType::Int32),
            Node::optional("ratio", PhysicalType::Double),
        ],
    )
    .unwrap()
}

fn scores(count: i32) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let score = if i % 5 == 0 { Field::Null } else { ((i * 37) % 101 - 50).into() };
            let ratio = match i % 7 {
                0 => Field::Null,
                3 => f64::NAN.into(),
                _ => (i as f64 / 3.0).into(),
            };
            Row::new(vec![score, ratio])
        })
        .collect()
}

#[test]
fn chunk_statistics_cover_all_rows() {
    let rows = scores(1000);
    let bytes = write_rows(scores_schema(), &rows, WriterOptions::new().with_page_buffer_size(300));
    let file = open(&bytes);
    let chunk = file.row_group(0).unwrap().column(0).unwrap();
    let stats = chunk.statistics().unwrap().unwrap();
    let values = rows
        .iter()
        .filter_map(|row| match row.get(0) {
            Some(Field::Value(Value::Int32(v))) => Some(*v),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(stats.null_count, 200);
    assert_eq!(stats.min, values.iter().min().copied().map(Value::Int32));
    assert_eq!(stats.max, values.iter().max().copied().map(Value::Int32));

    // NaN never becomes a bound
    let ratio = file.row_group(0).unwrap().column(1).unwrap();
    let Statistics { min, max, .. } = ratio.statistics().unwrap().unwrap();
    assert!(matches!(min, Some(Value::Double(v)) if !v.is_nan()));
    assert!(matches!(max, Some(Value::Double(v)) if !v.is_nan()));
}

#[test]
fn page_indexes_match_the_pages() {
    for version in VERSIONS {
        let rows = scores(2000);
        let options = WriterOptions::new()
            .with_version(version)
            .with_page_buffer_size(256);
        let bytes = write_rows(scores_schema(), &rows, options);
        let file = open(&bytes);
        for chunk in file.row_group(0).unwrap().columns() {
            let column_index = chunk.column_index().unwrap();
            let offset_index = chunk.offset_index().unwrap();
            assert!(column_index.num_pages() > 1);
            assert_eq!(column_index.num_pages(), offset_index.num_pages());

            let mut first_row = 0u64;
            for (i, page) in chunk.pages().unwrap().enumerate() {
                let page = page.unwrap();
                let location = offset_index.page_locations()[i];
                assert_eq!(location.first_row_index, first_row);
                assert_eq!(column_index.null_count(i), Some(page.num_nulls() as i64));
                assert_eq!(column_index.is_null_page(i), page.values.is_empty());
                let statistics = page.statistics.as_ref().unwrap();
                assert_eq!(column_index.min_value(i), statistics.min.as_ref());
                assert_eq!(column_index.max_value(i), statistics.max.as_ref());
                first_row += page.num_rows() as u64;
            }
            assert_eq!(first_row, 2000);
        }
    }
}

#[test]
fn pages_from_skips_earlier_pages() {
    let rows = scores(1000);
    let bytes = write_rows(scores_schema(), &rows, WriterOptions::new().with_page_buffer_size(200));
    let file = open(&bytes);
    let chunk = file.row_group(0).unwrap().column(0).unwrap();
    let all = chunk.pages().unwrap().collect::<Result<Vec<_>, _>>().unwrap();
    let tail = chunk.pages_from(3).unwrap().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(tail.len(), all.len() - 3);
    assert_eq!(tail[0].values, all[3].values);
    assert!(chunk.pages_from(all.len()).is_err());
}

/// One optional double per row; a page is sealed at 8 estimated bytes, which is one
/// value or 64 nulls.
fn ratios(values: &[Option<f64>]) -> Vec<u8> {
    let schema =
        Schema::new("ratios", vec![Node::optional("ratio", PhysicalType::Double)]).unwrap();
    let rows = values
        .iter()
        .map(|v| Row::new(vec![(*v).into()]))
        .collect::<Vec<_>>();
    write_rows(schema, &rows, WriterOptions::new().with_page_buffer_size(8))
}

#[test]
fn null_pages_hold_only_nulls() {
    let mut values = vec![None; 64];
    values.extend([Some(1.0), Some(2.0)]);
    let bytes = ratios(&values);
    let file = open(&bytes);
    let chunk = file.row_group(0).unwrap().column(0).unwrap();
    let index = chunk.column_index().unwrap();
    assert_eq!(index.num_pages(), 3);
    assert!(index.is_null_page(0));
    assert_eq!(index.null_count(0), Some(64));
    assert!(!index.is_null_page(1));
    assert_eq!(index.min_value(1), Some(&Value::Double(1.0)));
}

#[test]
fn nan_only_page_drops_the_column_index() {
    let bytes = ratios(&[Some(f64::NAN), None, Some(2.0)]);
    let file = open(&bytes);
    let chunk = file.row_group(0).unwrap().column(0).unwrap();
    assert_eq!(chunk.offset_index().unwrap().num_pages(), 2);
    assert!(chunk.column_index().is_none());
    let stats = chunk.statistics().unwrap().unwrap();
    assert_eq!(stats.min, Some(Value::Double(2.0)));
    assert_eq!(stats.null_count, 1);

    let rows = common::read_rows(&bytes);
    assert!(matches!(rows[0].get(0), Some(Field::Value(Value::Double(v))) if v.is_nan()));
}

#[test]
fn statistics_can_be_disabled() {
    let bytes = write_rows(
        scores_schema(),
        &scores(100),
        WriterOptions::new().with_statistics(false),
    );
    let file = open(&bytes);
    let chunk = file.row_group(0).unwrap().column(0).unwrap();
    assert!(chunk.statistics().unwrap().is_none());
    assert!(chunk.column_index().is_none());
    assert!(chunk.offset_index().is_some());
}

#[test]
fn dictionary_falls_back_per_page() {
    let schema = Schema::new("s", vec![Node::string("name", Repetition::Required)]).unwrap();
    let rows = (0..600)
        .map(|i| {
            let name = if i < 200 { format!("k{}", i % 3) } else { format!("unique {i}") };
            Row::new(vec![name.into()])
        })
        .collect::<Vec<_>>();
    let options = WriterOptions::new()
        .with_page_buffer_size(1000)
        .with_dictionary_max_cardinality(50)
        .with_encoding(Encoding::DeltaLengthByteArray);
    let bytes = write_rows(schema, &rows, options);
    let file = open(&bytes);
    let chunk = file.row_group(0).unwrap().column(0).unwrap();
    let encodings = chunk
        .pages()
        .unwrap()
        .map(|page| page.map(|page| page.encoding))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(encodings[0], Encoding::RleDictionary);
    assert_eq!(encodings.last(), Some(&Encoding::DeltaLengthByteArray));
    let switch = encodings
        .iter()
        .position(|e| *e != Encoding::RleDictionary)
        .unwrap();
    assert!(encodings[switch..]
        .iter()
        .all(|e| *e == Encoding::DeltaLengthByteArray));
    assert_eq!(common::read_rows(&bytes), rows);
}

#[test]
fn bloom_filter_finds_written_values() {
    let rows = (0..500).map(|i| person(i, &format!("user {i}"))).collect::<Vec<_>>();
    let options = WriterOptions::new().with_bloom_filter("Name", 0.01);
    let bytes = write_rows(people_schema(), &rows, options);
    let file = open(&bytes);
    let group = file.row_group(0).unwrap();
    assert!(group.column(0).unwrap().bloom_filter().unwrap().is_none());

    let filter = group.column(1).unwrap().bloom_filter().unwrap().unwrap();
    for i in 0..500 {
        assert!(filter.check(&Value::string(format!("user {i}"))));
    }
    let false_positives = (0..1000)
        .filter(|i| filter.check(&Value::string(format!("absent {i}"))))
        .count();
    assert!(false_positives < 50, "{false_positives}");
}
