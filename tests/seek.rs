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

use std::thread;

use parquet_rows::{
    BoundaryOrder, Node, ParquetFile, ReaderOptions, Repetition, Row, Schema, SortingColumn, Value,
    WriterOptions,
};

use common::{name_of, open, people_schema, person, read_rows, write_rows, VERSIONS};

fn star_wars() -> Vec<u8> {
    let schema = Schema::new("people", vec![Node::string("FirstName", Repetition::Required)])
        .unwrap();
    let rows = ["C", "Han", "Leia", "Luke", "R2"]
        .map(|name| Row::new(vec![name.into()]))
        .to_vec();
    write_rows(schema, &rows, WriterOptions::new().with_page_buffer_size(12))
}

#[test]
fn search_then_seek() {
    let bytes = star_wars();
    let file = open(&bytes);
    let chunk = file.row_group(0).unwrap().column(0).unwrap();
    let column_index = chunk.column_index().unwrap();
    let offset_index = chunk.offset_index().unwrap();
    assert_eq!(column_index.num_pages(), 3);
    assert_eq!(column_index.boundary_order(), BoundaryOrder::Ascending);

    let target = Value::string("Luke");
    let page = column_index.search(&target);
    assert_eq!(page, 1);
    let first_row = offset_index.page_locations()[page].first_row_index;
    assert_eq!(first_row, 2);

    let mut rows = file.rows();
    rows.seek_to_row(first_row).unwrap();
    let mut buffer = vec![Row::default(); 2];
    assert_eq!(rows.read(&mut buffer).unwrap(), 2);
    let names = buffer
        .iter()
        .map(|row| row.get(0).and_then(|f| f.as_value()).cloned().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec![Value::string("Leia"), target]);
}

#[test]
fn search_misses_return_page_count() {
    let bytes = star_wars();
    let file = open(&bytes);
    let index = file.row_group(0).unwrap().column(0).unwrap().column_index().unwrap().clone();
    assert_eq!(index.search(&Value::string("A")), 3);
    assert_eq!(index.search(&Value::string("Z")), 3);
    assert_eq!(index.search(&Value::string("C")), 0);
    assert_eq!(index.search(&Value::string("R2")), 2);
}

fn numbered(count: i64) -> Vec<Row> {
    (0..count).map(|i| person(i, &format!("name {i:05}"))).collect()
}

#[test]
fn seek_to_every_row() {
    for version in VERSIONS {
        for page_index in [true, false] {
            let rows = numbered(230);
            let options = WriterOptions::new()
                .with_version(version)
                .with_page_index(page_index)
                .with_page_buffer_size(100)
                .with_max_rows_per_row_group(70);
            let bytes = write_rows(people_schema(), &rows, options);
            let file = open(&bytes);
            assert_eq!(file.num_row_groups(), 4);

            let mut reader = file.rows();
            for n in 0..rows.len() {
                reader.seek_to_row(n as u64).unwrap();
                assert_eq!(reader.position(), n as u64);
                let rest = reader.by_ref().collect::<Result<Vec<_>, _>>().unwrap();
                assert_eq!(rest, rows[n..], "seek to {n}, {version:?}");
            }
        }
    }
}

#[test]
fn seek_past_the_end() {
    let bytes = write_rows(people_schema(), &numbered(10), WriterOptions::new());
    let file = open(&bytes);
    let mut reader = file.rows();
    reader.seek_to_row(10).unwrap();
    assert!(reader.next().is_none());
    reader.seek_to_row(1_000).unwrap();
    assert_eq!(reader.position(), 10);
    assert_eq!(reader.read(&mut [Row::default()]).unwrap(), 0);
    reader.seek_to_row(9).unwrap();
    assert_eq!(name_of(&reader.next().unwrap().unwrap()), "name 00009");
}

#[test]
fn reads_without_page_index() {
    let rows = numbered(100);
    let options = WriterOptions::new().with_page_buffer_size(64);
    let bytes = write_rows(people_schema(), &rows, options);
    let file = ParquetFile::open_with_options(
        bytes.as_slice(),
        bytes.len() as u64,
        ReaderOptions::new().with_page_index(false),
    )
    .unwrap();
    let chunk = file.row_group(0).unwrap().column(1).unwrap();
    assert!(chunk.column_index().is_none());
    assert!(chunk.offset_index().is_none());

    let mut reader = file.rows();
    reader.seek_to_row(57).unwrap();
    let rest = reader.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rest, rows[57..]);
}

#[test]
fn declared_sort_order_is_the_boundary_order() {
    let rows = (0..40).map(|i| person(40 - i, "x")).collect::<Vec<_>>();
    let sorting = SortingColumn {
        column_idx: 0,
        descending: true,
        nulls_first: false,
    };
    let options = WriterOptions::new()
        .with_page_buffer_size(32)
        .with_sorting_columns(Some(vec![sorting.clone()]));
    let bytes = write_rows(people_schema(), &rows, options);
    let file = open(&bytes);
    let group = file.row_group(0).unwrap();
    assert_eq!(group.sorting_columns(), Some(&[sorting][..]));
    let index = group.column(0).unwrap().column_index().unwrap().clone();
    assert_eq!(index.boundary_order(), BoundaryOrder::Descending);
    let page = index.search(&Value::Int64(17));
    assert!(page < index.num_pages());
    let (Some(Value::Int64(min)), Some(Value::Int64(max))) =
        (index.min_value(page), index.max_value(page))
    else {
        panic!("page {page} has no bounds");
    };
    assert!((*min..=*max).contains(&17));

    // constant names: computed as ascending
    let names = group.column(1).unwrap().column_index().unwrap().clone();
    assert_eq!(names.boundary_order(), BoundaryOrder::Ascending);
}

#[test]
fn readers_share_a_file() {
    let rows = numbered(1000);
    let bytes = write_rows(
        people_schema(),
        &rows,
        WriterOptions::new().with_page_buffer_size(256),
    );
    let file = open(&bytes);
    let mut first = file.rows();
    let mut second = file.rows();
    second.seek_to_row(500).unwrap();
    for i in 0..500 {
        assert_eq!(first.next().unwrap().unwrap(), rows[i]);
        assert_eq!(second.next().unwrap().unwrap(), rows[i + 500]);
    }

    thread::scope(|scope| {
        for start in [0u64, 250, 999] {
            let file = &file;
            let rows = &rows;
            scope.spawn(move || {
                let mut reader = file.rows();
                reader.seek_to_row(start).unwrap();
                let rest = reader.collect::<Result<Vec<_>, _>>().unwrap();
                assert_eq!(rest, rows[start as usize..]);
            });
        }
    });
    assert_eq!(read_rows(&bytes), rows);
}
