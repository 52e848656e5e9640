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
    Compression, ParquetErrorCause, ParquetFile, ParquetWriter, ReaderOptions, Row, WriterOptions,
};

use common::{name_of, people_schema, person, write_rows};

fn people_file() -> Vec<u8> {
    let rows = vec![person(0, "Bob"), person(1, "Alice"), person(2, "Franky")];
    let options = WriterOptions::new()
        .with_dictionary(false)
        .with_page_checksum(true);
    write_rows(people_schema(), &rows, options)
}

fn open_err(bytes: &[u8]) -> ParquetErrorCause {
    match ParquetFile::open(bytes, bytes.len() as u64) {
        Ok(_) => panic!("file opened"),
        Err(err) => err.cause().clone(),
    }
}

#[test]
fn broken_layouts_are_format_errors() {
    let bytes = people_file();

    let mut bad_head = bytes.clone();
    bad_head[0] = b'X';
    assert!(open_err(&bad_head).is_format());

    let mut bad_tail = bytes.clone();
    let last = bad_tail.len() - 1;
    bad_tail[last] = b'X';
    assert!(open_err(&bad_tail).is_format());

    assert!(open_err(&bytes[..bytes.len() - 10]).is_format());
    assert!(open_err(&bytes[..8]).is_format());
    assert!(open_err(b"").is_format());

    // footer length pointing before the start of the file
    let mut long_footer = bytes.clone();
    let at = long_footer.len() - 8;
    long_footer[at..at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(open_err(&long_footer).is_format());
}

/// Flips the last byte of the first data page of the name column.
fn corrupt_last_name(bytes: &[u8]) -> Vec<u8> {
    let file = ParquetFile::open(bytes, bytes.len() as u64).unwrap();
    let chunk = file.row_group(0).unwrap().column(1).unwrap();
    let location = chunk.offset_index().unwrap().page_locations()[0];
    let at = location.offset as usize + location.compressed_page_size - 1;
    let mut corrupted = bytes.to_vec();
    corrupted[at] = b'z';
    corrupted
}

#[test]
fn checksum_mismatch_is_corruption() {
    let corrupted = corrupt_last_name(&people_file());
    let file = ParquetFile::open(corrupted.as_slice(), corrupted.len() as u64).unwrap();
    let err = file.rows().next().unwrap().unwrap_err();
    assert!(matches!(err.cause(), ParquetErrorCause::Corruption), "{err}");
    let message = err.to_string();
    assert!(message.contains("row group 0"), "{message}");
    assert!(message.contains("checksum"), "{message}");

    let unchecked = ParquetFile::open_with_options(
        corrupted.as_slice(),
        corrupted.len() as u64,
        ReaderOptions::new().with_verify_checksums(false),
    )
    .unwrap();
    let rows = unchecked.rows().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(name_of(&rows[2]), "Frankz");
}

#[test]
fn write_errors() {
    let mut writer = ParquetWriter::new(Vec::new(), people_schema(), WriterOptions::new()).unwrap();
    let err = writer
        .write(&[person(0, "ok"), Row::new(vec!["wrong".into(), 1i64.into()])])
        .unwrap_err();
    assert!(matches!(err.cause(), ParquetErrorCause::SchemaMismatch));
    assert!(err.to_string().contains("row 1 of the batch"), "{err}");
    assert_eq!(writer.num_rows(), 0);

    let err = writer.write_row(&Row::new(vec![1i64.into()])).unwrap_err();
    assert!(matches!(err.cause(), ParquetErrorCause::SchemaMismatch));

    writer.write_row(&person(7, "kept")).unwrap();
    writer.close().unwrap();
    let err = writer.write_row(&person(8, "late")).unwrap_err();
    assert!(matches!(err.cause(), ParquetErrorCause::Closed));
    assert!(matches!(writer.close().unwrap_err().cause(), ParquetErrorCause::Closed));

    let bytes = writer.into_inner().unwrap();
    assert_eq!(common::read_rows(&bytes), vec![person(7, "kept")]);
}

#[test]
fn unavailable_codec_is_unsupported() {
    let options = WriterOptions::new().with_compression(Compression::Lzo);
    let err = ParquetWriter::new(Vec::new(), people_schema(), options)
        .err()
        .unwrap();
    assert!(matches!(err.cause(), ParquetErrorCause::Unsupported));
}
