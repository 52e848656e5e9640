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

use std::io::Cursor;

use parquet_format_safe::thrift::protocol::TCompactInputProtocol;
use parquet_format_safe::{
    ColumnChunk, ColumnIndex as ThriftColumnIndex, ColumnMetaData, FileMetaData,
    OffsetIndex as ThriftOffsetIndex, RowGroup, SortingColumn,
};

use super::options::ReaderOptions;
use super::page::{ChunkRange, PageReader};
use super::reader::RowReader;
use crate::bloom_filter::BloomFilter;
use crate::parquet::compression::Compression;
use crate::parquet::error::{fmt_err, ParquetError, ParquetErrorExt, ParquetResult};
use crate::parquet::indexes::{ColumnIndex, OffsetIndex};
use crate::parquet::io::ReadAt;
use crate::parquet::schema::{ColumnDescriptor, Schema};
use crate::parquet::statistics::Statistics;

const PARQUET_MAGIC: &[u8; 4] = b"PAR1";
/// Magic, footer length and magic again.
const FOOTER_SIZE: u64 = 8;
const HEADER_SIZE: u64 = 4;

/// An open parquet file: its footer, schema and page indexes.
///
/// Nothing past the footer and the indexes is read until pages are requested. The file holds
/// no cursor state, so any number of [`RowReader`]s may read it at once.
pub struct ParquetFile<R: ReadAt> {
    source: R,
    size: u64,
    options: ReaderOptions,
    metadata: FileMetaData,
    schema: Schema,
    /// Global index of the first row of every row group.
    row_group_starts: Vec<u64>,
    num_rows: u64,
    column_indexes: Vec<Vec<Option<ColumnIndex>>>,
    offset_indexes: Vec<Vec<Option<OffsetIndex>>>,
}

impl<R: ReadAt> ParquetFile<R> {
    pub fn open(source: R, size: u64) -> ParquetResult<Self> {
        Self::open_with_options(source, size, ReaderOptions::default())
    }

    pub fn open_with_options(source: R, size: u64, options: ReaderOptions) -> ParquetResult<Self> {
        let metadata = read_metadata(&source, size).context("footer")?;
        let schema = Schema::from_thrift(&metadata.schema).context("footer schema")?;

        let mut row_group_starts = Vec::with_capacity(metadata.row_groups.len());
        let mut num_rows = 0u64;
        for (index, row_group) in metadata.row_groups.iter().enumerate() {
            validate_row_group(row_group, &schema, size)
                .with_context(|_| format!("row group {index}"))?;
            row_group_starts.push(num_rows);
            num_rows += row_group.num_rows as u64;
        }
        if metadata.num_rows != num_rows as i64 {
            return Err(fmt_err!(
                Format,
                "footer declares {} rows, its row groups hold {num_rows}",
                metadata.num_rows
            ));
        }

        let mut file = Self {
            source,
            size,
            options,
            metadata,
            schema,
            row_group_starts,
            num_rows,
            column_indexes: Vec::new(),
            offset_indexes: Vec::new(),
        };
        if options.page_index {
            file.load_page_indexes()?;
        }
        log::debug!(
            "opened parquet file of {} bytes: {} rows in {} row groups, {} columns",
            size,
            file.num_rows,
            file.metadata.row_groups.len(),
            file.schema.columns().len()
        );
        Ok(file)
    }

    fn load_page_indexes(&mut self) -> ParquetResult<()> {
        let mut column_indexes = Vec::with_capacity(self.num_row_groups());
        let mut offset_indexes = Vec::with_capacity(self.num_row_groups());
        for (group, row_group) in self.metadata.row_groups.iter().enumerate() {
            let mut group_column_indexes = Vec::with_capacity(row_group.columns.len());
            let mut group_offset_indexes = Vec::with_capacity(row_group.columns.len());
            for (column, chunk) in row_group.columns.iter().enumerate() {
                let descriptor = self.schema.column(column);
                let context = |_: &mut ParquetError| {
                    format!("row group {group}, column {}", descriptor.path_string())
                };
                let column_index = match (chunk.column_index_offset, chunk.column_index_length) {
                    (Some(offset), Some(length)) => {
                        let bytes = self.read_index_bytes(offset, length).with_context(context)?;
                        let mut cursor = Cursor::new(bytes.as_slice());
                        let thrift = {
                            let mut prot =
                                TCompactInputProtocol::new(&mut cursor, max_thrift_size(&bytes));
                            ThriftColumnIndex::read_from_in_protocol(&mut prot)
                                .map_err(ParquetError::from)
                                .with_context(context)?
                        };
                        Some(ColumnIndex::from_thrift(thrift, descriptor).with_context(context)?)
                    }
                    _ => None,
                };
                let offset_index = match (chunk.offset_index_offset, chunk.offset_index_length) {
                    (Some(offset), Some(length)) => {
                        let bytes = self.read_index_bytes(offset, length).with_context(context)?;
                        let mut cursor = Cursor::new(bytes.as_slice());
                        let thrift = {
                            let mut prot =
                                TCompactInputProtocol::new(&mut cursor, max_thrift_size(&bytes));
                            ThriftOffsetIndex::read_from_in_protocol(&mut prot)
                                .map_err(ParquetError::from)
                                .with_context(context)?
                        };
                        Some(OffsetIndex::from_thrift(thrift).with_context(context)?)
                    }
                    _ => None,
                };
                group_column_indexes.push(column_index);
                group_offset_indexes.push(offset_index);
            }
            column_indexes.push(group_column_indexes);
            offset_indexes.push(group_offset_indexes);
        }
        self.column_indexes = column_indexes;
        self.offset_indexes = offset_indexes;
        Ok(())
    }

    fn read_index_bytes(&self, offset: i64, length: i32) -> ParquetResult<Vec<u8>> {
        let (Ok(offset), Ok(length)) = (u64::try_from(offset), usize::try_from(length)) else {
            return Err(fmt_err!(Format, "invalid page index range {offset}+{length}"));
        };
        if offset + length as u64 > self.size {
            return Err(fmt_err!(
                Format,
                "page index range {offset}+{length} exceeds the file size {}",
                self.size
            ));
        }
        Ok(self.source.read_vec_at(offset, length)?)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Total number of rows, known from the footer alone.
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    pub fn num_row_groups(&self) -> usize {
        self.metadata.row_groups.len()
    }

    pub fn row_group(&self, index: usize) -> Option<RowGroupReader<'_, R>> {
        (index < self.num_row_groups()).then_some(RowGroupReader { file: self, index })
    }

    pub fn row_groups(&self) -> impl Iterator<Item = RowGroupReader<'_, R>> {
        (0..self.num_row_groups()).map(move |index| RowGroupReader { file: self, index })
    }

    /// Global index of the first row of a row group.
    pub fn row_group_start(&self, index: usize) -> Option<u64> {
        self.row_group_starts.get(index).copied()
    }

    /// The row group holding global row `row`, and the row's index within it.
    pub fn locate_row(&self, row: u64) -> Option<(usize, u64)> {
        if row >= self.num_rows {
            return None;
        }
        // the last group starting at or before `row` is never empty
        let group = self
            .row_group_starts
            .partition_point(|&start| start <= row)
            .saturating_sub(1);
        Some((group, row - self.row_group_starts[group]))
    }

    pub fn key_value_metadata(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.metadata
            .key_value_metadata
            .iter()
            .flatten()
            .map(|kv| (kv.key.as_str(), kv.value.as_deref()))
    }

    pub fn key_value(&self, key: &str) -> Option<&str> {
        self.key_value_metadata()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v)
    }

    pub fn created_by(&self) -> Option<&str> {
        self.metadata.created_by.as_deref()
    }

    /// The raw footer.
    pub fn metadata(&self) -> &FileMetaData {
        &self.metadata
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    /// Reads rows from the start of the file.
    pub fn rows(&self) -> RowReader<'_, R> {
        RowReader::new(self)
    }
}

/// Allocation limit when decoding a thrift structure of `bytes`.
fn max_thrift_size(bytes: &[u8]) -> usize {
    // a structure can't take more memory than twice its size
    bytes.len() * 2 + 1024
}

fn read_metadata<R: ReadAt>(source: &R, size: u64) -> ParquetResult<FileMetaData> {
    if size < HEADER_SIZE + FOOTER_SIZE {
        return Err(fmt_err!(
            Format,
            "a file of {size} bytes is too small to be parquet"
        ));
    }
    let head = source.read_vec_at(0, HEADER_SIZE as usize)?;
    if head != PARQUET_MAGIC {
        return Err(fmt_err!(Format, "the file does not start with the parquet magic"));
    }
    let tail = source.read_vec_at(size - FOOTER_SIZE, FOOTER_SIZE as usize)?;
    if &tail[4..] != PARQUET_MAGIC {
        return Err(fmt_err!(Format, "the file does not end with the parquet magic"));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&tail[..4]);
    let metadata_len = u32::from_le_bytes(len_bytes) as u64;
    if metadata_len + FOOTER_SIZE + HEADER_SIZE > size {
        return Err(fmt_err!(
            Format,
            "footer length {metadata_len} exceeds the file size {size}"
        ));
    }
    let bytes = source.read_vec_at(size - FOOTER_SIZE - metadata_len, metadata_len as usize)?;
    let mut cursor = Cursor::new(bytes.as_slice());
    let mut prot = TCompactInputProtocol::new(&mut cursor, max_thrift_size(&bytes));
    Ok(FileMetaData::read_from_in_protocol(&mut prot)?)
}

fn validate_row_group(row_group: &RowGroup, schema: &Schema, size: u64) -> ParquetResult<()> {
    if row_group.num_rows < 0 {
        return Err(fmt_err!(Format, "negative row count {}", row_group.num_rows));
    }
    if row_group.columns.len() != schema.columns().len() {
        return Err(fmt_err!(
            Format,
            "row group has {} column chunks, the schema has {} columns",
            row_group.columns.len(),
            schema.columns().len()
        ));
    }
    for (index, chunk) in row_group.columns.iter().enumerate() {
        let meta = chunk_metadata(chunk).with_context(|_| format!("column {index}"))?;
        let (start, length) = byte_range(meta);
        if start < HEADER_SIZE || start + length > size {
            return Err(fmt_err!(
                Format,
                "column {index} spans bytes {start}..{} outside of the file",
                start + length
            ));
        }
    }
    Ok(())
}

fn chunk_metadata(chunk: &ColumnChunk) -> ParquetResult<&ColumnMetaData> {
    if chunk.file_path.is_some() {
        return Err(fmt_err!(Unsupported, "column chunks in external files are not supported"));
    }
    chunk
        .meta_data
        .as_ref()
        .ok_or_else(|| fmt_err!(Format, "column chunk has no metadata"))
}

/// Start and length of the pages of a column chunk.
fn byte_range(meta: &ColumnMetaData) -> (u64, u64) {
    let start = meta
        .dictionary_page_offset
        .filter(|&offset| offset > 0 && offset < meta.data_page_offset)
        .unwrap_or(meta.data_page_offset);
    (start.max(0) as u64, meta.total_compressed_size.max(0) as u64)
}

/// A row group of an open file.
pub struct RowGroupReader<'a, R: ReadAt> {
    file: &'a ParquetFile<R>,
    index: usize,
}

impl<'a, R: ReadAt> RowGroupReader<'a, R> {
    fn metadata(&self) -> &'a RowGroup {
        &self.file.metadata.row_groups[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn num_rows(&self) -> u64 {
        self.metadata().num_rows as u64
    }

    pub fn num_columns(&self) -> usize {
        self.metadata().columns.len()
    }

    /// Global index of the first row of the group.
    pub fn first_row(&self) -> u64 {
        self.file.row_group_starts[self.index]
    }

    pub fn total_byte_size(&self) -> i64 {
        self.metadata().total_byte_size
    }

    pub fn sorting_columns(&self) -> Option<&'a [SortingColumn]> {
        self.metadata().sorting_columns.as_deref()
    }

    pub fn column(&self, column: usize) -> Option<ColumnChunkReader<'a, R>> {
        let chunk = self.metadata().columns.get(column)?;
        // checked when the file was opened
        let meta = chunk.meta_data.as_ref()?;
        Some(ColumnChunkReader {
            file: self.file,
            row_group: self.index,
            column,
            meta,
        })
    }

    pub fn columns(&self) -> impl Iterator<Item = ColumnChunkReader<'a, R>> + '_ {
        (0..self.num_columns()).filter_map(move |column| self.column(column))
    }
}

/// A column chunk of an open file.
pub struct ColumnChunkReader<'a, R: ReadAt> {
    file: &'a ParquetFile<R>,
    row_group: usize,
    column: usize,
    meta: &'a ColumnMetaData,
}

impl<'a, R: ReadAt> ColumnChunkReader<'a, R> {
    pub fn descriptor(&self) -> &'a ColumnDescriptor {
        self.file.schema.column(self.column)
    }

    pub fn metadata(&self) -> &'a ColumnMetaData {
        self.meta
    }

    pub fn compression(&self) -> ParquetResult<Compression> {
        Compression::try_from(self.meta.codec)
    }

    /// Number of level entries in the chunk, nulls included.
    pub fn num_values(&self) -> u64 {
        self.meta.num_values.max(0) as u64
    }

    /// Start and length of the pages.
    pub fn byte_range(&self) -> (u64, u64) {
        byte_range(self.meta)
    }

    /// Chunk statistics, when the writer recorded them.
    pub fn statistics(&self) -> ParquetResult<Option<Statistics>> {
        let descriptor = self.descriptor();
        self.meta
            .statistics
            .as_ref()
            .map(|stats| {
                Statistics::from_thrift(stats, descriptor.physical_type, descriptor.sort_order())
            })
            .transpose()
    }

    pub fn column_index(&self) -> Option<&'a ColumnIndex> {
        self.file
            .column_indexes
            .get(self.row_group)?
            .get(self.column)?
            .as_ref()
    }

    pub fn offset_index(&self) -> Option<&'a OffsetIndex> {
        self.file
            .offset_indexes
            .get(self.row_group)?
            .get(self.column)?
            .as_ref()
    }

    /// The bloom filter of the chunk, if one was written in a supported layout.
    pub fn bloom_filter(&self) -> ParquetResult<Option<BloomFilter>> {
        let Some(offset) = self.meta.bloom_filter_offset else {
            return Ok(None);
        };
        let offset = u64::try_from(offset)
            .map_err(|_| fmt_err!(Format, "negative bloom filter offset {offset}"))?;
        BloomFilter::read(&self.file.source, offset, self.file.size)
            .with_context(|_| self.context())
    }

    fn context(&self) -> String {
        format!(
            "row group {}, column {} ({})",
            self.row_group,
            self.column,
            self.descriptor().path_string()
        )
    }

    /// Decoded data pages of the chunk, from the first one.
    pub fn pages(&self) -> ParquetResult<PageReader<'a, R>> {
        let (start, length) = self.byte_range();
        self.page_reader(ChunkRange {
            dictionary: None,
            start,
            end: start + length,
            first_page: 0,
        })
    }

    /// Decoded data pages starting at data page `page`, located with the offset index.
    /// The dictionary page, if any, is read first; the pages before `page` are not read.
    pub fn pages_from(&self, page: usize) -> ParquetResult<PageReader<'a, R>> {
        if page == 0 {
            return self.pages();
        }
        let offset_index = self.offset_index().ok_or_else(|| {
            fmt_err!(Format, "{} has no offset index", self.context())
        })?;
        let location = offset_index.page_locations().get(page).ok_or_else(|| {
            fmt_err!(
                Format,
                "{} has {} pages, page {page} was requested",
                self.context(),
                offset_index.num_pages()
            )
        })?;
        let (start, length) = self.byte_range();
        let dictionary = self
            .meta
            .dictionary_page_offset
            .filter(|&offset| offset > 0 && offset < self.meta.data_page_offset)
            .map(|offset| offset as u64);
        self.page_reader(ChunkRange {
            dictionary,
            start: location.offset,
            end: start + length,
            first_page: page,
        })
    }

    fn page_reader(&self, range: ChunkRange) -> ParquetResult<PageReader<'a, R>> {
        let compression = self.compression().with_context(|_| self.context())?;
        Ok(PageReader::new(
            &self.file.source,
            self.descriptor(),
            compression,
            range,
            self.file.options,
        ))
    }

    pub fn row_group_index(&self) -> usize {
        self.row_group
    }

    pub fn column_index_in_schema(&self) -> usize {
        self.column
    }
}
