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

use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{ColumnOrder, FileMetaData, KeyValue, RowGroup, TypeDefinedOrder};

use super::column_chunk::WrittenColumnChunk;
use super::options::WriterOptions;
use super::row_group::RowGroupWriter;
use super::shred::{shred_row, ShreddedRow};
use crate::parquet::error::{fmt_err, ParquetErrorCause, ParquetErrorExt, ParquetResult};
use crate::parquet::indexes::{BoundaryOrder, ColumnIndex, OffsetIndex};
use crate::parquet::io::CountingWriter;
use crate::parquet::schema::{Schema, SortOrder};
use crate::parquet::value::{Row, Value};

pub const PARQUET_MAGIC: [u8; 4] = *b"PAR1";
const DEFAULT_CREATED_BY: &str = concat!("parquet-rows version ", env!("CARGO_PKG_VERSION"));

/// Used to recall the state of the parquet writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initialised,
    Started,
    Finished,
}

/// Writes rows of a fixed schema to `W` as a parquet file.
///
/// Rows accumulate in column buffers; pages are sealed as they fill up and row groups are
/// written on [`ParquetWriter::flush`] or when a row group threshold is reached. The footer
/// is written by [`ParquetWriter::close`].
pub struct ParquetWriter<W: Write> {
    sink: CountingWriter<W>,
    schema: Schema,
    options: WriterOptions,
    state: State,
    staged: Vec<ShreddedRow>,
    row_group: RowGroupWriter,
    row_groups: Vec<RowGroup>,
    /// Page bounds and locations of every written chunk, per row group.
    chunks: Vec<Vec<WrittenColumnChunk>>,
    num_rows: u64,
}

impl<W: Write> ParquetWriter<W> {
    pub fn new(sink: W, schema: Schema, options: WriterOptions) -> ParquetResult<Self> {
        validate_options(&schema, &options)?;
        let row_group = RowGroupWriter::new(&schema, &options);
        Ok(Self {
            sink: CountingWriter::new(sink),
            schema,
            options,
            state: State::Initialised,
            staged: Vec::new(),
            row_group,
            row_groups: Vec::new(),
            chunks: Vec::new(),
            num_rows: 0,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Rows accepted so far, including the ones not yet flushed.
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    /// Row groups written so far.
    pub fn num_row_groups(&self) -> usize {
        self.row_groups.len()
    }

    fn check_open(&self) -> ParquetResult<()> {
        if self.state == State::Finished {
            return Err(ParquetErrorCause::Closed.into_err());
        }
        Ok(())
    }

    /// Writes `rows`, returning how many were written. The batch is rejected as a whole,
    /// before anything is buffered, when one of its rows does not match the schema.
    pub fn write(&mut self, rows: &[Row]) -> ParquetResult<usize> {
        self.check_open()?;
        let shredded = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                shred_row(&self.schema, row).with_context(|_| format!("row {i} of the batch"))
            })
            .collect::<ParquetResult<Vec<_>>>()?;
        for row in shredded {
            self.stage(row)?;
        }
        Ok(rows.len())
    }

    pub fn write_row(&mut self, row: &Row) -> ParquetResult<()> {
        self.check_open()?;
        let shredded = shred_row(&self.schema, row)?;
        self.stage(shredded)
    }

    fn stage(&mut self, row: ShreddedRow) -> ParquetResult<()> {
        self.num_rows += 1;
        if self.options.write_buffer_size == 0 {
            return self.push(row);
        }
        self.staged.push(row);
        if self.staged.len() >= self.options.write_buffer_size {
            self.drain_staged()?;
        }
        Ok(())
    }

    fn drain_staged(&mut self) -> ParquetResult<()> {
        for row in std::mem::take(&mut self.staged) {
            self.push(row)?;
        }
        Ok(())
    }

    fn push(&mut self, row: ShreddedRow) -> ParquetResult<()> {
        self.row_group.push_row(row, self.options.page_buffer_size)?;
        if self.row_group.num_rows() >= self.options.max_rows_per_row_group
            || self.row_group.estimated_size() >= self.options.row_group_size
        {
            self.flush_row_group()?;
        }
        Ok(())
    }

    fn start(&mut self) -> ParquetResult<()> {
        if self.state == State::Initialised {
            self.sink.write_all(&PARQUET_MAGIC)?;
            self.state = State::Started;
        }
        Ok(())
    }

    fn flush_row_group(&mut self) -> ParquetResult<()> {
        if self.row_group.is_empty() {
            return Ok(());
        }
        self.start()?;
        let row_group = std::mem::replace(
            &mut self.row_group,
            RowGroupWriter::new(&self.schema, &self.options),
        );
        let ordinal = self.row_groups.len();
        let (metadata, chunks) =
            row_group.finish(&mut self.sink, &self.options.sorting_columns, ordinal)?;
        log::debug!(
            "flushed row group {} with {} rows, {} bytes",
            ordinal,
            metadata.num_rows,
            metadata.total_compressed_size.unwrap_or_default()
        );
        self.row_groups.push(metadata);
        self.chunks.push(chunks);
        Ok(())
    }

    /// Closes the current row group. Rows written afterwards go to the next one.
    pub fn flush(&mut self) -> ParquetResult<()> {
        self.check_open()?;
        self.drain_staged()?;
        self.flush_row_group()
    }

    /// Flushes pending rows and writes the page indexes and the footer.
    /// Returns the total size of the file.
    pub fn close(&mut self) -> ParquetResult<u64> {
        self.flush()?;
        self.start()?;
        if self.options.page_index {
            self.write_page_indexes()?;
        }
        let metadata = self.file_metadata();
        let mut protocol = TCompactOutputProtocol::new(&mut self.sink);
        let metadata_len = metadata.write_to_out_protocol(&mut protocol)? as u32;
        self.sink.write_all(&metadata_len.to_le_bytes())?;
        self.sink.write_all(&PARQUET_MAGIC)?;
        self.sink.flush()?;
        self.state = State::Finished;
        log::debug!(
            "wrote footer of {} bytes: {} rows in {} row groups",
            metadata_len,
            self.num_rows,
            self.row_groups.len()
        );
        Ok(self.sink.position())
    }

    /// Returns the underlying sink, closing the file first if it is still open.
    pub fn into_inner(mut self) -> ParquetResult<W> {
        if self.state != State::Finished {
            self.close()?;
        }
        Ok(self.sink.into_inner())
    }

    /// Declared sorting columns are trusted as is; other columns get the order their pages show.
    fn boundary_order(
        &self,
        column: usize,
        bounds: &[(Option<Value>, Option<Value>)],
    ) -> BoundaryOrder {
        let declared = self
            .options
            .sorting_columns
            .iter()
            .flatten()
            .find(|c| c.column_idx as usize == column);
        match declared {
            Some(c) if c.descending => BoundaryOrder::Descending,
            Some(_) => BoundaryOrder::Ascending,
            None => {
                ColumnIndex::compute_boundary_order(bounds, self.schema.column(column).sort_order())
            }
        }
    }

    /// Writes the column indexes, then the offset indexes, of every chunk.
    fn write_page_indexes(&mut self) -> ParquetResult<()> {
        let mut column_indexes = Vec::new();
        for chunks in &self.chunks {
            let mut group = Vec::with_capacity(chunks.len());
            for (i, chunk) in chunks.iter().enumerate() {
                let order = self.schema.column(i).sort_order();
                if !self.options.statistics || order == SortOrder::Undefined {
                    group.push(None);
                    continue;
                }
                let bounds = chunk
                    .page_bounds
                    .iter()
                    .map(|page| (page.min.clone(), page.max.clone()))
                    .collect::<Vec<_>>();
                let boundary_order = self.boundary_order(i, &bounds);
                let index = ColumnIndex::new(chunk.page_bounds.clone(), boundary_order, order);
                if index.is_none() {
                    log::debug!(
                        "no column index for {}: a page has values but no bounds",
                        self.schema.column(i).path_string()
                    );
                }
                group.push(index);
            }
            column_indexes.push(group);
        }

        for (group, indexes) in column_indexes.iter().enumerate() {
            for (column, index) in indexes.iter().enumerate() {
                let Some(index) = index else { continue };
                let offset = self.sink.position();
                let mut protocol = TCompactOutputProtocol::new(&mut self.sink);
                let length = index.to_thrift().write_to_out_protocol(&mut protocol)?;
                let chunk = &mut self.row_groups[group].columns[column];
                chunk.column_index_offset = Some(offset as i64);
                chunk.column_index_length = Some(length as i32);
            }
        }

        for group in 0..self.chunks.len() {
            for column in 0..self.chunks[group].len() {
                let index = OffsetIndex::new(self.chunks[group][column].locations.clone());
                let offset = self.sink.position();
                let mut protocol = TCompactOutputProtocol::new(&mut self.sink);
                let length = index.to_thrift().write_to_out_protocol(&mut protocol)?;
                let chunk = &mut self.row_groups[group].columns[column];
                chunk.offset_index_offset = Some(offset as i64);
                chunk.offset_index_length = Some(length as i32);
            }
        }
        Ok(())
    }

    fn file_metadata(&self) -> FileMetaData {
        let key_value_metadata = (!self.options.key_value_metadata.is_empty()).then(|| {
            self.options
                .key_value_metadata
                .iter()
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: Some(value.clone()),
                })
                .collect()
        });
        FileMetaData {
            version: self.options.version.into(),
            schema: self.schema.to_thrift(),
            num_rows: self.num_rows as i64,
            row_groups: self.row_groups.clone(),
            key_value_metadata,
            created_by: Some(
                self.options
                    .created_by
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CREATED_BY.to_string()),
            ),
            column_orders: Some(
                self.schema
                    .columns()
                    .iter()
                    .map(|_| ColumnOrder::TYPEORDER(TypeDefinedOrder {}))
                    .collect(),
            ),
            encryption_algorithm: None,
            footer_signing_key_metadata: None,
        }
    }
}

fn validate_options(schema: &Schema, options: &WriterOptions) -> ParquetResult<()> {
    if !options.compression.is_supported() {
        return Err(fmt_err!(
            Unsupported,
            "compression {:?} is not available in this build",
            options.compression
        ));
    }
    for (path, _) in &options.bloom_filters {
        if schema.column_index(path).is_none() {
            return Err(fmt_err!(
                SchemaMismatch,
                "bloom filter requested for unknown column {path}"
            ));
        }
    }
    for sorting in options.sorting_columns.iter().flatten() {
        let known = usize::try_from(sorting.column_idx)
            .map(|i| i < schema.columns().len())
            .unwrap_or(false);
        if !known {
            return Err(fmt_err!(
                SchemaMismatch,
                "sorting column {} is not a column of the schema",
                sorting.column_idx
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parquet::schema::{Node, PhysicalType, Repetition};
    use crate::parquet_write::SortingColumn;

    fn people() -> Schema {
        Schema::new(
            "people",
            vec![
                Node::required("id", PhysicalType::Int64),
                Node::string("name", Repetition::Optional),
            ],
        )
        .unwrap()
    }

    fn person(id: i64, name: Option<&str>) -> Row {
        Row::new(vec![id.into(), name.into()])
    }

    #[test]
    fn empty_file_is_valid() {
        let mut writer = ParquetWriter::new(Vec::new(), people(), WriterOptions::new()).unwrap();
        let size = writer.close().unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(size as usize, bytes.len());
        assert_eq!(&bytes[..4], b"PAR1");
        assert_eq!(&bytes[bytes.len() - 4..], b"PAR1");
    }

    #[test]
    fn flush_starts_a_new_row_group() {
        let mut writer = ParquetWriter::new(Vec::new(), people(), WriterOptions::new()).unwrap();
        writer.write(&[person(0, Some("Bob")), person(1, None)]).unwrap();
        writer.flush().unwrap();
        // an empty flush does not produce an empty row group
        writer.flush().unwrap();
        writer.write_row(&person(2, Some("Franky"))).unwrap();
        writer.close().unwrap();
        assert_eq!(writer.num_row_groups(), 2);
        assert_eq!(writer.row_groups[0].num_rows, 2);
        assert_eq!(writer.row_groups[1].num_rows, 1);
        assert!(writer.row_groups[1].columns[0].offset_index_offset.is_some());
    }

    #[test]
    fn row_count_threshold() {
        let options = WriterOptions::new().with_max_rows_per_row_group(2);
        let mut writer = ParquetWriter::new(Vec::new(), people(), options).unwrap();
        let rows = (0..5).map(|i| person(i, None)).collect::<Vec<_>>();
        assert_eq!(writer.write(&rows).unwrap(), 5);
        writer.close().unwrap();
        let sizes = writer.row_groups.iter().map(|g| g.num_rows).collect::<Vec<_>>();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn write_buffer_defers_shredded_rows() {
        let options = WriterOptions::new().with_write_buffer_size(3);
        let mut writer = ParquetWriter::new(Vec::new(), people(), options).unwrap();
        writer.write(&[person(0, None), person(1, None)]).unwrap();
        assert_eq!(writer.staged.len(), 2);
        assert_eq!(writer.row_group.num_rows(), 0);
        writer.write_row(&person(2, None)).unwrap();
        assert!(writer.staged.is_empty());
        assert_eq!(writer.row_group.num_rows(), 3);
    }

    #[test]
    fn bad_batch_is_rejected_whole() {
        let mut writer = ParquetWriter::new(Vec::new(), people(), WriterOptions::new()).unwrap();
        let rows = vec![person(0, None), Row::new(vec![1i32.into(), "x".into()])];
        let err = writer.write(&rows).unwrap_err();
        assert!(matches!(err.cause(), ParquetErrorCause::SchemaMismatch));
        assert_eq!(writer.num_rows(), 0);
    }

    #[test]
    fn closed_writer_rejects_everything() {
        let mut writer = ParquetWriter::new(Vec::new(), people(), WriterOptions::new()).unwrap();
        writer.close().unwrap();
        for err in [
            writer.write(&[person(0, None)]).unwrap_err(),
            writer.flush().unwrap_err(),
            writer.close().map(|_| ()).unwrap_err(),
        ] {
            assert!(matches!(err.cause(), ParquetErrorCause::Closed));
        }
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = WriterOptions::new().with_bloom_filter("missing", 0.01);
        assert!(ParquetWriter::new(Vec::new(), people(), options).is_err());

        let sorting = SortingColumn {
            column_idx: 7,
            descending: false,
            nulls_first: false,
        };
        let options = WriterOptions::new().with_sorting_columns(Some(vec![sorting]));
        assert!(ParquetWriter::new(Vec::new(), people(), options).is_err());
    }
}
