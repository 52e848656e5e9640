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

use parquet_format_safe::{RowGroup, SortingColumn};

use super::column_chunk::{ColumnChunkWriter, WrittenColumnChunk};
use super::options::WriterOptions;
use super::shred::ShreddedRow;
use crate::parquet::error::{ParquetErrorExt, ParquetResult};
use crate::parquet::io::CountingWriter;
use crate::parquet::schema::Schema;

/// The column chunks of the row group being filled.
pub struct RowGroupWriter {
    columns: Vec<ColumnChunkWriter>,
    num_rows: usize,
}

impl RowGroupWriter {
    pub fn new(schema: &Schema, options: &WriterOptions) -> Self {
        let columns = schema
            .columns()
            .iter()
            .map(|descriptor| ColumnChunkWriter::new(descriptor.clone(), options))
            .collect();
        Self {
            columns,
            num_rows: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Fans a shredded row out to the columns, sealing the pages that reached
    /// `page_buffer_size`. Pages only break between rows.
    pub fn push_row(&mut self, row: ShreddedRow, page_buffer_size: usize) -> ParquetResult<()> {
        for (column, triplets) in self.columns.iter_mut().zip(row) {
            column.push_row(triplets);
            if column.estimated_page_size() >= page_buffer_size {
                let path = column.descriptor().path_string();
                column
                    .seal_page()
                    .with_context(|_| format!("column {path}"))?;
            }
        }
        self.num_rows += 1;
        Ok(())
    }

    /// Estimated size of the row group once written.
    pub fn estimated_size(&self) -> usize {
        self.columns.iter().map(ColumnChunkWriter::estimated_size).sum()
    }

    /// Writes every column chunk and returns the row group metadata.
    pub fn finish<W: Write>(
        self,
        sink: &mut CountingWriter<W>,
        sorting_columns: &Option<Vec<SortingColumn>>,
        ordinal: usize,
    ) -> ParquetResult<(RowGroup, Vec<WrittenColumnChunk>)> {
        let num_rows = self.num_rows;
        let written = self
            .columns
            .into_iter()
            .map(|column| column.finish(sink))
            .collect::<ParquetResult<Vec<_>>>()
            .with_context(|_| format!("row group {ordinal}"))?;

        let file_offset = written.first().and_then(|c| {
            c.chunk.meta_data.as_ref().map(|meta| {
                meta.dictionary_page_offset
                    .filter(|&x| x > 0)
                    .unwrap_or(meta.data_page_offset)
            })
        });
        let total_byte_size = written
            .iter()
            .filter_map(|c| c.chunk.meta_data.as_ref())
            .map(|meta| meta.total_uncompressed_size)
            .sum();
        let total_compressed_size = written
            .iter()
            .filter_map(|c| c.chunk.meta_data.as_ref())
            .map(|meta| meta.total_compressed_size)
            .sum();

        let row_group = RowGroup {
            columns: written.iter().map(|c| c.chunk.clone()).collect(),
            total_byte_size,
            num_rows: num_rows as i64,
            sorting_columns: sorting_columns.clone(),
            file_offset,
            total_compressed_size: Some(total_compressed_size),
            ordinal: ordinal.try_into().ok(),
        };
        Ok((row_group, written))
    }
}
