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

use super::assemble::{assemble_row, ColumnCursor};
use super::file::{ColumnChunkReader, ParquetFile};
use crate::parquet::error::{fmt_err, ParquetError, ParquetErrorExt, ParquetResult};
use crate::parquet::io::ReadAt;
use crate::parquet::value::Row;

/// Reads the rows of a file in order, starting anywhere.
///
/// Each leaf column is read through its own cursor; a row is assembled from the
/// triplets every cursor yields for it.
pub struct RowReader<'a, R: ReadAt> {
    file: &'a ParquetFile<R>,
    /// Global index of the next row.
    position: u64,
    row_group: usize,
    /// Rows of the current row group not yet read.
    rows_left: u64,
    cursors: Vec<ColumnCursor<'a, R>>,
}

impl<'a, R: ReadAt> RowReader<'a, R> {
    pub fn new(file: &'a ParquetFile<R>) -> Self {
        Self {
            file,
            position: 0,
            row_group: 0,
            rows_left: 0,
            cursors: Vec::new(),
        }
    }

    pub fn file(&self) -> &'a ParquetFile<R> {
        self.file
    }

    pub fn num_rows(&self) -> u64 {
        self.file.num_rows()
    }

    /// Global index of the next row to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Positions the reader on global row `row`. Seeking past the last row leaves the reader
    /// at the end.
    ///
    /// The offset index of each column is used to start decoding at the page holding the
    /// row; earlier pages are not read. Without an offset index the chunk is decoded from
    /// its first page.
    pub fn seek_to_row(&mut self, row: u64) -> ParquetResult<()> {
        self.cursors.clear();
        self.rows_left = 0;
        let Some((group, row_in_group)) = self.file.locate_row(row) else {
            self.position = self.file.num_rows();
            self.row_group = self.file.num_row_groups();
            return Ok(());
        };
        self.open_row_group(group, row_in_group)?;
        self.position = row;
        Ok(())
    }

    /// Opens the cursors of row group `group` positioned on its row `row_in_group`.
    fn open_row_group(&mut self, group: usize, row_in_group: u64) -> ParquetResult<()> {
        let file = self.file;
        let row_group = file
            .row_group(group)
            .ok_or_else(|| fmt_err!(Format, "row group {group} does not exist"))?;
        let mut cursors = Vec::with_capacity(row_group.num_columns());
        for chunk in row_group.columns() {
            let cursor = open_cursor(&chunk, row_in_group).with_context(|_| {
                format!(
                    "row group {group}, column {} ({})",
                    chunk.column_index_in_schema(),
                    chunk.descriptor().path_string()
                )
            })?;
            cursors.push(cursor);
        }
        log::trace!("positioned on row {row_in_group} of row group {group}");
        self.cursors = cursors;
        self.row_group = group;
        self.rows_left = row_group.num_rows() - row_in_group;
        Ok(())
    }

    /// Reads the next row, or `None` once every row was read.
    pub fn next_row(&mut self) -> ParquetResult<Option<Row>> {
        if self.position >= self.file.num_rows() {
            return Ok(None);
        }
        while self.rows_left == 0 {
            let next = if self.cursors.is_empty() && self.position == 0 {
                0
            } else {
                self.row_group + 1
            };
            if next >= self.file.num_row_groups() {
                return Err(fmt_err!(
                    Corruption,
                    "row groups ended at row {} of {}",
                    self.position,
                    self.file.num_rows()
                ));
            }
            self.open_row_group(next, 0)?;
        }

        let group = self.row_group;
        let group_rows = self.file.row_group(group).map_or(0, |g| g.num_rows());
        let row_in_group = group_rows - self.rows_left;
        let mut columns = Vec::with_capacity(self.cursors.len());
        for (column, cursor) in self.cursors.iter_mut().enumerate() {
            let context = |_: &mut ParquetError| format!("row group {group}, column {column}");
            let triplets = cursor
                .next_row()
                .with_context(context)?
                .ok_or_else(|| {
                    fmt_err!(
                        Corruption,
                        "column chunk ended at row {row_in_group} of {group_rows}"
                    )
                })
                .with_context(context)?;
            columns.push(triplets);
        }
        let row = assemble_row(self.file.schema(), &columns)
            .with_context(|_| format!("row group {group}"))?;
        self.rows_left -= 1;
        self.position += 1;
        Ok(Some(row))
    }

    /// Fills `buffer` with the next rows and returns how many were read.
    /// Fewer than `buffer.len()`, down to zero, means the end was reached.
    pub fn read(&mut self, buffer: &mut [Row]) -> ParquetResult<usize> {
        for (filled, slot) in buffer.iter_mut().enumerate() {
            match self.next_row()? {
                Some(row) => *slot = row,
                None => return Ok(filled),
            }
        }
        Ok(buffer.len())
    }
}

fn open_cursor<'a, R: ReadAt>(
    chunk: &ColumnChunkReader<'a, R>,
    row_in_group: u64,
) -> ParquetResult<ColumnCursor<'a, R>> {
    let max_def_level = chunk.descriptor().max_def_level;
    let located = chunk
        .offset_index()
        .filter(|index| index.num_pages() > 0)
        .map(|index| {
            let page = index.page_for_row(row_in_group);
            (page, index.page_locations()[page].first_row_index)
        });
    let (pages, skip) = match located {
        Some((page, first_row)) if row_in_group > 0 => {
            (chunk.pages_from(page)?, row_in_group - first_row)
        }
        _ => (chunk.pages()?, row_in_group),
    };
    let mut cursor = ColumnCursor::new(pages, max_def_level);
    cursor.skip_rows(skip)?;
    Ok(cursor)
}

impl<R: ReadAt> Iterator for RowReader<'_, R> {
    type Item = ParquetResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
