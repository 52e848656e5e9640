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

use crate::bloom_filter::DEFAULT_BLOOM_FILTER_FPP;
use crate::encoding::Encoding;
use crate::parquet::compression::Compression;

pub use parquet_format_safe::SortingColumn;

pub const DEFAULT_PAGE_SIZE: usize = 1024 * 1024;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 100_000;
pub const DEFAULT_ROW_GROUP_BYTES: usize = 128 * 1024 * 1024;
pub const DEFAULT_DICTIONARY_MAX_CARDINALITY: usize = 1 << 16;
pub const DEFAULT_DICTIONARY_MAX_BYTES: usize = DEFAULT_PAGE_SIZE;

/// The data page header version to write.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    V1,
    V2,
}

impl From<Version> for i32 {
    fn from(version: Version) -> Self {
        match version {
            Version::V1 => 1,
            Version::V2 => 2,
        }
    }
}

/// Knobs of [`ParquetWriter`](super::ParquetWriter). They only change the physical
/// layout, never the rows read back.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    /// Pre-compression size at which a data page is sealed.
    pub page_buffer_size: usize,
    /// Rows staged before they are distributed to the column buffers.
    pub write_buffer_size: usize,
    /// Estimated bytes at which a row group is flushed.
    pub row_group_size: usize,
    /// Rows at which a row group is flushed.
    pub max_rows_per_row_group: usize,
    /// Codec of columns without their own.
    pub compression: Compression,
    /// Non-dictionary encoding of columns without their own.
    pub encoding: Encoding,
    /// Try dictionary encoding first.
    pub dictionary: bool,
    pub dictionary_max_cardinality: usize,
    pub dictionary_max_bytes: usize,
    pub version: Version,
    /// Whether to write statistics.
    pub statistics: bool,
    /// Whether to write column and offset indexes.
    pub page_index: bool,
    /// Whether to write a CRC of every page.
    pub page_checksum: bool,
    /// Sets sorting order of rows in the row group if any
    pub sorting_columns: Option<Vec<SortingColumn>>,
    /// Column paths with a bloom filter and the filter's false positive probability.
    pub bloom_filters: Vec<(String, f64)>,
    pub key_value_metadata: Vec<(String, String)>,
    pub created_by: Option<String>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            page_buffer_size: DEFAULT_PAGE_SIZE,
            write_buffer_size: 0,
            row_group_size: DEFAULT_ROW_GROUP_BYTES,
            max_rows_per_row_group: DEFAULT_ROW_GROUP_SIZE,
            compression: Compression::Uncompressed,
            encoding: Encoding::Plain,
            dictionary: true,
            dictionary_max_cardinality: DEFAULT_DICTIONARY_MAX_CARDINALITY,
            dictionary_max_bytes: DEFAULT_DICTIONARY_MAX_BYTES,
            version: Version::V1,
            statistics: true,
            page_index: true,
            page_checksum: false,
            sorting_columns: None,
            bloom_filters: Vec::new(),
            key_value_metadata: Vec::new(),
            created_by: None,
        }
    }
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the size in bytes at which a data page is sealed. Defaults to `DEFAULT_PAGE_SIZE`.
    pub fn with_page_buffer_size(mut self, size: usize) -> Self {
        self.page_buffer_size = size;
        self
    }

    /// Number of rows buffered before they are shredded into columns. `0` shreds every row
    /// as it is written.
    pub fn with_write_buffer_size(mut self, rows: usize) -> Self {
        self.write_buffer_size = rows;
        self
    }

    /// Sets the estimated size in bytes at which a row group is flushed.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Set the row group size (in number of rows). This can reduce memory pressure.
    pub fn with_max_rows_per_row_group(mut self, rows: usize) -> Self {
        self.max_rows_per_row_group = rows;
        self
    }

    /// Set the compression used. Defaults to `Uncompressed`.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Encoding used when a page is not dictionary encoded. Columns fall back to `Plain`
    /// when their type does not support it.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_dictionary(mut self, dictionary: bool) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_dictionary_max_cardinality(mut self, max: usize) -> Self {
        self.dictionary_max_cardinality = max;
        self
    }

    pub fn with_dictionary_max_bytes(mut self, max: usize) -> Self {
        self.dictionary_max_bytes = max;
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Compute and write statistic
    pub fn with_statistics(mut self, statistics: bool) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_page_index(mut self, page_index: bool) -> Self {
        self.page_index = page_index;
        self
    }

    pub fn with_page_checksum(mut self, page_checksum: bool) -> Self {
        self.page_checksum = page_checksum;
        self
    }

    /// Declares the physical sort order of the rows. The declaration is not checked;
    /// it becomes the boundary order of the column indexes.
    pub fn with_sorting_columns(mut self, sorting_columns: Option<Vec<SortingColumn>>) -> Self {
        self.sorting_columns = sorting_columns;
        self
    }

    /// Writes a bloom filter for the column at dotted `path`. An `fpp` outside `(0, 1)`
    /// uses the default of 1%.
    pub fn with_bloom_filter(mut self, path: impl Into<String>, fpp: f64) -> Self {
        let fpp = if fpp > 0.0 && fpp < 1.0 {
            fpp
        } else {
            DEFAULT_BLOOM_FILTER_FPP
        };
        self.bloom_filters.push((path.into(), fpp));
        self
    }

    pub fn with_key_value_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.key_value_metadata.push((key.into(), value.into()));
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let options = WriterOptions::new()
            .with_page_buffer_size(12)
            .with_compression(Compression::Snappy)
            .with_version(Version::V2)
            .with_bloom_filter("name", 7.0)
            .with_key_value_metadata("origin", "test");
        assert_eq!(options.page_buffer_size, 12);
        assert_eq!(options.compression, Compression::Snappy);
        assert_eq!(options.version, Version::V2);
        assert_eq!(options.bloom_filters, vec![("name".to_string(), DEFAULT_BLOOM_FILTER_FPP)]);
        assert_eq!(options.max_rows_per_row_group, DEFAULT_ROW_GROUP_SIZE);
        assert!(options.dictionary);
    }
}
