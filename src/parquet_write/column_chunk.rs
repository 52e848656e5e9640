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

use std::collections::{BTreeSet, HashSet};
use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{ColumnChunk, ColumnMetaData};

use super::options::{Version, WriterOptions};
use super::page::{
    build_data_page, build_dictionary_page, write_page, CompressedPage, DataPageParts,
};
use super::shred::Triplet;
use crate::bloom_filter::BloomFilter;
use crate::encoding::dictionary::{encode_indices, DictionaryBuilder};
use crate::encoding::{bit_width, ceil8, Encoding};
use crate::parquet::compression::Compression;
use crate::parquet::error::{ParquetErrorExt, ParquetResult};
use crate::parquet::indexes::{PageBounds, PageLocation};
use crate::parquet::io::CountingWriter;
use crate::parquet::schema::{
    encoding_supports, physical_type_to_thrift, ColumnDescriptor, PhysicalType,
};
use crate::parquet::statistics::{Statistics, StatisticsBuilder};
use crate::parquet::value::Value;

/// A column chunk as written: its footer metadata plus what the page indexes need.
#[derive(Debug)]
pub struct WrittenColumnChunk {
    pub chunk: ColumnChunk,
    pub locations: Vec<PageLocation>,
    /// Bounds and counts of every data page.
    pub page_bounds: Vec<PageBounds>,
}

/// Buffers the values of one leaf column for the current row group and seals them into pages.
pub struct ColumnChunkWriter {
    descriptor: ColumnDescriptor,
    version: Version,
    compression: Compression,
    statistics: bool,
    checksum: bool,
    /// Encoding of pages that are not dictionary encoded.
    fallback: Encoding,
    dictionary: Option<DictionaryBuilder>,
    /// Whether new pages may still use the dictionary.
    dictionary_open: bool,
    dictionary_max_cardinality: usize,
    dictionary_max_bytes: usize,
    level_bits: usize,

    def_levels: Vec<i16>,
    rep_levels: Vec<i16>,
    values: Vec<Value>,
    page_num_values: usize,
    page_rows: usize,
    page_value_bytes: usize,

    pages: Vec<CompressedPage>,
    pages_bytes: usize,
    num_rows: u64,
    num_values: u64,
    chunk_statistics: StatisticsBuilder,
    encodings: BTreeSet<Encoding>,
    bloom_hashes: Option<(HashSet<u64>, f64)>,
}

impl ColumnChunkWriter {
    pub fn new(descriptor: ColumnDescriptor, options: &WriterOptions) -> Self {
        let physical_type = descriptor.physical_type;
        let supported = |e: Encoding| encoding_supports(e, physical_type);
        let (dictionary, fallback) = match descriptor.encoding {
            Some(encoding) if encoding.is_dictionary() => (true, Encoding::Plain),
            Some(encoding) => (false, encoding),
            None if options.encoding.is_dictionary() => (true, Encoding::Plain),
            None if supported(options.encoding) => (options.dictionary, options.encoding),
            None => (options.dictionary, Encoding::Plain),
        };
        let dictionary = dictionary && physical_type != PhysicalType::Boolean;
        let bloom_hashes = options
            .bloom_filters
            .iter()
            .find(|(path, _)| *path == descriptor.path_string())
            .map(|(_, fpp)| (HashSet::new(), *fpp));
        let level_bits = (bit_width(descriptor.max_def_level as u64)
            + bit_width(descriptor.max_rep_level as u64)) as usize;
        let order = descriptor.sort_order();
        Self {
            compression: descriptor.compression.unwrap_or(options.compression),
            version: options.version,
            statistics: options.statistics,
            checksum: options.page_checksum,
            fallback,
            dictionary: dictionary.then(|| DictionaryBuilder::new(physical_type)),
            dictionary_open: dictionary,
            dictionary_max_cardinality: options.dictionary_max_cardinality,
            dictionary_max_bytes: options.dictionary_max_bytes,
            level_bits,
            def_levels: Vec::new(),
            rep_levels: Vec::new(),
            values: Vec::new(),
            page_num_values: 0,
            page_rows: 0,
            page_value_bytes: 0,
            pages: Vec::new(),
            pages_bytes: 0,
            num_rows: 0,
            num_values: 0,
            chunk_statistics: StatisticsBuilder::new(order),
            encodings: BTreeSet::new(),
            bloom_hashes,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Appends the triplets of one row.
    pub fn push_row(&mut self, triplets: Vec<Triplet>) {
        for Triplet { def, rep, value } in triplets {
            if self.descriptor.max_def_level > 0 {
                self.def_levels.push(def);
            }
            if self.descriptor.max_rep_level > 0 {
                self.rep_levels.push(rep);
            }
            if let Some(value) = value {
                if let Some((hashes, _)) = &mut self.bloom_hashes {
                    hashes.insert(crate::bloom_filter::hash_value(&value));
                }
                self.page_value_bytes += value.plain_size();
                self.values.push(value);
            }
            self.page_num_values += 1;
        }
        self.page_rows += 1;
        self.num_rows += 1;
    }

    /// Pre-compression estimate of the current page.
    pub fn estimated_page_size(&self) -> usize {
        self.page_value_bytes + ceil8(self.page_num_values * self.level_bits)
    }

    /// Estimate of the whole chunk: sealed pages, dictionary and current page.
    pub fn estimated_size(&self) -> usize {
        let dictionary = self.dictionary.as_ref().map_or(0, DictionaryBuilder::byte_size);
        self.pages_bytes + dictionary + self.estimated_page_size()
    }

    /// Seals the buffered rows into a page. Does nothing when no row is buffered.
    pub fn seal_page(&mut self) -> ParquetResult<()> {
        if self.page_rows == 0 {
            return Ok(());
        }
        let physical_type = self.descriptor.physical_type;

        let statistics = self.statistics.then(|| {
            let mut builder = StatisticsBuilder::new(self.descriptor.sort_order());
            for value in &self.values {
                builder.update(value);
            }
            let mut statistics = builder.finish();
            statistics.null_count = (self.page_num_values - self.values.len()) as u64;
            statistics
        });
        if let Some(statistics) = &statistics {
            self.chunk_statistics.merge(statistics);
        }

        let mut encoded = Vec::with_capacity(self.page_value_bytes);
        let encoding = match self.dictionary_indices() {
            Some((indices, dictionary_len)) => {
                encode_indices(&indices, dictionary_len, &mut encoded);
                Encoding::RleDictionary
            }
            None => {
                let fallback = self.fallback;
                super::page::encode_values(&self.values, physical_type, fallback, &mut encoded)?;
                fallback
            }
        };

        let parts = DataPageParts {
            rep_levels: &self.rep_levels,
            max_rep_level: self.descriptor.max_rep_level,
            def_levels: &self.def_levels,
            max_def_level: self.descriptor.max_def_level,
            values: &encoded,
            encoding,
            num_values: self.page_num_values,
            num_nulls: self.page_num_values - self.values.len(),
            num_rows: self.page_rows,
            first_row_index: self.num_rows - self.page_rows as u64,
            statistics,
        };
        let page = build_data_page(parts, self.version, self.compression, self.checksum)?;
        log::debug!(
            "sealed page {} of column {}: {} rows, {} values, {:?}, {} bytes",
            self.pages.len(),
            self.descriptor.path_string(),
            self.page_rows,
            self.page_num_values,
            encoding,
            page.compressed_size()
        );

        self.encodings.insert(encoding);
        self.pages_bytes += page.compressed_size();
        self.num_values += self.page_num_values as u64;
        self.pages.push(page);
        self.def_levels.clear();
        self.rep_levels.clear();
        self.values.clear();
        self.page_num_values = 0;
        self.page_rows = 0;
        self.page_value_bytes = 0;
        Ok(())
    }

    /// Dictionary indices of the buffered values, or `None` when the page is written with
    /// the fallback encoding. Closes the dictionary when the page does not fit in it.
    fn dictionary_indices(&mut self) -> Option<(Vec<u32>, usize)> {
        if !self.dictionary_open || self.values.is_empty() {
            return None;
        }
        let dictionary = self.dictionary.as_mut()?;
        match dictionary.try_insert_page(
            &self.values,
            self.dictionary_max_cardinality,
            self.dictionary_max_bytes,
        ) {
            Some(indices) => Some((indices, dictionary.len())),
            None => {
                log::debug!(
                    "dictionary of column {} is full at {} values, falling back to {:?}",
                    self.descriptor.path_string(),
                    dictionary.len(),
                    self.fallback
                );
                self.dictionary_open = false;
                None
            }
        }
    }

    /// Seals the last page and writes the chunk: dictionary page, data pages, bloom filter
    /// and the column metadata.
    pub fn finish<W: Write>(
        mut self,
        sink: &mut CountingWriter<W>,
    ) -> ParquetResult<WrittenColumnChunk> {
        let path = self.descriptor.path_string();
        self.seal_page().with_context(|_| format!("column {path}"))?;

        let dictionary_page = match &self.dictionary {
            Some(dictionary) if !dictionary.is_empty() => {
                let mut plain = Vec::with_capacity(dictionary.byte_size());
                dictionary.encode(&mut plain)?;
                self.encodings.insert(Encoding::Plain);
                Some(build_dictionary_page(
                    &plain,
                    dictionary.len(),
                    self.compression,
                    self.checksum,
                )?)
            }
            _ => None,
        };
        if self.descriptor.max_def_level > 0 || self.descriptor.max_rep_level > 0 {
            self.encodings.insert(Encoding::Rle);
        }

        let mut total_compressed_size = 0u64;
        let mut total_uncompressed_size = 0u64;
        let mut dictionary_page_offset = None;
        if let Some(page) = &dictionary_page {
            let offset = sink.position();
            let spec = write_page(sink, offset, page)?;
            dictionary_page_offset = Some(offset as i64);
            total_compressed_size += spec.bytes_written;
            total_uncompressed_size += spec.header_size + page.uncompressed_size() as u64;
        }

        let data_page_offset = sink.position();
        let mut locations = Vec::with_capacity(self.pages.len());
        let mut page_bounds = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let offset = sink.position();
            let spec = write_page(sink, offset, page)?;
            total_compressed_size += spec.bytes_written;
            total_uncompressed_size += spec.header_size + page.uncompressed_size() as u64;
            locations.push(PageLocation {
                offset,
                compressed_page_size: spec.bytes_written as usize,
                first_row_index: page.first_row_index,
            });
            let header = &page.header;
            let num_values = match (&header.data_page_header, &header.data_page_header_v2) {
                (Some(v1), _) => v1.num_values,
                (None, Some(v2)) => v2.num_values,
                (None, None) => 0,
            } as u64;
            page_bounds.push(match &page.statistics {
                Some(Statistics {
                    min,
                    max,
                    null_count,
                    ..
                }) => PageBounds {
                    min: min.clone(),
                    max: max.clone(),
                    null_count: *null_count,
                    num_values,
                },
                None => PageBounds {
                    min: None,
                    max: None,
                    null_count: 0,
                    num_values,
                },
            });
        }

        let bloom_filter_offset = match &self.bloom_hashes {
            Some((hashes, fpp)) if !hashes.is_empty() => {
                let mut filter = BloomFilter::with_capacity(hashes.len(), *fpp);
                for &hash in hashes {
                    filter.insert_hash(hash);
                }
                let offset = sink.position();
                filter.write(sink)?;
                Some(offset as i64)
            }
            _ => None,
        };

        let (type_, _) = physical_type_to_thrift(self.descriptor.physical_type);
        let metadata = ColumnMetaData {
            type_,
            encodings: self.encodings.iter().map(|&e| e.into()).collect(),
            path_in_schema: self.descriptor.path.clone(),
            codec: self.compression.into(),
            num_values: self.num_values as i64,
            total_uncompressed_size: total_uncompressed_size as i64,
            total_compressed_size: total_compressed_size as i64,
            key_value_metadata: None,
            data_page_offset: data_page_offset as i64,
            index_page_offset: None,
            dictionary_page_offset,
            statistics: self
                .statistics
                .then(|| self.chunk_statistics.finish().to_thrift()),
            encoding_stats: None,
            bloom_filter_offset,
        };

        // the metadata is also written after the chunk
        let file_offset = sink.position();
        let mut protocol = TCompactOutputProtocol::new(&mut *sink);
        metadata.write_to_out_protocol(&mut protocol)?;

        Ok(WrittenColumnChunk {
            chunk: ColumnChunk {
                file_path: None,
                file_offset: file_offset as i64,
                meta_data: Some(metadata),
                offset_index_offset: None,
                offset_index_length: None,
                column_index_offset: None,
                column_index_length: None,
                crypto_metadata: None,
                encrypted_column_metadata: None,
            },
            locations,
            page_bounds,
        })
    }
}
