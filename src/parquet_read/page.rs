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
use parquet_format_safe::{PageHeader, PageType};

use super::decode::{decode_levels, decode_values, split_prefixed};
use super::options::ReaderOptions;
use crate::encoding::{plain, Encoding};
use crate::parquet::compression::{decompress, Compression};
use crate::parquet::error::{fmt_err, ParquetErrorExt, ParquetResult};
use crate::parquet::io::ReadAt;
use crate::parquet::schema::ColumnDescriptor;
use crate::parquet::statistics::Statistics;
use crate::parquet::value::Value;

const HEADER_PROBE_BYTES: usize = 256;

/// A decoded data page.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPage {
    pub encoding: Encoding,
    pub rep_levels: Vec<i16>,
    pub def_levels: Vec<i16>,
    /// The non-null values, in order.
    pub values: Vec<Value>,
    pub statistics: Option<Statistics>,
}

impl DataPage {
    /// Number of level entries, nulls included.
    pub fn num_values(&self) -> usize {
        self.def_levels.len()
    }

    pub fn num_nulls(&self) -> usize {
        self.num_values() - self.values.len()
    }

    /// Number of rows starting in this page.
    pub fn num_rows(&self) -> usize {
        self.rep_levels.iter().filter(|&&rep| rep == 0).count()
    }
}

/// Where a page reader starts reading.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChunkRange {
    /// Offset of the dictionary page, read before anything else.
    pub dictionary: Option<u64>,
    pub start: u64,
    pub end: u64,
    /// Index of the first data page read.
    pub first_page: usize,
}

/// Lazy, forward only iterator of the decoded data pages of a column chunk.
///
/// The dictionary page is consumed on the way and only used to decode the data pages.
pub struct PageReader<'a, R: ReadAt + ?Sized> {
    source: &'a R,
    descriptor: &'a ColumnDescriptor,
    compression: Compression,
    options: ReaderOptions,
    pending_dictionary: Option<u64>,
    dictionary: Option<Vec<Value>>,
    offset: u64,
    end: u64,
    page_index: usize,
}

impl<'a, R: ReadAt + ?Sized> PageReader<'a, R> {
    pub(crate) fn new(
        source: &'a R,
        descriptor: &'a ColumnDescriptor,
        compression: Compression,
        range: ChunkRange,
        options: ReaderOptions,
    ) -> Self {
        Self {
            source,
            descriptor,
            compression,
            options,
            pending_dictionary: range.dictionary,
            dictionary: None,
            offset: range.start,
            end: range.end,
            page_index: range.first_page,
        }
    }

    /// Index within the chunk of the next data page.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// The dictionary, once its page was read.
    pub fn dictionary(&self) -> Option<&[Value]> {
        self.dictionary.as_deref()
    }

    fn read_header(&self, offset: u64, limit: u64) -> ParquetResult<(PageHeader, u64)> {
        let remaining = usize::try_from(limit.saturating_sub(offset)).unwrap_or(usize::MAX);
        if remaining == 0 {
            return Err(fmt_err!(Format, "page header at offset {offset} is past the chunk end"));
        }
        let mut probe = HEADER_PROBE_BYTES.min(remaining);
        loop {
            let bytes = self.source.read_vec_at(offset, probe)?;
            let mut cursor = Cursor::new(bytes.as_slice());
            let parsed = {
                let mut prot = TCompactInputProtocol::new(&mut cursor, self.options.max_page_size);
                PageHeader::read_from_in_protocol(&mut prot)
            };
            match parsed {
                Ok(header) => return Ok((header, cursor.position())),
                // headers with large statistics need a longer probe
                Err(_) if probe < remaining && probe < self.options.max_page_size => {
                    probe = (probe * 2).min(remaining);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Reads the raw payload of the page at `offset`, checking its sizes and checksum.
    fn read_page(&self, offset: u64, limit: u64) -> ParquetResult<(PageHeader, Vec<u8>, u64)> {
        let (header, header_size) = self.read_header(offset, limit)?;
        let compressed_size = usize::try_from(header.compressed_page_size).map_err(|_| {
            fmt_err!(Format, "negative compressed page size {}", header.compressed_page_size)
        })?;
        let uncompressed_size = usize::try_from(header.uncompressed_page_size).map_err(|_| {
            fmt_err!(Format, "negative uncompressed page size {}", header.uncompressed_page_size)
        })?;
        if compressed_size.max(uncompressed_size) > self.options.max_page_size {
            return Err(fmt_err!(
                Format,
                "page of {} bytes exceeds the limit of {} bytes",
                compressed_size.max(uncompressed_size),
                self.options.max_page_size
            ));
        }
        let start = offset + header_size;
        if start + compressed_size as u64 > limit {
            return Err(fmt_err!(
                Format,
                "the page header reported the wrong page size: {compressed_size} bytes at {start} overrun the chunk end {limit}"
            ));
        }
        let payload = self.source.read_vec_at(start, compressed_size)?;
        if let Some(crc) = header.crc.filter(|_| self.options.verify_checksums) {
            let actual = crc32fast::hash(&payload) as i32;
            if actual != crc {
                return Err(fmt_err!(
                    Corruption,
                    "page checksum mismatch: header has {crc:#x}, payload hashes to {actual:#x}"
                ));
            }
        }
        Ok((header, payload, start + compressed_size as u64))
    }

    fn decompress(&self, payload: &[u8], uncompressed_size: usize) -> ParquetResult<Vec<u8>> {
        if self.compression == Compression::Uncompressed {
            if payload.len() != uncompressed_size {
                return Err(fmt_err!(
                    Corruption,
                    "uncompressed page holds {} bytes, header declares {uncompressed_size}",
                    payload.len()
                ));
            }
            return Ok(payload.to_vec());
        }
        let mut buffer = vec![0u8; uncompressed_size];
        decompress(self.compression, payload, &mut buffer)?;
        Ok(buffer)
    }

    fn load_dictionary(&mut self, offset: u64) -> ParquetResult<()> {
        let (header, payload, _) = self.read_page(offset, self.end)?;
        if header.type_ != PageType::DICTIONARY_PAGE {
            return Err(fmt_err!(
                Format,
                "expected a dictionary page at offset {offset}, found page type {}",
                header.type_.0
            ));
        }
        self.set_dictionary(&header, &payload)
    }

    fn set_dictionary(&mut self, header: &PageHeader, payload: &[u8]) -> ParquetResult<()> {
        let dict_header = header.dictionary_page_header.as_ref().ok_or_else(|| {
            fmt_err!(
                Format,
                "the page header type is a dictionary page but the dictionary header is empty"
            )
        })?;
        let num_values = usize::try_from(dict_header.num_values)
            .map_err(|_| fmt_err!(Format, "negative dictionary size {}", dict_header.num_values))?;
        let data = self.decompress(payload, header.uncompressed_page_size as usize)?;
        let values = plain::decode(&data, self.descriptor.physical_type, num_values)
            .context("dictionary page")?;
        log::trace!(
            "column {}: loaded dictionary of {} values",
            self.descriptor.path_string(),
            values.len()
        );
        self.dictionary = Some(values);
        Ok(())
    }

    fn decode_data_page(&self, header: PageHeader, payload: Vec<u8>) -> ParquetResult<DataPage> {
        let descriptor = self.descriptor;
        let physical_type = descriptor.physical_type;
        let uncompressed_size = header.uncompressed_page_size as usize;
        let (encoding, num_values, rep_levels, def_levels, data, statistics) =
            if header.type_ == PageType::DATA_PAGE {
                let v1 = header.data_page_header.ok_or_else(|| {
                    fmt_err!(
                        Format,
                        "the page header type is a v1 data page but the v1 data header is empty"
                    )
                })?;
                let num_values = usize::try_from(v1.num_values)
                    .map_err(|_| fmt_err!(Format, "negative value count {}", v1.num_values))?;
                let buffer = self.decompress(&payload, uncompressed_size)?;
                let mut rest = buffer.as_slice();
                let rep = if descriptor.max_rep_level > 0 {
                    split_prefixed(&mut rest, "repetition levels")?
                } else {
                    &[]
                };
                let def = if descriptor.max_def_level > 0 {
                    split_prefixed(&mut rest, "definition levels")?
                } else {
                    &[]
                };
                (
                    Encoding::try_from(v1.encoding)?,
                    num_values,
                    decode_levels(rep, descriptor.max_rep_level, num_values)?,
                    decode_levels(def, descriptor.max_def_level, num_values)?,
                    rest.to_vec(),
                    v1.statistics,
                )
            } else {
                let v2 = header.data_page_header_v2.ok_or_else(|| {
                    fmt_err!(
                        Format,
                        "the page header type is a v2 data page but the v2 data header is empty"
                    )
                })?;
                let num_values = usize::try_from(v2.num_values)
                    .map_err(|_| fmt_err!(Format, "negative value count {}", v2.num_values))?;
                let rep_len =
                    usize::try_from(v2.repetition_levels_byte_length).unwrap_or(usize::MAX);
                let def_len =
                    usize::try_from(v2.definition_levels_byte_length).unwrap_or(usize::MAX);
                let levels_len = rep_len.saturating_add(def_len);
                if levels_len > payload.len() || levels_len > uncompressed_size {
                    return Err(fmt_err!(
                        Format,
                        "v2 page header reported incorrect offset to compressed data"
                    ));
                }
                let (rep, rest) = payload.split_at(rep_len);
                let (def, values) = rest.split_at(def_len);
                // a missing flag means the values are compressed
                let data = if v2.is_compressed.unwrap_or(true) {
                    self.decompress(values, uncompressed_size - levels_len)?
                } else {
                    values.to_vec()
                };
                (
                    Encoding::try_from(v2.encoding)?,
                    num_values,
                    decode_levels(rep, descriptor.max_rep_level, num_values)?,
                    decode_levels(def, descriptor.max_def_level, num_values)?,
                    data,
                    v2.statistics,
                )
            };

        let num_non_null = def_levels
            .iter()
            .filter(|&&def| def == descriptor.max_def_level)
            .count();
        let values = decode_values(
            &data,
            encoding,
            physical_type,
            num_non_null,
            self.dictionary.as_deref(),
        )?;
        let statistics = statistics
            .map(|stats| Statistics::from_thrift(&stats, physical_type, descriptor.sort_order()))
            .transpose()?;
        log::trace!(
            "column {}: decoded page {} with {} values, {} nulls",
            descriptor.path_string(),
            self.page_index,
            num_values,
            num_values - num_non_null
        );
        Ok(DataPage {
            encoding,
            rep_levels,
            def_levels,
            values,
            statistics,
        })
    }

    fn read_next(&mut self) -> ParquetResult<Option<DataPage>> {
        if let Some(offset) = self.pending_dictionary.take() {
            self.load_dictionary(offset).context("dictionary page")?;
        }
        loop {
            if self.offset >= self.end {
                return Ok(None);
            }
            let (header, payload, next) = self.read_page(self.offset, self.end)?;
            self.offset = next;
            match header.type_ {
                PageType::DICTIONARY_PAGE => {
                    if self.dictionary.is_some() {
                        return Err(fmt_err!(Format, "column chunk has two dictionary pages"));
                    }
                    self.set_dictionary(&header, &payload)?;
                }
                PageType::DATA_PAGE | PageType::DATA_PAGE_V2 => {
                    let page = self.decode_data_page(header, payload)?;
                    self.page_index += 1;
                    return Ok(Some(page));
                }
                PageType::INDEX_PAGE => continue,
                other => return Err(fmt_err!(Format, "unknown page type {}", other.0)),
            }
        }
    }
}

impl<R: ReadAt + ?Sized> Iterator for PageReader<'_, R> {
    type Item = ParquetResult<DataPage>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.page_index;
        let result = self
            .read_next()
            .with_context(|_| format!("page {index}"))
            .transpose();
        if matches!(result, Some(Err(_))) {
            // a broken page leaves the chunk unreadable from there on
            self.offset = self.end;
        }
        result
    }
}
