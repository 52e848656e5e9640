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
use parquet_format_safe::{
    DataPageHeader, DataPageHeaderV2, DictionaryPageHeader, PageHeader, PageType,
};

use super::options::Version;
use crate::encoding::{
    bit_width, delta_bitpacked, delta_byte_array, delta_length_byte_array, hybrid_rle, plain,
    Encoding,
};
use crate::parquet::compression::{compress, Compression};
use crate::parquet::error::{fmt_err, ParquetError, ParquetResult};
use crate::parquet::schema::PhysicalType;
use crate::parquet::statistics::Statistics;
use crate::parquet::value::Value;

/// A sealed page: header and compressed payload, ready to be written.
#[derive(Debug)]
pub struct CompressedPage {
    pub header: PageHeader,
    pub payload: Vec<u8>,
    /// First row of the page, relative to its row group.
    pub first_row_index: u64,
    pub statistics: Option<Statistics>,
}

impl CompressedPage {
    pub fn compressed_size(&self) -> usize {
        self.payload.len()
    }

    pub fn uncompressed_size(&self) -> usize {
        self.header.uncompressed_page_size as usize
    }
}

/// Where a page was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWriteSpec {
    pub offset: u64,
    pub header_size: u64,
    pub bytes_written: u64,
}

/// Writes the page header followed by the payload.
pub fn write_page<W: Write>(
    writer: &mut W,
    offset: u64,
    page: &CompressedPage,
) -> ParquetResult<PageWriteSpec> {
    let mut protocol = TCompactOutputProtocol::new(&mut *writer);
    let header_size = page.header.write_to_out_protocol(&mut protocol)? as u64;
    writer.write_all(&page.payload)?;
    Ok(PageWriteSpec {
        offset,
        header_size,
        bytes_written: header_size + page.payload.len() as u64,
    })
}

/// Appends a level stream. V1 pages prefix it with its length as a 4 byte integer.
pub fn encode_levels(levels: &[i16], max_level: i16, version: Version, buffer: &mut Vec<u8>) {
    let num_bits = bit_width(max_level as u64);
    let iter = levels.iter().map(|&level| level as u32);
    match version {
        Version::V1 => {
            buffer.extend_from_slice(&[0; 4]);
            let start = buffer.len();
            hybrid_rle::encode_u32(buffer, iter, num_bits);
            let length_bytes = ((buffer.len() - start) as i32).to_le_bytes();
            buffer[start - 4..start].copy_from_slice(&length_bytes);
        }
        Version::V2 => hybrid_rle::encode_u32(buffer, iter, num_bits),
    }
}

/// Encodes non-null values with a non-dictionary `encoding`.
pub fn encode_values(
    values: &[Value],
    physical_type: PhysicalType,
    encoding: Encoding,
    buffer: &mut Vec<u8>,
) -> ParquetResult<()> {
    match (encoding, physical_type) {
        (Encoding::Plain, _) => plain::encode(values, physical_type, buffer),
        (Encoding::Rle, PhysicalType::Boolean) => {
            buffer.extend_from_slice(&[0; 4]);
            let start = buffer.len();
            let bits = values.iter().map(|v| matches!(v, Value::Boolean(true)));
            hybrid_rle::encode_bool(buffer, bits);
            let length_bytes = ((buffer.len() - start) as i32).to_le_bytes();
            buffer[start - 4..start].copy_from_slice(&length_bytes);
            Ok(())
        }
        (Encoding::DeltaBinaryPacked, PhysicalType::Int32) => {
            let ints = values
                .iter()
                .map(|value| match value {
                    Value::Int32(v) => Ok(*v),
                    other => Err(type_mismatch(other, physical_type)),
                })
                .collect::<ParquetResult<Vec<_>>>()?;
            delta_bitpacked::encode_slice(&ints, buffer);
            Ok(())
        }
        (Encoding::DeltaBinaryPacked, PhysicalType::Int64) => {
            let ints = values
                .iter()
                .map(|value| match value {
                    Value::Int64(v) => Ok(*v),
                    other => Err(type_mismatch(other, physical_type)),
                })
                .collect::<ParquetResult<Vec<_>>>()?;
            delta_bitpacked::encode_slice(&ints, buffer);
            Ok(())
        }
        (Encoding::DeltaLengthByteArray, PhysicalType::ByteArray) => {
            let bytes = byte_slices(values)?;
            delta_length_byte_array::encode(bytes.into_iter(), buffer);
            Ok(())
        }
        (
            Encoding::DeltaByteArray,
            PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_),
        ) => {
            let bytes = byte_slices(values)?;
            delta_byte_array::encode(bytes.into_iter(), buffer);
            Ok(())
        }
        (encoding, physical_type) => Err(fmt_err!(
            Unsupported,
            "cannot write {:?} values with encoding {:?}",
            physical_type,
            encoding
        )),
    }
}

fn type_mismatch(value: &Value, physical_type: PhysicalType) -> ParquetError {
    fmt_err!(
        SchemaMismatch,
        "{} value in a {:?} column",
        value.type_name(),
        physical_type
    )
}

fn byte_slices(values: &[Value]) -> ParquetResult<Vec<&[u8]>> {
    values
        .iter()
        .map(|value| {
            value.as_bytes().ok_or_else(|| {
                fmt_err!(
                    SchemaMismatch,
                    "{} value in a byte array column",
                    value.type_name()
                )
            })
        })
        .collect()
}

/// Uncompressed parts of a data page.
pub struct DataPageParts<'a> {
    pub rep_levels: &'a [i16],
    pub max_rep_level: i16,
    pub def_levels: &'a [i16],
    pub max_def_level: i16,
    /// Encoded values.
    pub values: &'a [u8],
    pub encoding: Encoding,
    pub num_values: usize,
    pub num_nulls: usize,
    pub num_rows: usize,
    pub first_row_index: u64,
    pub statistics: Option<Statistics>,
}

/// Lays out, compresses and checksums a data page.
pub fn build_data_page(
    parts: DataPageParts<'_>,
    version: Version,
    compression: Compression,
    checksum: bool,
) -> ParquetResult<CompressedPage> {
    let mut levels = Vec::new();
    if parts.max_rep_level > 0 {
        encode_levels(parts.rep_levels, parts.max_rep_level, version, &mut levels);
    }
    let rep_levels_len = levels.len();
    if parts.max_def_level > 0 {
        encode_levels(parts.def_levels, parts.max_def_level, version, &mut levels);
    }
    let def_levels_len = levels.len() - rep_levels_len;
    let thrift_stats = parts.statistics.as_ref().map(Statistics::to_thrift);

    let (payload, uncompressed_size, data_page_header, data_page_header_v2) = match version {
        Version::V1 => {
            let mut uncompressed = levels;
            uncompressed.extend_from_slice(parts.values);
            let payload = compress_payload(compression, uncompressed.as_slice())?;
            let header = DataPageHeader {
                num_values: parts.num_values as i32,
                encoding: parts.encoding.into(),
                definition_level_encoding: Encoding::Rle.into(),
                repetition_level_encoding: Encoding::Rle.into(),
                statistics: thrift_stats,
            };
            (payload, uncompressed.len(), Some(header), None)
        }
        Version::V2 => {
            // levels are never compressed in v2 pages
            let uncompressed_size = levels.len() + parts.values.len();
            let mut payload = levels;
            payload.extend(compress_payload(compression, parts.values)?);
            let header = DataPageHeaderV2 {
                num_values: parts.num_values as i32,
                num_nulls: parts.num_nulls as i32,
                num_rows: parts.num_rows as i32,
                encoding: parts.encoding.into(),
                definition_levels_byte_length: def_levels_len as i32,
                repetition_levels_byte_length: rep_levels_len as i32,
                is_compressed: Some(compression != Compression::Uncompressed),
                statistics: thrift_stats,
            };
            (payload, uncompressed_size, None, Some(header))
        }
    };

    let type_ = match version {
        Version::V1 => PageType::DATA_PAGE,
        Version::V2 => PageType::DATA_PAGE_V2,
    };
    let header = PageHeader {
        type_,
        uncompressed_page_size: page_size(uncompressed_size)?,
        compressed_page_size: page_size(payload.len())?,
        crc: checksum.then(|| crc32fast::hash(&payload) as i32),
        data_page_header,
        index_page_header: None,
        dictionary_page_header: None,
        data_page_header_v2,
    };
    Ok(CompressedPage {
        header,
        payload,
        first_row_index: parts.first_row_index,
        statistics: parts.statistics,
    })
}

/// Compresses and checksums the plain encoded dictionary.
pub fn build_dictionary_page(
    values: &[u8],
    num_values: usize,
    compression: Compression,
    checksum: bool,
) -> ParquetResult<CompressedPage> {
    let payload = compress_payload(compression, values)?;
    let header = PageHeader {
        type_: PageType::DICTIONARY_PAGE,
        uncompressed_page_size: page_size(values.len())?,
        compressed_page_size: page_size(payload.len())?,
        crc: checksum.then(|| crc32fast::hash(&payload) as i32),
        data_page_header: None,
        index_page_header: None,
        dictionary_page_header: Some(DictionaryPageHeader {
            num_values: num_values as i32,
            encoding: Encoding::Plain.into(),
            is_sorted: Some(false),
        }),
        data_page_header_v2: None,
    };
    Ok(CompressedPage {
        header,
        payload,
        first_row_index: 0,
        statistics: None,
    })
}

fn compress_payload(compression: Compression, input: &[u8]) -> ParquetResult<Vec<u8>> {
    if compression == Compression::Uncompressed {
        return Ok(input.to_vec());
    }
    let mut out = Vec::with_capacity(input.len() / 2);
    compress(compression, input, &mut out)?;
    Ok(out)
}

fn page_size(size: usize) -> ParquetResult<i32> {
    i32::try_from(size)
        .map_err(|_| fmt_err!(Format, "page of {size} bytes exceeds the format limit"))
}
