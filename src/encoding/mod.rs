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

pub mod bitpacked;
pub mod delta_bitpacked;
pub mod delta_byte_array;
pub mod delta_length_byte_array;
pub mod dictionary;
pub mod hybrid_rle;
pub mod plain;
pub mod uleb128;
pub mod zigzag_leb128;

use parquet_format_safe::Encoding as ThriftEncoding;

use crate::parquet::error::{fmt_err, ParquetError, ParquetResult};

/// Value encodings understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Encoding {
    Plain,
    PlainDictionary,
    Rle,
    BitPacked,
    DeltaBinaryPacked,
    DeltaLengthByteArray,
    DeltaByteArray,
    RleDictionary,
    ByteStreamSplit,
}

impl Encoding {
    pub fn is_dictionary(self) -> bool {
        matches!(self, Encoding::PlainDictionary | Encoding::RleDictionary)
    }
}

impl TryFrom<ThriftEncoding> for Encoding {
    type Error = ParquetError;

    fn try_from(encoding: ThriftEncoding) -> ParquetResult<Self> {
        Ok(match encoding {
            ThriftEncoding::PLAIN => Encoding::Plain,
            ThriftEncoding::PLAIN_DICTIONARY => Encoding::PlainDictionary,
            ThriftEncoding::RLE => Encoding::Rle,
            ThriftEncoding::BIT_PACKED => Encoding::BitPacked,
            ThriftEncoding::DELTA_BINARY_PACKED => Encoding::DeltaBinaryPacked,
            ThriftEncoding::DELTA_LENGTH_BYTE_ARRAY => Encoding::DeltaLengthByteArray,
            ThriftEncoding::DELTA_BYTE_ARRAY => Encoding::DeltaByteArray,
            ThriftEncoding::RLE_DICTIONARY => Encoding::RleDictionary,
            ThriftEncoding::BYTE_STREAM_SPLIT => Encoding::ByteStreamSplit,
            other => return Err(fmt_err!(Unsupported, "unknown encoding id {}", other.0)),
        })
    }
}

impl From<Encoding> for ThriftEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Plain => ThriftEncoding::PLAIN,
            Encoding::PlainDictionary => ThriftEncoding::PLAIN_DICTIONARY,
            Encoding::Rle => ThriftEncoding::RLE,
            Encoding::BitPacked => ThriftEncoding::BIT_PACKED,
            Encoding::DeltaBinaryPacked => ThriftEncoding::DELTA_BINARY_PACKED,
            Encoding::DeltaLengthByteArray => ThriftEncoding::DELTA_LENGTH_BYTE_ARRAY,
            Encoding::DeltaByteArray => ThriftEncoding::DELTA_BYTE_ARRAY,
            Encoding::RleDictionary => ThriftEncoding::RLE_DICTIONARY,
            Encoding::ByteStreamSplit => ThriftEncoding::BYTE_STREAM_SPLIT,
        }
    }
}

#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + ((value % 8 != 0) as usize)
}

/// Number of bits required to represent `max`.
#[inline]
pub fn bit_width(max: u64) -> u32 {
    64 - max.leading_zeros()
}

/// Splits `n` leading bytes off `data`, failing if fewer are available.
pub(crate) fn take_bytes<'a>(data: &mut &'a [u8], n: usize, what: &str) -> ParquetResult<&'a [u8]> {
    if data.len() < n {
        return Err(fmt_err!(
            Corruption,
            "{what} needs {n} bytes but only {} remain",
            data.len()
        ));
    }
    let (head, tail) = data.split_at(n);
    *data = tail;
    Ok(head)
}
