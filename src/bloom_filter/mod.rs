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

mod split_block;

use std::io::{Cursor, Write};

use parquet_format_safe::thrift::protocol::{TCompactInputProtocol, TCompactOutputProtocol};
use parquet_format_safe::{
    BloomFilterAlgorithm, BloomFilterCompression, BloomFilterHash, BloomFilterHeader,
    SplitBlockAlgorithm, Uncompressed, XxHash,
};
use xxhash_rust::xxh64::xxh64;

use crate::encoding::plain;
use crate::parquet::error::{fmt_err, ParquetResult};
use crate::parquet::io::ReadAt;
use crate::parquet::value::Value;

pub const DEFAULT_BLOOM_FILTER_FPP: f64 = 0.01;
const MINIMUM_BLOOM_FILTER_BYTES: usize = 32;
const MAXIMUM_BLOOM_FILTER_BYTES: usize = 128 * 1024 * 1024; // 128MB
const HEADER_PROBE_BYTES: usize = 64;

/// Calculate optimal bloom filter size using the Split Block Bloom Filter formula.
/// Formula: m = -8 * ndv / ln(1 - fpp^(1/8))
pub fn bitset_size(ndv: usize, fpp: f64) -> usize {
    if ndv == 0 {
        return MINIMUM_BLOOM_FILTER_BYTES;
    }
    let fpp = if fpp <= 0.0 || fpp >= 1.0 {
        DEFAULT_BLOOM_FILTER_FPP
    } else {
        fpp
    };

    let num_bits = -8.0 * (ndv as f64) / (1.0 - fpp.powf(1.0 / 8.0)).ln();

    // Handle overflow
    let num_bits = if num_bits < 0.0 || num_bits > (MAXIMUM_BLOOM_FILTER_BYTES * 8) as f64 {
        MAXIMUM_BLOOM_FILTER_BYTES * 8
    } else {
        num_bits as usize
    };

    let num_bits = num_bits.max(MINIMUM_BLOOM_FILTER_BYTES * 8);
    let num_bytes = num_bits.div_ceil(8).next_power_of_two();
    num_bytes.clamp(MINIMUM_BLOOM_FILTER_BYTES, MAXIMUM_BLOOM_FILTER_BYTES)
}

/// Hash of a value as stored in parquet bloom filters: xxHash64 of its plain bytes,
/// byte arrays without their length prefix.
pub fn hash_value(value: &Value) -> u64 {
    xxh64(&plain::encode_bound(value), 0)
}

/// A split block bloom filter of one column chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    bitset: Vec<u8>,
}

impl BloomFilter {
    /// A filter sized for `ndv` distinct values at false positive probability `fpp`.
    pub fn with_capacity(ndv: usize, fpp: f64) -> Self {
        Self {
            bitset: vec![0u8; bitset_size(ndv, fpp)],
        }
    }

    pub fn from_bitset(bitset: Vec<u8>) -> ParquetResult<Self> {
        if bitset.is_empty() || bitset.len() % split_block::BLOCK_BYTES != 0 {
            return Err(fmt_err!(
                Corruption,
                "bloom filter bitset of {} bytes is not a whole number of blocks",
                bitset.len()
            ));
        }
        Ok(Self { bitset })
    }

    pub fn bitset(&self) -> &[u8] {
        &self.bitset
    }

    pub fn insert_hash(&mut self, hash: u64) {
        split_block::insert(&mut self.bitset, hash);
    }

    pub fn insert(&mut self, value: &Value) {
        self.insert_hash(hash_value(value));
    }

    /// `false` means the value is definitely absent from the column chunk.
    pub fn check(&self, value: &Value) -> bool {
        self.check_hash(hash_value(value))
    }

    pub fn check_hash(&self, hash: u64) -> bool {
        split_block::is_in_set(&self.bitset, hash)
    }

    /// Writes the header and bitset, returning the number of bytes written.
    pub fn write<W: Write>(&self, writer: &mut W) -> ParquetResult<usize> {
        let header = BloomFilterHeader {
            num_bytes: self.bitset.len() as i32,
            algorithm: BloomFilterAlgorithm::BLOCK(SplitBlockAlgorithm {}),
            hash: BloomFilterHash::XXHASH(XxHash {}),
            compression: BloomFilterCompression::UNCOMPRESSED(Uncompressed {}),
        };

        let mut protocol = TCompactOutputProtocol::new(&mut *writer);
        let header_bytes = header.write_to_out_protocol(&mut protocol)?;
        writer.write_all(&self.bitset)?;
        Ok(header_bytes + self.bitset.len())
    }

    /// Reads the filter stored at `offset` of `source`.
    /// Returns `None` when the algorithm, hash or compression is not supported.
    pub fn read<R: ReadAt + ?Sized>(
        source: &R,
        offset: u64,
        limit: u64,
    ) -> ParquetResult<Option<Self>> {
        let probe = HEADER_PROBE_BYTES.min(limit.saturating_sub(offset) as usize);
        let head = source.read_vec_at(offset, probe)?;
        let mut cursor = Cursor::new(head.as_slice());
        let header = {
            // max is ok since `BloomFilterHeader` never allocates
            let mut prot = TCompactInputProtocol::new(&mut cursor, usize::MAX);
            BloomFilterHeader::read_from_in_protocol(&mut prot)?
        };
        let header_size = cursor.position();

        if header.algorithm != BloomFilterAlgorithm::BLOCK(SplitBlockAlgorithm {})
            || header.hash != BloomFilterHash::XXHASH(XxHash {})
            || header.compression != BloomFilterCompression::UNCOMPRESSED(Uncompressed {})
        {
            return Ok(None);
        }

        let length = usize::try_from(header.num_bytes)
            .ok()
            .filter(|&len| len <= MAXIMUM_BLOOM_FILTER_BYTES)
            .ok_or_else(|| fmt_err!(Format, "invalid bloom filter size {}", header.num_bytes))?;
        let start = offset + header_size;
        if start + length as u64 > limit {
            return Err(fmt_err!(
                Format,
                "bloom filter bitset exceeds data length {limit}"
            ));
        }
        let bitset = source.read_vec_at(start, length)?;
        Self::from_bitset(bitset).map(Some)
    }
}
