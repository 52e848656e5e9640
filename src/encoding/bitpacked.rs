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

//! Little-endian bit packing of unsigned integers, least significant bit first.
use crate::encoding::ceil8;
use crate::parquet::error::{fmt_err, ParquetResult};

#[inline]
fn mask(num_bits: usize) -> u64 {
    if num_bits >= 64 {
        u64::MAX
    } else {
        (1u64 << num_bits) - 1
    }
}

/// Packs every item of `values` using `num_bits` bits each, appending to `out`.
/// The last byte is zero padded.
pub fn encode<I: Iterator<Item = u64>>(values: I, num_bits: usize, out: &mut Vec<u8>) {
    if num_bits == 0 {
        return;
    }
    let mask = mask(num_bits);
    let mut acc = 0u128;
    let mut pending = 0usize;
    for value in values {
        acc |= u128::from(value & mask) << pending;
        pending += num_bits;
        while pending >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            pending -= 8;
        }
    }
    if pending > 0 {
        out.push(acc as u8);
    }
}

/// Number of bytes needed to pack `length` values of `num_bits` bits.
#[inline]
pub fn packed_len(length: usize, num_bits: usize) -> usize {
    ceil8(length * num_bits)
}

/// An [`Iterator`] of `u64` unpacked from a bitpacked slice of bytes.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    packed: &'a [u8],
    num_bits: usize,
    position: usize,
    remaining: usize,
}

impl<'a> Decoder<'a> {
    /// Returns a [`Decoder`] over `length` values encoded in `packed` with `num_bits`.
    pub fn try_new(packed: &'a [u8], num_bits: usize, length: usize) -> ParquetResult<Self> {
        if num_bits > 64 {
            return Err(fmt_err!(
                Corruption,
                "bitpacking supports at most 64 bits per value, got {num_bits}"
            ));
        }
        if packed.len() * 8 < length * num_bits {
            return Err(fmt_err!(
                Corruption,
                "unpacking {length} items with a number of bits {num_bits} requires at least {} bytes, got {}",
                packed_len(length, num_bits),
                packed.len()
            ));
        }
        Ok(Self {
            packed,
            num_bits,
            position: 0,
            remaining: length,
        })
    }

    #[inline]
    fn get(&self, index: usize) -> u64 {
        let mut bit = index * self.num_bits;
        let mut value = 0u64;
        let mut read = 0;
        while read < self.num_bits {
            let byte = self.packed[bit / 8];
            let shift = bit % 8;
            let take = (8 - shift).min(self.num_bits - read);
            value |= ((u64::from(byte) >> shift) & mask(take)) << read;
            read += take;
            bit += take;
        }
        value
    }

    /// Skips up to `n` values, returning how many were skipped.
    #[inline]
    pub fn advance(&mut self, n: usize) -> usize {
        let n = n.min(self.remaining);
        self.position += n;
        self.remaining -= n;
        n
    }
}

impl Iterator for Decoder<'_> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = if self.num_bits == 0 {
            0
        } else {
            self.get(self.position)
        };
        self.position += 1;
        self.remaining -= 1;
        Some(result)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Decoder<'_> {}
