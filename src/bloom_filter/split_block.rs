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

//! Split block bloom filter: 256 bit blocks of eight 32 bit words, one bit set per word.

/// magic numbers taken from https://github.com/apache/parquet-format/blob/master/BloomFilter.md
const SALT: [u32; 8] = [
    1203114875, 1150766481, 2284105051, 2729912477, 1884591559, 770785867, 2667333959, 1550580529,
];

pub const BLOCK_BYTES: usize = 32;

#[inline]
fn block_offset(hash: u64, len: usize) -> usize {
    let number_of_blocks = (len / BLOCK_BYTES) as u64;
    let high_hash = hash >> 32;
    (((high_hash * number_of_blocks) >> 32) as usize) * BLOCK_BYTES
}

#[inline]
fn word_masks(hash: u64) -> impl Iterator<Item = (usize, u32)> {
    let key = hash as u32;
    SALT.iter()
        .enumerate()
        .map(move |(i, salt)| (i * 4, 1u32 << (key.wrapping_mul(*salt) >> 27)))
}

#[inline]
fn read_word(bitset: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bitset[offset],
        bitset[offset + 1],
        bitset[offset + 2],
        bitset[offset + 3],
    ])
}

/// Whether `hash` may be in the set. `bitset` must be a non empty multiple of 32 bytes.
#[inline]
pub fn is_in_set(bitset: &[u8], hash: u64) -> bool {
    let block = block_offset(hash, bitset.len());
    word_masks(hash).all(|(word, mask)| read_word(bitset, block + word) & mask != 0)
}

/// Inserts a new hash to the set.
#[inline]
pub fn insert(bitset: &mut [u8], hash: u64) {
    let block = block_offset(hash, bitset.len());
    for (word, mask) in word_masks(hash) {
        let offset = block + word;
        let updated = read_word(bitset, offset) | mask;
        bitset[offset..offset + 4].copy_from_slice(&updated.to_le_bytes());
    }
}
