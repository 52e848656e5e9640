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

//! DELTA_BINARY_PACKED: blocks of 128 deltas split into 4 miniblocks of 32,
//! each miniblock bitpacked with its own width after subtracting the block's minimum delta.
use super::{bit_width, bitpacked, take_bytes, uleb128, zigzag_leb128};
use num_traits::{AsPrimitive, WrappingSub};

use crate::parquet::error::{fmt_err, ParquetResult};

const BLOCK_SIZE: usize = 128;
const MINIBLOCKS_PER_BLOCK: usize = 4;
const MINIBLOCK_SIZE: usize = BLOCK_SIZE / MINIBLOCKS_PER_BLOCK;

/// Integer widths the delta encoding works in. Deltas wrap at the type's own width, so
/// bit widths never exceed it.
pub trait DeltaInt: Copy + Ord + WrappingSub + AsPrimitive<i64> {
    const ZERO: Self;

    /// Bits of a wrapped difference, read as unsigned at the type's width.
    fn to_bits(self) -> u64;
}

impl DeltaInt for i32 {
    const ZERO: Self = 0;

    fn to_bits(self) -> u64 {
        self as u32 as u64
    }
}

impl DeltaInt for i64 {
    const ZERO: Self = 0;

    fn to_bits(self) -> u64 {
        self as u64
    }
}

/// Encodes `values`, appending to `out`.
pub fn encode<T: DeltaInt, I: ExactSizeIterator<Item = T>>(mut values: I, out: &mut Vec<u8>) {
    let length = values.len();
    uleb128::write(BLOCK_SIZE as u64, out);
    uleb128::write(MINIBLOCKS_PER_BLOCK as u64, out);
    uleb128::write(length as u64, out);

    let Some(first) = values.next() else {
        zigzag_leb128::write(0, out);
        return;
    };
    zigzag_leb128::write(first.as_(), out);

    let mut previous = first;
    let mut deltas = [T::ZERO; BLOCK_SIZE];
    loop {
        let mut count = 0;
        for value in values.by_ref().take(BLOCK_SIZE) {
            deltas[count] = value.wrapping_sub(&previous);
            previous = value;
            count += 1;
        }
        if count == 0 {
            break;
        }
        write_block(&deltas[..count], out);
        if count < BLOCK_SIZE {
            break;
        }
    }
}

fn write_block<T: DeltaInt>(deltas: &[T], out: &mut Vec<u8>) {
    let min_delta = deltas.iter().copied().min().unwrap_or(T::ZERO);
    zigzag_leb128::write(min_delta.as_(), out);

    let miniblocks = deltas.chunks(MINIBLOCK_SIZE).collect::<Vec<_>>();
    let mut widths = [0u8; MINIBLOCKS_PER_BLOCK];
    for (width, miniblock) in widths.iter_mut().zip(&miniblocks) {
        let max = miniblock
            .iter()
            .map(|delta| delta.wrapping_sub(&min_delta).to_bits())
            .max()
            .unwrap_or(0);
        *width = bit_width(max) as u8;
    }
    out.extend_from_slice(&widths);

    for (width, miniblock) in widths.iter().zip(miniblocks) {
        let padding = MINIBLOCK_SIZE - miniblock.len();
        bitpacked::encode(
            miniblock
                .iter()
                .map(|delta| delta.wrapping_sub(&min_delta).to_bits())
                .chain(std::iter::repeat(0).take(padding)),
            *width as usize,
            out,
        );
    }
}

/// Encodes a slice, computing deltas at the width of `T`.
pub fn encode_slice<T: DeltaInt>(values: &[T], out: &mut Vec<u8>) {
    encode(values.iter().copied(), out)
}

/// Decodes into `T`, narrowing every value with `as` semantics.
pub fn decode_as<T>(data: &[u8]) -> ParquetResult<(Vec<T>, usize)>
where
    T: Copy + 'static,
    i64: AsPrimitive<T>,
{
    let (values, consumed) = decode(data)?;
    Ok((values.into_iter().map(AsPrimitive::as_).collect(), consumed))
}

/// Decodes one DELTA_BINARY_PACKED stream from the front of `data`.
/// Returns the values and the number of bytes consumed.
pub fn decode(data: &[u8]) -> ParquetResult<(Vec<i64>, usize)> {
    let mut rest = data;
    let block_size = uleb128::read(&mut rest)? as usize;
    let miniblocks_per_block = uleb128::read(&mut rest)? as usize;
    let total = uleb128::read(&mut rest)? as usize;
    let first = zigzag_leb128::read(&mut rest)?;

    if block_size == 0 || block_size % 128 != 0 {
        return Err(fmt_err!(
            Corruption,
            "delta block size must be a positive multiple of 128, got {block_size}"
        ));
    }
    if miniblocks_per_block == 0 || block_size % miniblocks_per_block != 0 {
        return Err(fmt_err!(
            Corruption,
            "{miniblocks_per_block} miniblocks do not divide a block of {block_size}"
        ));
    }
    let miniblock_size = block_size / miniblocks_per_block;
    if miniblock_size % 32 != 0 {
        return Err(fmt_err!(
            Corruption,
            "delta miniblock size must be a multiple of 32, got {miniblock_size}"
        ));
    }

    // every block costs at least its min delta and width bytes
    let max_total = (rest.len() / (1 + miniblocks_per_block) + 1) * block_size + 1;
    if total > max_total {
        return Err(fmt_err!(
            Corruption,
            "delta header declares {total} values but {} bytes hold at most {max_total}",
            rest.len()
        ));
    }

    let mut values = Vec::with_capacity(total);
    if total == 0 {
        return Ok((values, data.len() - rest.len()));
    }
    values.push(first);
    let mut previous = first;

    while values.len() < total {
        let min_delta = zigzag_leb128::read(&mut rest)?;
        let widths = take_bytes(&mut rest, miniblocks_per_block, "delta miniblock widths")?;
        for &width in widths {
            if values.len() >= total {
                break;
            }
            let width = width as usize;
            if width > 64 {
                return Err(fmt_err!(Corruption, "delta miniblock width {width} exceeds 64"));
            }
            let packed = take_bytes(
                &mut rest,
                bitpacked::packed_len(miniblock_size, width),
                "delta miniblock",
            )?;
            let wanted = (total - values.len()).min(miniblock_size);
            for delta in bitpacked::Decoder::try_new(packed, width, wanted)? {
                previous = previous
                    .wrapping_add(min_delta)
                    .wrapping_add(delta as i64);
                values.push(previous);
            }
        }
    }
    Ok((values, data.len() - rest.len()))
}
