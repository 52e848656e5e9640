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

use crate::encoding::{bitpacked, ceil8, uleb128};

/// Runs of at least this many identical values are written run-length encoded.
pub const MIN_REPEAT: usize = 8;

/// RLE-hybrid encoding of `values` with `num_bits` bits per value, appended to `out`.
///
/// Literal values are collected into bit-packed runs of whole groups of eight;
/// only the final literal run is zero padded, as readers stop at the value count.
pub fn encode_u64<I: IntoIterator<Item = u64>>(out: &mut Vec<u8>, values: I, num_bits: u32) {
    let num_bits = num_bits as usize;
    let mut literals: Vec<u64> = Vec::with_capacity(64);
    let mut values = values.into_iter().peekable();

    while let Some(value) = values.next() {
        let mut run = 1usize;
        while values.peek() == Some(&value) {
            values.next();
            run += 1;
        }

        if run < MIN_REPEAT {
            literals.extend(std::iter::repeat(value).take(run));
            continue;
        }

        // bitpacked runs cover whole groups of 8, borrow from the run to fill the last one
        let pad = (8 - literals.len() % 8) % 8;
        literals.extend(std::iter::repeat(value).take(pad));
        run -= pad;
        flush_literals(out, &mut literals, num_bits);
        if run > 0 {
            write_rle_run(out, value, run, num_bits);
        }
    }
    flush_literals(out, &mut literals, num_bits);
}

pub fn encode_u32<I: IntoIterator<Item = u32>>(out: &mut Vec<u8>, values: I, num_bits: u32) {
    encode_u64(out, values.into_iter().map(u64::from), num_bits)
}

/// Encodes booleans as a bit width 1 hybrid stream.
pub fn encode_bool<I: IntoIterator<Item = bool>>(out: &mut Vec<u8>, values: I) {
    encode_u64(out, values.into_iter().map(u64::from), 1)
}

fn write_rle_run(out: &mut Vec<u8>, value: u64, run: usize, num_bits: usize) {
    uleb128::write((run as u64) << 1, out);
    let width = ceil8(num_bits);
    out.extend_from_slice(&value.to_le_bytes()[..width]);
}

fn flush_literals(out: &mut Vec<u8>, literals: &mut Vec<u64>, num_bits: usize) {
    if literals.is_empty() {
        return;
    }
    let groups = ceil8(literals.len());
    uleb128::write(((groups as u64) << 1) | 1, out);
    let padding = groups * 8 - literals.len();
    bitpacked::encode(
        literals
            .iter()
            .copied()
            .chain(std::iter::repeat(0).take(padding)),
        num_bits,
        out,
    );
    literals.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_basics() {
        let mut vec = vec![];
        let values = [
            true, false, true, true, true, false, false, true, true, false, true, true, true, false,
        ];
        encode_bool(&mut vec, values);
        assert_eq!(vec, vec![(2 << 1 | 1), 0b10011101u8, 0b00011101]);
    }

    #[test]
    fn bool_run_is_run_length_encoded() {
        let mut vec = vec![];
        encode_bool(&mut vec, std::iter::repeat(true).take(8));
        assert_eq!(vec, vec![8 << 1, 1]);
    }

    #[test]
    fn test_encode_u32() {
        let mut vec = vec![];
        encode_u32(&mut vec, [0, 1, 2, 1, 2, 1, 1, 0, 3], 2);

        assert_eq!(
            vec,
            vec![
                (2 << 1 | 1),
                0b01_10_01_00,
                0b00_01_01_10,
                0b_00_00_00_11,
                0b00_00_00_00
            ]
        );
    }

    #[test]
    fn test_encode_u32_large() {
        let mut vec = vec![];
        let values: Vec<u32> = (0..128).map(|x| x % 4).collect();
        encode_u32(&mut vec, values, 2);

        let length = 128;
        let mut expected = vec![0b11_10_01_00u8; length / 4];
        expected.insert(0, ((length / 8) as u8) << 1 | 1);
        assert_eq!(vec, expected);
    }

    #[test]
    fn test_u32_other() {
        let mut vec = vec![];
        encode_u32(&mut vec, [3, 3, 0, 3, 2, 3, 3, 3, 3, 1, 3, 3, 3, 0, 3], 2);
        assert_eq!(vec, vec![5, 207, 254, 247, 51]);
    }

    #[test]
    fn literals_before_a_run_fill_whole_groups() {
        // 3 literals, then a run of 20: 5 values of the run complete the group
        let mut values = vec![1u32, 2, 3];
        values.extend(std::iter::repeat(7).take(20));
        let mut vec = vec![];
        encode_u32(&mut vec, values, 3);
        // one bitpacked group (3 bytes at 3 bits), then an rle run of 15
        assert_eq!(vec[0], 1 << 1 | 1);
        assert_eq!(&vec[4..], &[15 << 1, 7]);
    }

    #[test]
    fn wide_rle_values_use_whole_bytes() {
        let mut vec = vec![];
        encode_u32(&mut vec, std::iter::repeat(0x1234).take(10), 13);
        assert_eq!(vec, vec![10 << 1, 0x34, 0x12]);
    }
}
