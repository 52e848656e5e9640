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

mod encoder;

pub use encoder::{encode_bool, encode_u32, encode_u64, MIN_REPEAT};

use crate::encoding::{bitpacked, ceil8, uleb128};
use crate::parquet::error::{fmt_err, ParquetResult};

/// A run of the RLE/bit-packed hybrid encoding.
#[derive(Debug, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// A bitpacked slice and the number of values it holds (a multiple of 8).
    Bitpacked(&'a [u8], usize),
    /// A value repeated `usize` times.
    Rle(u64, usize),
}

/// Iterator of the runs of a hybrid RLE stream.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    values: &'a [u8],
    num_bits: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(values: &'a [u8], num_bits: usize) -> Self {
        Self { values, num_bits }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.values
    }

    fn read_run(&mut self) -> ParquetResult<HybridEncoded<'a>> {
        if self.num_bits > 64 {
            return Err(fmt_err!(
                Corruption,
                "hybrid rle bit width {} exceeds 64",
                self.num_bits
            ));
        }
        let (indicator, consumed) = uleb128::decode(self.values)?;
        self.values = &self.values[consumed..];
        if indicator & 1 == 1 {
            let groups = indicator >> 1;
            let (num_values, num_bits) = usize::try_from(groups)
                .ok()
                .and_then(|groups| groups.checked_mul(8))
                .and_then(|values| Some((values, values.checked_mul(self.num_bits)?)))
                .ok_or_else(|| {
                    fmt_err!(
                        Corruption,
                        "bitpacked run of {groups} groups overflows at bit width {}",
                        self.num_bits
                    )
                })?;
            // some writers truncate the padding of the last run
            let bytes = ceil8(num_bits).min(self.values.len());
            let (packed, rest) = self.values.split_at(bytes);
            self.values = rest;
            Ok(HybridEncoded::Bitpacked(packed, num_values))
        } else {
            let run = (indicator >> 1) as usize;
            let width = ceil8(self.num_bits);
            if self.values.len() < width {
                return Err(fmt_err!(
                    Corruption,
                    "rle run needs {width} value bytes but only {} remain",
                    self.values.len()
                ));
            }
            let mut bytes = [0u8; 8];
            bytes[..width].copy_from_slice(&self.values[..width]);
            self.values = &self.values[width..];
            Ok(HybridEncoded::Rle(u64::from_le_bytes(bytes), run))
        }
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = ParquetResult<HybridEncoded<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.read_run())
    }
}

/// Decodes exactly `length` values of a hybrid stream, appending them to `out`.
pub fn decode_into(
    data: &[u8],
    num_bits: u32,
    length: usize,
    out: &mut Vec<u64>,
) -> ParquetResult<()> {
    let num_bits = num_bits as usize;
    out.reserve(length);
    let target = out.len() + length;
    let mut decoder = Decoder::new(data, num_bits);
    while out.len() < target {
        let Some(run) = decoder.next() else {
            return Err(fmt_err!(
                Corruption,
                "hybrid rle stream ended after {} of {length} values",
                length - (target - out.len())
            ));
        };
        let wanted = target - out.len();
        match run? {
            HybridEncoded::Rle(value, run) => {
                out.extend(std::iter::repeat(value).take(run.min(wanted)));
            }
            HybridEncoded::Bitpacked(packed, num_values) => {
                let available = if num_bits == 0 {
                    num_values
                } else {
                    (packed.len() * 8 / num_bits).min(num_values)
                };
                let take = available.min(wanted);
                if take < wanted.min(num_values) {
                    return Err(fmt_err!(
                        Corruption,
                        "bitpacked run declares {num_values} values but holds {available}"
                    ));
                }
                out.extend(bitpacked::Decoder::try_new(packed, num_bits, take)?);
            }
        }
    }
    Ok(())
}

/// Decodes `length` values of a hybrid stream.
pub fn decode(data: &[u8], num_bits: u32, length: usize) -> ParquetResult<Vec<u64>> {
    let mut out = Vec::with_capacity(length);
    decode_into(data, num_bits, length, &mut out)?;
    Ok(out)
}

/// Decodes a stream of repetition or definition levels.
pub fn decode_levels(data: &[u8], max_level: i16, length: usize) -> ParquetResult<Vec<i16>> {
    let num_bits = crate::encoding::bit_width(max_level as u64);
    let decoded = decode(data, num_bits, length)?;
    decoded
        .into_iter()
        .map(|level| {
            if level > max_level as u64 {
                Err(fmt_err!(
                    Corruption,
                    "level {level} exceeds the column maximum {max_level}"
                ))
            } else {
                Ok(level as i16)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parquet::error::ParquetErrorCause;

    #[test]
    fn runs_of_mixed_stream() {
        // rle run of 10 x 5, then one bitpacked group
        let mut data = vec![];
        encode_u32(&mut data, std::iter::repeat(5).take(10).chain(0..4), 3);
        let runs = Decoder::new(&data, 3).collect::<ParquetResult<Vec<_>>>().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], HybridEncoded::Rle(5, 10));
        assert!(matches!(runs[1], HybridEncoded::Bitpacked(_, 8)));
    }

    #[test]
    fn decode_mixed() {
        let values: Vec<u64> = (0..100)
            .map(|i| if (20..60).contains(&i) { 3 } else { i % 5 })
            .collect();
        let mut data = vec![];
        encode_u64(&mut data, values.iter().copied(), 3);
        assert_eq!(decode(&data, 3, values.len()).unwrap(), values);
    }

    #[test]
    fn decode_all_identical() {
        let values = vec![1u64; 1000];
        let mut data = vec![];
        encode_u64(&mut data, values.iter().copied(), 1);
        // a single rle run
        assert_eq!(data.len(), 3);
        assert_eq!(decode(&data, 1, 1000).unwrap(), values);
    }

    #[test]
    fn decode_stops_at_length() {
        let mut data = vec![];
        encode_u32(&mut data, [1, 2, 3], 2);
        assert_eq!(decode(&data, 2, 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn truncated_stream_is_corruption() {
        let mut data = vec![];
        encode_u32(&mut data, std::iter::repeat(2).take(10), 2);
        assert!(decode(&data, 2, 11).is_err());
        assert!(decode(&data[..1], 2, 10).is_err());

        let mut data = vec![];
        encode_u32(&mut data, 0..16, 4);
        assert!(decode(&data[..4], 4, 16).is_err());
    }

    #[test]
    fn oversized_run_header_is_corruption() {
        // bitpacked indicator with a group count near u64::MAX
        let mut data = vec![0xff; 8];
        data.extend_from_slice(&[0x7f, 0, 0, 0, 0]);
        let err = decode(&data, 1, 8).unwrap_err();
        assert!(matches!(err.cause(), ParquetErrorCause::Corruption), "{err}");

        let err = decode(&[2, 1], 65, 1).unwrap_err();
        assert!(matches!(err.cause(), ParquetErrorCause::Corruption), "{err}");
    }

    #[test]
    fn levels_above_maximum_are_rejected() {
        let mut data = vec![];
        encode_u32(&mut data, [0, 1, 3], 2);
        assert!(decode_levels(&data, 2, 3).is_err());
        assert_eq!(decode_levels(&data, 3, 3).unwrap(), vec![0, 1, 3]);
    }

    #[test]
    fn zero_width_levels() {
        let mut data = vec![];
        encode_u32(&mut data, [0, 0, 0], 0);
        assert_eq!(decode_levels(&data, 0, 3).unwrap(), vec![0, 0, 0]);
    }
}
