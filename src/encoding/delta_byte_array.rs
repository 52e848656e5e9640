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

//! DELTA_BYTE_ARRAY: incremental encoding storing, for each value, the length of the
//! prefix shared with the previous value and the remaining suffix.
use super::{delta_bitpacked, delta_length_byte_array};
use crate::parquet::error::{fmt_err, ParquetResult};

pub fn encode<'a, I>(values: I, out: &mut Vec<u8>)
where
    I: ExactSizeIterator<Item = &'a [u8]> + Clone,
{
    let mut previous: &[u8] = &[];
    let mut prefixes = Vec::with_capacity(values.len());
    let mut suffixes = Vec::with_capacity(values.len());
    for value in values {
        let prefix = previous
            .iter()
            .zip(value)
            .take_while(|(a, b)| a == b)
            .count();
        prefixes.push(prefix as i64);
        suffixes.push(&value[prefix..]);
        previous = value;
    }
    delta_bitpacked::encode(prefixes.into_iter(), out);
    delta_length_byte_array::encode(suffixes.into_iter(), out);
}

pub fn decode(data: &[u8]) -> ParquetResult<(Vec<Vec<u8>>, usize)> {
    let (prefixes, consumed) = delta_bitpacked::decode(data)?;
    let (suffixes, suffix_consumed) = delta_length_byte_array::decode(&data[consumed..])?;
    if prefixes.len() != suffixes.len() {
        return Err(fmt_err!(
            Corruption,
            "delta byte array has {} prefixes but {} suffixes",
            prefixes.len(),
            suffixes.len()
        ));
    }

    let mut values: Vec<Vec<u8>> = Vec::with_capacity(prefixes.len());
    for (prefix, suffix) in prefixes.into_iter().zip(suffixes) {
        let previous = values.last().map(|x| x.as_slice()).unwrap_or(&[]);
        let prefix = usize::try_from(prefix)
            .ok()
            .filter(|&p| p <= previous.len())
            .ok_or_else(|| {
                fmt_err!(
                    Corruption,
                    "prefix length {prefix} exceeds previous value of {} bytes",
                    previous.len()
                )
            })?;
        let mut value = Vec::with_capacity(prefix + suffix.len());
        value.extend_from_slice(&previous[..prefix]);
        value.extend_from_slice(&suffix);
        values.push(value);
    }
    Ok((values, consumed + suffix_consumed))
}
