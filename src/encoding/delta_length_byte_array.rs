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

//! DELTA_LENGTH_BYTE_ARRAY: delta-packed lengths followed by the concatenated bytes.
use super::{delta_bitpacked, take_bytes};
use crate::parquet::error::{fmt_err, ParquetResult};

pub fn encode<'a, I>(values: I, out: &mut Vec<u8>)
where
    I: ExactSizeIterator<Item = &'a [u8]> + Clone,
{
    delta_bitpacked::encode(values.clone().map(|x| x.len() as i64), out);
    for value in values {
        out.extend_from_slice(value);
    }
}

/// Decodes a stream from the front of `data`, returning the values and bytes consumed.
pub fn decode(data: &[u8]) -> ParquetResult<(Vec<Vec<u8>>, usize)> {
    let (lengths, consumed) = delta_bitpacked::decode(data)?;
    let mut rest = &data[consumed..];
    let mut values = Vec::with_capacity(lengths.len());
    for length in lengths {
        let length = usize::try_from(length)
            .map_err(|_| fmt_err!(Corruption, "negative byte array length {length}"))?;
        values.push(take_bytes(&mut rest, length, "byte array")?.to_vec());
    }
    Ok((values, data.len() - rest.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic() {
        let values: [&[u8]; 3] = [b"Hello", b"World", b""];
        let mut out = vec![];
        encode(values.iter().copied(), &mut out);
        assert!(out.ends_with(b"HelloWorld"));

        let (decoded, consumed) = decode(&out).unwrap();
        assert_eq!(decoded, vec![b"Hello".to_vec(), b"World".to_vec(), vec![]]);
        assert_eq!(consumed, out.len());
    }

    #[test]
    fn missing_bytes_are_corruption() {
        let values: [&[u8]; 2] = [b"abc", b"defgh"];
        let mut out = vec![];
        encode(values.iter().copied(), &mut out);
        assert!(decode(&out[..out.len() - 1]).is_err());
    }
}
