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

//! Decoding of page payloads: levels, then values with the page encoding.
use crate::encoding::{
    delta_bitpacked, delta_byte_array, delta_length_byte_array, dictionary, hybrid_rle, plain,
    Encoding,
};
use crate::parquet::error::{fmt_err, ParquetResult};
use crate::parquet::schema::PhysicalType;
use crate::parquet::value::Value;

/// Splits a 4 byte length prefixed block off the front of `data`.
pub fn split_prefixed<'a>(data: &mut &'a [u8], what: &str) -> ParquetResult<&'a [u8]> {
    let Some((length, rest)) = data.split_first_chunk::<4>() else {
        return Err(fmt_err!(Corruption, "{what} is missing its length prefix"));
    };
    let length = u32::from_le_bytes(*length) as usize;
    if length > rest.len() {
        return Err(fmt_err!(
            Corruption,
            "{what} declares {length} bytes but only {} remain",
            rest.len()
        ));
    }
    let (block, rest) = rest.split_at(length);
    *data = rest;
    Ok(block)
}

/// Decodes a level stream, or returns zeros when the column has no such levels.
pub fn decode_levels(data: &[u8], max_level: i16, count: usize) -> ParquetResult<Vec<i16>> {
    if max_level == 0 {
        return Ok(vec![0; count]);
    }
    hybrid_rle::decode_levels(data, max_level, count)
}

/// Decodes `count` non-null values encoded with `encoding`.
pub fn decode_values(
    data: &[u8],
    encoding: Encoding,
    physical_type: PhysicalType,
    count: usize,
    dictionary: Option<&[Value]>,
) -> ParquetResult<Vec<Value>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let values = match (encoding, physical_type) {
        (Encoding::Plain, _) => plain::decode(data, physical_type, count)?,
        (Encoding::PlainDictionary | Encoding::RleDictionary, _) => {
            let dictionary = dictionary.ok_or_else(|| {
                fmt_err!(Corruption, "dictionary encoded page without a dictionary page")
            })?;
            dictionary::decode(data, count, dictionary)?
        }
        (Encoding::Rle, PhysicalType::Boolean) => {
            let mut data = data;
            let runs = split_prefixed(&mut data, "rle booleans")?;
            hybrid_rle::decode(runs, 1, count)?
                .into_iter()
                .map(|bit| Value::Boolean(bit == 1))
                .collect()
        }
        (Encoding::DeltaBinaryPacked, PhysicalType::Int32) => {
            let (ints, _) = delta_bitpacked::decode_as::<i32>(data)?;
            ints.into_iter().map(Value::Int32).collect()
        }
        (Encoding::DeltaBinaryPacked, PhysicalType::Int64) => {
            let (ints, _) = delta_bitpacked::decode(data)?;
            ints.into_iter().map(Value::Int64).collect()
        }
        (Encoding::DeltaLengthByteArray, PhysicalType::ByteArray) => {
            byte_values(delta_length_byte_array::decode(data)?.0, physical_type)?
        }
        (
            Encoding::DeltaByteArray,
            PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_),
        ) => byte_values(delta_byte_array::decode(data)?.0, physical_type)?,
        (encoding, physical_type) => {
            return Err(fmt_err!(
                Unsupported,
                "cannot read {:?} values encoded with {:?}",
                physical_type,
                encoding
            ))
        }
    };
    if values.len() != count {
        return Err(fmt_err!(
            Corruption,
            "page decoded to {} values, its levels require {count}",
            values.len()
        ));
    }
    Ok(values)
}

fn byte_values(values: Vec<Vec<u8>>, physical_type: PhysicalType) -> ParquetResult<Vec<Value>> {
    match physical_type {
        PhysicalType::FixedLenByteArray(len) => values
            .into_iter()
            .map(|v| {
                if v.len() == len {
                    Ok(Value::FixedLenByteArray(v))
                } else {
                    Err(fmt_err!(
                        Corruption,
                        "fixed length value of {} bytes in a column of {len} bytes",
                        v.len()
                    ))
                }
            })
            .collect(),
        _ => Ok(values.into_iter().map(Value::ByteArray).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parquet::error::ParquetErrorCause;

    #[test]
    fn prefixed_blocks() {
        let mut data: &[u8] = &[2, 0, 0, 0, 7, 8, 9];
        assert_eq!(split_prefixed(&mut data, "x").unwrap(), &[7, 8]);
        assert_eq!(data, &[9]);
        let mut short: &[u8] = &[5, 0, 0, 0, 1];
        assert!(split_prefixed(&mut short, "x").is_err());
    }

    #[test]
    fn flat_levels_are_zero() {
        assert_eq!(decode_levels(&[], 0, 3).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn delta_ints_keep_their_width() {
        let mut data = Vec::new();
        delta_bitpacked::encode([5i64, 3, -1, 100].into_iter(), &mut data);
        let values =
            decode_values(&data, Encoding::DeltaBinaryPacked, PhysicalType::Int32, 4, None)
                .unwrap();
        assert_eq!(
            values,
            vec![Value::Int32(5), Value::Int32(3), Value::Int32(-1), Value::Int32(100)]
        );
    }

    #[test]
    fn rle_booleans() {
        let mut data = vec![0; 4];
        hybrid_rle::encode_bool(&mut data, [true, false, true].into_iter());
        let length = (data.len() - 4) as u32;
        data[..4].copy_from_slice(&length.to_le_bytes());
        let values = decode_values(&data, Encoding::Rle, PhysicalType::Boolean, 3, None).unwrap();
        assert_eq!(
            values,
            vec![Value::Boolean(true), Value::Boolean(false), Value::Boolean(true)]
        );
    }

    #[test]
    fn missing_dictionary_is_corruption() {
        let err = decode_values(&[1, 0], Encoding::RleDictionary, PhysicalType::Int32, 1, None)
            .unwrap_err();
        assert!(matches!(err.cause(), ParquetErrorCause::Corruption));
    }

    #[test]
    fn short_pages_are_corruption() {
        let mut data = Vec::new();
        plain::encode(&[Value::Int64(1)], PhysicalType::Int64, &mut data).unwrap();
        let err = decode_values(&data, Encoding::Plain, PhysicalType::Int64, 2, None).unwrap_err();
        assert!(matches!(err.cause(), ParquetErrorCause::Corruption));
    }

    #[test]
    fn surplus_values_are_corruption() {
        let mut data = Vec::new();
        delta_bitpacked::encode([1i64, 2, 3, 4].into_iter(), &mut data);
        let err = decode_values(&data, Encoding::DeltaBinaryPacked, PhysicalType::Int64, 3, None)
            .unwrap_err();
        assert!(matches!(err.cause(), ParquetErrorCause::Corruption));
        assert!(err.to_string().contains("decoded to 4 values"), "{err}");

        let mut data = Vec::new();
        delta_length_byte_array::encode([&b"a"[..], b"bc", b"d"].into_iter(), &mut data);
        let err = decode_values(
            &data,
            Encoding::DeltaLengthByteArray,
            PhysicalType::ByteArray,
            2,
            None,
        )
        .unwrap_err();
        assert!(matches!(err.cause(), ParquetErrorCause::Corruption));
    }

    #[test]
    fn unknown_combinations_are_unsupported() {
        let err = decode_values(&[0; 4], Encoding::ByteStreamSplit, PhysicalType::Float, 1, None)
            .unwrap_err();
        assert!(matches!(err.cause(), ParquetErrorCause::Unsupported));
    }
}
