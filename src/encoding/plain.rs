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

use super::take_bytes;
use crate::parquet::error::{fmt_err, ParquetResult};
use crate::parquet::schema::PhysicalType;
use crate::parquet::value::Value;

/// PLAIN encodes `values`, which must all match `physical_type`, appending to `out`.
pub fn encode(
    values: &[Value],
    physical_type: PhysicalType,
    out: &mut Vec<u8>,
) -> ParquetResult<()> {
    if physical_type == PhysicalType::Boolean {
        let mut byte = 0u8;
        let mut bit = 0;
        for value in values {
            let Value::Boolean(v) = value else {
                return Err(type_mismatch(value, physical_type));
            };
            byte |= (*v as u8) << bit;
            bit += 1;
            if bit == 8 {
                out.push(byte);
                byte = 0;
                bit = 0;
            }
        }
        if bit > 0 {
            out.push(byte);
        }
        return Ok(());
    }

    for value in values {
        encode_one(value, physical_type, out)?;
    }
    Ok(())
}

/// PLAIN encodes a single non boolean value.
pub fn encode_one(
    value: &Value,
    physical_type: PhysicalType,
    out: &mut Vec<u8>,
) -> ParquetResult<()> {
    if !value.matches(physical_type) {
        return Err(type_mismatch(value, physical_type));
    }
    match value {
        Value::Boolean(v) => out.push(*v as u8),
        Value::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Int96(v) => {
            for word in v {
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        Value::Float(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Double(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::ByteArray(v) => {
            out.extend_from_slice(&(v.len() as u32).to_le_bytes());
            out.extend_from_slice(v);
        }
        Value::FixedLenByteArray(v) => out.extend_from_slice(v),
    }
    Ok(())
}

/// Encoding used for statistics and page index bounds: plain, without the length
/// prefix of byte arrays.
pub fn encode_bound(value: &Value) -> Vec<u8> {
    match value {
        Value::Boolean(v) => vec![*v as u8],
        Value::ByteArray(v) | Value::FixedLenByteArray(v) => v.clone(),
        Value::Int32(v) => v.to_le_bytes().to_vec(),
        Value::Int64(v) => v.to_le_bytes().to_vec(),
        Value::Float(v) => v.to_le_bytes().to_vec(),
        Value::Double(v) => v.to_le_bytes().to_vec(),
        Value::Int96(v) => v.iter().flat_map(|w| w.to_le_bytes()).collect(),
    }
}

/// Inverse of [`encode_bound`].
pub fn decode_bound(bytes: &[u8], physical_type: PhysicalType) -> ParquetResult<Value> {
    match physical_type {
        PhysicalType::ByteArray => Ok(Value::ByteArray(bytes.to_vec())),
        PhysicalType::FixedLenByteArray(_) => Ok(Value::FixedLenByteArray(bytes.to_vec())),
        PhysicalType::Boolean => match bytes {
            [b] => Ok(Value::Boolean(*b != 0)),
            _ => Err(fmt_err!(Corruption, "boolean bound must be 1 byte, got {}", bytes.len())),
        },
        _ => {
            let mut values = decode(bytes, physical_type, 1)?;
            if bytes.len() != values.iter().map(Value::plain_size).sum::<usize>() {
                return Err(fmt_err!(
                    Corruption,
                    "statistics bound of {} bytes does not fit a {:?} value",
                    bytes.len(),
                    physical_type
                ));
            }
            values
                .pop()
                .ok_or_else(|| fmt_err!(Corruption, "empty statistics bound"))
        }
    }
}

fn type_mismatch(
    value: &Value,
    physical_type: PhysicalType,
) -> crate::parquet::error::ParquetError {
    fmt_err!(
        SchemaMismatch,
        "{} value cannot be stored in a {:?} column",
        value.type_name(),
        physical_type
    )
}

fn fixed<const N: usize>(data: &mut &[u8], what: &str) -> ParquetResult<[u8; N]> {
    let bytes = take_bytes(data, N, what)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Decodes `count` PLAIN values from `data`.
pub fn decode(data: &[u8], physical_type: PhysicalType, count: usize) -> ParquetResult<Vec<Value>> {
    decode_from(&mut &data[..], physical_type, count)
}

/// Decodes `count` PLAIN values from the front of `data`, advancing it.
pub fn decode_from(
    data: &mut &[u8],
    physical_type: PhysicalType,
    count: usize,
) -> ParquetResult<Vec<Value>> {
    // guards the allocation against a corrupt count
    let min_size = match physical_type {
        PhysicalType::Boolean => 0,
        PhysicalType::Int32 | PhysicalType::Float | PhysicalType::ByteArray => 4,
        PhysicalType::Int64 | PhysicalType::Double => 8,
        PhysicalType::Int96 => 12,
        PhysicalType::FixedLenByteArray(len) => len,
    };
    if (physical_type == PhysicalType::Boolean && data.len() * 8 < count)
        || data.len() < count.saturating_mul(min_size)
    {
        return Err(fmt_err!(
            Corruption,
            "{} bytes cannot hold {count} plain {:?} values",
            data.len(),
            physical_type
        ));
    }

    let mut values = Vec::with_capacity(count);
    match physical_type {
        PhysicalType::Boolean => {
            let bytes = take_bytes(data, super::ceil8(count), "plain booleans")?;
            values.extend((0..count).map(|i| Value::Boolean(bytes[i / 8] >> (i % 8) & 1 == 1)));
        }
        PhysicalType::Int32 => {
            for _ in 0..count {
                values.push(Value::Int32(i32::from_le_bytes(fixed(data, "plain int32")?)));
            }
        }
        PhysicalType::Int64 => {
            for _ in 0..count {
                values.push(Value::Int64(i64::from_le_bytes(fixed(data, "plain int64")?)));
            }
        }
        PhysicalType::Int96 => {
            for _ in 0..count {
                let bytes: [u8; 12] = fixed(data, "plain int96")?;
                let mut words = [0u32; 3];
                for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
                    *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                }
                values.push(Value::Int96(words));
            }
        }
        PhysicalType::Float => {
            for _ in 0..count {
                values.push(Value::Float(f32::from_le_bytes(fixed(data, "plain float")?)));
            }
        }
        PhysicalType::Double => {
            for _ in 0..count {
                values.push(Value::Double(f64::from_le_bytes(fixed(data, "plain double")?)));
            }
        }
        PhysicalType::ByteArray => {
            for _ in 0..count {
                let len = u32::from_le_bytes(fixed(data, "byte array length")?) as usize;
                values.push(Value::ByteArray(take_bytes(data, len, "byte array")?.to_vec()));
            }
        }
        PhysicalType::FixedLenByteArray(len) => {
            for _ in 0..count {
                values.push(Value::FixedLenByteArray(
                    take_bytes(data, len, "fixed length byte array")?.to_vec(),
                ));
            }
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_are_bitpacked_lsb_first() {
        let values = [true, false, true, true, false, false, false, false, true]
            .map(Value::Boolean)
            .to_vec();
        let mut out = vec![];
        encode(&values, PhysicalType::Boolean, &mut out).unwrap();
        assert_eq!(out, vec![0b0000_1101, 0b0000_0001]);
        assert_eq!(decode(&out, PhysicalType::Boolean, 9).unwrap(), values);
    }

    #[test]
    fn byte_arrays_are_length_prefixed() {
        let values = vec![Value::string("Bob"), Value::string("")];
        let mut out = vec![];
        encode(&values, PhysicalType::ByteArray, &mut out).unwrap();
        assert_eq!(out, vec![3, 0, 0, 0, b'B', b'o', b'b', 0, 0, 0, 0]);
        assert_eq!(decode(&out, PhysicalType::ByteArray, 2).unwrap(), values);
    }

    #[test]
    fn numeric_types() {
        let cases = [
            (PhysicalType::Int32, vec![Value::Int32(-1), Value::Int32(i32::MAX)]),
            (PhysicalType::Int64, vec![Value::Int64(i64::MIN), Value::Int64(3)]),
            (PhysicalType::Float, vec![Value::Float(1.5), Value::Float(-0.0)]),
            (PhysicalType::Double, vec![Value::Double(f64::MAX), Value::Double(2.25)]),
            (PhysicalType::Int96, vec![Value::Int96([1, 2, 3])]),
            (
                PhysicalType::FixedLenByteArray(2),
                vec![Value::FixedLenByteArray(vec![1, 2]), Value::FixedLenByteArray(vec![3, 4])],
            ),
        ];
        for (physical_type, values) in cases {
            let mut out = vec![];
            encode(&values, physical_type, &mut out).unwrap();
            assert_eq!(decode(&out, physical_type, values.len()).unwrap(), values);
        }
    }

    #[test]
    fn truncated_input_is_corruption() {
        let mut out = vec![];
        encode(&[Value::string("Franky")], PhysicalType::ByteArray, &mut out).unwrap();
        assert!(decode(&out[..out.len() - 1], PhysicalType::ByteArray, 1).is_err());
        assert!(decode(&[0, 0, 0], PhysicalType::Int32, 1).is_err());
        assert!(decode(&[0; 8], PhysicalType::Int64, 1_000_000).is_err());
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut out = vec![];
        assert!(encode(&[Value::Int64(1)], PhysicalType::Int32, &mut out).is_err());
    }

    #[test]
    fn bounds() {
        let v = Value::string("Luke");
        assert_eq!(encode_bound(&v), b"Luke".to_vec());
        assert_eq!(decode_bound(b"Luke", PhysicalType::ByteArray).unwrap(), v);
        assert_eq!(
            decode_bound(&7i64.to_le_bytes(), PhysicalType::Int64).unwrap(),
            Value::Int64(7)
        );
        assert!(decode_bound(&[1, 2, 3], PhysicalType::Int32).is_err());
    }
}
