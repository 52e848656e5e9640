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

use std::collections::HashMap;

use super::{bit_width, hybrid_rle, plain};
use crate::parquet::error::{fmt_err, ParquetResult};
use crate::parquet::schema::PhysicalType;
use crate::parquet::value::Value;

/// Distinct values of a column chunk in insertion order.
///
/// Values are keyed by their plain bytes, so floats are kept bit exact.
#[derive(Debug)]
pub struct DictionaryBuilder {
    physical_type: PhysicalType,
    values: Vec<Value>,
    index: HashMap<Vec<u8>, u32>,
    byte_size: usize,
}

impl DictionaryBuilder {
    pub fn new(physical_type: PhysicalType) -> Self {
        Self {
            physical_type,
            values: Vec::new(),
            index: HashMap::new(),
            byte_size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Plain encoded size of the dictionary page payload.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Maps `page` to dictionary indices, adding the values not seen yet.
    ///
    /// Nothing is added and `None` is returned when the new values would push the
    /// dictionary beyond `max_len` entries or `max_bytes` bytes.
    pub fn try_insert_page(
        &mut self,
        page: &[Value],
        max_len: usize,
        max_bytes: usize,
    ) -> Option<Vec<u32>> {
        let mut staged: HashMap<Vec<u8>, u32> = HashMap::new();
        let mut staged_values = Vec::new();
        let mut staged_bytes = 0;
        let mut indices = Vec::with_capacity(page.len());

        for value in page {
            let key = plain::encode_bound(value);
            let index = match self.index.get(&key).or_else(|| staged.get(&key)) {
                Some(&index) => index,
                None => {
                    let index = (self.values.len() + staged_values.len()) as u32;
                    if index as usize >= max_len
                        || self.byte_size + staged_bytes + value.plain_size() > max_bytes
                    {
                        return None;
                    }
                    staged_bytes += value.plain_size();
                    staged.insert(key, index);
                    staged_values.push(value.clone());
                    index
                }
            };
            indices.push(index);
        }

        self.byte_size += staged_bytes;
        self.index.extend(staged);
        self.values.extend(staged_values);
        Some(indices)
    }

    /// The dictionary page payload.
    pub fn encode(&self, out: &mut Vec<u8>) -> ParquetResult<()> {
        plain::encode(&self.values, self.physical_type, out)
    }
}

/// Writes dictionary indices: one byte of bit width, then the hybrid RLE stream.
pub fn encode_indices(indices: &[u32], dictionary_len: usize, out: &mut Vec<u8>) {
    let num_bits = bit_width(dictionary_len.saturating_sub(1) as u64);
    out.push(num_bits as u8);
    hybrid_rle::encode_u32(out, indices.iter().copied(), num_bits);
}

/// Decodes `count` values of an RLE_DICTIONARY data page against `dictionary`.
pub fn decode(data: &[u8], count: usize, dictionary: &[Value]) -> ParquetResult<Vec<Value>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let (&num_bits, indices) = data
        .split_first()
        .ok_or_else(|| fmt_err!(Corruption, "dictionary indices are missing their bit width"))?;
    if num_bits > 32 {
        return Err(fmt_err!(
            Corruption,
            "dictionary index bit width {num_bits} exceeds 32"
        ));
    }
    let indices = hybrid_rle::decode(indices, num_bits as u32, count)?;
    indices
        .into_iter()
        .map(|index| {
            dictionary.get(index as usize).cloned().ok_or_else(|| {
                fmt_err!(
                    Corruption,
                    "dictionary index {index} is out of range for a dictionary of {} values",
                    dictionary.len()
                )
            })
        })
        .collect()
}
