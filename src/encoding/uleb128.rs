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

use crate::parquet::error::{fmt_err, ParquetResult};

/// Decodes an unsigned LEB128 integer, returning it with the number of bytes consumed.
pub fn decode(values: &[u8]) -> ParquetResult<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;

    for (consumed, byte) in values.iter().enumerate() {
        if shift >= 64 {
            return Err(fmt_err!(Corruption, "uleb128 integer overflows 64 bits"));
        }
        result |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok((result, consumed + 1));
        }
        shift += 7;
    }
    Err(fmt_err!(Corruption, "truncated uleb128 integer"))
}

/// Encodes `value` into `container`, returning the number of bytes used.
pub fn encode(mut value: u64, container: &mut [u8; 10]) -> usize {
    let mut consumed = 0;
    let mut iter = container.iter_mut();
    loop {
        let mut byte = (value as u8) & !128;
        value >>= 7;
        if value != 0 {
            byte |= 128;
        }
        // 10 bytes always hold a u64
        if let Some(slot) = iter.next() {
            *slot = byte;
        }
        consumed += 1;
        if value == 0 {
            break;
        }
    }
    consumed
}

pub fn write(value: u64, out: &mut Vec<u8>) {
    let mut container = [0u8; 10];
    let used = encode(value, &mut container);
    out.extend_from_slice(&container[..used]);
}

/// Reads one integer from the front of `data`, advancing it.
pub fn read(data: &mut &[u8]) -> ParquetResult<u64> {
    let (value, consumed) = decode(data)?;
    *data = &data[consumed..];
    Ok(value)
}
