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

use super::uleb128;
use crate::parquet::error::ParquetResult;

pub fn decode(values: &[u8]) -> ParquetResult<(i64, usize)> {
    let (u, consumed) = uleb128::decode(values)?;
    Ok((((u >> 1) as i64) ^ -((u & 1) as i64), consumed))
}

pub fn encode(value: i64) -> ([u8; 10], usize) {
    let value = ((value << 1) ^ (value >> 63)) as u64;
    let mut a = [0u8; 10];
    let produced = uleb128::encode(value, &mut a);
    (a, produced)
}

pub fn write(value: i64, out: &mut Vec<u8>) {
    let (container, used) = encode(value);
    out.extend_from_slice(&container[..used]);
}

pub fn read(data: &mut &[u8]) -> ParquetResult<i64> {
    let (value, consumed) = decode(data)?;
    *data = &data[consumed..];
    Ok(value)
}
