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

use std::cmp::Ordering;

use parquet_format_safe::Statistics as ThriftStatistics;

use crate::encoding::plain;
use crate::parquet::error::ParquetResult;
use crate::parquet::schema::{PhysicalType, SortOrder};
use crate::parquet::value::{compare, Value};

/// Min, max and null count of a page or column chunk.
///
/// `min`/`max` only cover non-null, non-NaN values and are `None` when there were none
/// or when the column has no defined order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    pub null_count: u64,
    pub distinct_count: Option<u64>,
    pub min: Option<Value>,
    pub max: Option<Value>,
}

impl Statistics {
    pub fn to_thrift(&self) -> ThriftStatistics {
        ThriftStatistics {
            max: None,
            min: None,
            null_count: Some(self.null_count as i64),
            distinct_count: self.distinct_count.map(|x| x as i64),
            max_value: self.max.as_ref().map(plain::encode_bound),
            min_value: self.min.as_ref().map(plain::encode_bound),
        }
    }

    pub fn from_thrift(
        stats: &ThriftStatistics,
        physical_type: PhysicalType,
        order: SortOrder,
    ) -> ParquetResult<Self> {
        // the deprecated fields are only trusted where signed and unsigned orders agree
        let legacy_ok = order == SortOrder::Signed
            && !matches!(
                physical_type,
                PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_)
            );
        let min = stats
            .min_value
            .as_ref()
            .or(stats.min.as_ref().filter(|_| legacy_ok));
        let max = stats
            .max_value
            .as_ref()
            .or(stats.max.as_ref().filter(|_| legacy_ok));
        Ok(Self {
            null_count: stats.null_count.unwrap_or(0).max(0) as u64,
            distinct_count: stats.distinct_count.map(|x| x.max(0) as u64),
            min: min
                .map(|bytes| plain::decode_bound(bytes, physical_type))
                .transpose()?,
            max: max
                .map(|bytes| plain::decode_bound(bytes, physical_type))
                .transpose()?,
        })
    }
}

/// Accumulates [`Statistics`] over values as they are written.
#[derive(Debug, Clone)]
pub struct StatisticsBuilder {
    order: SortOrder,
    null_count: u64,
    min: Option<Value>,
    max: Option<Value>,
}

impl StatisticsBuilder {
    pub fn new(order: SortOrder) -> Self {
        Self {
            order,
            null_count: 0,
            min: None,
            max: None,
        }
    }

    pub fn update_null(&mut self) {
        self.null_count += 1;
    }

    pub fn update(&mut self, value: &Value) {
        if self.order == SortOrder::Undefined || value.is_nan() {
            return;
        }
        match &self.min {
            Some(min) if compare(value, min, self.order) != Ordering::Less => {}
            _ => self.min = Some(value.clone()),
        }
        match &self.max {
            Some(max) if compare(value, max, self.order) != Ordering::Greater => {}
            _ => self.max = Some(value.clone()),
        }
    }

    /// Folds finished page statistics into chunk statistics.
    pub fn merge(&mut self, other: &Statistics) {
        self.null_count += other.null_count;
        if let Some(min) = &other.min {
            self.update(min);
        }
        if let Some(max) = &other.max {
            self.update(max);
        }
    }

    pub fn finish(&self) -> Statistics {
        Statistics {
            null_count: self.null_count,
            distinct_count: None,
            min: self.min.clone(),
            max: self.max.clone(),
        }
    }
}
