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

//! Row-to-column writer: shreds rows into leaf columns, seals pages, writes row groups,
//! page indexes and the footer.
mod column_chunk;
mod file;
mod options;
mod page;
mod row_group;
mod shred;

pub use file::{ParquetWriter, PARQUET_MAGIC};
pub use options::{
    SortingColumn, Version, WriterOptions, DEFAULT_DICTIONARY_MAX_BYTES,
    DEFAULT_DICTIONARY_MAX_CARDINALITY, DEFAULT_PAGE_SIZE, DEFAULT_ROW_GROUP_BYTES,
    DEFAULT_ROW_GROUP_SIZE,
};
pub use shred::{shred_row, ShreddedRow, Triplet};
