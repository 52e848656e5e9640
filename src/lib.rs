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

//! Row oriented reading and writing of Apache Parquet files.
//!
//! Rows are trees of [`Field`]s shaped by a [`Schema`]. [`ParquetWriter`] shreds them into
//! column chunks of pages, [`ParquetFile`] reads the footer back and [`RowReader`]
//! reassembles rows, optionally seeking with the page indexes. [`GenericWriter`] and
//! [`GenericReader`] convert typed rows through [`ParquetRow`].
pub mod bloom_filter;
pub mod encoding;
pub mod parquet;
pub mod parquet_read;
pub mod parquet_write;
pub mod row;

pub use crate::encoding::Encoding;
pub use crate::parquet::compression::Compression;
pub use crate::parquet::error::{ParquetError, ParquetErrorCause, ParquetErrorExt, ParquetResult};
pub use crate::parquet::indexes::{
    BoundaryOrder, ColumnIndex, OffsetIndex, PageBounds, PageLocation,
};
pub use crate::parquet::io::ReadAt;
pub use crate::parquet::schema::{
    ColumnDescriptor, LogicalType, Node, PhysicalType, Repetition, Schema, SortOrder, TimeUnit,
};
pub use crate::parquet::statistics::Statistics;
pub use crate::parquet::value::{Field, Row, Value};
pub use crate::parquet_read::{ParquetFile, ReaderOptions, RowReader};
pub use crate::parquet_write::{ParquetWriter, SortingColumn, Version, WriterOptions};
pub use crate::row::{read, write, GenericReader, GenericWriter, ParquetRow};
