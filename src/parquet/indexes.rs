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

//! Page indexes: per page statistics (ColumnIndex) and locations (OffsetIndex)
//! of a column chunk, and the search that prunes pages with them.
use std::cmp::Ordering;

use parquet_format_safe::{
    BoundaryOrder as ThriftBoundaryOrder, ColumnIndex as ThriftColumnIndex,
    OffsetIndex as ThriftOffsetIndex, PageLocation as ThriftPageLocation,
};

use crate::encoding::plain;
use crate::parquet::error::{fmt_err, ParquetResult};
use crate::parquet::schema::{ColumnDescriptor, SortOrder};
use crate::parquet::value::{compare, Value};

/// Declared ordering of page bounds across a column chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryOrder {
    Unordered,
    Ascending,
    Descending,
}

impl From<BoundaryOrder> for ThriftBoundaryOrder {
    fn from(order: BoundaryOrder) -> Self {
        match order {
            BoundaryOrder::Unordered => ThriftBoundaryOrder::UNORDERED,
            BoundaryOrder::Ascending => ThriftBoundaryOrder::ASCENDING,
            BoundaryOrder::Descending => ThriftBoundaryOrder::DESCENDING,
        }
    }
}

impl From<ThriftBoundaryOrder> for BoundaryOrder {
    fn from(order: ThriftBoundaryOrder) -> Self {
        match order {
            ThriftBoundaryOrder::ASCENDING => BoundaryOrder::Ascending,
            ThriftBoundaryOrder::DESCENDING => BoundaryOrder::Descending,
            _ => BoundaryOrder::Unordered,
        }
    }
}

/// Per page min, max and null count of a column chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnIndex {
    null_pages: Vec<bool>,
    min_values: Vec<Option<Value>>,
    max_values: Vec<Option<Value>>,
    null_counts: Option<Vec<i64>>,
    boundary_order: BoundaryOrder,
    order: SortOrder,
}

/// Bounds and counts of one data page, as the writer saw them.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBounds {
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub null_count: u64,
    /// Level entries in the page, nulls included.
    pub num_values: u64,
}

impl PageBounds {
    fn is_null_page(&self) -> bool {
        self.null_count >= self.num_values
    }
}

impl ColumnIndex {
    /// Builds an index from the bounds of every page. Returns `None` when a page holding
    /// non-null values has no bounds (only NaN, say), since such a page cannot be described.
    pub fn new(
        pages: Vec<PageBounds>,
        boundary_order: BoundaryOrder,
        order: SortOrder,
    ) -> Option<Self> {
        let mut null_pages = Vec::with_capacity(pages.len());
        let mut min_values = Vec::with_capacity(pages.len());
        let mut max_values = Vec::with_capacity(pages.len());
        let mut null_counts = Vec::with_capacity(pages.len());
        for page in pages {
            let null_page = page.is_null_page();
            if !null_page && (page.min.is_none() || page.max.is_none()) {
                return None;
            }
            null_pages.push(null_page);
            min_values.push(page.min.filter(|_| !null_page));
            max_values.push(page.max.filter(|_| !null_page));
            null_counts.push(page.null_count as i64);
        }
        Some(Self {
            null_pages,
            min_values,
            max_values,
            null_counts: Some(null_counts),
            boundary_order,
            order,
        })
    }

    pub fn num_pages(&self) -> usize {
        self.null_pages.len()
    }

    /// Whether every value of page `i` is null.
    pub fn is_null_page(&self, i: usize) -> bool {
        self.null_pages[i]
    }

    pub fn min_value(&self, i: usize) -> Option<&Value> {
        self.min_values[i].as_ref()
    }

    pub fn max_value(&self, i: usize) -> Option<&Value> {
        self.max_values[i].as_ref()
    }

    pub fn null_count(&self, i: usize) -> Option<i64> {
        self.null_counts.as_ref().map(|counts| counts[i])
    }

    pub fn boundary_order(&self) -> BoundaryOrder {
        self.boundary_order
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order
    }

    /// Index of the page that may contain `target`, or [`ColumnIndex::num_pages`]
    /// when no page range contains it. Uses the column's natural ordering.
    pub fn search(&self, target: &Value) -> usize {
        let order = self.order;
        search(self, target, |a, b| compare(a, b, order))
    }

    /// Like [`ColumnIndex::search`] with a caller supplied comparator.
    pub fn search_by<F>(&self, target: &Value, comparator: F) -> usize
    where
        F: Fn(&Value, &Value) -> Ordering,
    {
        search(self, target, comparator)
    }

    /// Derives the boundary order from the bounds of the non-null pages.
    pub fn compute_boundary_order(
        bounds: &[(Option<Value>, Option<Value>)],
        order: SortOrder,
    ) -> BoundaryOrder {
        let pages = bounds
            .iter()
            .filter_map(|(min, max)| min.as_ref().zip(max.as_ref()))
            .collect::<Vec<_>>();
        let ascending = pages.windows(2).all(|w| {
            compare(w[0].0, w[1].0, order) != Ordering::Greater
                && compare(w[0].1, w[1].1, order) != Ordering::Greater
        });
        if ascending {
            return BoundaryOrder::Ascending;
        }
        let descending = pages.windows(2).all(|w| {
            compare(w[0].0, w[1].0, order) != Ordering::Less
                && compare(w[0].1, w[1].1, order) != Ordering::Less
        });
        if descending {
            BoundaryOrder::Descending
        } else {
            BoundaryOrder::Unordered
        }
    }

    pub fn to_thrift(&self) -> ThriftColumnIndex {
        let bound = |v: &Option<Value>| v.as_ref().map(plain::encode_bound).unwrap_or_default();
        ThriftColumnIndex {
            null_pages: self.null_pages.clone(),
            min_values: self.min_values.iter().map(bound).collect(),
            max_values: self.max_values.iter().map(bound).collect(),
            boundary_order: self.boundary_order.into(),
            null_counts: self.null_counts.clone(),
        }
    }

    pub fn from_thrift(index: ThriftColumnIndex, column: &ColumnDescriptor) -> ParquetResult<Self> {
        let num_pages = index.null_pages.len();
        if index.min_values.len() != num_pages
            || index.max_values.len() != num_pages
            || index.null_counts.as_ref().is_some_and(|c| c.len() != num_pages)
        {
            return Err(fmt_err!(
                Format,
                "column index of {} has inconsistent page counts",
                column.path_string()
            ));
        }
        let decode = |null_page: bool, bytes: &[u8]| -> ParquetResult<Option<Value>> {
            if null_page {
                Ok(None)
            } else {
                plain::decode_bound(bytes, column.physical_type).map(Some)
            }
        };
        let mut min_values = Vec::with_capacity(num_pages);
        let mut max_values = Vec::with_capacity(num_pages);
        for i in 0..num_pages {
            min_values.push(decode(index.null_pages[i], &index.min_values[i])?);
            max_values.push(decode(index.null_pages[i], &index.max_values[i])?);
        }
        Ok(Self {
            null_pages: index.null_pages,
            min_values,
            max_values,
            null_counts: index.null_counts,
            boundary_order: index.boundary_order.into(),
            order: column.sort_order(),
        })
    }
}

/// Finds the page whose `[min, max]` range may contain `target`.
///
/// For an ascending column this is the last non-null page whose min is `<= target`,
/// provided its max is `>= target`; descending columns mirror that and unordered ones
/// are scanned. Returns the page count when no page can contain `target`.
///
/// The declared boundary order is trusted: on a column that is not actually sorted
/// as declared, the result is not meaningful.
pub fn search<F>(index: &ColumnIndex, target: &Value, comparator: F) -> usize
where
    F: Fn(&Value, &Value) -> Ordering,
{
    let not_found = index.num_pages();
    let pages = (0..index.num_pages())
        .filter(|&i| !index.is_null_page(i))
        .collect::<Vec<_>>();
    let min = |i: usize| index.min_values[i].as_ref();
    let max = |i: usize| index.max_values[i].as_ref();
    let contains = |i: usize| match (min(i), max(i)) {
        (Some(min), Some(max)) => {
            comparator(min, target) != Ordering::Greater
                && comparator(max, target) != Ordering::Less
        }
        _ => false,
    };

    match index.boundary_order() {
        BoundaryOrder::Ascending => {
            // first page whose min is greater than the target
            let upper = pages.partition_point(|&i| {
                min(i).is_some_and(|m| comparator(m, target) != Ordering::Greater)
            });
            match upper.checked_sub(1).map(|p| pages[p]) {
                Some(page) if contains(page) => page,
                _ => not_found,
            }
        }
        BoundaryOrder::Descending => {
            // first page whose max is less than the target
            let upper = pages.partition_point(|&i| {
                max(i).is_some_and(|m| comparator(m, target) != Ordering::Less)
            });
            match upper.checked_sub(1).map(|p| pages[p]) {
                Some(page) if contains(page) => page,
                _ => not_found,
            }
        }
        BoundaryOrder::Unordered => pages
            .into_iter()
            .find(|&i| contains(i))
            .unwrap_or(not_found),
    }
}

/// Location of a page in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLocation {
    /// File offset of the page header.
    pub offset: u64,
    /// Size of the page including its header.
    pub compressed_page_size: usize,
    /// Index of the first row of the page, relative to the row group.
    pub first_row_index: u64,
}

/// Per page locations of a column chunk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OffsetIndex {
    page_locations: Vec<PageLocation>,
}

impl OffsetIndex {
    pub fn new(page_locations: Vec<PageLocation>) -> Self {
        Self { page_locations }
    }

    pub fn page_locations(&self) -> &[PageLocation] {
        &self.page_locations
    }

    pub fn num_pages(&self) -> usize {
        self.page_locations.len()
    }

    /// Index of the page holding row `row` of the row group.
    pub fn page_for_row(&self, row: u64) -> usize {
        self.page_locations
            .partition_point(|loc| loc.first_row_index <= row)
            .saturating_sub(1)
    }

    pub fn to_thrift(&self) -> ThriftOffsetIndex {
        ThriftOffsetIndex {
            page_locations: self
                .page_locations
                .iter()
                .map(|loc| ThriftPageLocation {
                    offset: loc.offset as i64,
                    compressed_page_size: loc.compressed_page_size as i32,
                    first_row_index: loc.first_row_index as i64,
                })
                .collect(),
        }
    }

    pub fn from_thrift(index: ThriftOffsetIndex) -> ParquetResult<Self> {
        let mut page_locations = Vec::with_capacity(index.page_locations.len());
        for loc in index.page_locations {
            if loc.offset < 0 || loc.compressed_page_size < 0 || loc.first_row_index < 0 {
                return Err(fmt_err!(Format, "negative value in offset index: {loc:?}"));
            }
            let loc = PageLocation {
                offset: loc.offset as u64,
                compressed_page_size: loc.compressed_page_size as usize,
                first_row_index: loc.first_row_index as u64,
            };
            if let Some(prev) = page_locations.last() {
                let prev: &PageLocation = prev;
                if loc.offset <= prev.offset || loc.first_row_index < prev.first_row_index {
                    return Err(fmt_err!(
                        Format,
                        "offset index entries are not increasing: {prev:?} then {loc:?}"
                    ));
                }
            }
            page_locations.push(loc);
        }
        Ok(Self { page_locations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: Option<Value>, max: Option<Value>, null_count: u64) -> PageBounds {
        PageBounds {
            min,
            max,
            null_count,
            num_values: 10,
        }
    }

    fn ints(values: &[(i32, i32)]) -> Vec<PageBounds> {
        values
            .iter()
            .map(|(min, max)| bounds(Some(Value::Int32(*min)), Some(Value::Int32(*max)), 0))
            .collect()
    }

    fn names_index(pages: &[(&str, &str)], boundary_order: BoundaryOrder) -> ColumnIndex {
        ColumnIndex::new(
            pages
                .iter()
                .map(|(min, max)| {
                    bounds(Some(Value::string(*min)), Some(Value::string(*max)), 0)
                })
                .collect(),
            boundary_order,
            SortOrder::Unsigned,
        )
        .unwrap()
    }

    #[test]
    fn ascending_search_finds_containing_page() {
        let index = names_index(
            &[("C", "Han"), ("Leia", "Luke"), ("R2", "R2")],
            BoundaryOrder::Ascending,
        );
        assert_eq!(index.search(&Value::string("Luke")), 1);
        assert_eq!(index.search(&Value::string("Leia")), 1);
        assert_eq!(index.search(&Value::string("C")), 0);
        assert_eq!(index.search(&Value::string("R2")), 2);
    }

    #[test]
    fn ascending_search_reports_gaps() {
        let index = names_index(
            &[("C", "Han"), ("Leia", "Luke"), ("R2", "R2")],
            BoundaryOrder::Ascending,
        );
        // between pages, before the first and after the last
        assert_eq!(index.search(&Value::string("Ian")), 3);
        assert_eq!(index.search(&Value::string("A")), 3);
        assert_eq!(index.search(&Value::string("Z")), 3);
    }

    #[test]
    fn null_pages_are_skipped() {
        let index = ColumnIndex::new(
            vec![
                bounds(Some(Value::Int64(1)), Some(Value::Int64(5)), 0),
                bounds(None, None, 10),
                bounds(Some(Value::Int64(6)), Some(Value::Int64(9)), 2),
            ],
            BoundaryOrder::Ascending,
            SortOrder::Signed,
        )
        .unwrap();
        assert!(index.is_null_page(1));
        assert!(!index.is_null_page(2));
        assert_eq!(index.null_count(2), Some(2));
        assert_eq!(index.search(&Value::Int64(7)), 2);
        assert_eq!(index.search(&Value::Int64(3)), 0);
    }

    #[test]
    fn descending_search() {
        let index = ColumnIndex::new(
            ints(&[(90, 100), (50, 60), (1, 10)]),
            BoundaryOrder::Descending,
            SortOrder::Signed,
        )
        .unwrap();
        assert_eq!(index.search(&Value::Int32(55)), 1);
        assert_eq!(index.search(&Value::Int32(100)), 0);
        assert_eq!(index.search(&Value::Int32(1)), 2);
        assert_eq!(index.search(&Value::Int32(70)), 3);
    }

    #[test]
    fn unordered_search_scans() {
        let index = ColumnIndex::new(
            ints(&[(50, 60), (1, 10)]),
            BoundaryOrder::Unordered,
            SortOrder::Signed,
        )
        .unwrap();
        assert!(!index.is_null_page(0));
        assert_eq!(index.search(&Value::Int32(5)), 1);
        assert_eq!(index.search(&Value::Int32(20)), 2);
    }

    #[test]
    fn pages_without_bounds() {
        // all null: a null page without bounds
        let doubles = bounds(Some(Value::Double(1.0)), Some(Value::Double(2.0)), 0);
        let index = ColumnIndex::new(
            vec![bounds(None, None, 10), doubles.clone()],
            BoundaryOrder::Ascending,
            SortOrder::Signed,
        )
        .unwrap();
        assert!(index.is_null_page(0));
        assert_eq!(index.min_value(0), None);

        // only NaN: values but no orderable bound
        let pages = vec![bounds(None, None, 0), doubles];
        assert!(ColumnIndex::new(pages, BoundaryOrder::Ascending, SortOrder::Signed).is_none());
    }

    #[test]
    fn custom_comparator() {
        let index = names_index(&[("a", "c"), ("d", "f")], BoundaryOrder::Ascending);
        let case_insensitive = |a: &Value, b: &Value| {
            let a = a.as_str().unwrap_or_default().to_lowercase();
            let b = b.as_str().unwrap_or_default().to_lowercase();
            a.cmp(&b)
        };
        assert_eq!(index.search_by(&Value::string("E"), case_insensitive), 1);
    }

    #[test]
    fn computed_boundary_orders() {
        let b = |x: i32, y: i32| (Some(Value::Int32(x)), Some(Value::Int32(y)));
        assert_eq!(
            ColumnIndex::compute_boundary_order(
                &[b(1, 2), (None, None), b(2, 5)],
                SortOrder::Signed
            ),
            BoundaryOrder::Ascending
        );
        assert_eq!(
            ColumnIndex::compute_boundary_order(&[b(5, 9), b(1, 4)], SortOrder::Signed),
            BoundaryOrder::Descending
        );
        assert_eq!(
            ColumnIndex::compute_boundary_order(&[b(1, 9), b(2, 4)], SortOrder::Signed),
            BoundaryOrder::Unordered
        );
    }

    #[test]
    fn page_for_row() {
        let location = |offset, compressed_page_size, first_row_index| PageLocation {
            offset,
            compressed_page_size,
            first_row_index,
        };
        let index = OffsetIndex::new(vec![
            location(4, 30, 0),
            location(34, 30, 2),
            location(64, 20, 4),
        ]);
        assert_eq!(index.page_for_row(0), 0);
        assert_eq!(index.page_for_row(1), 0);
        assert_eq!(index.page_for_row(2), 1);
        assert_eq!(index.page_for_row(5), 2);
    }

    #[test]
    fn non_increasing_offsets_are_rejected() {
        let thrift = ThriftOffsetIndex {
            page_locations: vec![
                ThriftPageLocation {
                    offset: 40,
                    compressed_page_size: 10,
                    first_row_index: 0,
                },
                ThriftPageLocation {
                    offset: 20,
                    compressed_page_size: 10,
                    first_row_index: 5,
                },
            ],
        };
        assert!(OffsetIndex::from_thrift(thrift).is_err());
    }
}
