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

//! Reassembles rows from the triplets of their leaf columns.
use std::vec;

use super::page::{DataPage, PageReader};
use crate::parquet::error::{fmt_err, ParquetResult};
use crate::parquet::io::ReadAt;
use crate::parquet::schema::{Node, NodeKind, Repetition, Schema};
use crate::parquet::value::{Field, Row, Triplet, Value};

/// Walks the triplets of one column chunk, a row at a time.
pub struct ColumnCursor<'a, R: ReadAt + ?Sized> {
    pages: PageReader<'a, R>,
    max_def_level: i16,
    rep_levels: vec::IntoIter<i16>,
    def_levels: vec::IntoIter<i16>,
    values: vec::IntoIter<Value>,
    /// Levels of the next triplet, already taken from the iterators.
    peeked: Option<(i16, i16)>,
}

impl<'a, R: ReadAt + ?Sized> ColumnCursor<'a, R> {
    pub fn new(pages: PageReader<'a, R>, max_def_level: i16) -> Self {
        Self {
            pages,
            max_def_level,
            rep_levels: Vec::new().into_iter(),
            def_levels: Vec::new().into_iter(),
            values: Vec::new().into_iter(),
            peeked: None,
        }
    }

    /// Levels of the next triplet, loading pages as needed. `None` at the end of the chunk.
    fn peek(&mut self) -> ParquetResult<Option<(i16, i16)>> {
        while self.peeked.is_none() {
            match (self.rep_levels.next(), self.def_levels.next()) {
                (Some(rep), Some(def)) => self.peeked = Some((rep, def)),
                _ => match self.pages.next().transpose()? {
                    Some(DataPage {
                        rep_levels,
                        def_levels,
                        values,
                        ..
                    }) => {
                        self.rep_levels = rep_levels.into_iter();
                        self.def_levels = def_levels.into_iter();
                        self.values = values.into_iter();
                    }
                    None => return Ok(None),
                },
            }
        }
        Ok(self.peeked)
    }

    fn take(&mut self) -> ParquetResult<Triplet> {
        let Some((rep, def)) = self.peek()? else {
            return Err(fmt_err!(Corruption, "column chunk ended inside a row"));
        };
        self.peeked = None;
        let value = if def == self.max_def_level {
            let value = self
                .values
                .next()
                .ok_or_else(|| fmt_err!(Corruption, "page has fewer values than levels"))?;
            Some(value)
        } else {
            None
        };
        Ok(Triplet { def, rep, value })
    }

    /// The triplets of the next row, or `None` once the chunk is exhausted.
    pub fn next_row(&mut self) -> ParquetResult<Option<Vec<Triplet>>> {
        match self.peek()? {
            None => return Ok(None),
            Some((rep, _)) if rep != 0 => {
                return Err(fmt_err!(
                    Corruption,
                    "row starts with repetition level {rep}"
                ))
            }
            Some(_) => {}
        }
        let mut triplets = vec![self.take()?];
        while let Some((rep, _)) = self.peek()? {
            if rep == 0 {
                break;
            }
            triplets.push(self.take()?);
        }
        Ok(Some(triplets))
    }

    /// Skips `count` rows, failing if the chunk has fewer.
    pub fn skip_rows(&mut self, count: u64) -> ParquetResult<()> {
        for skipped in 0..count {
            if self.next_row()?.is_none() {
                return Err(fmt_err!(
                    Corruption,
                    "column chunk ended after skipping {skipped} of {count} rows"
                ));
            }
        }
        Ok(())
    }
}

/// Rebuilds a row from the triplets each leaf column holds for it.
pub fn assemble_row(schema: &Schema, columns: &[Vec<Triplet>]) -> ParquetResult<Row> {
    let mut assembler = Assembler {
        columns,
        positions: vec![0; columns.len()],
    };
    let fields = schema
        .fields()
        .iter()
        .map(|node| assembler.read_node(node, 0, 0))
        .collect::<ParquetResult<Vec<_>>>()?;
    for (column, (position, triplets)) in assembler.positions.iter().zip(columns).enumerate() {
        if *position != triplets.len() {
            return Err(fmt_err!(
                Corruption,
                "column {column} holds {} entries for the row, {position} were used",
                triplets.len()
            ));
        }
    }
    Ok(Row::new(fields))
}

struct Assembler<'a> {
    columns: &'a [Vec<Triplet>],
    positions: Vec<usize>,
}

impl Assembler<'_> {
    fn peek(&self, leaf: usize) -> ParquetResult<&Triplet> {
        self.columns
            .get(leaf)
            .and_then(|triplets| triplets.get(self.positions[leaf]))
            .ok_or_else(|| fmt_err!(Corruption, "column {leaf} ended inside a row"))
    }

    /// Consumes the single entry each leaf of `node` holds for an undefined instance.
    fn skip_undefined(&mut self, node: &Node) {
        for leaf in node.leaves() {
            self.positions[leaf] += 1;
        }
    }

    /// `def` is the definition level of the parent, `depth` its repetition depth.
    fn read_node(&mut self, node: &Node, def: i16, depth: i16) -> ParquetResult<Field> {
        match node.repetition() {
            Repetition::Required => self.read_instance(node, def, depth),
            Repetition::Optional => {
                if self.peek(node.first_leaf())?.def <= def {
                    self.skip_undefined(node);
                    return Ok(Field::Null);
                }
                self.read_instance(node, def + 1, depth)
            }
            Repetition::Repeated => {
                if self.peek(node.first_leaf())?.def <= def {
                    self.skip_undefined(node);
                    return Ok(Field::Repeated(Vec::new()));
                }
                let mut items = vec![self.read_instance(node, def + 1, depth + 1)?];
                loop {
                    let first = node.first_leaf();
                    let more = self
                        .columns
                        .get(first)
                        .and_then(|triplets| triplets.get(self.positions[first]))
                        .is_some_and(|next| next.rep == depth + 1);
                    if !more {
                        break;
                    }
                    items.push(self.read_instance(node, def + 1, depth + 1)?);
                }
                Ok(Field::Repeated(items))
            }
        }
    }

    fn read_instance(&mut self, node: &Node, def: i16, depth: i16) -> ParquetResult<Field> {
        match node.kind() {
            NodeKind::Primitive { .. } => {
                let leaf = node.first_leaf();
                let triplet = self.peek(leaf)?;
                let value = triplet.value.clone().ok_or_else(|| {
                    fmt_err!(
                        Corruption,
                        "field {} is defined to level {} but holds no value",
                        node.name(),
                        triplet.def
                    )
                })?;
                self.positions[leaf] += 1;
                Ok(Field::Value(value))
            }
            NodeKind::Group(children) => children
                .iter()
                .map(|child| self.read_node(child, def, depth))
                .collect::<ParquetResult<Vec<_>>>()
                .map(Field::Group),
        }
    }
}
