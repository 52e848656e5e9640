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

//! Splits rows into per-leaf streams of values with repetition and definition levels.
use crate::parquet::error::{fmt_err, ParquetErrorExt, ParquetResult};
use crate::parquet::schema::{Node, NodeKind, Repetition, Schema};
use crate::parquet::value::{Field, Row};
pub use crate::parquet::value::Triplet;

/// The triplets one row contributes to every leaf column, in column order.
pub type ShreddedRow = Vec<Vec<Triplet>>;

/// Shreds `row` against `schema`. Nothing is returned unless the whole row matches.
pub fn shred_row(schema: &Schema, row: &Row) -> ParquetResult<ShreddedRow> {
    let fields = schema.fields();
    if row.len() != fields.len() {
        return Err(fmt_err!(
            SchemaMismatch,
            "row has {} fields but the schema has {}",
            row.len(),
            fields.len()
        ));
    }
    let mut out = vec![Vec::with_capacity(1); schema.columns().len()];
    for (node, field) in fields.iter().zip(row.fields()) {
        shred_node(node, field, 0, 0, 0, &mut out)
            .with_context(|_| format!("field {}", node.name()))?;
    }
    Ok(out)
}

/// `def` and `depth` are the definition and repetition levels of the parent,
/// `rep` is the repetition level of the first value this node emits.
fn shred_node(
    node: &Node,
    field: &Field,
    def: i16,
    rep: i16,
    depth: i16,
    out: &mut ShreddedRow,
) -> ParquetResult<()> {
    match node.repetition() {
        Repetition::Required => match field {
            Field::Null => Err(fmt_err!(SchemaMismatch, "required field is null")),
            field => shred_instance(node, field, def, rep, depth, out),
        },
        Repetition::Optional => match field {
            Field::Null => {
                emit_nulls(node, def, rep, out);
                Ok(())
            }
            field => shred_instance(node, field, def + 1, rep, depth, out),
        },
        Repetition::Repeated => {
            let items: &[Field] = match field {
                Field::Repeated(items) => items,
                Field::Null => &[],
                other => {
                    return Err(fmt_err!(
                        SchemaMismatch,
                        "repeated field holds a single {:?}",
                        other
                    ))
                }
            };
            if items.is_empty() {
                emit_nulls(node, def, rep, out);
                return Ok(());
            }
            for (i, item) in items.iter().enumerate() {
                if item.is_null() {
                    return Err(fmt_err!(SchemaMismatch, "element {i} of a repeated field is null"));
                }
                let item_rep = if i == 0 { rep } else { depth + 1 };
                shred_instance(node, item, def + 1, item_rep, depth + 1, out)?;
            }
            Ok(())
        }
    }
}

/// Shreds one defined instance of `node`.
fn shred_instance(
    node: &Node,
    field: &Field,
    def: i16,
    rep: i16,
    depth: i16,
    out: &mut ShreddedRow,
) -> ParquetResult<()> {
    match (node.kind(), field) {
        (NodeKind::Primitive { physical_type, .. }, Field::Value(value)) => {
            if !value.matches(*physical_type) {
                return Err(fmt_err!(
                    SchemaMismatch,
                    "{} value cannot be stored in a {:?} column",
                    value.type_name(),
                    physical_type
                ));
            }
            out[node.first_leaf()].push(Triplet {
                def,
                rep,
                value: Some(value.clone()),
            });
            Ok(())
        }
        (NodeKind::Group(children), Field::Group(fields)) => {
            if fields.len() != children.len() {
                return Err(fmt_err!(
                    SchemaMismatch,
                    "group has {} fields but the schema has {}",
                    fields.len(),
                    children.len()
                ));
            }
            for (child, field) in children.iter().zip(fields) {
                shred_node(child, field, def, rep, depth, out)
                    .with_context(|_| format!("field {}", child.name()))?;
            }
            Ok(())
        }
        (NodeKind::Primitive { .. }, other) => Err(fmt_err!(
            SchemaMismatch,
            "expected a value for a primitive field, found {:?}",
            other
        )),
        (NodeKind::Group(_), other) => Err(fmt_err!(
            SchemaMismatch,
            "expected a group, found {:?}",
            other
        )),
    }
}

fn emit_nulls(node: &Node, def: i16, rep: i16, out: &mut ShreddedRow) {
    for leaf in node.leaves() {
        out[leaf].push(Triplet {
            def,
            rep,
            value: None,
        });
    }
}
