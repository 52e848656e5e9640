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

use parquet_format_safe::{
    BsonType, ConvertedType, DateType, DecimalType, EnumType, FieldRepetitionType, IntType,
    JsonType, ListType, LogicalType as ThriftLogicalType, MapType, MicroSeconds, MilliSeconds,
    NanoSeconds, SchemaElement, StringType, TimeType, TimeUnit as ThriftTimeUnit,
    TimestampType, Type, UUIDType,
};

use crate::encoding::Encoding;
use crate::parquet::compression::Compression;
use crate::parquet::error::{fmt_err, ParquetResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
    Required,
    Optional,
    Repeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Millis,
    Micros,
    Nanos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    String,
    Enum,
    Json,
    Bson,
    Uuid,
    Date,
    Decimal { scale: i32, precision: i32 },
    Time { unit: TimeUnit, utc: bool },
    Timestamp { unit: TimeUnit, utc: bool },
    Integer { bit_width: u8, signed: bool },
    List,
    Map,
}

/// How values of a column compare, for statistics and page index search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Signed,
    Unsigned,
    Undefined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Primitive {
        physical_type: PhysicalType,
        /// Per-column encoding override.
        encoding: Option<Encoding>,
        /// Per-column compression override.
        compression: Option<Compression>,
    },
    Group(Vec<Node>),
}

/// A field of the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    repetition: Repetition,
    logical_type: Option<LogicalType>,
    field_id: Option<i32>,
    kind: NodeKind,
    first_leaf: usize,
    num_leaves: usize,
}

impl Node {
    pub fn primitive(
        name: impl Into<String>,
        repetition: Repetition,
        physical_type: PhysicalType,
    ) -> Self {
        Self {
            name: name.into(),
            repetition,
            logical_type: None,
            field_id: None,
            kind: NodeKind::Primitive {
                physical_type,
                encoding: None,
                compression: None,
            },
            first_leaf: 0,
            num_leaves: 1,
        }
    }

    pub fn required(name: impl Into<String>, physical_type: PhysicalType) -> Self {
        Self::primitive(name, Repetition::Required, physical_type)
    }

    pub fn optional(name: impl Into<String>, physical_type: PhysicalType) -> Self {
        Self::primitive(name, Repetition::Optional, physical_type)
    }

    pub fn repeated(name: impl Into<String>, physical_type: PhysicalType) -> Self {
        Self::primitive(name, Repetition::Repeated, physical_type)
    }

    /// A UTF-8 annotated byte array.
    pub fn string(name: impl Into<String>, repetition: Repetition) -> Self {
        Self::primitive(name, repetition, PhysicalType::ByteArray)
            .with_logical_type(LogicalType::String)
    }

    pub fn group(name: impl Into<String>, repetition: Repetition, fields: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            repetition,
            logical_type: None,
            field_id: None,
            kind: NodeKind::Group(fields),
            first_leaf: 0,
            num_leaves: 0,
        }
    }

    pub fn with_logical_type(mut self, logical_type: LogicalType) -> Self {
        self.logical_type = Some(logical_type);
        self
    }

    pub fn with_field_id(mut self, field_id: i32) -> Self {
        self.field_id = Some(field_id);
        self
    }

    /// Sets the preferred encoding of a primitive column. Ignored on groups.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        if let NodeKind::Primitive { encoding: e, .. } = &mut self.kind {
            *e = Some(encoding);
        }
        self
    }

    /// Sets the compression of a primitive column. Ignored on groups.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        if let NodeKind::Primitive { compression: c, .. } = &mut self.kind {
            *c = Some(compression);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn logical_type(&self) -> Option<LogicalType> {
        self.logical_type
    }

    pub fn field_id(&self) -> Option<i32> {
        self.field_id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Group(children) => children,
            NodeKind::Primitive { .. } => &[],
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    /// Index of the first leaf column under this node.
    pub fn first_leaf(&self) -> usize {
        self.first_leaf
    }

    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    pub fn leaves(&self) -> std::ops::Range<usize> {
        self.first_leaf..self.first_leaf + self.num_leaves
    }

    fn index(
        &mut self,
        path: &mut Vec<String>,
        max_def: i16,
        max_rep: i16,
        columns: &mut Vec<ColumnDescriptor>,
    ) -> ParquetResult<()> {
        if self.name.is_empty() {
            return Err(fmt_err!(SchemaMismatch, "schema field names must not be empty"));
        }
        let (max_def, max_rep) = match self.repetition {
            Repetition::Required => (max_def, max_rep),
            Repetition::Optional => (max_def + 1, max_rep),
            Repetition::Repeated => (max_def + 1, max_rep + 1),
        };
        path.push(self.name.clone());
        self.first_leaf = columns.len();
        match &mut self.kind {
            NodeKind::Primitive {
                physical_type,
                encoding,
                compression,
            } => {
                validate_primitive(
                    path,
                    *physical_type,
                    self.logical_type,
                    *encoding,
                    *compression,
                )?;
                columns.push(ColumnDescriptor {
                    path: path.clone(),
                    physical_type: *physical_type,
                    logical_type: self.logical_type,
                    repetition: self.repetition,
                    max_def_level: max_def,
                    max_rep_level: max_rep,
                    encoding: *encoding,
                    compression: *compression,
                    field_id: self.field_id,
                });
            }
            NodeKind::Group(children) => {
                if children.is_empty() {
                    return Err(fmt_err!(
                        SchemaMismatch,
                        "group {} has no fields",
                        path.join(".")
                    ));
                }
                for child in children.iter_mut() {
                    child.index(path, max_def, max_rep, columns)?;
                }
            }
        }
        self.num_leaves = columns.len() - self.first_leaf;
        path.pop();
        Ok(())
    }
}

fn validate_primitive(
    path: &[String],
    physical_type: PhysicalType,
    logical_type: Option<LogicalType>,
    encoding: Option<Encoding>,
    compression: Option<Compression>,
) -> ParquetResult<()> {
    if physical_type == PhysicalType::FixedLenByteArray(0) {
        return Err(fmt_err!(
            SchemaMismatch,
            "fixed length byte array column {} must have a positive length",
            path.join(".")
        ));
    }
    if let Some(logical_type) = logical_type {
        let ok = match logical_type {
            LogicalType::String | LogicalType::Enum | LogicalType::Json | LogicalType::Bson => {
                physical_type == PhysicalType::ByteArray
            }
            LogicalType::Uuid => physical_type == PhysicalType::FixedLenByteArray(16),
            LogicalType::Date => physical_type == PhysicalType::Int32,
            LogicalType::Time { unit, .. } => matches!(
                (unit, physical_type),
                (TimeUnit::Millis, PhysicalType::Int32)
                    | (TimeUnit::Micros | TimeUnit::Nanos, PhysicalType::Int64)
            ),
            LogicalType::Timestamp { .. } => physical_type == PhysicalType::Int64,
            LogicalType::Integer { bit_width, .. } => match bit_width {
                8 | 16 | 32 => physical_type == PhysicalType::Int32,
                64 => physical_type == PhysicalType::Int64,
                _ => false,
            },
            LogicalType::Decimal { .. } => matches!(
                physical_type,
                PhysicalType::Int32
                    | PhysicalType::Int64
                    | PhysicalType::ByteArray
                    | PhysicalType::FixedLenByteArray(_)
            ),
            LogicalType::List | LogicalType::Map => false,
        };
        if !ok {
            return Err(fmt_err!(
                SchemaMismatch,
                "logical type {:?} cannot annotate {:?} column {}",
                logical_type,
                physical_type,
                path.join(".")
            ));
        }
    }
    if let Some(encoding) = encoding {
        if !encoding_supports(encoding, physical_type) {
            return Err(fmt_err!(
                Unsupported,
                "encoding {:?} is not supported for {:?} column {}",
                encoding,
                physical_type,
                path.join(".")
            ));
        }
    }
    if let Some(compression) = compression {
        if !compression.is_supported() {
            return Err(fmt_err!(
                Unsupported,
                "compression {:?} requested for column {} is not available",
                compression,
                path.join(".")
            ));
        }
    }
    Ok(())
}

/// Whether values of `physical_type` can be written with `encoding`.
pub fn encoding_supports(encoding: Encoding, physical_type: PhysicalType) -> bool {
    match encoding {
        Encoding::Plain => true,
        Encoding::PlainDictionary | Encoding::RleDictionary => {
            physical_type != PhysicalType::Boolean
        }
        Encoding::Rle => physical_type == PhysicalType::Boolean,
        Encoding::DeltaBinaryPacked => {
            matches!(physical_type, PhysicalType::Int32 | PhysicalType::Int64)
        }
        Encoding::DeltaLengthByteArray => physical_type == PhysicalType::ByteArray,
        Encoding::DeltaByteArray => matches!(
            physical_type,
            PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_)
        ),
        Encoding::BitPacked | Encoding::ByteStreamSplit => false,
    }
}

/// A leaf column of the schema, in the order columns appear in every row group.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub path: Vec<String>,
    pub physical_type: PhysicalType,
    pub logical_type: Option<LogicalType>,
    pub repetition: Repetition,
    pub max_def_level: i16,
    pub max_rep_level: i16,
    pub encoding: Option<Encoding>,
    pub compression: Option<Compression>,
    pub field_id: Option<i32>,
}

impl ColumnDescriptor {
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    pub fn sort_order(&self) -> SortOrder {
        match (self.physical_type, self.logical_type) {
            (PhysicalType::Int96, _) => SortOrder::Undefined,
            (_, Some(LogicalType::Integer { signed: false, .. })) => SortOrder::Unsigned,
            (
                PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_),
                Some(LogicalType::Decimal { .. }),
            ) => SortOrder::Undefined,
            (PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_), _) => {
                SortOrder::Unsigned
            }
            (PhysicalType::Boolean, _) => SortOrder::Unsigned,
            _ => SortOrder::Signed,
        }
    }
}

/// The schema tree of a file: a root group whose fields are the top level columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<Node>,
    columns: Vec<ColumnDescriptor>,
}

impl Schema {
    pub fn new(name: impl Into<String>, mut fields: Vec<Node>) -> ParquetResult<Self> {
        if fields.is_empty() {
            return Err(fmt_err!(SchemaMismatch, "schema has no fields"));
        }
        let mut columns = Vec::new();
        let mut path = Vec::new();
        for field in fields.iter_mut() {
            field.index(&mut path, 0, 0, &mut columns)?;
        }
        Ok(Self {
            name: name.into(),
            fields,
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Node] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<(usize, &Node)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> &ColumnDescriptor {
        &self.columns[index]
    }

    /// Finds a leaf column by its dotted path.
    pub fn column_index(&self, path: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.path_string() == path)
    }

    /// Flattens the tree depth first, root first, as stored in the footer.
    pub fn to_thrift(&self) -> Vec<SchemaElement> {
        let mut elements = vec![SchemaElement {
            type_: None,
            type_length: None,
            repetition_type: None,
            name: self.name.clone(),
            num_children: Some(self.fields.len() as i32),
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }];
        for field in &self.fields {
            node_to_thrift(field, &mut elements);
        }
        elements
    }

    pub fn from_thrift(elements: &[SchemaElement]) -> ParquetResult<Self> {
        let (root, rest) = elements
            .split_first()
            .ok_or_else(|| fmt_err!(Format, "footer schema is empty"))?;
        let num_children = root.num_children.unwrap_or(0);
        let mut rest = rest;
        let mut fields = Vec::with_capacity(num_children.max(0) as usize);
        for _ in 0..num_children {
            fields.push(node_from_thrift(&mut rest)?);
        }
        if !rest.is_empty() {
            return Err(fmt_err!(
                Format,
                "footer schema has {} elements outside the root group",
                rest.len()
            ));
        }
        Schema::new(root.name.clone(), fields)
    }
}

fn node_to_thrift(node: &Node, elements: &mut Vec<SchemaElement>) {
    let repetition_type = Some(match node.repetition {
        Repetition::Required => FieldRepetitionType::REQUIRED,
        Repetition::Optional => FieldRepetitionType::OPTIONAL,
        Repetition::Repeated => FieldRepetitionType::REPEATED,
    });
    let (scale, precision) = match node.logical_type {
        Some(LogicalType::Decimal { scale, precision }) => (Some(scale), Some(precision)),
        _ => (None, None),
    };
    match &node.kind {
        NodeKind::Primitive { physical_type, .. } => {
            let (type_, type_length) = physical_type_to_thrift(*physical_type);
            elements.push(SchemaElement {
                type_: Some(type_),
                type_length,
                repetition_type,
                name: node.name.clone(),
                num_children: None,
                converted_type: node.logical_type.and_then(converted_type),
                scale,
                precision,
                field_id: node.field_id,
                logical_type: node.logical_type.map(logical_type_to_thrift),
            });
        }
        NodeKind::Group(children) => {
            elements.push(SchemaElement {
                type_: None,
                type_length: None,
                repetition_type,
                name: node.name.clone(),
                num_children: Some(children.len() as i32),
                converted_type: node.logical_type.and_then(converted_type),
                scale: None,
                precision: None,
                field_id: node.field_id,
                logical_type: node.logical_type.map(logical_type_to_thrift),
            });
            for child in children {
                node_to_thrift(child, elements);
            }
        }
    }
}

fn node_from_thrift(elements: &mut &[SchemaElement]) -> ParquetResult<Node> {
    let (element, rest) = elements
        .split_first()
        .ok_or_else(|| fmt_err!(Format, "footer schema ends before all children were read"))?;
    *elements = rest;

    let repetition = match element.repetition_type {
        Some(FieldRepetitionType::REQUIRED) => Repetition::Required,
        Some(FieldRepetitionType::OPTIONAL) => Repetition::Optional,
        Some(FieldRepetitionType::REPEATED) => Repetition::Repeated,
        Some(other) => {
            return Err(fmt_err!(
                Format,
                "field {} has unknown repetition {}",
                element.name,
                other.0
            ))
        }
        None => {
            return Err(fmt_err!(Format, "field {} has no repetition", element.name));
        }
    };
    let logical_type = match &element.logical_type {
        Some(logical_type) => logical_type_from_thrift(logical_type),
        None => element
            .converted_type
            .and_then(|c| logical_type_from_converted(c, element.scale, element.precision)),
    };

    let mut node = match (element.num_children, element.type_) {
        (Some(num_children), _) if num_children > 0 => {
            let mut children = Vec::with_capacity(num_children as usize);
            for _ in 0..num_children {
                children.push(node_from_thrift(elements)?);
            }
            Node::group(element.name.clone(), repetition, children)
        }
        (_, Some(type_)) => {
            let physical_type = physical_type_from_thrift(type_, element.type_length)?;
            Node::primitive(element.name.clone(), repetition, physical_type)
        }
        _ => {
            return Err(fmt_err!(
                Format,
                "field {} is neither a group nor a primitive",
                element.name
            ))
        }
    };
    node.logical_type = logical_type;
    node.field_id = element.field_id;
    Ok(node)
}

pub(crate) fn physical_type_to_thrift(physical_type: PhysicalType) -> (Type, Option<i32>) {
    match physical_type {
        PhysicalType::Boolean => (Type::BOOLEAN, None),
        PhysicalType::Int32 => (Type::INT32, None),
        PhysicalType::Int64 => (Type::INT64, None),
        PhysicalType::Int96 => (Type::INT96, None),
        PhysicalType::Float => (Type::FLOAT, None),
        PhysicalType::Double => (Type::DOUBLE, None),
        PhysicalType::ByteArray => (Type::BYTE_ARRAY, None),
        PhysicalType::FixedLenByteArray(len) => (Type::FIXED_LEN_BYTE_ARRAY, Some(len as i32)),
    }
}

fn physical_type_from_thrift(type_: Type, length: Option<i32>) -> ParquetResult<PhysicalType> {
    Ok(match type_ {
        Type::BOOLEAN => PhysicalType::Boolean,
        Type::INT32 => PhysicalType::Int32,
        Type::INT64 => PhysicalType::Int64,
        Type::INT96 => PhysicalType::Int96,
        Type::FLOAT => PhysicalType::Float,
        Type::DOUBLE => PhysicalType::Double,
        Type::BYTE_ARRAY => PhysicalType::ByteArray,
        Type::FIXED_LEN_BYTE_ARRAY => {
            let length = length
                .filter(|&l| l > 0)
                .ok_or_else(|| fmt_err!(Format, "fixed length byte array without a length"))?;
            PhysicalType::FixedLenByteArray(length as usize)
        }
        other => return Err(fmt_err!(Unsupported, "unknown physical type {}", other.0)),
    })
}

fn time_unit_to_thrift(unit: TimeUnit) -> ThriftTimeUnit {
    match unit {
        TimeUnit::Millis => ThriftTimeUnit::MILLIS(MilliSeconds {}),
        TimeUnit::Micros => ThriftTimeUnit::MICROS(MicroSeconds {}),
        TimeUnit::Nanos => ThriftTimeUnit::NANOS(NanoSeconds {}),
    }
}

fn time_unit_from_thrift(unit: &ThriftTimeUnit) -> TimeUnit {
    match unit {
        ThriftTimeUnit::MILLIS(_) => TimeUnit::Millis,
        ThriftTimeUnit::MICROS(_) => TimeUnit::Micros,
        ThriftTimeUnit::NANOS(_) => TimeUnit::Nanos,
    }
}

fn logical_type_to_thrift(logical_type: LogicalType) -> ThriftLogicalType {
    match logical_type {
        LogicalType::String => ThriftLogicalType::STRING(StringType {}),
        LogicalType::Enum => ThriftLogicalType::ENUM(EnumType {}),
        LogicalType::Json => ThriftLogicalType::JSON(JsonType {}),
        LogicalType::Bson => ThriftLogicalType::BSON(BsonType {}),
        LogicalType::Uuid => ThriftLogicalType::UUID(UUIDType {}),
        LogicalType::Date => ThriftLogicalType::DATE(DateType {}),
        LogicalType::Decimal { scale, precision } => {
            ThriftLogicalType::DECIMAL(DecimalType { scale, precision })
        }
        LogicalType::Time { unit, utc } => ThriftLogicalType::TIME(TimeType {
            is_adjusted_to_u_t_c: utc,
            unit: time_unit_to_thrift(unit),
        }),
        LogicalType::Timestamp { unit, utc } => ThriftLogicalType::TIMESTAMP(TimestampType {
            is_adjusted_to_u_t_c: utc,
            unit: time_unit_to_thrift(unit),
        }),
        LogicalType::Integer { bit_width, signed } => ThriftLogicalType::INTEGER(IntType {
            bit_width: bit_width as i8,
            is_signed: signed,
        }),
        LogicalType::List => ThriftLogicalType::LIST(ListType {}),
        LogicalType::Map => ThriftLogicalType::MAP(MapType {}),
    }
}

fn logical_type_from_thrift(logical_type: &ThriftLogicalType) -> Option<LogicalType> {
    Some(match logical_type {
        ThriftLogicalType::STRING(_) => LogicalType::String,
        ThriftLogicalType::ENUM(_) => LogicalType::Enum,
        ThriftLogicalType::JSON(_) => LogicalType::Json,
        ThriftLogicalType::BSON(_) => LogicalType::Bson,
        ThriftLogicalType::UUID(_) => LogicalType::Uuid,
        ThriftLogicalType::DATE(_) => LogicalType::Date,
        ThriftLogicalType::DECIMAL(d) => LogicalType::Decimal {
            scale: d.scale,
            precision: d.precision,
        },
        ThriftLogicalType::TIME(t) => LogicalType::Time {
            unit: time_unit_from_thrift(&t.unit),
            utc: t.is_adjusted_to_u_t_c,
        },
        ThriftLogicalType::TIMESTAMP(t) => LogicalType::Timestamp {
            unit: time_unit_from_thrift(&t.unit),
            utc: t.is_adjusted_to_u_t_c,
        },
        ThriftLogicalType::INTEGER(i) => LogicalType::Integer {
            bit_width: i.bit_width as u8,
            signed: i.is_signed,
        },
        ThriftLogicalType::LIST(_) => LogicalType::List,
        ThriftLogicalType::MAP(_) => LogicalType::Map,
        _ => return None,
    })
}

fn converted_type(logical_type: LogicalType) -> Option<ConvertedType> {
    Some(match logical_type {
        LogicalType::String => ConvertedType::UTF8,
        LogicalType::Enum => ConvertedType::ENUM,
        LogicalType::Json => ConvertedType::JSON,
        LogicalType::Bson => ConvertedType::BSON,
        LogicalType::Date => ConvertedType::DATE,
        LogicalType::Decimal { .. } => ConvertedType::DECIMAL,
        LogicalType::Time { unit: TimeUnit::Millis, utc: true } => ConvertedType::TIME_MILLIS,
        LogicalType::Time { unit: TimeUnit::Micros, utc: true } => ConvertedType::TIME_MICROS,
        LogicalType::Timestamp { unit: TimeUnit::Millis, utc: true } => {
            ConvertedType::TIMESTAMP_MILLIS
        }
        LogicalType::Timestamp { unit: TimeUnit::Micros, utc: true } => {
            ConvertedType::TIMESTAMP_MICROS
        }
        LogicalType::Integer { bit_width, signed } => match (bit_width, signed) {
            (8, true) => ConvertedType::INT_8,
            (16, true) => ConvertedType::INT_16,
            (32, true) => ConvertedType::INT_32,
            (64, true) => ConvertedType::INT_64,
            (8, false) => ConvertedType::UINT_8,
            (16, false) => ConvertedType::UINT_16,
            (32, false) => ConvertedType::UINT_32,
            (64, false) => ConvertedType::UINT_64,
            _ => return None,
        },
        LogicalType::List => ConvertedType::LIST,
        LogicalType::Map => ConvertedType::MAP,
        _ => return None,
    })
}

fn logical_type_from_converted(
    converted: ConvertedType,
    scale: Option<i32>,
    precision: Option<i32>,
) -> Option<LogicalType> {
    let integer = |bit_width, signed| Some(LogicalType::Integer { bit_width, signed });
    match converted {
        ConvertedType::UTF8 => Some(LogicalType::String),
        ConvertedType::ENUM => Some(LogicalType::Enum),
        ConvertedType::JSON => Some(LogicalType::Json),
        ConvertedType::BSON => Some(LogicalType::Bson),
        ConvertedType::DATE => Some(LogicalType::Date),
        ConvertedType::DECIMAL => Some(LogicalType::Decimal {
            scale: scale.unwrap_or(0),
            precision: precision.unwrap_or(0),
        }),
        ConvertedType::TIME_MILLIS => Some(LogicalType::Time {
            unit: TimeUnit::Millis,
            utc: true,
        }),
        ConvertedType::TIME_MICROS => Some(LogicalType::Time {
            unit: TimeUnit::Micros,
            utc: true,
        }),
        ConvertedType::TIMESTAMP_MILLIS => Some(LogicalType::Timestamp {
            unit: TimeUnit::Millis,
            utc: true,
        }),
        ConvertedType::TIMESTAMP_MICROS => Some(LogicalType::Timestamp {
            unit: TimeUnit::Micros,
            utc: true,
        }),
        ConvertedType::INT_8 => integer(8, true),
        ConvertedType::INT_16 => integer(16, true),
        ConvertedType::INT_32 => integer(32, true),
        ConvertedType::INT_64 => integer(64, true),
        ConvertedType::UINT_8 => integer(8, false),
        ConvertedType::UINT_16 => integer(16, false),
        ConvertedType::UINT_32 => integer(32, false),
        ConvertedType::UINT_64 => integer(64, false),
        ConvertedType::LIST => Some(LogicalType::List),
        ConvertedType::MAP | ConvertedType::MAP_KEY_VALUE => Some(LogicalType::Map),
        _ => None,
    }
}
