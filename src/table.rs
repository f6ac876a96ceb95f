use crate::ident::IdentId;

use std::collections::BTreeMap;

/// A position in a table: either coordinates, or the location of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Point {
    Numeric { x: u64, y: u64 },
    /// Refers to a unit by its identifier.
    Reference(IdentId),
}

/// A path is a list of segments, each of which is a list of [`Point`]s.
///
/// In source, points are separated by `,` and segments by `;`.
/// Every segment holds at least one point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Vec<Point>>,
}

impl Path {
    pub fn new(segments: Vec<Vec<Point>>) -> Path {
        Path { segments }
    }

    pub fn segments(&self) -> &[Vec<Point>] {
        &self.segments
    }

    /// Every point of every segment, in order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.segments.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableValue {
    Number(u64),
    Path(Path),
    Point(Point),
}

impl TableValue {
    pub fn as_number(&self) -> Option<u64> {
        if let TableValue::Number(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        if let TableValue::Path(path) = self {
            Some(path)
        } else {
            None
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        if let TableValue::Point(point) = self {
            Some(point)
        } else {
            None
        }
    }
}

/// Free-form metadata attached to LUTs, wires and units.
///
/// Keys are identifiers. Nothing in the simulator reads a table;
/// values are kept exactly as they were written so that a renderer can interpret them.
/// A key written twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table(BTreeMap<IdentId, TableValue>);

impl Table {
    pub fn new() -> Table {
        Table::default()
    }

    pub fn insert(&mut self, key: IdentId, value: TableValue) -> Option<TableValue> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: IdentId) -> Option<&TableValue> {
        self.0.get(&key)
    }

    pub fn number(&self, key: IdentId) -> Option<u64> {
        self.get(key).and_then(TableValue::as_number)
    }

    pub fn path(&self, key: IdentId) -> Option<&Path> {
        self.get(key).and_then(TableValue::as_path)
    }

    pub fn point(&self, key: IdentId) -> Option<&Point> {
        self.get(key).and_then(TableValue::as_point)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (IdentId, &TableValue)> {
        self.0.iter().map(|(key, value)| (*key, value))
    }
}
