//! Cell coordinates.

use std::fmt;

use crate::error::WrapError;

use super::{column_index_to_letters, column_letters_to_index};

/// One axis of a cell position.
///
/// `Last` stands for the last column or row of the sheet and is resolved
/// once the sheet's bounds are known. It orders after every concrete
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Coordinate {
    At(usize),
    Last,
}

impl Coordinate {
    pub fn is_last(self) -> bool {
        matches!(self, Coordinate::Last)
    }

    pub fn resolve(self, last: usize) -> usize {
        match self {
            Coordinate::At(index) => index,
            Coordinate::Last => last,
        }
    }

    /// Parse column letters, or `*`
    pub fn parse_column(id: &str) -> Result<Self, WrapError> {
        if id == "*" {
            return Ok(Coordinate::Last);
        }
        column_letters_to_index(id)
            .map(Coordinate::At)
            .ok_or_else(|| WrapError::InvalidColumnId(id.to_string()))
    }

    /// Parse a 1-based row number, or `*`
    pub fn parse_row(id: &str) -> Result<Self, WrapError> {
        if id == "*" {
            return Ok(Coordinate::Last);
        }
        match id.parse::<usize>() {
            Ok(row) if row >= 1 && id.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(Coordinate::At(row - 1))
            }
            _ => Err(WrapError::InvalidRowId(id.to_string())),
        }
    }
}

/// Index of the last column and last row of a sheet, both 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetBounds {
    pub last_column: usize,
    pub last_row: usize,
}

impl SheetBounds {
    pub fn new(last_column: usize, last_row: usize) -> Self {
        Self {
            last_column,
            last_row,
        }
    }
}

/// A cell position. Immutable; resolving produces a new index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub column: Coordinate,
    pub row: Coordinate,
}

impl CellIndex {
    pub fn new(column: Coordinate, row: Coordinate) -> Self {
        Self { column, row }
    }

    /// A concrete, 0-based position
    pub fn at(column: usize, row: usize) -> Self {
        Self::new(Coordinate::At(column), Coordinate::At(row))
    }

    /// Parse `A1`-style ids. `*` may replace the column letters or the row
    /// number, as in `*3` or `B*`.
    pub fn parse(id: &str) -> Result<Self, WrapError> {
        let invalid = || WrapError::InvalidCellReference(id.to_string());
        let split = if id.starts_with('*') {
            1
        } else {
            id.find(|c: char| !c.is_ascii_uppercase())
                .ok_or_else(invalid)?
        };
        if split == 0 || split == id.len() {
            return Err(invalid());
        }
        let (column, row) = id.split_at(split);
        let column = Coordinate::parse_column(column).map_err(|_| invalid())?;
        let row = Coordinate::parse_row(row).map_err(|_| invalid())?;
        Ok(Self { column, row })
    }

    pub fn has_last(&self) -> bool {
        self.column.is_last() || self.row.is_last()
    }

    /// Replace `Last` by the sheet's concrete last column and row
    pub fn resolve_last(&self, bounds: SheetBounds) -> CellIndex {
        CellIndex::at(
            self.column.resolve(bounds.last_column),
            self.row.resolve(bounds.last_row),
        )
    }

    pub fn is_inside_bounds(&self, bounds: SheetBounds) -> bool {
        self.column.resolve(bounds.last_column) <= bounds.last_column
            && self.row.resolve(bounds.last_row) <= bounds.last_row
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Coordinate::At(column) => f.write_str(&column_index_to_letters(column))?,
            Coordinate::Last => f.write_str("*")?,
        }
        match self.row {
            Coordinate::At(row) => write!(f, "{}", row + 1),
            Coordinate::Last => f.write_str("*"),
        }
    }
}
