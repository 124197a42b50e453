//! Cell ranges.

use std::fmt;

use crate::ast::CellRangeLiteral;
use crate::error::WrapError;

use super::{CellIndex, Coordinate, SheetBounds};

/// The canonical shape of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeShape {
    /// `from == to`
    Cell,
    /// One column, all rows
    Column,
    /// One row, all columns
    Row,
    Rectangle,
}

/// A rectangular selection between two corner cells, both inclusive.
///
/// Ranges are only meaningful when `from` is the top-left corner; see
/// [`CellRange::is_valid`]. Construction does not enforce this so that
/// validation can report inverted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub from: CellIndex,
    pub to: CellIndex,
}

impl CellRange {
    pub fn new(from: CellIndex, to: CellIndex) -> Self {
        Self { from, to }
    }

    pub fn cell(index: CellIndex) -> Self {
        Self::new(index, index)
    }

    /// Every row of one column
    pub fn column(column: Coordinate) -> Self {
        Self::new(
            CellIndex::new(column, Coordinate::At(0)),
            CellIndex::new(column, Coordinate::Last),
        )
    }

    /// Every column of one row
    pub fn row(row: Coordinate) -> Self {
        Self::new(
            CellIndex::new(Coordinate::At(0), row),
            CellIndex::new(Coordinate::Last, row),
        )
    }

    pub fn can_be_wrapped(literal: &CellRangeLiteral) -> bool {
        Self::from_literal(literal).is_ok()
    }

    /// Build the canonical range of one of the four literal syntaxes
    pub fn from_literal(literal: &CellRangeLiteral) -> Result<Self, WrapError> {
        match literal {
            CellRangeLiteral::Cell { cell } => Ok(Self::cell(CellIndex::parse(cell)?)),
            CellRangeLiteral::Column { column } => {
                Ok(Self::column(Coordinate::parse_column(column)?))
            }
            CellRangeLiteral::Row { row } => Ok(Self::row(Coordinate::parse_row(row)?)),
            CellRangeLiteral::Range { from, to } => {
                Ok(Self::new(CellIndex::parse(from)?, CellIndex::parse(to)?))
            }
        }
    }

    pub fn shape(&self) -> RangeShape {
        if self.from == self.to {
            RangeShape::Cell
        } else if self.from.column == self.to.column
            && self.from.row == Coordinate::At(0)
            && self.to.row == Coordinate::Last
        {
            RangeShape::Column
        } else if self.from.row == self.to.row
            && self.from.column == Coordinate::At(0)
            && self.to.column == Coordinate::Last
        {
            RangeShape::Row
        } else {
            RangeShape::Rectangle
        }
    }

    pub fn is_one_dimensional(&self) -> bool {
        self.from.column == self.to.column || self.from.row == self.to.row
    }

    /// `from` is the top-left and `to` the bottom-right corner
    pub fn is_valid(&self) -> bool {
        self.from.column <= self.to.column && self.from.row <= self.to.row
    }

    /// Cells covered by the range.
    ///
    /// `None` when an axis spans up to an unresolved `Last` (the size
    /// depends on the sheet) or the range is inverted. A `Last..Last` span
    /// counts as one.
    pub fn number_of_cells(&self) -> Option<usize> {
        let columns = span(self.from.column, self.to.column)?;
        let rows = span(self.from.row, self.to.row)?;
        columns.checked_mul(rows)
    }

    pub fn resolve_last(&self, bounds: SheetBounds) -> CellRange {
        CellRange::new(self.from.resolve_last(bounds), self.to.resolve_last(bounds))
    }

    pub fn is_inside_bounds(&self, bounds: SheetBounds) -> bool {
        self.from.is_inside_bounds(bounds) && self.to.is_inside_bounds(bounds)
    }
}

fn span(from: Coordinate, to: Coordinate) -> Option<usize> {
    match (from, to) {
        (Coordinate::At(from), Coordinate::At(to)) => to.checked_sub(from).map(|n| n + 1),
        (Coordinate::Last, Coordinate::Last) => Some(1),
        _ => None,
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape() {
            RangeShape::Cell => write!(f, "cell {}", self.from),
            RangeShape::Column => {
                write!(f, "column ")?;
                match self.from.column {
                    Coordinate::At(column) => {
                        f.write_str(&super::column_index_to_letters(column))
                    }
                    Coordinate::Last => f.write_str("*"),
                }
            }
            RangeShape::Row => match self.from.row {
                Coordinate::At(row) => write!(f, "row {}", row + 1),
                Coordinate::Last => f.write_str("row *"),
            },
            RangeShape::Rectangle => write!(f, "range {}:{}", self.from, self.to),
        }
    }
}
