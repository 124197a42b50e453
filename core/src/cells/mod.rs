//! Cell-Range Addressing
//!
//! Spreadsheet-style positions (`B3`), columns, rows and rectangles, with
//! `*` standing for the last column or row until the sheet's bounds are
//! known.

mod column;
mod index;
mod range;

pub use column::{column_index_to_letters, column_letters_to_index};
pub use index::{CellIndex, Coordinate, SheetBounds};
pub use range::{CellRange, RangeShape};
