use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid position of an anchored cell, zero-based on both axes.
///
/// Orders row-major, so sorted coordinates read like the grid.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub const fn new(row: u32, col: u32) -> Self {
        CellCoord { row, col }
    }

    /// One step down and right, the exclusive end of a range ending here.
    ///
    /// `None` on the last row or column.
    pub fn next_diagonal(&self) -> Option<Self> {
        Some(CellCoord::new(self.row.checked_add(1)?, self.col.checked_add(1)?))
    }
}

impl From<(u32, u32)> for CellCoord {
    fn from((row, col): (u32, u32)) -> Self {
        CellCoord::new(row, col)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Spreadsheet column name of a zero-based index: A..Z, AA..ZZ, AAA..
pub fn col_to_label(col: u32) -> String {
    let mut letters = Vec::new();
    let mut rest = u64::from(col) + 1;
    while rest > 0 {
        rest -= 1;
        letters.push(b'A' + (rest % 26) as u8);
        rest /= 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_label() {
        assert_eq!(col_to_label(0), "A");
        assert_eq!(col_to_label(25), "Z");
        assert_eq!(col_to_label(26), "AA");
        assert_eq!(col_to_label(701), "ZZ");
        assert_eq!(col_to_label(702), "AAA");
        assert_eq!(col_to_label(u32::MAX), "MWLQKWV");
    }

    #[test]
    fn test_next_diagonal_and_display() {
        let coord = CellCoord::from((2, 5));
        assert_eq!(coord.next_diagonal(), Some(CellCoord::new(3, 6)));
        assert_eq!(CellCoord::new(u32::MAX, 0).next_diagonal(), None);
        assert_eq!(CellCoord::new(0, u32::MAX).next_diagonal(), None);
        assert_eq!(coord.to_string(), "(2, 5)");
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut coords = vec![
            CellCoord::new(1, 0),
            CellCoord::new(0, 5),
            CellCoord::new(0, 1),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![CellCoord::new(0, 1), CellCoord::new(0, 5), CellCoord::new(1, 0)]
        );
    }
}
