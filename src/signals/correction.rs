//! Haldane-Anscombe continuity correction.

use super::contingency::Cell;

/// Cell values the ratio statistics are computed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedCell {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl From<Cell> for CorrectedCell {
    fn from(cell: Cell) -> Self {
        Self {
            a: cell.a as f64,
            b: cell.b as f64,
            c: cell.c as f64,
            d: cell.d as f64,
        }
    }
}

/// Add `increment` to all four cells when any of them is zero.
///
/// The flag reports whether the correction was applied.
pub fn correct(cell: Cell, increment: f64) -> (CorrectedCell, bool) {
    let raw = CorrectedCell::from(cell);
    if !cell.has_zero() {
        return (raw, false);
    }
    let shifted = CorrectedCell {
        a: raw.a + increment,
        b: raw.b + increment,
        c: raw.c + increment,
        d: raw.d + increment,
    };
    (shifted, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_table_is_untouched() {
        let (cell, corrected) = correct(Cell { a: 10, b: 10, c: 5, d: 75 }, 0.5);
        assert!(!corrected);
        assert_eq!(cell, CorrectedCell { a: 10.0, b: 10.0, c: 5.0, d: 75.0 });
    }

    #[test]
    fn single_zero_shifts_every_cell() {
        let (cell, corrected) = correct(Cell { a: 5, b: 0, c: 0, d: 45 }, 0.5);
        assert!(corrected);
        assert_eq!(cell, CorrectedCell { a: 5.5, b: 0.5, c: 0.5, d: 45.5 });
    }
}
