//! Proportional reporting ratio and reporting odds ratio.

use std::cmp::Ordering;

use super::correction::CorrectedCell;

/// Outcome of a ratio statistic. `Undefined` replaces a division by a non-positive
/// denominator and is persisted as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Value(f64),
    Undefined,
}

impl Ratio {
    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Value(v) => Some(v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Ratio::Value(_))
    }

    /// `false` for `Undefined`.
    pub fn at_least(self, threshold: f64) -> bool {
        self.value().is_some_and(|v| v >= threshold)
    }

    pub fn to_f64(self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }

    /// Read back a persisted value; `NaN` maps to `Undefined`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Ratio::Undefined
        } else {
            Ratio::Value(value)
        }
    }

    /// Descending order with `Undefined` after every defined value.
    pub fn cmp_desc(self, other: Self) -> Ordering {
        match (self.value(), other.value()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

fn divide(numerator: f64, denominator: f64) -> Ratio {
    if denominator > 0.0 && numerator.is_finite() {
        Ratio::Value(numerator / denominator)
    } else {
        Ratio::Undefined
    }
}

/// `(a / (a + b)) / (c / (c + d))`.
pub fn prr(cell: &CorrectedCell) -> Ratio {
    let exposed = divide(cell.a, cell.a + cell.b);
    let unexposed = divide(cell.c, cell.c + cell.d);
    match (exposed, unexposed) {
        (Ratio::Value(r1), Ratio::Value(r0)) => divide(r1, r0),
        _ => Ratio::Undefined,
    }
}

/// `(a * d) / (b * c)`.
pub fn ror(cell: &CorrectedCell) -> Ratio {
    divide(cell.a * cell.d, cell.b * cell.c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_unexposed_rate_is_undefined() {
        let cell = CorrectedCell { a: 3.0, b: 1.0, c: 0.0, d: 4.0 };
        assert_eq!(prr(&cell), Ratio::Undefined);
        assert_eq!(ror(&cell), Ratio::Undefined);
    }

    #[test]
    fn undefined_sorts_last() {
        let mut values = vec![Ratio::Undefined, Ratio::Value(1.5), Ratio::Value(9.0)];
        values.sort_by(|x, y| x.cmp_desc(*y));
        assert_eq!(
            values,
            vec![Ratio::Value(9.0), Ratio::Value(1.5), Ratio::Undefined]
        );
    }

    #[test]
    fn undefined_never_meets_threshold() {
        assert!(!Ratio::Undefined.at_least(0.0));
        assert!(Ratio::Value(2.0).at_least(2.0));
    }
}
