//! Cell-level comparison logic

use std::borrow::Cow;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::ComparisonOptions;
use crate::model::CellValue;

/// Cell comparator with configurable options.
///
/// Every value is reduced to a canonical text form; two cells are equal when
/// their canonical forms are. Row keys and content hashes use the same form,
/// so matching and cell comparison never disagree.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellComparator {
    strict_decimal: bool,
    ignore_case: bool,
    trim_whitespace: bool,
}

impl CellComparator {
    /// Create a new cell comparator
    pub fn new(strict_decimal: bool, ignore_case: bool, trim_whitespace: bool) -> Self {
        Self {
            strict_decimal,
            ignore_case,
            trim_whitespace,
        }
    }

    pub fn from_options(options: &ComparisonOptions) -> Self {
        Self::new(
            options.strict_decimal,
            options.ignore_case,
            options.trim_whitespace,
        )
    }

    /// Canonical text of a value under the active options
    pub fn normalize<'a>(&self, value: &'a CellValue) -> Cow<'a, str> {
        match value {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Decimal(d) if self.strict_decimal => Cow::Owned(d.to_string()),
            CellValue::Decimal(d) => Cow::Owned(d.normalize().to_string()),
            CellValue::String(s) => {
                let s: &str = if self.trim_whitespace { s.trim() } else { s };
                if self.trim_whitespace {
                    // Padded numbers are only numeric once trimmed
                    let parsed = CellValue::parse(s);
                    if parsed.is_numeric() {
                        return Cow::Owned(self.normalize(&parsed).into_owned());
                    }
                }
                if self.ignore_case {
                    Cow::Owned(s.to_lowercase())
                } else {
                    Cow::Borrowed(s)
                }
            }
        }
    }

    /// Compare two cell values for equality
    pub fn equal(&self, a: &CellValue, b: &CellValue) -> bool {
        self.normalize(a) == self.normalize(b)
    }
}

/// Calculate percentage change for numeric values
pub fn percentage_change(old: &CellValue, new: &CellValue) -> Option<f64> {
    let old_num = as_decimal(old)?;
    let new_num = as_decimal(new)?;

    if old_num.is_zero() {
        if new_num.is_zero() {
            Some(0.0)
        } else {
            None // Infinite change
        }
    } else {
        let delta = new_num.checked_sub(old_num)?;
        let ratio = delta.checked_div(old_num)?;
        ratio.checked_mul(Decimal::ONE_HUNDRED)?.to_f64()
    }
}

fn as_decimal(value: &CellValue) -> Option<Decimal> {
    match value {
        CellValue::Int(i) => Some(Decimal::from(*i)),
        CellValue::Decimal(d) => Some(*d),
        _ => None,
    }
}
