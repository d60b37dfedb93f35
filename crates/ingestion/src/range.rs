//! Block range parsing.

use crate::error::RangeError;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Inclusive, validated range of block numbers.
///
/// Both bounds fit in an SQLite INTEGER and `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    start: u64,
    end: u64,
}

impl BlockRange {
    /// Build a range from numeric bounds.
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        for bound in [start, end] {
            if i64::try_from(bound).is_err() {
                return Err(RangeError::OutOfBounds(bound));
            }
        }
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a `<start>-<end>` expression such as `"100-200"`.
    pub fn parse(expr: &str) -> Result<Self, RangeError> {
        let malformed = || RangeError::Malformed(expr.to_string());

        let mut parts = expr.split('-');
        let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };

        let start = start.trim().parse::<u64>().map_err(|_| malformed())?;
        let end = end.trim().parse::<u64>().map_err(|_| malformed())?;
        Self::new(start, end)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of blocks in the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn contains(&self, block_number: u64) -> bool {
        (self.start..=self.end).contains(&block_number)
    }

    /// Block numbers in ascending order.
    pub fn blocks(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }
}

impl FromStr for BlockRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
