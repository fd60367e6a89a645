//! Byte size type.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Strongly typed byte count
///
/// This wrapper around `u64` keeps sizes apart from offsets, line numbers and
/// counts, and owns the two renderings the report uses side by side: whole
/// bytes (`"64 B"`) and kibibytes with two decimals (`"0.06 KB"`).
///
/// ## Example
///
/// ```rust
/// use sizelens_core::types::ByteSize;
///
/// let size = ByteSize::from(1536);
/// assert_eq!(size.bytes_label(), "1536 B");
/// assert_eq!(size.kib_label(), "1.50 KB");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(u64);

impl ByteSize
{
    /// Zero bytes
    pub const ZERO: Self = ByteSize(0);

    /// Create a new size from a `u64` value
    ///
    /// ```rust
    /// use sizelens_core::types::ByteSize;
    ///
    /// const PAGE: ByteSize = ByteSize::new(65536);
    /// assert_eq!(PAGE.value(), 65536);
    /// ```
    #[must_use]
    pub const fn new(value: u64) -> Self
    {
        ByteSize(value)
    }

    /// Get the raw `u64` value
    #[must_use]
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Size in kibibytes (1024 bytes)
    #[must_use]
    pub fn kib(self) -> f64
    {
        self.0 as f64 / 1024.0
    }

    /// `"<n> B"` rendering used in report columns
    #[must_use]
    pub fn bytes_label(self) -> String
    {
        format!("{} B", self.0)
    }

    /// `"<n.nn> KB"` rendering used in report columns
    #[must_use]
    pub fn kib_label(self) -> String
    {
        format!("{:.2} KB", self.kib())
    }
}

impl From<u64> for ByteSize
{
    fn from(value: u64) -> Self
    {
        ByteSize(value)
    }
}

impl From<ByteSize> for u64
{
    fn from(size: ByteSize) -> Self
    {
        size.0
    }
}

impl fmt::Display for ByteSize
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} B", self.0)
    }
}

impl Add for ByteSize
{
    type Output = ByteSize;

    fn add(self, rhs: ByteSize) -> Self::Output
    {
        ByteSize(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for ByteSize
{
    fn add_assign(&mut self, rhs: ByteSize)
    {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for ByteSize
{
    fn sum<I: Iterator<Item = ByteSize>>(iter: I) -> Self
    {
        iter.fold(ByteSize::ZERO, Add::add)
    }
}
