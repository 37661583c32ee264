//! Memory address type.

use std::fmt;

/// Strongly typed address in the debuggee's address space
///
/// Keeps load addresses apart from the file offsets they are computed from.
/// Both are `u64`, and mixing them up is the classic way to load symbols at
/// the wrong place.
///
/// `Display` renders the form GDB accepts in `add-symbol-file`: lowercase
/// hex with a `0x` prefix and no padding.
///
/// ## Example
///
/// ```rust
/// use symfetch_core::types::Address;
///
/// let base = Address::new(0x7ffff7dc3000);
/// let text = base.checked_add(0x28700).unwrap();
/// assert_eq!(text.to_string(), "0x7ffff7deb700");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use symfetch_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    #[must_use]
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Parse a hexadecimal address, with or without a `0x` prefix
    ///
    /// Returns `None` for empty input or non-hex digits.
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self>
    {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty() {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_from_hex_accepts_both_forms()
    {
        assert_eq!(Address::from_hex("7ffff7dc3000"), Some(Address::new(0x7fff_f7dc_3000)));
        assert_eq!(Address::from_hex("0x7ffff7dc3000"), Some(Address::new(0x7fff_f7dc_3000)));
        assert_eq!(Address::from_hex("0x"), None);
        assert_eq!(Address::from_hex("zz"), None);
    }

    #[test]
    fn test_padded_formatting()
    {
        assert_eq!(format!("0x{:08x}", Address::new(0x1100)), "0x00001100");
        assert_eq!(Address::new(0x1100).to_string(), "0x1100");
    }
}
