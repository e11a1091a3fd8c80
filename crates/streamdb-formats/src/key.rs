//! Shard lookup keys
//!
//! The archive identifies content by a 64-bit hash; streamdb shards index the
//! same content by a key derived from that hash. The derivation works on the
//! hash's 16-digit hex rendering:
//!
//! ```text
//! hash ─swap_bytes─> digits ─nibble swap─> rotate right 1 ─nibble swap─>
//!      set digit[1] = low hex digit of (6 + mip count) ─parse─> swap_bytes ─> key
//! ```
//!
//! Both byte swaps exist because archive hashes and shard keys are stored in
//! the opposite byte order from the domain the digit shuffle works in.

use std::fmt;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Reverse the byte order of a 64-bit value
pub const fn reverse_bytes(value: u64) -> u64 {
    value.swap_bytes()
}

/// Key addressing a block inside a streamdb shard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardKey(u64);

impl ShardKey {
    /// Wrap a raw key as stored in a shard index
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Derive the lookup key for a content hash and mip count
    pub fn derive(content_hash: u64, mip_count: i32) -> Self {
        let digits = to_hex_digits(reverse_bytes(content_hash));
        let scrambled = scramble_digits(digits, mip_count);
        Self(reverse_bytes(from_hex_digits(&scrambled)))
    }

    /// Raw key value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Key one above this one, wrapping at `u64::MAX`
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Key one below this one, wrapping at zero
    #[must_use]
    pub const fn prev(self) -> Self {
        Self(self.0.wrapping_sub(1))
    }

    /// Fixed-width lowercase hex rendering
    pub fn to_hex(self) -> String {
        hex::encode(self.0.to_be_bytes())
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for ShardKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ShardKey> for u64 {
    fn from(key: ShardKey) -> Self {
        key.0
    }
}

/// Digit shuffle applied between the two byte reversals.
///
/// Takes and returns 16 lowercase hex digits (most significant first).
pub fn scramble_digits(mut digits: [u8; 16], mip_count: i32) -> [u8; 16] {
    swap_digit_pairs(&mut digits);
    digits.rotate_right(1);
    swap_digit_pairs(&mut digits);
    digits[1] = mip_digit(mip_count);
    digits
}

/// Render a value as 16 lowercase hex digits
pub fn to_hex_digits(value: u64) -> [u8; 16] {
    let mut digits = [0u8; 16];
    for (i, digit) in digits.iter_mut().enumerate() {
        let shift = 60 - 4 * i;
        *digit = HEX_DIGITS[((value >> shift) & 0xF) as usize];
    }
    digits
}

/// Parse 16 hex digits back into a value.
///
/// Digits other than `0-9a-f` are treated as zero; [`to_hex_digits`] and
/// [`scramble_digits`] never produce them.
pub fn from_hex_digits(digits: &[u8; 16]) -> u64 {
    digits
        .iter()
        .fold(0u64, |acc, &d| (acc << 4) | u64::from(digit_value(d)))
}

fn swap_digit_pairs(digits: &mut [u8; 16]) {
    for pair in digits.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

// Only the low nibble survives, so negative sums wrap like a signed byte.
fn mip_digit(mip_count: i32) -> u8 {
    HEX_DIGITS[(6i32.wrapping_add(mip_count) & 0xF) as usize]
}

const fn digit_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => 0,
    }
}
