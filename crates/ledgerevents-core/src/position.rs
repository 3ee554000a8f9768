//! Block positions — 64-bit ledger heights and their decimal-string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The committed height of a ledger block.
///
/// Carried natively as an unsigned 64-bit integer and converted to/from a
/// decimal string only at the checkpoint and delivery boundaries, so values
/// beyond any smaller "safe integer" range round-trip without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockPosition(u64);

impl BlockPosition {
    /// Wrap a raw block height.
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    /// The raw block height.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for BlockPosition {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A checkpoint key that is not a decimal block position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid block position: {0:?}")]
pub struct InvalidPosition(pub String);

impl FromStr for BlockPosition {
    type Err = InvalidPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidPosition(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_round_trip() {
        let pos = BlockPosition::new(42);
        let key = pos.to_string();
        assert_eq!(key, "42");
        assert_eq!(key.parse::<BlockPosition>().unwrap(), pos);
    }

    #[test]
    fn round_trip_above_53_bits() {
        // 2^53 + 1 — unrepresentable as an IEEE double, fine as u64.
        let pos = BlockPosition::new(9_007_199_254_740_993);
        let key = pos.to_string();
        assert_eq!(key, "9007199254740993");
        assert_eq!(key.parse::<BlockPosition>().unwrap().value(), 9_007_199_254_740_993);
    }

    #[test]
    fn rejects_non_decimal_keys() {
        assert!("0x10".parse::<BlockPosition>().is_err());
        assert!("-1".parse::<BlockPosition>().is_err());
        assert!("".parse::<BlockPosition>().is_err());
    }

    #[test]
    fn ordering_follows_height() {
        assert!(BlockPosition::new(9) < BlockPosition::new(10));
        assert_eq!(BlockPosition::from(7).value(), 7);
    }
}
