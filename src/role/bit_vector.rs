/// Fixed-width big-endian binary form of a non-negative integer, one `0`/`1` per position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
  bits: Vec<u8>,
}

impl BitVector {
  /// Fill positions from the least significant end (index `width - 1`) towards index `0`.
  /// Bits that do not fit in `width` are dropped.
  pub fn encode(value: u64, width: usize) -> Self {
    let mut bits = vec![0u8; width];
    let mut rest = value;
    let mut cursor = width;
    while rest > 0 && cursor > 0 {
      cursor -= 1;
      bits[cursor] = (rest % 2) as u8;
      rest /= 2;
    }
    Self { bits }
  }

  pub fn decode(&self) -> u64 {
    self
      .bits
      .iter()
      .fold(0u64, |acc, bit| acc.wrapping_shl(1) | u64::from(*bit))
  }

  pub fn width(&self) -> usize {
    self.bits.len()
  }

  pub fn bits(&self) -> &[u8] {
    &self.bits
  }

  /// True if both vectors have the same width and share at least one set position.
  pub fn overlaps(&self, other: &Self) -> bool {
    self.width() == other.width() && self.bits.iter().zip(other.bits.iter()).any(|(a, b)| a & b == 1)
  }
}

/// Number of bits needed to represent `value`; zero needs none.
pub fn bit_length(value: u64) -> usize {
  (u64::BITS - value.leading_zeros()) as usize
}
