//! Fixed-width binary chromosome used as a feature mask.
//!
//! A [`Chromosome`] stores up to 64 bits in a `u64`. Bit `i` (LSB first) selects
//! feature column `i`. Bits at or above the dataset's feature count are carried
//! through crossover and mutation but ignored by [`projection`](crate::projection).
//!
//! All operations are pure: they return new values instead of twiddling bits in place.
//!
//! # Text Form
//!
//! The text form lists bits from bit 0 upward, one `'0'`/`'1'` character per bit, so
//! character `j` answers "is feature `j` selected?":
//!
//! ```
//! use featsel_data::chromosome::Chromosome;
//!
//! let c = Chromosome::new(0b0110, 6);
//! assert_eq!(c.to_string(), "011000");
//! assert_eq!("011000".parse::<Chromosome>().unwrap(), c);
//! ```

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum number of bits a chromosome can carry.
pub const MAX_LEN: usize = 64;

/// Default chromosome length.
pub const DEFAULT_LEN: usize = 64;

const fn len_mask(len: usize) -> u64 {
    if len >= MAX_LEN {
        u64::MAX
    } else {
        (1 << len) - 1
    }
}

/// Fixed-width bit vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chromosome {
    bits: u64,
    len: usize,
}

impl Chromosome {
    /// Creates a chromosome of `len` bits. Bits at or above `len` are cleared.
    ///
    /// # Panics
    ///
    /// Panics if `len` is 0 or greater than [`MAX_LEN`].
    #[must_use]
    pub fn new(bits: u64, len: usize) -> Self {
        assert!(
            (1..=MAX_LEN).contains(&len),
            "chromosome length must be in 1..={MAX_LEN}, got {len}"
        );
        Self {
            bits: bits & len_mask(len),
            len,
        }
    }

    /// Creates a chromosome with every bit cleared.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self::new(0, len)
    }

    /// Creates a chromosome with uniformly random bits.
    pub fn random<R>(len: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(rng.random(), len)
    }

    /// Raw bit value.
    #[must_use]
    pub fn bits(self) -> u64 {
        self.bits
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.len
    }

    /// Always `false`: chromosomes hold at least one bit.
    #[must_use]
    pub fn is_empty(self) -> bool {
        false
    }

    /// Returns bit `i`. Out-of-range bits read as `false`.
    #[must_use]
    pub fn get(self, i: usize) -> bool {
        i < self.len && (self.bits >> i) & 1 == 1
    }

    /// Returns a copy with bit `i` set to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[must_use]
    pub fn with_bit(self, i: usize, value: bool) -> Self {
        assert!(i < self.len, "bit {i} out of range for length {}", self.len);
        let bit = 1 << i;
        let bits = if value {
            self.bits | bit
        } else {
            self.bits & !bit
        };
        Self { bits, ..self }
    }

    /// Number of set bits.
    #[must_use]
    pub fn popcount(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Number of set bits among positions `0..limit`.
    #[must_use]
    pub fn popcount_below(self, limit: usize) -> usize {
        (self.bits & len_mask(limit.min(self.len))).count_ones() as usize
    }

    /// Ascending indices of set bits among positions `0..limit`.
    pub fn selected_indices(self, limit: usize) -> impl Iterator<Item = usize> {
        (0..limit.min(self.len)).filter(move |&i| self.get(i))
    }

    /// Single-point crossover.
    ///
    /// The first child takes bits `0..point` from `self` and the rest from `other`;
    /// the second child takes the complementary bits.
    ///
    /// # Panics
    ///
    /// Panics if the chromosomes differ in length or `point > len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use featsel_data::chromosome::Chromosome;
    ///
    /// let a = Chromosome::new(0b1111, 4);
    /// let b = Chromosome::new(0b0000, 4);
    /// let (c1, c2) = a.crossover(b, 1);
    /// assert_eq!(c1.bits(), 0b0001);
    /// assert_eq!(c2.bits(), 0b1110);
    /// ```
    #[must_use]
    pub fn crossover(self, other: Self, point: usize) -> (Self, Self) {
        assert_eq!(self.len, other.len, "crossover of chromosomes of different lengths");
        assert!(point <= self.len);
        let low = len_mask(point);
        let high = !low & len_mask(self.len);
        (
            Self::new((self.bits & low) | (other.bits & high), self.len),
            Self::new((other.bits & low) | (self.bits & high), self.len),
        )
    }

    /// Flips each bit independently with probability `rate`.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is outside `[0, 1]`.
    #[must_use]
    pub fn mutate<R>(self, rate: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut flips = 0;
        for i in 0..self.len {
            if rng.random_bool(rate) {
                flips |= 1 << i;
            }
        }
        Self {
            bits: self.bits ^ flips,
            ..self
        }
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Error returned when parsing a chromosome from its text form.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseChromosomeError {
    #[display("chromosome text must have 1..=64 characters, got {len}")]
    InvalidLength { len: usize },
    #[display("invalid character {ch:?} at position {pos}")]
    InvalidChar { ch: char, pos: usize },
}

impl FromStr for Chromosome {
    type Err = ParseChromosomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if !(1..=MAX_LEN).contains(&len) {
            return Err(ParseChromosomeError::InvalidLength { len });
        }
        let mut bits = 0;
        for (pos, ch) in s.chars().enumerate() {
            match ch {
                '0' => {}
                '1' => bits |= 1 << pos,
                _ => return Err(ParseChromosomeError::InvalidChar { ch, pos }),
            }
        }
        Ok(Self::new(bits, len))
    }
}

impl Serialize for Chromosome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Chromosome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
