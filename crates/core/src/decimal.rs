//! Fixed-point decimal numbers.
//!
//! Prices arrive as text like `"1234.56"`. Parsing them into a [`Decimal`]
//! keeps every digit, so sums come out the same no matter how the rows are
//! grouped or in which order partial totals are added.

use alloc::string::ToString;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Largest number of fractional digits a [`Decimal`] holds.
const MAX_SCALE: u32 = 18;

const POW10: [i128; MAX_SCALE as usize + 1] = {
    let mut table = [1i128; MAX_SCALE as usize + 1];
    let mut i = 1;
    while i < table.len() {
        table[i] = table[i - 1] * 10;
        i += 1;
    }
    table
};

/// `mantissa / 10^scale`, exact.
#[derive(Clone, Copy, Debug)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Returns None if `scale` exceeds 18.
    pub fn new(mantissa: i128, scale: u32) -> Option<Decimal> {
        (scale <= MAX_SCALE).then_some(Decimal { mantissa, scale })
    }

    /// Parses plain decimal text: optional sign, digits, optional fraction.
    ///
    /// Exponents, empty digit runs and more than 18 fractional
    /// digits are rejected.
    pub fn parse(text: &str) -> Option<Decimal> {
        let text = text.trim();
        let (negative, digits) = match text.as_bytes().first().copied()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if fraction.len() > MAX_SCALE as usize {
            return None;
        }

        let mut mantissa: i128 = 0;
        for b in whole.bytes().chain(fraction.bytes()) {
            if !b.is_ascii_digit() {
                return None;
            }
            mantissa = mantissa
                .checked_mul(10)?
                .checked_add(i128::from(b - b'0'))?;
        }
        if negative {
            mantissa = -mantissa;
        }
        Some(Decimal {
            mantissa,
            scale: fraction.len() as u32,
        })
    }

    /// Exact sum, or None on overflow.
    pub fn checked_add(self, other: Decimal) -> Option<Decimal> {
        let scale = self.scale.max(other.scale);
        let a = self.rescale(scale)?;
        let b = other.rescale(scale)?;
        Some(Decimal {
            mantissa: a.checked_add(b)?,
            scale,
        })
    }

    fn rescale(&self, scale: u32) -> Option<i128> {
        self.mantissa.checked_mul(POW10[(scale - self.scale) as usize])
    }

    /// Drops trailing fractional zeros.
    pub fn normalize(self) -> Decimal {
        let Decimal {
            mut mantissa,
            mut scale,
        } = self;
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Decimal { mantissa, scale }
    }

    /// Returns the value as an i64 if it has no fractional part and fits.
    pub fn to_i64(&self) -> Option<i64> {
        let d = self.normalize();
        if d.scale == 0 {
            i64::try_from(d.mantissa).ok()
        } else {
            None
        }
    }

    /// Nearest f64.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Whole part and the fraction scaled to 18 digits, both
    /// truncated toward zero. Comparing these pairs never overflows.
    fn key(&self) -> (i128, i128) {
        let unit = POW10[self.scale as usize];
        let whole = self.mantissa / unit;
        let fraction = self.mantissa % unit * POW10[(MAX_SCALE - self.scale) as usize];
        (whole, fraction)
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Decimal {
            mantissa: i128::from(v),
            scale: 0,
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = POW10[self.scale as usize];
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let abs = self.mantissa.unsigned_abs();
        let whole = abs / unit as u128;
        if self.scale == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let fraction = abs % unit as u128;
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            whole,
            fraction,
            width = self.scale as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(text: &str) -> Decimal {
        Decimal::parse(text).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(d("1234.56"), Decimal::new(123456, 2).unwrap());
        assert_eq!(d("-0.5"), Decimal::new(-5, 1).unwrap());
        assert_eq!(d(".5"), d("0.5"));
        assert_eq!(d("7."), d("7"));
        assert!(Decimal::parse("").is_none());
        assert!(Decimal::parse(".").is_none());
        assert!(Decimal::parse("-").is_none());
        assert!(Decimal::parse("1e3").is_none());
        assert!(Decimal::parse("1.2.3").is_none());
        assert!(Decimal::parse("0.1234567890123456789").is_none());
    }

    #[test]
    fn test_exact_addition() {
        let sum = d("0.1").checked_add(d("0.2")).unwrap();
        assert_eq!(sum, d("0.3"));
        assert_eq!(sum.to_f64(), 0.3);
        assert_eq!(d("1999.99").checked_add(d("0.01")).unwrap(), d("2000"));
        assert!(Decimal::new(i128::MAX, 0)
            .unwrap()
            .checked_add(d("1"))
            .is_none());
    }

    #[test]
    fn test_equality_ignores_scale() {
        assert_eq!(d("1.50"), d("1.5"));
        assert_eq!(d("-0"), d("0.00"));
        assert_eq!(d("2.10").normalize().to_string(), "2.1");
        assert_eq!(d("3.00").to_i64(), Some(3));
        assert_eq!(d("3.01").to_i64(), None);
    }

    #[test]
    fn test_ordering() {
        assert!(d("-1.5") < d("-1.2"));
        assert!(d("-1.0") < d("-0.9"));
        assert!(d("-0.5") < d("0.5"));
        assert!(d("0.09") < d("0.1"));
        assert!(d("10") > d("9.999"));
    }

    #[test]
    fn test_display() {
        assert_eq!(d("1234.50").to_string(), "1234.50");
        assert_eq!(d("-0.05").to_string(), "-0.05");
        assert_eq!(d("42").to_string(), "42");
        assert_eq!(d("0.30").normalize().to_string(), "0.3");
    }
}
