//! Signed WAD fixed-point arithmetic.
//!
//! Every fractional quantity in the engine (prices, inventory, spreads,
//! weights) is a signed integer scaled by `WAD = 10^18`, held in a 256-bit
//! signed integer so that products of two WAD values never overflow.
//!
//! Division truncates toward zero, exactly like native integer division.
//! Results are therefore bit-reproducible: `mul_wad(-3 raw, 0.5)` is `-1 raw`,
//! not `-2 raw` as floor division would give.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use alloy::primitives::{I256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// Number of fractional decimal digits in a WAD value.
pub const WAD_DECIMALS: u32 = 18;

/// Raw integer value of `1.0` in WAD.
pub const WAD_RAW: u64 = 1_000_000_000_000_000_000;

const fn raw_i256(v: u64) -> I256 {
    I256::from_raw(U256::from_limbs([v, 0, 0, 0]))
}

const WAD_I256: I256 = raw_i256(WAD_RAW);

/// `|x| >= 3.0` saturates `tanh_wad` to `±1.0`.
pub const TANH_SATURATION: Wad = Wad::from_raw_u64(3 * WAD_RAW);

/// Signed fixed-point number scaled by 10^18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Wad(I256);

impl Wad {
    pub const ZERO: Self = Self(I256::ZERO);
    pub const ONE: Self = Self(WAD_I256);
    pub const HALF: Self = Self::from_raw_u64(WAD_RAW / 2);

    /// Wrap a non-negative raw (already scaled) integer.
    #[inline]
    pub const fn from_raw_u64(raw: u64) -> Self {
        Self(raw_i256(raw))
    }

    /// Wrap a raw (already scaled) signed integer.
    pub fn from_raw_i128(raw: i128) -> Self {
        let magnitude = I256::from_raw(U256::from(raw.unsigned_abs()));
        if raw < 0 {
            Self(-magnitude)
        } else {
            Self(magnitude)
        }
    }

    /// Whole number of units, e.g. `from_int(2100)` is `2100.0`.
    pub fn from_int(units: i64) -> Self {
        Self::from_raw_i128(i128::from(units) * i128::from(WAD_RAW))
    }

    /// Convert an unsigned integer expressed with `decimals` fractional
    /// digits (e.g. a 1e8-scaled oracle price) into WAD.
    ///
    /// Sources with more than 18 decimals are truncated toward zero.
    pub fn from_units(value: u128, decimals: u32) -> CoreResult<Self> {
        if decimals > 2 * WAD_DECIMALS {
            return Err(CoreError::InvalidValue(format!(
                "unsupported source decimals: {decimals}"
            )));
        }
        let value = I256::from_raw(U256::from(value));
        if decimals <= WAD_DECIMALS {
            value
                .checked_mul(pow10(WAD_DECIMALS - decimals))
                .map(Self)
                .ok_or(CoreError::Overflow("unit conversion"))
        } else {
            value
                .checked_div(pow10(decimals - WAD_DECIMALS))
                .map(Self)
                .ok_or(CoreError::Overflow("unit conversion"))
        }
    }

    /// Exact conversion from a decimal. Digits beyond 18 decimal places are
    /// truncated toward zero.
    pub fn from_decimal(value: Decimal) -> CoreResult<Self> {
        let mantissa = Self::from_raw_i128(value.mantissa()).0;
        let scale = value.scale();
        let raw = if scale <= WAD_DECIMALS {
            mantissa.checked_mul(pow10(WAD_DECIMALS - scale))
        } else {
            mantissa.checked_div(pow10(scale - WAD_DECIMALS))
        };
        raw.map(Self).ok_or(CoreError::Overflow("decimal conversion"))
    }

    /// Lossless conversion to a decimal, if the value fits in 96 bits of
    /// mantissa.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let raw = i128::try_from(self.0).ok()?;
        Decimal::try_from_i128_with_scale(raw, WAD_DECIMALS).ok()
    }

    /// Underlying raw integer.
    #[inline]
    pub fn raw(&self) -> I256 {
        self.0
    }

    /// Raw integer as `i128`, if it fits.
    pub fn raw_i128(&self) -> Option<i128> {
        i128::try_from(self.0).ok()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// Absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    /// `self * rhs / WAD`, truncating toward zero.
    pub fn mul_wad(self, rhs: Self) -> CoreResult<Self> {
        let product = self
            .0
            .checked_mul(rhs.0)
            .ok_or(CoreError::Overflow("mul_wad"))?;
        Ok(Self(product / WAD_I256))
    }

    /// `mul_wad` for operands already known to be in range.
    fn mul_wad_trunc(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0 / WAD_I256)
    }

    /// `div_wad` for operands already known to be in range with `rhs != 0`.
    fn div_wad_trunc(self, rhs: Self) -> Self {
        Self(self.0 * WAD_I256 / rhs.0)
    }

    /// `self * WAD / rhs`, truncating toward zero.
    pub fn div_wad(self, rhs: Self) -> CoreResult<Self> {
        if rhs.is_zero() {
            return Err(CoreError::DivisionByZero);
        }
        let scaled = self
            .0
            .checked_mul(WAD_I256)
            .ok_or(CoreError::Overflow("div_wad"))?;
        scaled
            .checked_div(rhs.0)
            .map(Self)
            .ok_or(CoreError::Overflow("div_wad"))
    }

    /// Clamp into `[lo, hi]`. Never panics; `lo` wins if the bounds cross.
    #[inline]
    pub fn clamp_to(self, lo: Self, hi: Self) -> Self {
        std::cmp::max(lo, std::cmp::min(hi, self))
    }

    /// Raw midpoint `(a + b) / 2`, truncating toward zero.
    pub fn midpoint(a: Self, b: Self) -> Self {
        Self((a.0 + b.0) / raw_i256(2))
    }
}

/// `floor(x * y / WAD)` with truncation toward zero.
pub fn mul_wad(x: Wad, y: Wad) -> CoreResult<Wad> {
    x.mul_wad(y)
}

/// `x * WAD / y` with truncation toward zero. Fails on `y == 0`.
pub fn div_wad(x: Wad, y: Wad) -> CoreResult<Wad> {
    x.div_wad(y)
}

/// Clamp `x` into `[lo, hi]`.
pub fn clamp(x: Wad, lo: Wad, hi: Wad) -> Wad {
    x.clamp_to(lo, hi)
}

/// Absolute value.
pub fn abs(x: Wad) -> Wad {
    x.abs()
}

/// Rational approximation of `tanh`, saturating at `|x| >= 3`.
///
/// Inside the band the value is `x·(27 + x²) / (27 + 9·x²)`, with every step
/// composed from `mul_wad` and `div_wad` so each product truncates at WAD
/// scale. Not the true hyperbolic tangent, but odd and
/// monotonic on `(-3, 3)`, meeting `±1` at the saturation points.
pub fn tanh_wad(x: Wad) -> Wad {
    if x.abs() >= TANH_SATURATION {
        return if x.is_negative() { -Wad::ONE } else { Wad::ONE };
    }
    // |x| < 3 keeps every intermediate far from overflow and the
    // denominator at least 27.
    let twenty_seven = Wad::from_int(27);
    let x_sq = x.mul_wad_trunc(x);
    let numerator = x.mul_wad_trunc(twenty_seven + x_sq);
    let denominator = twenty_seven + Wad(raw_i256(9) * x_sq.0);
    numerator.div_wad_trunc(denominator)
}

fn pow10(exp: u32) -> I256 {
    let mut acc = U256::from(1u64);
    for _ in 0..exp {
        acc *= U256::from(10u64);
    }
    I256::from_raw(acc)
}

impl Default for Wad {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Wad {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Wad {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Wad {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Wad {
    /// Human-readable decimal, e.g. `2100.5` or `-0.0025`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.abs().0;
        let int_part = magnitude / WAD_I256;
        let frac_part = magnitude % WAD_I256;
        let sign = if self.is_negative() { "-" } else { "" };
        if frac_part.is_zero() {
            return write!(f, "{sign}{int_part}");
        }
        let frac = format!("{:0>18}", frac_part.to_string());
        write!(f, "{sign}{int_part}.{}", frac.trim_end_matches('0'))
    }
}

impl FromStr for Wad {
    type Err = CoreError;

    /// Parses a human decimal such as `"2100.25"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s)
            .map_err(|e| CoreError::InvalidValue(format!("{s}: {e}")))?;
        Self::from_decimal(value)
    }
}

impl TryFrom<Decimal> for Wad {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl Serialize for Wad {
    /// Serialized as the raw scaled integer string so that values survive
    /// JSON round trips bit-for-bit.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Wad {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        I256::from_dec_str(&raw)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn w(value: Decimal) -> Wad {
        Wad::from_decimal(value).unwrap()
    }

    #[test]
    fn test_constants() {
        assert_eq!(Wad::ONE.raw_i128(), Some(1_000_000_000_000_000_000));
        assert_eq!(Wad::HALF.raw_i128(), Some(500_000_000_000_000_000));
        assert_eq!(Wad::from_int(-2).raw_i128(), Some(-2_000_000_000_000_000_000));
    }

    #[test]
    fn test_mul_wad_basic() {
        let product = mul_wad(w(dec!(2100)), w(dec!(1.001))).unwrap();
        assert_eq!(product, w(dec!(2102.1)));
    }

    #[test]
    fn test_mul_wad_truncates_toward_zero() {
        // -3 raw * 0.5 = -1.5 raw: truncation gives -1, floor would give -2
        let product = mul_wad(Wad::from_raw_i128(-3), Wad::HALF).unwrap();
        assert_eq!(product, Wad::from_raw_i128(-1));

        let product = mul_wad(Wad::from_raw_i128(3), Wad::HALF).unwrap();
        assert_eq!(product, Wad::from_raw_i128(1));
    }

    #[test]
    fn test_div_wad_truncates_toward_zero() {
        // -1 / 3 = -0.333...
        let quotient = div_wad(Wad::from_int(-1), Wad::from_int(3)).unwrap();
        assert_eq!(quotient, Wad::from_raw_i128(-333_333_333_333_333_333));

        let quotient = div_wad(Wad::from_int(2), Wad::from_int(3)).unwrap();
        assert_eq!(quotient, Wad::from_raw_i128(666_666_666_666_666_666));
    }

    #[test]
    fn test_div_wad_by_zero() {
        assert_eq!(
            div_wad(Wad::ONE, Wad::ZERO),
            Err(CoreError::DivisionByZero)
        );
    }

    #[test]
    fn test_clamp_and_abs() {
        let lo = -Wad::HALF;
        let hi = Wad::HALF;
        assert_eq!(clamp(Wad::from_int(3), lo, hi), hi);
        assert_eq!(clamp(Wad::from_int(-3), lo, hi), lo);
        assert_eq!(clamp(w(dec!(0.25)), lo, hi), w(dec!(0.25)));
        assert_eq!(abs(w(dec!(-0.25))), w(dec!(0.25)));
        assert_eq!(abs(Wad::ZERO), Wad::ZERO);
    }

    #[test]
    fn test_tanh_known_values() {
        // 1 * 28 / 36
        assert_eq!(tanh_wad(Wad::ONE), Wad::from_raw_i128(777_777_777_777_777_777));
        // 0.5 * 27.25 / 29.25
        assert_eq!(tanh_wad(Wad::HALF), Wad::from_raw_i128(465_811_965_811_965_811));
        assert_eq!(tanh_wad(Wad::ZERO), Wad::ZERO);
    }

    #[test]
    fn test_tanh_saturates() {
        assert_eq!(tanh_wad(Wad::from_int(3)), Wad::ONE);
        assert_eq!(tanh_wad(Wad::from_int(-3)), -Wad::ONE);
        assert_eq!(tanh_wad(Wad::from_int(1_000)), Wad::ONE);
        assert_eq!(tanh_wad(Wad::from_int(-1_000)), -Wad::ONE);
        // x² truncates to 8.999.. so the quotient lands exactly on 1.
        let below = TANH_SATURATION - Wad::from_raw_i128(1);
        assert_eq!(tanh_wad(below), Wad::ONE);
        assert_eq!(tanh_wad(-below), -Wad::ONE);
    }

    #[test]
    fn test_tanh_truncates_at_wad_scale() {
        // x² rounds to zero, leaving x·27 / 27
        assert_eq!(tanh_wad(Wad::from_raw_i128(1)), Wad::from_raw_i128(1));
        assert_eq!(tanh_wad(Wad::from_raw_i128(7)), Wad::from_raw_i128(7));
        assert_eq!(tanh_wad(Wad::from_raw_i128(-7)), Wad::from_raw_i128(-7));
        assert_eq!(
            tanh_wad(w(dec!(0.0025))),
            Wad::from_raw_i128(2_499_995_370_380_015)
        );
        assert_eq!(
            tanh_wad(w(dec!(-0.0000025))),
            Wad::from_raw_i128(-2_499_999_999_995)
        );
    }

    #[test]
    fn test_tanh_is_odd() {
        let samples = [
            dec!(0.000000000000000001),
            dec!(0.0025),
            dec!(0.3),
            dec!(0.5),
            dec!(1),
            dec!(1.7),
            dec!(2.999999),
            dec!(3),
            dec!(12),
        ];
        for sample in samples {
            let x = w(sample);
            assert_eq!(tanh_wad(-x), -tanh_wad(x), "tanh not odd at {sample}");
        }
    }

    #[test]
    fn test_tanh_monotonic_inside_band() {
        let mut prev = tanh_wad(Wad::from_int(-3));
        let step = w(dec!(0.05));
        let mut x = Wad::from_int(-3);
        while x < Wad::from_int(3) {
            x = x + step;
            let y = tanh_wad(x);
            assert!(y >= prev, "tanh decreased at {x}");
            prev = y;
        }
    }

    #[test]
    fn test_from_units() {
        // 2100.00000000 at 1e8 scale
        let price = Wad::from_units(210_000_000_000, 8).unwrap();
        assert_eq!(price, Wad::from_int(2100));

        // 20-decimal source truncates the last two digits
        let fine = Wad::from_units(123, 20).unwrap();
        assert_eq!(fine, Wad::from_raw_i128(1));

        assert!(Wad::from_units(1, 40).is_err());
    }

    #[test]
    fn test_decimal_conversions() {
        let value = w(dec!(-0.0025));
        assert_eq!(value.raw_i128(), Some(-2_500_000_000_000_000));
        assert_eq!(value.to_decimal(), Some(dec!(-0.002500000000000000)));

        let fine = Wad::from_decimal(dec!(0.0000000000000000019)).unwrap();
        assert_eq!(fine, Wad::from_raw_i128(1));
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(w(dec!(2100)).to_string(), "2100");
        assert_eq!(w(dec!(-0.0025)).to_string(), "-0.0025");
        assert_eq!(w(dec!(1.5)).to_string(), "1.5");
        assert_eq!("0.001".parse::<Wad>().unwrap(), w(dec!(0.001)));
        assert!("abc".parse::<Wad>().is_err());
    }

    #[test]
    fn test_serde_uses_raw_integer() {
        let value = w(dec!(-1.25));
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"-1250000000000000000\"");
        let back: Wad = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_midpoint_truncates() {
        let mid = Wad::midpoint(Wad::ZERO, Wad::from_raw_i128(-5));
        assert_eq!(mid, Wad::from_raw_i128(-2));
        let mid = Wad::midpoint(Wad::from_int(1), Wad::from_int(2));
        assert_eq!(mid, w(dec!(1.5)));
    }
}
