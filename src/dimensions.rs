//! Typed lengths for layout computations.
//!
//! Mixing up font design units, em quads and device pixels is the classic
//! source of wrong math layout, so the three live in distinct types:
//!
//!  - [`FUnit`]: the integer grid the font file addresses glyphs in
//!    (`units_per_em` of them make one em),
//!  - [`Em`]: the font's em quad; MATH constants are stored in em once
//!    loaded,
//!  - [`Px`]: device pixels, the unit of the final SVG user space.
//!
//! Conversion between them needs the font (`units_per_em`) or the current
//! font size and therefore lives on the layout settings, not here.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::error::ConfigError;

/// Smallest unit the font file can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FUnit;

/// The em quad of the current font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Em;

/// Device pixels of the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Px;

/// A floating quantity in unit `U`.
pub struct Unit<U> {
    value: f64,
    _unit: PhantomData<U>,
}

impl<U> Unit<U> {
    /// 0 in units U.
    pub const ZERO: Self = Unit { value: 0.0, _unit: PhantomData };

    pub const fn new(value: f64) -> Self {
        Unit { value, _unit: PhantomData }
    }

    /// The bare number, dropping the unit.
    pub fn unitless(self) -> f64 {
        self.value
    }

    pub fn is_zero(self) -> bool {
        self.value == 0.0
    }

    /// Multiplies by a dimensionless factor.
    pub fn scale(self, factor: f64) -> Self {
        Unit::new(self.value * factor)
    }

    pub fn min(a: Self, b: Self) -> Self {
        if a.value <= b.value { a } else { b }
    }

    pub fn max(a: Self, b: Self) -> Self {
        if a.value >= b.value { a } else { b }
    }

    pub fn abs(self) -> Self {
        Unit::new(self.value.abs())
    }
}

impl<U> Clone for Unit<U> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<U> Copy for Unit<U> {}

impl<U> Default for Unit<U> {
    fn default() -> Self {
        Unit::ZERO
    }
}

impl<U> PartialEq for Unit<U> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<U> PartialOrd for Unit<U> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<U> Add for Unit<U> {
    type Output = Unit<U>;
    fn add(self, rhs: Unit<U>) -> Unit<U> {
        Unit::new(self.value + rhs.value)
    }
}

impl<U> Sub for Unit<U> {
    type Output = Unit<U>;
    fn sub(self, rhs: Unit<U>) -> Unit<U> {
        Unit::new(self.value - rhs.value)
    }
}

impl<U> AddAssign for Unit<U> {
    fn add_assign(&mut self, rhs: Unit<U>) {
        self.value += rhs.value;
    }
}

impl<U> SubAssign for Unit<U> {
    fn sub_assign(&mut self, rhs: Unit<U>) {
        self.value -= rhs.value;
    }
}

impl<U> Neg for Unit<U> {
    type Output = Unit<U>;
    fn neg(self) -> Unit<U> {
        Unit::new(-self.value)
    }
}

impl<U> Mul<f64> for Unit<U> {
    type Output = Unit<U>;
    fn mul(self, rhs: f64) -> Unit<U> {
        Unit::new(self.value * rhs)
    }
}

impl<U> Div<f64> for Unit<U> {
    type Output = Unit<U>;
    fn div(self, rhs: f64) -> Unit<U> {
        Unit::new(self.value / rhs)
    }
}

/// Ratio of two lengths in the same unit.
impl<U> Div for Unit<U> {
    type Output = f64;
    fn div(self, rhs: Unit<U>) -> f64 {
        self.value / rhs.value
    }
}

impl<U> Sum for Unit<U> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Unit::new(iter.map(|u| u.value).sum())
    }
}

macro_rules! impl_unit_fmt {
    ($($unit:ty),*) => {
        $(
            impl fmt::Debug for Unit<$unit> {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, concat!("{:?} ", stringify!($unit)), self.value)
                }
            }
            impl fmt::Display for Unit<$unit> {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, concat!("{} ", stringify!($unit)), self.value)
                }
            }
        )*
    };
}

impl_unit_fmt!(FUnit, Em, Px);

// ------------------- Attribute lengths -------------------

/// Pixels per physical inch of the output space (CSS reference pixel).
const PX_PER_INCH: f64 = 96.0;

/// Units accepted in MathML length attributes and in configured column widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Em,
    /// x-height; approximated as half an em when the font is not consulted.
    Ex,
    Px,
    /// Printer's point, 1/72.27 in.
    Pt,
    Mm,
    Cm,
    In,
    /// Pica, 12 pt.
    Pc,
    /// Math unit, 1/18 em.
    Mu,
    /// Big point, 1/72 in.
    Bp,
    /// Didot point, 1238/1157 pt.
    Dd,
}

/// A length as written in an attribute, e.g. `"2.5em"` or `"0.4in"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnyLength {
    pub value: f64,
    pub unit: LengthUnit,
}

impl AnyLength {
    pub const ZERO: AnyLength = AnyLength { value: 0.0, unit: LengthUnit::Px };

    /// Parses a length string. A bare number is taken to be in pixels.
    pub fn parse(s: &str) -> Result<AnyLength, ConfigError> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        let (num, suffix) = s.split_at(split);
        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| ConfigError::BadLength(s.to_string()))?;
        let unit = match suffix.trim() {
            "" | "px" => LengthUnit::Px,
            "em" => LengthUnit::Em,
            "ex" => LengthUnit::Ex,
            "pt" => LengthUnit::Pt,
            "mm" => LengthUnit::Mm,
            "cm" => LengthUnit::Cm,
            "in" => LengthUnit::In,
            "pc" => LengthUnit::Pc,
            "mu" => LengthUnit::Mu,
            "bp" => LengthUnit::Bp,
            "dd" => LengthUnit::Dd,
            _ => return Err(ConfigError::BadLength(s.to_string())),
        };
        Ok(AnyLength { value, unit })
    }

    /// Resolves the length against the current font size (pixels per em).
    pub fn to_px(self, em_px: f64) -> Unit<Px> {
        let pt = PX_PER_INCH / 72.27;
        let px = match self.unit {
            LengthUnit::Px => self.value,
            LengthUnit::Em => self.value * em_px,
            LengthUnit::Ex => self.value * em_px * 0.5,
            LengthUnit::Pt => self.value * pt,
            LengthUnit::Mm => self.value * PX_PER_INCH / 25.4,
            LengthUnit::Cm => self.value * PX_PER_INCH / 2.54,
            LengthUnit::In => self.value * PX_PER_INCH,
            LengthUnit::Pc => self.value * 12.0 * pt,
            LengthUnit::Mu => self.value * em_px / 18.0,
            LengthUnit::Bp => self.value * PX_PER_INCH / 72.0,
            LengthUnit::Dd => self.value * (1238.0 / 1157.0) * pt,
        };
        Unit::new(px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Unit::<Px>::new(3.0);
        let b = Unit::<Px>::new(4.5);
        assert_eq!((a + b).unitless(), 7.5);
        assert_eq!((b - a).unitless(), 1.5);
        assert_eq!((-a).unitless(), -3.0);
        assert_eq!(a.scale(2.0).unitless(), 6.0);
        assert_eq!(Unit::max(a, b), b);
        assert_eq!(b / a, 1.5);
    }

    #[test]
    fn parse_lengths() {
        assert_eq!(AnyLength::parse("2em").unwrap(), AnyLength { value: 2.0, unit: LengthUnit::Em });
        assert_eq!(AnyLength::parse(" 1.5 ex ").unwrap(), AnyLength { value: 1.5, unit: LengthUnit::Ex });
        assert_eq!(AnyLength::parse("10").unwrap(), AnyLength { value: 10.0, unit: LengthUnit::Px });
        assert_eq!(AnyLength::parse("-3mu").unwrap(), AnyLength { value: -3.0, unit: LengthUnit::Mu });
        assert!(AnyLength::parse("2furlongs").is_err());
        assert!(AnyLength::parse("em").is_err());
    }

    #[test]
    fn resolve_lengths() {
        let em = 16.0;
        assert_close!(AnyLength::parse("2em").unwrap().to_px(em).unitless(), 32.0, 1e-9);
        assert_close!(AnyLength::parse("18mu").unwrap().to_px(em).unitless(), 16.0, 1e-9);
        assert_close!(AnyLength::parse("1in").unwrap().to_px(em).unitless(), 96.0, 1e-9);
        assert_close!(AnyLength::parse("72bp").unwrap().to_px(em).unitless(), 96.0, 1e-9);
        // TeX points are slightly smaller than big points
        assert!(AnyLength::parse("1pt").unwrap().to_px(em) < AnyLength::parse("1bp").unwrap().to_px(em));
    }
}
