use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
///
/// `Display` prints all 4 places unless a precision is given, in which case the
/// value is rounded half away from zero first: `format!("{:.2}", amount)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 10_000;
    const PLACES: u32 = 4;

    pub const ZERO: Amount = Amount(0);

    pub fn from_float(value: f64) -> Self {
        Amount((value * Self::SCALE as f64).round() as i64)
    }

    pub const fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    pub const fn from_cents(cents: i64) -> Self {
        Amount(cents.saturating_mul(100))
    }

    pub fn scaled(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Round half away from zero to `places` decimal places (at most 4).
    pub fn round_dp(self, places: u32) -> Self {
        let step = 10_i64.pow(Self::PLACES - places.min(Self::PLACES));
        Amount::saturating(div_round(self.0 as i128, step as i128) * step as i128)
    }

    pub fn round_to_cents(self) -> Self {
        self.round_dp(2)
    }

    /// Multiply by a rate, rounding the result to the amount's precision.
    pub fn apply_rate(self, rate: Rate) -> Self {
        let product = self.0 as i128 * rate.bps() as i128;
        Amount::saturating(div_round(product, Rate::BPS_SCALE as i128))
    }
}

impl Amount {
    fn saturating(value: i128) -> Self {
        Amount(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

fn div_round(value: i128, divisor: i128) -> i128 {
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        (value - half) / divisor
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = f
            .precision()
            .map_or(Self::PLACES, |p| (p as u32).min(Self::PLACES));
        let value = self.round_dp(places);
        let sign = if value.0 < 0 { "-" } else { "" };
        let abs = value.0.unsigned_abs();
        let whole = abs / Self::SCALE as u64;
        if places == 0 {
            return write!(f, "{sign}{whole}");
        }
        let frac = (abs % Self::SCALE as u64) / 10_u64.pow(Self::PLACES - places);
        write!(f, "{sign}{whole}.{frac:0width$}", width = places as usize)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

/// Unit price times quantity, saturating at the representable range.
impl std::ops::Mul<u32> for Amount {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Amount::saturating(self.0 as i128 * rhs as i128)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

/// A percentage stored in basis points (1/100 of a percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Rate(u32);

impl Rate {
    const BPS_SCALE: u32 = 10_000;

    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    pub const fn from_percent(percent: u32) -> Self {
        Rate(percent * 100)
    }

    pub fn bps(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        match self.0 % 100 {
            0 => write!(f, "{whole}%"),
            frac if frac % 10 == 0 => write!(f, "{whole}.{}%", frac / 10),
            frac => write!(f, "{whole}.{frac:02}%"),
        }
    }
}
