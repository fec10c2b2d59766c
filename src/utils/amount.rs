//! Fixed-precision balances.
//!
//! Balances are kept in integer base units together with the number of decimals
//! the asset uses, so equality checks never see floating point noise.

use std::cmp::Ordering;
use std::fmt;

/// Decimals of the native SOL balance (lamports).
pub const SOL_DECIMALS: u8 = 9;

/// Digits shown after the decimal point when rendering a change.
pub const DELTA_DISPLAY_DECIMALS: u8 = 4;

#[derive(Debug, Clone, Copy)]
pub struct Amount {
    pub raw: u64,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: u64, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self { raw: 0, decimals }
    }

    pub fn from_lamports(lamports: u64) -> Self {
        Self::new(lamports, SOL_DECIMALS)
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Raw units re-expressed at a wider scale. Saturates instead of overflowing.
    fn scaled_to(&self, decimals: u8) -> u128 {
        let shift = decimals.saturating_sub(self.decimals) as u32;
        10u128
            .checked_pow(shift)
            .and_then(|factor| (self.raw as u128).checked_mul(factor))
            .unwrap_or(u128::MAX)
    }

    /// `new - self`, expressed at the wider of the two scales.
    pub fn delta_to(&self, new: &Amount) -> AmountDelta {
        let decimals = self.decimals.max(new.decimals);
        let old = i128::try_from(self.scaled_to(decimals)).unwrap_or(i128::MAX);
        let new = i128::try_from(new.scaled_to(decimals)).unwrap_or(i128::MAX);
        AmountDelta::new(new - old, decimals)
    }

    /// Sums two holdings of the same asset (several token accounts for one mint).
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        let decimals = self.decimals.max(other.decimals);
        let sum = self.scaled_to(decimals).checked_add(other.scaled_to(decimals))?;
        u64::try_from(sum).ok().map(|raw| Amount::new(raw, decimals))
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        let decimals = self.decimals.max(other.decimals);
        self.scaled_to(decimals).cmp(&other.scaled_to(decimals))
    }
}

/// Renders the shortest exact decimal, keeping at least one fractional digit
/// (`1.0`, `1.5`, `0.000005`).
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.raw.to_string();
        let decimals = self.decimals as usize;
        let padded = if digits.len() <= decimals {
            format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            write!(f, "{}.0", int_part)
        } else {
            write!(f, "{}.{}", int_part, frac_part)
        }
    }
}

/// Signed difference between two amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountDelta {
    pub raw: i128,
    pub decimals: u8,
}

impl AmountDelta {
    pub fn new(raw: i128, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn is_positive(&self) -> bool {
        self.raw > 0
    }

    /// Magnitude rounded half away from zero to `DELTA_DISPLAY_DECIMALS` places.
    fn display_units(&self) -> u128 {
        let magnitude = self.raw.unsigned_abs();
        let target = DELTA_DISPLAY_DECIMALS;
        if self.decimals <= target {
            let factor = 10u128.pow((target - self.decimals) as u32);
            return magnitude.saturating_mul(factor);
        }
        match 10u128.checked_pow((self.decimals - target) as u32) {
            Some(divisor) => {
                let quotient = magnitude / divisor;
                let remainder = magnitude % divisor;
                if remainder >= divisor - remainder {
                    quotient + 1
                } else {
                    quotient
                }
            }
            None => 0,
        }
    }
}

/// Always signed, always four fractional digits: `+0.5000`, `-1.2500`.
impl fmt::Display for AmountDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.raw < 0 { '-' } else { '+' };
        let units = self.display_units();
        let scale = 10u128.pow(DELTA_DISPLAY_DECIMALS as u32);
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            units / scale,
            units % scale,
            width = DELTA_DISPLAY_DECIMALS as usize
        )
    }
}
