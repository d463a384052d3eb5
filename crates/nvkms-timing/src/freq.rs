//! Integer frequency helpers and their log formatting.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive frequency range; units depend on context (Hz for horizontal sync, 1/1000 Hz for
/// vertical refresh).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub low: u32,
    pub high: u32,
}

impl FrequencyRange {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }
}

/// `value * percent / 100` with a 64-bit intermediate.
pub fn percentage(value: u32, percent: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(percent) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Formats a value in 1/1000 units as `"<int>.<3-digit frac>"`.
///
/// The integer part is reduced modulo 1000 so the output never exceeds seven characters.
pub fn frequency_to_string(value: u32) -> String {
    format!("{}.{:03}", (value / 1000) % 1000, value % 1000)
}

/// Formats ranges as a comma separated list; a degenerate range prints a single value.
pub fn ranges_to_string(ranges: &[FrequencyRange]) -> String {
    ranges
        .iter()
        .map(|range| {
            if range.low == range.high {
                frequency_to_string(range.low)
            } else {
                format!(
                    "{}-{}",
                    frequency_to_string(range.low),
                    frequency_to_string(range.high)
                )
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Displays a kHz value as MHz with one decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MhzPoint1(pub u32);

impl fmt::Display for MhzPoint1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 1000, (self.0 % 1000) / 100)
    }
}

/// Displays a kHz value as MHz with two decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MhzPoint2(pub u32);

impl fmt::Display for MhzPoint2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 1000, (self.0 % 1000) / 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn percentage_uses_wide_intermediate() {
        assert_eq!(percentage(55_000, 101), 55_550);
        assert_eq!(percentage(28_000, 99), 27_720);
        assert_eq!(percentage(u32::MAX, 100), u32::MAX);
        assert_eq!(percentage(u32::MAX, 101), u32::MAX);
    }

    #[test]
    fn megahertz_display() {
        assert_eq!(MhzPoint1(148_500).to_string(), "148.5");
        assert_eq!(MhzPoint1(25_175).to_string(), "25.1");
        assert_eq!(MhzPoint2(25_175).to_string(), "25.17");
        assert_eq!(MhzPoint2(594_000).to_string(), "594.00");
    }
}
