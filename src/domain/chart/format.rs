use serde::{Deserialize, Serialize};

/// Decimal formatter for prices and volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumberFormat {
    pub decimals: u32,
    /// Insert `,` between thousands
    pub grouping: bool,
}

impl NumberFormat {
    pub fn new(decimals: u32, grouping: bool) -> Self {
        Self { decimals, grouping }
    }

    pub fn format(&self, value: f64) -> String {
        let raw = format!("{:.*}", self.decimals as usize, value);
        if !self.grouping {
            return raw;
        }
        let (sign, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", raw.as_str()),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (unsigned, None),
        };
        let mut grouped = String::with_capacity(raw.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        match frac_part {
            Some(frac) => format!("{}{}.{}", sign, grouped, frac),
            None => format!("{}{}", sign, grouped),
        }
    }

    /// Compact rendering with K/M suffixes for large magnitudes.
    pub fn fmt_small(&self, value: f64) -> String {
        let magnitude = value.abs();
        if magnitude >= 1_000_000.0 {
            format!("{:.2}M", value / 1_000_000.0)
        } else if magnitude >= 10_000.0 {
            format!("{:.2}K", value / 1_000.0)
        } else {
            self.format(value)
        }
    }
}

/// `fraction` of 0.0123 renders as `1.23%`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}
