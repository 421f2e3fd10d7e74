//! Cell text formatting.
//!
//! All number rendering goes through an explicit [`NumberFormat`] so output
//! never depends on the host locale.

use serde::Deserialize;

use crate::model::{BoxEntry, Numeric};

pub const BOX_UNIT: &str = "box";
pub const EACH_UNIT: &str = "EA";
pub const WEIGHT_UNIT: &str = "kg";
pub const VOLUME_UNIT: &str = "m³";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub decimal_places: usize,
    pub grouping_separator: String,
    pub decimal_separator: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            decimal_places: 2,
            grouping_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        }
    }
}

impl NumberFormat {
    /// Thousands-grouped amount, e.g. `1234.5 -> "1,234.50"`.
    pub fn amount(&self, value: Option<&Numeric>) -> String {
        match value.and_then(Numeric::to_f64) {
            Some(v) => self.render(v, true),
            None => String::new(),
        }
    }

    /// Fixed-point weight or volume without grouping, e.g. `"12.3" -> "12.30"`.
    pub fn weight(&self, value: Option<&Numeric>) -> String {
        match value.and_then(Numeric::to_f64) {
            Some(v) => self.render(v, false),
            None => String::new(),
        }
    }

    /// Weight with its unit token, blank when the value is missing or zero.
    pub fn measure(&self, value: Option<&Numeric>, unit: &str) -> String {
        match value.and_then(Numeric::to_f64) {
            Some(v) if v != 0.0 => format!("{}{}", self.render(v, false), unit),
            _ => String::new(),
        }
    }

    fn render(&self, value: f64, grouped: bool) -> String {
        let fixed = format!("{:.*}", self.decimal_places, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut out = String::new();
        // "-0.00" reads as zero
        if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
            out.push('-');
        }

        if grouped {
            let digits = int_part.len();
            for (i, c) in int_part.chars().enumerate() {
                if i > 0 && (digits - i) % 3 == 0 {
                    out.push_str(&self.grouping_separator);
                }
                out.push(c);
            }
        } else {
            out.push_str(int_part);
        }

        if let Some(frac) = frac_part {
            out.push_str(&self.decimal_separator);
            out.push_str(frac);
        }
        out
    }
}

/// Integer count suffixed with its unit token (`"12EA"`, `"3box"`).
pub fn count_with_unit(count: Option<i64>, unit: &str) -> String {
    match count {
        Some(n) => format!("{}{}", n, unit),
        None => String::new(),
    }
}

/// Size cell of the Marks columns.
///
/// A non-blank `dimensionString` wins; otherwise the label is derived from
/// the three dimensions as `"{w}x{l}x{h}cm"`.
pub fn box_dimensions(entry: &BoxEntry) -> String {
    if let Some(precomputed) = entry.dimension_string.as_deref() {
        if !precomputed.trim().is_empty() {
            return precomputed.to_string();
        }
    }

    let dims = [&entry.width, &entry.length, &entry.height]
        .map(|d| d.as_ref().and_then(Numeric::to_f64));
    match dims {
        [Some(w), Some(l), Some(h)] => format!("{}x{}x{}cm", plain(w), plain(l), plain(h)),
        _ => String::new(),
    }
}

pub fn box_title(entry: &BoxEntry) -> String {
    match entry.title.as_deref() {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => "Box".to_string(),
    }
}

// f64's Display is already the shortest round-trip form ("40", "12.5")
fn plain(v: f64) -> String {
    format!("{}", v)
}
