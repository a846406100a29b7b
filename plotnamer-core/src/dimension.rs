use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A discretized print-size class in feet, derived from inch measurements
/// embedded in a filename (e.g. `24x30` -> `2x3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionClass {
    pub width_ft: u32,
    pub height_ft: u32,
}

impl DimensionClass {
    /// Build a class from already-bucketed foot values, enforcing the minimum
    /// billable area of 2 square feet by clamping to 1x2.
    pub fn new(width_ft: u32, height_ft: u32) -> Self {
        if width_ft * height_ft < 2 {
            Self {
                width_ft: 1,
                height_ft: 2,
            }
        } else {
            Self {
                width_ft,
                height_ft,
            }
        }
    }

    /// The filename suffix form, e.g. `(FT.2x3)`.
    pub fn suffix(&self) -> String {
        format!("(FT.{})", self)
    }
}

impl fmt::Display for DimensionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width_ft, self.height_ft)
    }
}

/// Convert an inch measurement to its foot bucket.
///
/// The step table is part of the shop's billing convention and must not be
/// "simplified": both 21-26 and 27-38 inch ranges exist in it, and 27-32 and
/// 33-38 intentionally share bucket 3.
pub fn to_feet(inches: f64) -> u32 {
    if inches <= 20.0 {
        1
    } else if inches <= 26.0 {
        2
    } else if inches <= 32.0 {
        3
    } else if inches <= 38.0 {
        3
    } else if inches <= 50.0 {
        4
    } else if inches <= 62.0 {
        5
    } else if inches <= 74.0 {
        6
    } else if inches <= 98.0 {
        8
    } else {
        10
    }
}

fn dimension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+\.?\d*)\s*x\s*(\d+\.?\d*)").unwrap())
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\s*x\s*\d+").unwrap())
}

/// Normalize a filename for pattern matching: collapse whitespace, lower-case,
/// and treat an uppercase `X` separator as `x`.
pub(crate) fn normalize(filename: &str) -> String {
    let lowered = filename.replace('X', "x").to_lowercase();
    whitespace_pattern()
        .replace_all(lowered.trim(), " ")
        .into_owned()
}

/// Extract the first `<number> x <number>` token from a filename and bucket it
/// into a foot class. Returns `None` when the filename carries no dimensions;
/// later matches are ignored, first wins.
pub fn extract_dimensions(filename: &str) -> Option<DimensionClass> {
    let clean = normalize(filename);
    let caps = dimension_pattern().captures(&clean)?;
    let w_in: f64 = caps[1].parse().ok()?;
    let h_in: f64 = caps[2].parse().ok()?;
    Some(DimensionClass::new(to_feet(w_in), to_feet(h_in)))
}

/// Remove every `<int> x <int>` substring from an already-normalized name.
/// The quantity detector runs on the stripped text so dimension numbers are
/// never misread as quantities. Matches whole integers only, so text adjacent
/// to the digits (an extension dot in particular) survives.
pub(crate) fn strip_dimensions(normalized: &str) -> String {
    let stripped = strip_pattern().replace_all(normalized, "");
    whitespace_pattern()
        .replace_all(stripped.trim(), " ")
        .into_owned()
}
