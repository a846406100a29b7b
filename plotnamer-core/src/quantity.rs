use crate::dimension::{normalize, strip_dimensions};
use regex::Regex;

/// Default quantity-indicator keywords, in match-priority order.
pub const DEFAULT_KEYWORDS: &[&str] = &["copy", "copies", "pcs", "pieces", "x"];

/// Detect the print quantity embedded in a filename.
///
/// Dimension tokens are stripped before scanning so a `24x30` never reads as
/// quantity 24. Keywords are tried in the caller-supplied order and the first
/// match wins, so list order is a user-controlled disambiguation mechanism.
/// Returns 1 when no keyword matches.
pub fn detect_quantity(filename: &str, keywords: &[String]) -> u32 {
    let clean = strip_dimensions(&normalize(filename));

    for kw in keywords {
        let escaped = regex::escape(kw);
        // "2 copy", "3pcs"
        if let Some(qty) = capture_quantity(&format!(r"\b(\d+)\s*{escaped}\b"), &clean) {
            return qty;
        }
        // "copy 2", "x3"
        if let Some(qty) = capture_quantity(&format!(r"\b{escaped}\s*(\d+)\b"), &clean) {
            return qty;
        }
    }
    1
}

fn capture_quantity(pattern: &str, text: &str) -> Option<u32> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)?[1].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn number_before_keyword() {
        assert_eq!(detect_quantity("2 copy 24x30.plt", &kw(&["copy"])), 2);
    }

    #[test]
    fn keyword_before_number() {
        assert_eq!(detect_quantity("banner copy 3.plt", &kw(&["copy"])), 3);
    }

    #[test]
    fn dimension_numbers_are_not_quantities() {
        assert_eq!(detect_quantity("Design 60 x 36.plt", &kw(&["x"])), 1);
    }

    #[test]
    fn default_when_no_keyword_matches() {
        assert_eq!(detect_quantity("design final.plt", &kw(&["copy", "pcs"])), 1);
    }

    #[test]
    fn keyword_order_controls_disambiguation() {
        let name = "5 pcs 2 copy.plt";
        assert_eq!(detect_quantity(name, &kw(&["copy", "pcs"])), 2);
        assert_eq!(detect_quantity(name, &kw(&["pcs", "copy"])), 5);
    }

    #[test]
    fn x_keyword_survives_dimension_stripping() {
        // "2 x" is a quantity marker; "24x30" is a dimension.
        assert_eq!(detect_quantity("sign 24x30 2 x.plt", &kw(&["x"])), 2);
    }

    #[test]
    fn keyword_with_regex_metachars_is_escaped() {
        // The dot is literal, not a wildcard.
        assert_eq!(detect_quantity("job 4 q.s done.plt", &kw(&["q.s"])), 4);
        assert_eq!(detect_quantity("job 4 qxs done.plt", &kw(&["q.s"])), 1);
    }
}
