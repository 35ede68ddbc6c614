//! Canonicalization of element trees before rendering.
//!
//! Normalizing rounds numeric values and sorts dictionary keys. It only
//! ever reorders key/value pairs or rewrites number text, so running it
//! twice yields the same tree as running it once.

use crate::xml::Element;

/// Round `text` to `precision` fractional digits.
///
/// Returns the formatted number and whether it is integral, or `None`
/// when the text is not a number (callers then leave it untouched).
/// Rounding is decimal-correct for the parsed value: `1.005` is stored
/// as `1.00499…` and rounds to `1` at two digits.
#[must_use]
pub fn format_number(text: &str, precision: u32) -> Option<(String, bool)> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let rounded: f64 = format!("{:.*}", precision as usize, value).parse().ok()?;
    if rounded.fract() == 0.0 {
        let folded = if rounded == 0.0 { 0.0 } else { rounded };
        Some((format!("{folded:.0}"), true))
    } else {
        Some((rounded.to_string(), false))
    }
}

/// Normalize an element tree in place, children before parents.
///
/// * With a `precision`, `<integer>` and `<real>` nodes are rounded and
///   re-tagged `integer` when the result has no fractional part.
/// * With `sort_dicts`, `<dict>` key/value pairs are sorted by key.
pub fn normalize(element: &mut Element, precision: Option<u32>, sort_dicts: bool) {
    for child in &mut element.children {
        normalize(child, precision, sort_dicts);
    }

    if let Some(precision) = precision {
        if element.tag == "integer" || element.tag == "real" {
            if let Some((text, integral)) = format_number(element.text(), precision) {
                element.tag = if integral { "integer" } else { "real" }.to_string();
                element.text = Some(text);
            }
        }
    }

    if sort_dicts && element.tag == "dict" {
        sort_dict(element);
    }
}

fn sort_dict(dict: &mut Element) {
    if dict.children.len() % 2 != 0 {
        tracing::error!("Malformed dict with an odd number of children; not sorted");
        return;
    }
    let already_sorted = dict
        .children
        .chunks(2)
        .zip(dict.children.chunks(2).skip(1))
        .all(|(a, b)| a[0].text() <= b[0].text());
    if already_sorted {
        return;
    }

    let mut pairs: Vec<(Element, Element)> = Vec::with_capacity(dict.children.len() / 2);
    let mut children = std::mem::take(&mut dict.children).into_iter();
    while let (Some(key), Some(value)) = (children.next(), children.next()) {
        pairs.push((key, value));
    }
    pairs.sort_by(|a, b| a.0.text().cmp(b.0.text()));
    dict.children = pairs.into_iter().flat_map(|(k, v)| [k, v]).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, Element)]) -> Element {
        let mut d = Element::new("dict");
        for (k, v) in pairs {
            d.children.push(Element::with_text("key", *k));
            d.children.push(v.clone());
        }
        d
    }

    #[test]
    fn test_format_number_precision_two() {
        assert_eq!(format_number("1.005", 2), Some(("1".to_string(), true)));
        assert_eq!(format_number("1.0", 2), Some(("1".to_string(), true)));
        assert_eq!(format_number("3.14159", 2), Some(("3.14".to_string(), false)));
        assert_eq!(format_number("-0.001", 2), Some(("0".to_string(), true)));
        assert_eq!(format_number("abc", 2), None);
    }

    #[test]
    fn test_format_number_beyond_i64() {
        assert_eq!(
            format_number("1e20", 2),
            Some(("100000000000000000000".to_string(), true))
        );
        assert_eq!(
            format_number("-2.5e19", 0),
            Some(("-25000000000000000000".to_string(), true))
        );
        assert_eq!(format_number("-0.0", 3), Some(("0".to_string(), true)));
    }

    #[test]
    fn test_normalize_retags_numbers() {
        let mut el = Element::new("array")
            .child(Element::with_text("real", "1.0"))
            .child(Element::with_text("real", "2.5"))
            .child(Element::with_text("integer", "7"));
        normalize(&mut el, Some(2), false);
        assert_eq!(el.children[0].tag, "integer");
        assert_eq!(el.children[0].text(), "1");
        assert_eq!(el.children[1].tag, "real");
        assert_eq!(el.children[1].text(), "2.5");
        assert_eq!(el.children[2].text(), "7");
    }

    #[test]
    fn test_normalize_deterministic_across_runs() {
        let source = Element::new("array")
            .child(Element::with_text("real", "1.005"))
            .child(Element::with_text("real", "1.0"));
        let mut first = source.clone();
        let mut second = source.clone();
        normalize(&mut first, Some(2), true);
        normalize(&mut second, Some(2), true);
        assert_eq!(first, second);
        assert_eq!(first.children[0].text(), "1");
        assert_eq!(first.children[1].text(), "1");
    }

    #[test]
    fn test_sort_dicts_is_idempotent() {
        let mut d = dict(&[
            ("zeta", Element::with_text("string", "z")),
            ("alpha", Element::with_text("string", "a")),
            ("mid", Element::new("true")),
        ]);
        normalize(&mut d, None, true);
        let keys: Vec<_> = d.children.iter().step_by(2).map(Element::text).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
        assert_eq!(d.children[1].text(), "a");

        let once = d.clone();
        normalize(&mut d, None, true);
        assert_eq!(d, once);
    }

    #[test]
    fn test_nested_dicts_sorted_without_precision_change() {
        let inner = dict(&[("b", Element::with_text("real", "0.5")), ("a", Element::with_text("integer", "1"))]);
        let mut outer = dict(&[("y", inner), ("x", Element::new("false"))]);
        normalize(&mut outer, None, true);
        assert_eq!(outer.children[0].text(), "x");
        assert_eq!(outer.children[3].children[0].text(), "a");
        assert_eq!(outer.children[3].children[3].text(), "0.5");
    }
}
