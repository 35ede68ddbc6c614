//! Glyph name → glif file name conversion.
//!
//! File names must be safe on every file system the font may travel to,
//! including case-insensitive ones and Windows with its reserved device
//! names. This is the only place uniqueness of file names is enforced.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Characters replaced with `_`.
static ILLEGAL_CHARS: LazyLock<HashSet<char>> = LazyLock::new(|| {
    let mut set: HashSet<char> = "\"*+/:<>?[\\]|\u{7f}".chars().collect();
    set.extend((0u8..32).map(char::from));
    set
});

/// Windows device names, compared case-insensitively per dot-separated part.
static RESERVED_NAMES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    [
        "con", "prn", "aux", "clock$", "nul", "com1", "com2", "com3", "com4", "lpt1", "lpt2",
        "lpt3",
    ]
    .into_iter()
    .collect()
});

/// Width of the numeric suffix added on collisions.
const SUFFIX_WIDTH: usize = 15;

/// Make a file-system-safe file name (without extension) for `name`.
///
/// `used` holds the lower-cased names already taken in the directory; a
/// name that collides case-insensitively gets a zero-padded counter.
/// The result is a pure function of the inputs.
#[must_use]
pub fn make_file_name(name: &str, used: &HashSet<String>) -> String {
    let mut escaped = String::with_capacity(name.len() * 2);
    for c in name.chars() {
        if ILLEGAL_CHARS.contains(&c) {
            escaped.push('_');
        } else {
            escaped.push(c);
            if is_upper(c) {
                escaped.push('_');
            }
        }
    }

    if escaped.starts_with('.') {
        escaped.replace_range(..1, "_");
    }

    let base = escaped
        .split('.')
        .map(|part| {
            if RESERVED_NAMES.contains(part.to_lowercase().as_str()) {
                format!("_{part}")
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".");

    if !used.contains(&base.to_lowercase()) {
        return base;
    }
    (1u64..)
        .map(|i| format!("{base}{i:0width$}", width = SUFFIX_WIDTH))
        .find(|candidate| !used.contains(&candidate.to_lowercase()))
        .unwrap_or(base)
}

/// True when lower-casing changes the character.
fn is_upper(c: char) -> bool {
    let mut lower = c.to_lowercase();
    !(lower.next() == Some(c) && lower.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_lowercase()).collect()
    }

    #[test]
    fn test_plain_names_unchanged() {
        assert_eq!(make_file_name("a", &used(&[])), "a");
        assert_eq!(make_file_name("a.alt", &used(&[])), "a.alt");
        assert_eq!(make_file_name("one_two", &used(&[])), "one_two");
    }

    #[test]
    fn test_uppercase_gets_underscore() {
        assert_eq!(make_file_name("A", &used(&[])), "A_");
        assert_eq!(make_file_name("AE", &used(&[])), "A_E_");
        assert_eq!(make_file_name("Aacute", &used(&[])), "A_acute");
        assert_eq!(make_file_name("Émacron", &used(&[])), "É_macron");
    }

    #[test]
    fn test_illegal_characters_replaced() {
        assert_eq!(make_file_name("a/b", &used(&[])), "a_b");
        assert_eq!(make_file_name("x*y?z", &used(&[])), "x_y_z");
        assert_eq!(make_file_name("tab\there", &used(&[])), "tab_here");
        assert_eq!(make_file_name("q[\\]", &used(&[])), "q___");
    }

    #[test]
    fn test_leading_dot_replaced() {
        assert_eq!(make_file_name(".notdef", &used(&[])), "_notdef");
        assert_eq!(make_file_name(".null", &used(&[])), "_null");
    }

    #[test]
    fn test_reserved_names_escaped() {
        assert_eq!(format!("{}.glif", make_file_name("con", &used(&[]))), "_con.glif");
        assert_eq!(make_file_name("con.alt", &used(&[])), "_con.alt");
        assert_eq!(make_file_name("alt.aux", &used(&[])), "alt._aux");
        assert_eq!(make_file_name("clock$", &used(&[])), "_clock$");
        // Upper-case letters are suffixed first, so "CON" no longer matches.
        assert_eq!(make_file_name("CON", &used(&[])), "C_O_N_");
    }

    #[test]
    fn test_case_variants_are_distinct() {
        let mut taken = HashSet::new();
        let upper = make_file_name("A", &taken);
        taken.insert(upper.to_lowercase());
        let lower = make_file_name("a", &taken);
        assert_eq!(upper, "A_");
        assert_eq!(lower, "a");
        assert_ne!(upper.to_lowercase(), lower.to_lowercase());
    }

    #[test]
    fn test_collision_gets_numeric_suffix() {
        let mut taken = HashSet::new();
        let first = make_file_name("A", &taken);
        taken.insert(first.to_lowercase());
        let second = make_file_name("a_", &taken);
        assert_eq!(first, "A_");
        assert_eq!(second, "a_000000000000001");

        taken.insert(second.to_lowercase());
        let third = make_file_name("a_", &taken);
        assert_eq!(third, "a_000000000000002");
    }

    #[test]
    fn test_collision_is_deterministic() {
        let run = || {
            let mut taken = HashSet::new();
            let mut out = Vec::new();
            for name in ["A", "a_", "a_"] {
                let file = make_file_name(name, &taken);
                taken.insert(file.to_lowercase());
                out.push(file);
            }
            out
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(make_file_name("", &used(&[])), "");
    }
}
