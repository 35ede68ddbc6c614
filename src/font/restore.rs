//! Restoring values from a previously written font.
//!
//! When a font is regenerated by an external tool, some keys are lost.
//! [`restore_keys`] copies them back from the plist of an earlier copy.

use std::fmt;

use tracing::{debug, info};

use crate::error::Result;
use crate::plist::{Plist, PlistValue};

/// Longest value shown in full in change messages.
const MAX_SHOWN: usize = 21;

/// One key whose value was changed.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyChange {
    pub key: String,
    pub old: Option<PlistValue>,
    pub new: Option<PlistValue>,
}

impl fmt::Display for KeyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_change(
            &self.key,
            "restored from backup",
            self.old.as_ref(),
            self.new.as_ref(),
        ))
    }
}

/// Copy `keys` from `backup` into `target` where they differ.
///
/// Values for `integer_keys` are converted to integers first. Keys absent
/// from `backup` are left alone.
///
/// # Errors
///
/// Fails when a backup value cannot be decoded.
pub fn restore_keys(
    target: &mut Plist,
    backup: &Plist,
    keys: &[&str],
    integer_keys: &[&str],
) -> Result<Vec<KeyChange>> {
    let mut changes = Vec::new();
    for &key in keys {
        if !backup.contains(key) {
            continue;
        }
        let mut new = backup.get(key)?;
        if integer_keys.contains(&key) {
            new = to_integer(new);
        }
        let old = target.get(key).ok();
        if old.as_ref() == Some(&new) {
            continue;
        }
        target.set_value(key, &new)?;
        let change = KeyChange {
            key: key.to_string(),
            old,
            new: Some(new),
        };
        info!("{change}");
        log_full_values(&change);
        changes.push(change);
    }
    Ok(changes)
}

#[allow(clippy::cast_possible_truncation)]
fn to_integer(value: PlistValue) -> PlistValue {
    let parsed = match &value {
        PlistValue::Real(r) => Some(r.trunc() as i64),
        PlistValue::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.map_or(value, PlistValue::Integer)
}

fn log_full_values(change: &KeyChange) {
    for value in [&change.old, &change.new].into_iter().flatten() {
        let text = value.to_string();
        if text.chars().count() > MAX_SHOWN {
            debug!("Full value for {}: {text}", change.key);
        }
    }
}

/// One-line description of a value change, shortening long values.
#[must_use]
pub fn describe_change(
    key: &str,
    action: &str,
    old: Option<&PlistValue>,
    new: Option<&PlistValue>,
) -> String {
    let mut message = format!("{key} {action}.");
    match (old, new) {
        (None, Some(new)) => message.push_str(&format!(" New value: {}", shorten(new))),
        (Some(old), None) => message.push_str(&format!(" Old value: {}", shorten(old))),
        (Some(old), Some(new)) => message.push_str(&format!(
            " Old value: {}, new value: {}",
            shorten(old),
            shorten(new)
        )),
        (None, None) => {}
    }
    message
}

fn shorten(value: &PlistValue) -> String {
    let text = value.to_string();
    if text.chars().count() <= MAX_SHOWN {
        return text;
    }
    let mut short: String = text.chars().take(MAX_SHOWN - 1).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn plist(text: &str) -> Plist {
        Plist::from_element(parse_str(text, "test").unwrap())
    }

    #[test]
    fn test_restore_copies_differing_values() {
        let mut target = plist(
            "<plist><dict><key>styleMapStyleName</key><string>regular</string></dict></plist>",
        );
        let backup = plist(
            "<plist><dict>
                <key>styleMapStyleName</key><string>regular</string>
                <key>openTypeOS2WeightClass</key><string>700</string>
                <key>postscriptFontName</key><string>Test-Bold</string>
            </dict></plist>",
        );
        let changes = restore_keys(
            &mut target,
            &backup,
            &["styleMapStyleName", "openTypeOS2WeightClass", "postscriptFontName", "absent"],
            &["openTypeOS2WeightClass"],
        )
        .unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(target.get("openTypeOS2WeightClass").unwrap(), PlistValue::Integer(700));
        assert_eq!(target.get_string("postscriptFontName").unwrap(), "Test-Bold");
        assert_eq!(changes[0].old, None);
    }

    #[test]
    fn test_restore_arrays() {
        let mut target = plist("<plist><dict/></plist>");
        let backup = plist(
            "<plist><dict><key>public.glyphOrder</key><array><string>a</string><string>b</string></array></dict></plist>",
        );
        let changes = restore_keys(&mut target, &backup, &["public.glyphOrder"], &[]).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(
            target.get("public.glyphOrder").unwrap(),
            PlistValue::Array(vec![PlistValue::String("a".into()), PlistValue::String("b".into())])
        );
    }

    #[test]
    fn test_describe_change_truncates() {
        let long = PlistValue::String("abcdefghijklmnopqrstuvwxyz".into());
        let short = PlistValue::Integer(1);
        assert_eq!(
            describe_change("k", "updated", Some(&short), Some(&long)),
            "k updated. Old value: 1, new value: abcdefghijklmnopqrst..."
        );
        assert_eq!(describe_change("k", "added", None, Some(&short)), "k added. New value: 1");
        assert_eq!(describe_change("k", "removed", Some(&short), None), "k removed. Old value: 1");

        let exact = PlistValue::String("a".repeat(21));
        assert_eq!(
            describe_change("k", "added", None, Some(&exact)),
            format!("k added. New value: {}", "a".repeat(21))
        );
    }
}
