//! PGN tag pairs.
//!
//! The Seven Tag Roster is a fixed record that always renders first, in its
//! standard order. Any other key goes to an ordered extension list.

use crate::ChessError;

/// Keys of the Seven Tag Roster, in rendering order.
pub const REQUIRED_TAGS: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// The seven tags every PGN game carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SevenTagRoster {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub result: String,
}

impl Default for SevenTagRoster {
    fn default() -> Self {
        let unknown = || "?".to_string();
        SevenTagRoster {
            event: unknown(),
            site: unknown(),
            date: unknown(),
            round: unknown(),
            white: unknown(),
            black: unknown(),
            result: "*".to_string(),
        }
    }
}

impl SevenTagRoster {
    fn slot(&self, key: &str) -> Option<&String> {
        match key {
            "Event" => Some(&self.event),
            "Site" => Some(&self.site),
            "Date" => Some(&self.date),
            "Round" => Some(&self.round),
            "White" => Some(&self.white),
            "Black" => Some(&self.black),
            "Result" => Some(&self.result),
            _ => None,
        }
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "Event" => Some(&mut self.event),
            "Site" => Some(&mut self.site),
            "Date" => Some(&mut self.date),
            "Round" => Some(&mut self.round),
            "White" => Some(&mut self.white),
            "Black" => Some(&mut self.black),
            "Result" => Some(&mut self.result),
            _ => None,
        }
    }
}

/// A game's tag pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    roster: SevenTagRoster,
    extra: Vec<(String, String)>,
}

impl TagSet {
    /// A tag set holding only the roster defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self) -> &SevenTagRoster {
        &self.roster
    }

    /// Returns the value of a tag.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.roster
            .slot(key)
            .or_else(|| self.extra.iter().find(|(k, _)| k == key).map(|(_, v)| v))
            .map(String::as_str)
    }

    /// Sets a tag. Unknown keys are appended after the ones already present;
    /// an existing key keeps its place.
    ///
    /// Keys are limited to ASCII letters, digits and `_`, the characters a
    /// PGN tag name may use. Any other key is rejected with
    /// [`ChessError::InvalidPgn`] and the set is left unchanged.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), ChessError> {
        if !is_tag_key(key) {
            return Err(ChessError::InvalidPgn(format!("invalid tag name {:?}", key)));
        }
        self.insert(key, value);
        Ok(())
    }

    /// Sets a tag whose key is already known to be well formed.
    pub(crate) fn insert(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.roster.slot_mut(key) {
            *slot = value;
        } else if let Some((_, v)) = self.extra.iter_mut().find(|(k, _)| k == key) {
            *v = value;
        } else {
            self.extra.push((key.to_string(), value));
        }
    }

    /// Iterates over all tags: the roster first, then the extensions in
    /// insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        REQUIRED_TAGS
            .iter()
            .filter_map(|&key| self.roster.slot(key).map(|v| (key, v.as_str())))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        REQUIRED_TAGS.len() + self.extra.len()
    }

    /// The roster is always present, so a tag set is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The tag section of a PGN document, one `[Key "Value"]` per line.
    pub fn to_pgn(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("[{} \"{}\"]\n", key, escape(value)))
            .collect()
    }
}

/// Returns true if `key` can be written as a PGN tag name.
pub fn is_tag_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escapes `\` and `"` inside a tag value.
pub(crate) fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let tags = TagSet::new();
        assert_eq!(tags.get("Event"), Some("?"));
        assert_eq!(tags.get("Date"), Some("?"));
        assert_eq!(tags.get("Result"), Some("*"));
        assert_eq!(tags.get("ECO"), None);
        assert_eq!(tags.len(), 7);
    }

    #[test]
    fn roster_renders_first() {
        let mut tags = TagSet::new();
        tags.set("ECO", "C20").unwrap();
        tags.set("White", "Morphy").unwrap();
        tags.set("Annotator", "x").unwrap();
        tags.set("ECO", "C21").unwrap();
        let keys: Vec<&str> = tags.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["Event", "Site", "Date", "Round", "White", "Black", "Result", "ECO", "Annotator"]
        );
        assert_eq!(tags.get("ECO"), Some("C21"));
        assert_eq!(tags.get("White"), Some("Morphy"));
    }

    #[test]
    fn to_pgn_escapes_values() {
        let mut tags = TagSet::new();
        tags.set("Event", r#"The "Immortal" \ game"#).unwrap();
        let pgn = tags.to_pgn();
        assert!(pgn.starts_with("[Event \"The \\\"Immortal\\\" \\\\ game\"]\n[Site \"?\"]\n"));
        assert!(pgn.ends_with("[Result \"*\"]\n"));
        assert_eq!(pgn.lines().count(), 7);
    }

    #[test]
    fn keys_must_be_pgn_names() {
        let mut tags = TagSet::new();
        for bad in ["", "My Tag", "Tag]", "Quote\"", "Été"] {
            assert!(
                matches!(tags.set(bad, "x"), Err(ChessError::InvalidPgn(_))),
                "{bad}"
            );
        }
        assert_eq!(tags, TagSet::new());
        tags.set("Time_Control2", "40/7200").unwrap();
        assert_eq!(tags.get("Time_Control2"), Some("40/7200"));
    }
}
