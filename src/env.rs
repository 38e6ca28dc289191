//! Environment variable bindings carried by a profile.
//!
//! Bindings are kept in canonical order (ascending by name) whenever they are
//! built from user input or from a map, so rendering and comparisons are stable.
//!
//! Token parsing is permissive: anything that is not a single `NAME=VALUE`
//! pair is dropped rather than rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::scalar::scalar_string;

/// A single `name=value` environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvBinding {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
}

impl EnvBinding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a `NAME=VALUE` token.
    ///
    /// Returns `None` when the token has no `=`, more than one `=`, or a
    /// blank name.
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split('=');
        let name = parts.next()?;
        let value = parts.next()?;
        if parts.next().is_some() || name.trim().is_empty() {
            return None;
        }
        Some(Self::new(name, value))
    }
}

impl fmt::Display for EnvBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Ordered list of bindings. Serialized as a plain sequence of `{name, value}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvBindings(Vec<EnvBinding>);

impl EnvBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse CLI tokens into a canonically sorted list.
    ///
    /// Returns `None` when no tokens were supplied at all, so callers can tell
    /// "nothing given" apart from "given, but every token was malformed".
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Option<Self> {
        if tokens.is_empty() {
            return None;
        }

        let mut bindings: Self = tokens
            .iter()
            .filter_map(|token| {
                let token = token.as_ref();
                let parsed = EnvBinding::parse(token);
                if parsed.is_none() {
                    tracing::warn!(token, "ignoring malformed env token");
                }
                parsed
            })
            .collect();
        bindings.sort();
        Some(bindings)
    }

    /// Parse CLI tokens straight into a name -> value map (last write wins).
    pub fn parse_map<S: AsRef<str>>(tokens: &[S]) -> Option<BTreeMap<String, String>> {
        Self::parse(tokens).map(|bindings| bindings.to_map())
    }

    /// Build a canonically sorted list from any name -> value mapping.
    pub fn from_map<I, K, V>(map: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut bindings: Self = map
            .into_iter()
            .map(|(name, value)| EnvBinding::new(name, value))
            .collect();
        bindings.sort();
        bindings
    }

    /// Name -> value map. Later duplicates overwrite earlier ones.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|b| (b.name.clone(), b.value.clone()))
            .collect()
    }

    /// Stable in-place sort by name.
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Apply `NAME=VALUE` overrides on top of these bindings.
    ///
    /// Overrides replace bindings with the same name; every other existing
    /// binding is kept. When no override tokens were supplied the bindings are
    /// returned unchanged.
    pub fn merge<S: AsRef<str>>(&self, overrides: &[S]) -> Self {
        let Some(mut merged) = Self::parse_map(overrides) else {
            return self.clone();
        };

        for binding in &self.0 {
            merged
                .entry(binding.name.clone())
                .or_insert_with(|| binding.value.clone());
        }
        Self::from_map(merged)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnvBinding> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<EnvBinding>> for EnvBindings {
    fn from(bindings: Vec<EnvBinding>) -> Self {
        Self(bindings)
    }
}

impl FromIterator<EnvBinding> for EnvBindings {
    fn from_iter<T: IntoIterator<Item = EnvBinding>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EnvBindings {
    type Item = &'a EnvBinding;
    type IntoIter = std::slice::Iter<'a, EnvBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for EnvBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, binding) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{binding}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAG_TOKENS: &[&str] = &[
        "VAR_A=VAL_A",
        "something_not_valid",
        "VAR_B=VAL_B",
        "VAR_C=VAL_C",
        "VAR_D=VAL_D",
        "not:valid",
        " ",
        "how=about=this",
    ];

    fn unsorted() -> EnvBindings {
        EnvBindings::from(vec![
            EnvBinding::new("VAR_C", "VAL_C"),
            EnvBinding::new("VAR_A", "VAL_A"),
            EnvBinding::new("VAR_D", "VAL_D"),
            EnvBinding::new("VAR_B", "VAL_B"),
        ])
    }

    #[test]
    fn test_sort_and_render() {
        let mut envs = unsorted();
        envs.sort();
        assert_eq!(
            envs.to_string(),
            "VAR_A=VAL_A,VAR_B=VAL_B,VAR_C=VAL_C,VAR_D=VAL_D"
        );
    }

    #[test]
    fn test_render_single_and_empty() {
        let single = EnvBindings::from(vec![EnvBinding::new("HTTPS_PROXY", "http://proxy:3128")]);
        assert_eq!(single.to_string(), "HTTPS_PROXY=http://proxy:3128");
        assert_eq!(EnvBindings::new().to_string(), "");
    }

    #[test]
    fn test_parse_drops_malformed_tokens() {
        let parsed = EnvBindings::parse(FLAG_TOKENS).unwrap();
        let mut expected = unsorted();
        expected.sort();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_empty_is_none() {
        let empty: [&str; 0] = [];
        assert!(EnvBindings::parse(&empty).is_none());
        assert!(EnvBindings::parse_map(&empty).is_none());
    }

    #[test]
    fn test_parse_all_invalid_is_some_empty() {
        let parsed = EnvBindings::parse(&["nokey", "=value", "a=b=c"]).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_parse_keeps_empty_value() {
        let parsed = EnvBindings::parse(&["EMPTY="]).unwrap();
        assert_eq!(parsed.to_string(), "EMPTY=");
    }

    #[test]
    fn test_parse_map() {
        let map = EnvBindings::parse_map(FLAG_TOKENS).unwrap();
        let expected: BTreeMap<String, String> = [
            ("VAR_A", "VAL_A"),
            ("VAR_B", "VAL_B"),
            ("VAR_C", "VAL_C"),
            ("VAR_D", "VAL_D"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(map, expected);
    }

    #[test]
    fn test_to_map_last_write_wins() {
        let envs = EnvBindings::from(vec![
            EnvBinding::new("A", "first"),
            EnvBinding::new("A", "second"),
        ]);
        assert_eq!(envs.to_map().get("A").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_from_map_is_sorted() {
        let mut map = std::collections::HashMap::new();
        map.insert("VAR_D", "VAL_D");
        map.insert("VAR_B", "VAL_B");
        map.insert("VAR_A", "VAL_A");
        map.insert("VAR_C", "VAL_C");

        let mut expected = unsorted();
        expected.sort();
        assert_eq!(EnvBindings::from_map(map), expected);
    }

    #[test]
    fn test_from_empty_map() {
        let envs = EnvBindings::from_map(BTreeMap::<String, String>::new());
        assert!(envs.is_empty());
        assert_eq!(envs.to_string(), "");
    }

    #[test]
    fn test_merge_overrides_win() {
        let existing = EnvBindings::from_map([("HTTPS_PROXY", "old"), ("NO_PROXY", "localhost")]);
        let merged = existing.merge(&["HTTPS_PROXY=new", "EXTRA=1"]);
        assert_eq!(
            merged.to_string(),
            "EXTRA=1,HTTPS_PROXY=new,NO_PROXY=localhost"
        );
    }

    #[test]
    fn test_merge_without_overrides_is_unchanged() {
        let existing = unsorted();
        let none: [&str; 0] = [];
        assert_eq!(existing.merge(&none), existing);
    }
}
