use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered `key=value` argument map used for device discovery, construction
/// and hardware info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kwargs(BTreeMap<String, String>);

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `"a=1, b=2"`. A bare key maps to an empty value and empty
    /// segments are skipped.
    pub fn parse(input: &str) -> Self {
        let mut args = Self::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((key, value)) => args.insert(key.trim(), value.trim()),
                None => args.insert(part, ""),
            }
        }
        args
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries of `other` override entries of `self`.
    pub fn merge(&mut self, other: &Kwargs) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }
}

impl fmt::Display for Kwargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Kwargs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        for (key, value) in iter {
            args.insert(key, value);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::Kwargs;

    #[test]
    fn parses_pairs_and_bare_keys() {
        let args = Kwargs::parse(" driver=filesdr , fifo = /tmp/x,,flag ");
        assert_eq!(args.get("driver"), Some("filesdr"));
        assert_eq!(args.get("fifo"), Some("/tmp/x"));
        assert_eq!(args.get("flag"), Some(""));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn value_may_contain_equals() {
        let args = Kwargs::parse("fifo=/tmp/a=b");
        assert_eq!(args.get("fifo"), Some("/tmp/a=b"));
    }

    #[test]
    fn display_is_sorted_by_key() {
        let args: Kwargs = [("label", "filesdr"), ("driver", "filesdr")]
            .into_iter()
            .collect();
        assert_eq!(args.to_string(), "driver=filesdr, label=filesdr");
        assert_eq!(Kwargs::parse(&args.to_string()), args);
    }

    #[test]
    fn merge_overrides() {
        let mut base = Kwargs::parse("fifo=/tmp/a, driver=filesdr");
        base.merge(&Kwargs::parse("fifo=/tmp/b"));
        assert_eq!(base.get("fifo"), Some("/tmp/b"));
        assert_eq!(base.get("driver"), Some("filesdr"));
    }
}
