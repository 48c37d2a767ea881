//! Interned IRIs used for classes, roles and individuals.

use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";

lazy_static! {
    static ref NAME_POOL: RwLock<HashSet<Arc<str>>> = RwLock::new(HashSet::new());
}

/// Interned name. Two names are equal iff they share the same allocation.
#[derive(Clone)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let s = s.as_ref();
        {
            let pool = NAME_POOL.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(interned) = pool.get(s) {
                return Name(Arc::clone(interned));
            }
        }

        let mut pool = NAME_POOL.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(interned) = pool.get(s) {
            return Name(Arc::clone(interned));
        }
        let interned: Arc<str> = Arc::from(s);
        pool.insert(Arc::clone(&interned));
        Name(interned)
    }

    pub fn thing() -> Self {
        Name::new(OWL_THING)
    }

    pub fn nothing() -> Self {
        Name::new(OWL_NOTHING)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fragment after the last `#`, `/` or `:`, or the whole name.
    pub fn local_name(&self) -> &str {
        let s = self.as_str();
        match s.rfind(|c| c == '#' || c == '/' || c == ':') {
            Some(pos) if pos + 1 < s.len() => &s[pos + 1..],
            _ => s,
        }
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const u8 as usize).hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.0, &other.0) {
            Ordering::Equal
        } else {
            self.as_str().cmp(other.as_str())
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::new(s)
    }
}

impl From<&String> for Name {
    fn from(s: &String) -> Self {
        Name::new(s)
    }
}

impl From<&Name> for Name {
    fn from(n: &Name) -> Self {
        n.clone()
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Name::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_shares_allocation() {
        let a = Name::new("http://example.org/A");
        let b = Name::new(String::from("http://example.org/A"));
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_ne!(a, Name::new("http://example.org/B"));
    }

    #[test]
    fn test_ordering_is_lexical() {
        let mut names = vec![Name::new("ex:c"), Name::new("ex:a"), Name::new("ex:b")];
        names.sort();
        let strs: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(strs, vec!["ex:a", "ex:b", "ex:c"]);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(Name::thing().local_name(), "Thing");
        assert_eq!(Name::new("http://example.org/people/Alice").local_name(), "Alice");
        assert_eq!(Name::new("plain").local_name(), "plain");
        assert_eq!(Name::new("ex:alice").local_name(), "alice");
        assert_eq!(Name::new("urn:isbn:0451450523").local_name(), "0451450523");
        assert_eq!(Name::new("http://example.org/").local_name(), "http://example.org/");
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let name = Name::new("http://example.org/A");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"http://example.org/A\"");
        let back: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
